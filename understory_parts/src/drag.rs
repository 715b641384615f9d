// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragable parts.
//!
//! A dragable part stores a normalized value, size, step and page per axis,
//! each in `0..=1`. Values are reported in user orientation: on an axis the
//! template declares [`DragAxis::Reversed`](crate::DragAxis::Reversed), the
//! stored value is `1 - v` and getters undo that.
//!
//! While any pointer grab is active ([`Engine::part_drag_press`]), API
//! calls that move the value are ignored.

use kurbo::Vec2;
use understory_scene::Scene;

use crate::engine::{Engine, InstanceId};
use crate::part::DragState;
use crate::theme::{DragAxis, Dragable};

bitflags::bitflags! {
    /// Axes along which a part can be dragged.
    ///
    /// Empty for parts that are not dragable.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DragDir: u8 {
        /// Dragable horizontally.
        const X = 0b0000_0001;
        /// Dragable vertically.
        const Y = 0b0000_0010;
    }
}

impl Default for DragDir {
    fn default() -> Self {
        Self::empty()
    }
}

fn unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn orient(axis: DragAxis, v: f64) -> f64 {
    match axis {
        DragAxis::Reversed => 1.0 - v,
        _ => v,
    }
}

impl<S: Scene> Engine<S> {
    fn drag_part(&self, id: InstanceId, part: &str) -> Option<(Dragable, DragState)> {
        let (inst, idx) = self.part(id, part)?;
        let dragable = inst.collection().parts[idx].dragable;
        if !dragable.x.is_dragable() && !dragable.y.is_dragable() {
            return None;
        }
        Some((dragable, inst.parts[idx].drag))
    }

    fn drag_update(
        &mut self,
        id: InstanceId,
        part: &str,
        update: impl FnOnce(&mut DragState) -> bool,
    ) -> bool {
        let Some((inst, idx)) = self.part_mut(id, part) else {
            return false;
        };
        update(&mut inst.parts[idx].drag)
    }

    /// Returns the axes along which a part is dragable.
    #[must_use]
    pub fn part_drag_dir_get(&self, id: InstanceId, part: &str) -> DragDir {
        let Some((dragable, _)) = self.drag_part(id, part) else {
            return DragDir::empty();
        };
        let mut dir = DragDir::empty();
        dir.set(DragDir::X, dragable.x.is_dragable());
        dir.set(DragDir::Y, dragable.y.is_dragable());
        dir
    }

    /// Sets the drag value and emits `drag,set` when it changed.
    ///
    /// Inputs are clamped to `0..=1`.
    pub fn part_drag_value_set(&mut self, id: InstanceId, part: &str, dx: f64, dy: f64) {
        let Some((dragable, drag)) = self.drag_part(id, part) else {
            return;
        };
        if drag.down_count > 0 {
            return;
        }
        let value = Vec2::new(
            orient(dragable.x, unit(dx)),
            orient(dragable.y, unit(dy)),
        );
        if value == drag.value {
            return;
        }
        self.drag_update(id, part, |d| {
            d.value = value;
            true
        });
        self.drag_moved(id, part, "drag,set");
    }

    /// Returns the drag value in user orientation, or [`Vec2::ZERO`].
    #[must_use]
    pub fn part_drag_value_get(&self, id: InstanceId, part: &str) -> Vec2 {
        self.drag_part(id, part)
            .map_or(Vec2::ZERO, |(dragable, drag)| {
                Vec2::new(
                    orient(dragable.x, drag.value.x),
                    orient(dragable.y, drag.value.y),
                )
            })
    }

    /// Sets the dragable's size relative to its confinement.
    pub fn part_drag_size_set(&mut self, id: InstanceId, part: &str, dw: f64, dh: f64) {
        if self.drag_part(id, part).is_none() {
            return;
        }
        let size = Vec2::new(unit(dw), unit(dh));
        let changed = self.drag_update(id, part, |d| {
            let changed = d.size != size;
            d.size = size;
            changed
        });
        if changed && let Some(inst) = self.instance_mut(id) {
            inst.dirty = true;
            self.recalc(id);
        }
    }

    /// Returns the dragable's relative size, or [`Vec2::ZERO`].
    #[must_use]
    pub fn part_drag_size_get(&self, id: InstanceId, part: &str) -> Vec2 {
        self.drag_part(id, part).map_or(Vec2::ZERO, |(_, d)| d.size)
    }

    /// Sets the increment used by [`Engine::part_drag_step`].
    pub fn part_drag_step_set(&mut self, id: InstanceId, part: &str, dx: f64, dy: f64) {
        if self.drag_part(id, part).is_none() {
            return;
        }
        let step = Vec2::new(unit(dx), unit(dy));
        self.drag_update(id, part, |d| {
            d.step = step;
            true
        });
    }

    /// Returns the step increment, or [`Vec2::ZERO`].
    #[must_use]
    pub fn part_drag_step_get(&self, id: InstanceId, part: &str) -> Vec2 {
        self.drag_part(id, part).map_or(Vec2::ZERO, |(_, d)| d.step)
    }

    /// Sets the increment used by [`Engine::part_drag_page`].
    pub fn part_drag_page_set(&mut self, id: InstanceId, part: &str, dx: f64, dy: f64) {
        if self.drag_part(id, part).is_none() {
            return;
        }
        let page = Vec2::new(unit(dx), unit(dy));
        self.drag_update(id, part, |d| {
            d.page = page;
            true
        });
    }

    /// Returns the page increment, or [`Vec2::ZERO`].
    #[must_use]
    pub fn part_drag_page_get(&self, id: InstanceId, part: &str) -> Vec2 {
        self.drag_part(id, part).map_or(Vec2::ZERO, |(_, d)| d.page)
    }

    /// Moves the value by `dx`/`dy` steps and emits `drag,step`.
    pub fn part_drag_step(&mut self, id: InstanceId, part: &str, dx: f64, dy: f64) {
        self.drag_nudge(id, part, Vec2::new(dx, dy), false);
    }

    /// Moves the value by `dx`/`dy` pages and emits `drag,page`.
    pub fn part_drag_page(&mut self, id: InstanceId, part: &str, dx: f64, dy: f64) {
        self.drag_nudge(id, part, Vec2::new(dx, dy), true);
    }

    fn drag_nudge(&mut self, id: InstanceId, part: &str, delta: Vec2, page: bool) {
        let Some((dragable, drag)) = self.drag_part(id, part) else {
            return;
        };
        if drag.down_count > 0 {
            return;
        }
        let inc = if page { drag.page } else { drag.step };
        let value = Vec2::new(
            unit(drag.value.x + delta.x * inc.x * dragable.x.sign()),
            unit(drag.value.y + delta.y * inc.y * dragable.y.sign()),
        );
        if value == drag.value {
            return;
        }
        self.drag_update(id, part, |d| {
            d.value = value;
            true
        });
        self.drag_moved(id, part, if page { "drag,page" } else { "drag,step" });
    }

    /// Records a pointer grab on a dragable part.
    pub fn part_drag_press(&mut self, id: InstanceId, part: &str) {
        if self.drag_part(id, part).is_none() {
            return;
        }
        self.drag_update(id, part, |d| {
            d.down_count += 1;
            true
        });
    }

    /// Releases a pointer grab on a dragable part.
    pub fn part_drag_release(&mut self, id: InstanceId, part: &str) {
        if self.drag_part(id, part).is_none() {
            return;
        }
        self.drag_update(id, part, |d| {
            d.down_count = d.down_count.saturating_sub(1);
            true
        });
    }

    fn drag_moved(&mut self, id: InstanceId, part: &str, emission: &str) {
        if let Some(inst) = self.instance_mut(id) {
            inst.dirty = true;
        }
        self.recalc(id);
        self.signal_emit(id, emission, part);
    }
}
