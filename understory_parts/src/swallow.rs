// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swallowing externally owned scene objects into parts.
//!
//! A swallowed object is borrowed: the engine drives its geometry, clip and
//! stacking while it sits in a part, but never destroys it. The owning
//! instance watches the object for destruction and forgets it when the
//! notice arrives.
//!
//! Size constraints come from two places. Objects of a self-sized kind
//! (text, polygon, line) are pinned to their current geometry, and another
//! instance's root object reports that instance's declared minimum and
//! maximum. Any object can additionally carry hints written with
//! [`Engine::set_object_min_size_hint`] and friends; a present hint wins over
//! the kind-derived value.

use kurbo::Size;
use tracing::debug;
use understory_scene::{ObjectId, ObjectKind, Scene};

use crate::engine::{Engine, InstanceId};
use crate::part::{SwallowLimits, Swallowed};
use crate::theme::PartKind;

/// Data key holding the minimum width hint.
pub const HINT_MIN_W: &str = "understory_parts.min_w";
/// Data key holding the minimum height hint.
pub const HINT_MIN_H: &str = "understory_parts.min_h";
/// Data key holding the maximum width hint.
pub const HINT_MAX_W: &str = "understory_parts.max_w";
/// Data key holding the maximum height hint.
pub const HINT_MAX_H: &str = "understory_parts.max_h";
/// Data key holding the aspect mode hint.
pub const HINT_ASPECT_MODE: &str = "understory_parts.aspect_mode";
/// Data key holding the aspect width hint.
pub const HINT_ASPECT_W: &str = "understory_parts.aspect_w";
/// Data key holding the aspect height hint.
pub const HINT_ASPECT_H: &str = "understory_parts.aspect_h";

/// How a swallowed object's aspect ratio is enforced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum AspectMode {
    /// No aspect constraint.
    #[default]
    None = 0,
    /// Fit inside the part, keeping the ratio.
    Neither = 1,
    /// Keep the part's width and derive the height.
    Horizontal = 2,
    /// Keep the part's height and derive the width.
    Vertical = 3,
    /// Cover the part, keeping the ratio.
    Both = 4,
}

impl AspectMode {
    /// Decodes a stored hint value. Unknown values decode to `None`.
    #[must_use]
    pub const fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Neither,
            2 => Self::Horizontal,
            3 => Self::Vertical,
            4 => Self::Both,
            _ => Self::None,
        }
    }
}

fn hint(v: Option<i32>) -> Option<f64> {
    v.map(f64::from)
}

/// Like [`hint`], but a non-positive maximum means unbounded.
fn max_hint(v: Option<i32>) -> Option<f64> {
    v.filter(|&v| v > 0).map(f64::from)
}

impl<S: Scene> Engine<S> {
    /// Places `obj` inside a swallow part.
    ///
    /// Whatever the part held before is released first. If `obj` is held by
    /// another part, of this or any instance, it moves here. Stale objects,
    /// non-swallow parts and the instance's own root are ignored.
    pub fn part_swallow(&mut self, id: InstanceId, part: &str, obj: ObjectId) {
        let Some((inst, idx)) = self.part(id, part) else {
            return;
        };
        if inst.collection().parts[idx].kind != PartKind::Swallow {
            return;
        }
        if inst.root == obj || !self.scene.is_alive(obj) {
            return;
        }
        if inst.parts[idx].swallow.is_some_and(|sw| sw.object == obj) {
            return;
        }
        let clip = inst.collection().parts[idx]
            .clip_to
            .map_or(inst.clipper, |j| inst.parts[j].object);
        let part_object = inst.parts[idx].object;

        self.release_part(id, idx);
        if let Some(owner) = self.swallow_owners.get(&obj).copied() {
            debug!(?obj, from = ?owner, to = ?id, "moving swallowed object");
            self.part_unswallow(owner, obj);
        }

        let limits = self.swallow_limits(obj);
        self.scene.set_clip(obj, Some(clip));
        self.scene.stack_above(obj, part_object);
        self.scene.watch_destroy(obj, id.observer());
        self.swallow_owners.insert(obj, id);
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        inst.parts[idx].swallow = Some(Swallowed {
            object: obj,
            limits,
        });
        inst.dirty = true;
        self.recalc(id);
    }

    /// Releases `obj` from whichever part of the instance holds it.
    ///
    /// The object keeps its geometry but loses its clip.
    pub fn part_unswallow(&mut self, id: InstanceId, obj: ObjectId) {
        let Some(inst) = self.instance(id) else {
            return;
        };
        let Some(idx) = inst
            .parts
            .iter()
            .position(|p| p.swallow.is_some_and(|sw| sw.object == obj))
        else {
            return;
        };
        self.release_part(id, idx);
        if let Some(inst) = self.instance_mut(id) {
            inst.dirty = true;
        }
        self.recalc(id);
    }

    /// Returns the object swallowed by a part.
    #[must_use]
    pub fn part_swallow_get(&self, id: InstanceId, part: &str) -> Option<ObjectId> {
        let (inst, idx) = self.part(id, part)?;
        inst.parts[idx].swallow.map(|sw| sw.object)
    }

    fn release_part(&mut self, id: InstanceId, idx: usize) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        let Some(sw) = inst.parts[idx].swallow.take() else {
            return;
        };
        self.swallow_owners.remove(&sw.object);
        self.scene.unwatch_destroy(sw.object, id.observer());
        self.scene.set_clip(sw.object, None);
    }

    /// Drops a swallowed object that no longer exists.
    pub(crate) fn swallow_released(&mut self, id: InstanceId, obj: ObjectId) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        let mut found = false;
        for part in &mut inst.parts {
            if part.swallow.is_some_and(|sw| sw.object == obj) {
                part.swallow = None;
                found = true;
            }
        }
        if !found {
            return;
        }
        debug!(?id, ?obj, "swallowed object destroyed");
        inst.dirty = true;
        if self.swallow_owners.get(&obj) == Some(&id) {
            self.swallow_owners.remove(&obj);
        }
        self.recalc(id);
    }

    /// Computes the constraints `obj` brings into a swallow part.
    pub(crate) fn swallow_limits(&self, obj: ObjectId) -> SwallowLimits {
        let mut limits = SwallowLimits::default();
        match self.scene.kind(obj) {
            Some(ObjectKind::Layout) => {
                if let Some(child) = self.instance_of_root(obj) {
                    limits.min = self.size_min_get(child);
                    limits.max = self.size_max_get(child);
                }
            }
            Some(kind) if kind.is_self_sized() => {
                let size = self.scene.geometry(obj).map_or(Size::ZERO, |r| r.size());
                limits.min = size;
                limits.max = size;
            }
            _ => {}
        }

        let scene = &self.scene;
        if let Some(w) = hint(scene.data(obj, HINT_MIN_W)) {
            limits.min.width = w;
        }
        if let Some(h) = hint(scene.data(obj, HINT_MIN_H)) {
            limits.min.height = h;
        }
        if let Some(w) = max_hint(scene.data(obj, HINT_MAX_W)) {
            limits.max.width = w;
        }
        if let Some(h) = max_hint(scene.data(obj, HINT_MAX_H)) {
            limits.max.height = h;
        }
        if let Some(mode) = scene.data(obj, HINT_ASPECT_MODE) {
            limits.aspect = AspectMode::from_i32(mode);
        }
        if let Some(w) = hint(scene.data(obj, HINT_ASPECT_W)) {
            limits.aspect_size.width = w;
        }
        if let Some(h) = hint(scene.data(obj, HINT_ASPECT_H)) {
            limits.aspect_size.height = h;
        }
        limits
    }

    /// Declares the minimum size `obj` wants when swallowed.
    ///
    /// Negative values count as `0`; a zero axis removes that hint.
    pub fn set_object_min_size_hint(&mut self, obj: ObjectId, w: i32, h: i32) {
        let scene = &mut self.scene;
        for (key, v) in [(HINT_MIN_W, w.max(0)), (HINT_MIN_H, h.max(0))] {
            if v > 0 {
                scene.set_data(obj, key, v);
            } else {
                scene.remove_data(obj, key);
            }
        }
    }

    /// Declares the maximum size `obj` accepts when swallowed.
    ///
    /// A zero or negative axis removes that hint, leaving the axis unbounded.
    pub fn set_object_max_size_hint(&mut self, obj: ObjectId, w: i32, h: i32) {
        let scene = &mut self.scene;
        for (key, v) in [(HINT_MAX_W, w), (HINT_MAX_H, h)] {
            if v > 0 {
                scene.set_data(obj, key, v);
            } else {
                scene.remove_data(obj, key);
            }
        }
    }

    /// Declares the aspect ratio `obj` keeps when swallowed.
    ///
    /// Only positive ratio terms are recorded.
    pub fn set_object_aspect_hint(&mut self, obj: ObjectId, mode: AspectMode, w: i32, h: i32) {
        let scene = &mut self.scene;
        if mode != AspectMode::None {
            scene.set_data(obj, HINT_ASPECT_MODE, mode as i32);
        } else {
            scene.remove_data(obj, HINT_ASPECT_MODE);
        }
        if w > 0 {
            scene.set_data(obj, HINT_ASPECT_W, w);
        }
        if h > 0 {
            scene.set_data(obj, HINT_ASPECT_H, h);
        }
    }
}
