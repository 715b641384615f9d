// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless in-memory scene.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;
use understory_classes::Rgba;

use crate::scene::Scene;
use crate::types::{DestroyNotice, ObjectId, ObjectKind, ObserverId};

#[derive(Clone, Debug)]
struct Object {
    kind: ObjectKind,
    rect: Rect,
    clip: Option<ObjectId>,
    visible: bool,
    color: Rgba,
    text: String,
    font: Option<String>,
    font_size: u32,
    data: HashMap<String, i32>,
    watchers: SmallVec<[ObserverId; 2]>,
}

impl Object {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            rect: Rect::ZERO,
            clip: None,
            visible: true,
            color: Rgba::WHITE,
            text: String::new(),
            font: None,
            font_size: 0,
            data: HashMap::new(),
            watchers: SmallVec::new(),
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    object: Option<Object>,
}

/// A scene that only records state.
///
/// `MemoryScene` does not draw anything. It keeps object geometry, clips,
/// stacking, colors, text and data so tests and headless embedders can drive
/// a layout engine and inspect the result.
///
/// Text is measured with a fixed monospace model: every character advances
/// `size / 2` units and every line is `size` units tall. Wrapping breaks lines
/// by character count, ignoring word boundaries.
///
/// ```
/// use kurbo::{Point, Rect, Size};
/// use understory_scene::{MemoryScene, ObjectKind, Scene};
///
/// let mut scene = MemoryScene::new();
/// let a = scene.create(ObjectKind::Rectangle);
/// scene.move_to(a, Point::new(10.0, 20.0));
/// scene.resize(a, Size::new(5.0, 5.0));
/// assert_eq!(scene.geometry(a), Some(Rect::new(10.0, 20.0, 15.0, 25.0)));
///
/// scene.destroy(a);
/// assert!(!scene.is_alive(a));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    stacking: Vec<ObjectId>,
}

impl MemoryScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stacking.len()
    }

    /// Returns `true` if no object is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacking.is_empty()
    }

    /// Returns live objects from bottom to top.
    #[must_use]
    pub fn stacking_order(&self) -> &[ObjectId] {
        &self.stacking
    }

    /// Returns `true` if `obj` is shown.
    #[must_use]
    pub fn is_visible(&self, obj: ObjectId) -> bool {
        self.get(obj).is_some_and(|o| o.visible)
    }

    /// Returns the color multiplier of `obj`.
    #[must_use]
    pub fn color(&self, obj: ObjectId) -> Option<Rgba> {
        self.get(obj).map(|o| o.color)
    }

    /// Returns the text content of `obj`.
    #[must_use]
    pub fn text(&self, obj: ObjectId) -> Option<&str> {
        self.get(obj).map(|o| o.text.as_str())
    }

    /// Returns the font and size last applied to `obj`.
    #[must_use]
    pub fn text_style(&self, obj: ObjectId) -> Option<(Option<&str>, u32)> {
        self.get(obj).map(|o| (o.font.as_deref(), o.font_size))
    }

    /// Returns the observers watching `obj` for destruction.
    #[must_use]
    pub fn watchers(&self, obj: ObjectId) -> &[ObserverId] {
        self.get(obj).map_or(&[], |o| o.watchers.as_slice())
    }

    fn get(&self, obj: ObjectId) -> Option<&Object> {
        let slot = self.slots.get(obj.idx())?;
        if slot.generation != obj.generation() {
            return None;
        }
        slot.object.as_ref()
    }

    fn get_mut(&mut self, obj: ObjectId) -> Option<&mut Object> {
        let slot = self.slots.get_mut(obj.idx())?;
        if slot.generation != obj.generation() {
            return None;
        }
        slot.object.as_mut()
    }

    fn restack(&mut self, obj: ObjectId, at: impl FnOnce(&[ObjectId]) -> usize) {
        if !self.is_alive(obj) {
            return;
        }
        self.stacking.retain(|&o| o != obj);
        let idx = at(&self.stacking).min(self.stacking.len());
        self.stacking.insert(idx, obj);
    }
}

impl Scene for MemoryScene {
    fn create(&mut self, kind: ObjectKind) -> ObjectId {
        let id = if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.generation = entry.generation.wrapping_add(1);
            entry.object = Some(Object::new(kind));
            ObjectId::new(slot, entry.generation)
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "more than u32::MAX live objects is unsupported"
            )]
            let slot = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                object: Some(Object::new(kind)),
            });
            ObjectId::new(slot, 1)
        };
        self.stacking.push(id);
        id
    }

    fn destroy(&mut self, obj: ObjectId) -> DestroyNotice {
        let Some(slot) = self.slots.get_mut(obj.idx()) else {
            return DestroyNotice::new();
        };
        if slot.generation != obj.generation() {
            return DestroyNotice::new();
        }
        let Some(object) = slot.object.take() else {
            return DestroyNotice::new();
        };
        self.free.push(obj.slot());
        self.stacking.retain(|&o| o != obj);
        for slot in &mut self.slots {
            if let Some(other) = slot.object.as_mut()
                && other.clip == Some(obj)
            {
                other.clip = None;
            }
        }
        object.watchers
    }

    fn is_alive(&self, obj: ObjectId) -> bool {
        self.get(obj).is_some()
    }

    fn kind(&self, obj: ObjectId) -> Option<ObjectKind> {
        self.get(obj).map(|o| o.kind)
    }

    fn geometry(&self, obj: ObjectId) -> Option<Rect> {
        self.get(obj).map(|o| o.rect)
    }

    fn move_to(&mut self, obj: ObjectId, origin: Point) {
        if let Some(o) = self.get_mut(obj) {
            o.rect = Rect::from_origin_size(origin, o.rect.size());
        }
    }

    fn resize(&mut self, obj: ObjectId, size: Size) {
        if let Some(o) = self.get_mut(obj) {
            o.rect = Rect::from_origin_size(o.rect.origin(), size);
        }
    }

    fn set_clip(&mut self, obj: ObjectId, clip: Option<ObjectId>) {
        let clip = clip.filter(|&c| c != obj && self.is_alive(c));
        if let Some(o) = self.get_mut(obj) {
            o.clip = clip;
        }
    }

    fn clip(&self, obj: ObjectId) -> Option<ObjectId> {
        self.get(obj).and_then(|o| o.clip)
    }

    fn raise(&mut self, obj: ObjectId) {
        self.restack(obj, <[ObjectId]>::len);
    }

    fn lower(&mut self, obj: ObjectId) {
        self.restack(obj, |_| 0);
    }

    fn stack_above(&mut self, obj: ObjectId, sibling: ObjectId) {
        if obj == sibling || !self.is_alive(sibling) {
            return;
        }
        self.restack(obj, |order| {
            order
                .iter()
                .position(|&o| o == sibling)
                .map_or(order.len(), |i| i + 1)
        });
    }

    fn set_visible(&mut self, obj: ObjectId, visible: bool) {
        if let Some(o) = self.get_mut(obj) {
            o.visible = visible;
        }
    }

    fn set_color(&mut self, obj: ObjectId, color: Rgba) {
        if let Some(o) = self.get_mut(obj) {
            o.color = color;
        }
    }

    fn set_text(&mut self, obj: ObjectId, text: &str, font: Option<&str>, size: u32) {
        if let Some(o) = self.get_mut(obj) {
            if o.text != text {
                o.text = text.to_string();
            }
            o.font = font.map(String::from);
            o.font_size = size;
        }
    }

    fn measure_text(
        &self,
        text: &str,
        _font: Option<&str>,
        size: u32,
        wrap_width: Option<f64>,
    ) -> Size {
        if text.is_empty() || size == 0 {
            return Size::ZERO;
        }
        let advance = f64::from(size) / 2.0;
        let per_line = wrap_width.map(|w| {
            if w < advance {
                1
            } else {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "truncation is the floor of a positive quotient"
                )]
                let n = (w / advance) as usize;
                n
            }
        });
        let mut lines = 0_usize;
        let mut widest = 0_usize;
        for line in text.split('\n') {
            let chars = line.chars().count();
            match per_line {
                Some(per) if chars > per => {
                    lines += chars.div_ceil(per);
                    widest = widest.max(per);
                }
                _ => {
                    lines += 1;
                    widest = widest.max(chars);
                }
            }
        }
        Size::new(
            count_to_f64(widest) * advance,
            count_to_f64(lines) * f64::from(size),
        )
    }

    fn watch_destroy(&mut self, obj: ObjectId, observer: ObserverId) -> bool {
        let Some(o) = self.get_mut(obj) else {
            return false;
        };
        if o.watchers.contains(&observer) {
            return false;
        }
        o.watchers.push(observer);
        true
    }

    fn unwatch_destroy(&mut self, obj: ObjectId, observer: ObserverId) -> bool {
        let Some(o) = self.get_mut(obj) else {
            return false;
        };
        let before = o.watchers.len();
        o.watchers.retain(|w| *w != observer);
        o.watchers.len() != before
    }

    fn data(&self, obj: ObjectId, key: &str) -> Option<i32> {
        self.get(obj).and_then(|o| o.data.get(key).copied())
    }

    fn set_data(&mut self, obj: ObjectId, key: &str, value: i32) {
        if let Some(o) = self.get_mut(obj) {
            o.data.insert(key.to_string(), value);
        }
    }

    fn remove_data(&mut self, obj: ObjectId, key: &str) -> Option<i32> {
        self.get_mut(obj).and_then(|o| o.data.remove(key))
    }
}

fn count_to_f64(n: usize) -> f64 {
    // Character and line counts stay far below 2^52.
    n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_reuse_bumps_generation() {
        let mut scene = MemoryScene::new();
        let a = scene.create(ObjectKind::Rectangle);
        scene.destroy(a);
        let b = scene.create(ObjectKind::Text);
        assert_eq!(a.slot(), b.slot());
        assert_ne!(a, b);
        assert!(!scene.is_alive(a));
        assert_eq!(scene.kind(b), Some(ObjectKind::Text));
        assert_eq!(scene.kind(a), None);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut scene = MemoryScene::new();
        let a = scene.create(ObjectKind::Rectangle);
        scene.destroy(a);
        scene.move_to(a, Point::new(1.0, 1.0));
        scene.set_data(a, "k", 1);
        assert!(scene.destroy(a).is_empty());
        assert_eq!(scene.geometry(a), None);
        assert_eq!(scene.data(a, "k"), None);
    }

    #[test]
    fn stacking_operations() {
        let mut scene = MemoryScene::new();
        let a = scene.create(ObjectKind::Rectangle);
        let b = scene.create(ObjectKind::Rectangle);
        let c = scene.create(ObjectKind::Rectangle);
        assert_eq!(scene.stacking_order(), &[a, b, c]);

        scene.raise(a);
        assert_eq!(scene.stacking_order(), &[b, c, a]);
        scene.lower(c);
        assert_eq!(scene.stacking_order(), &[c, b, a]);
        scene.stack_above(c, b);
        assert_eq!(scene.stacking_order(), &[b, c, a]);
        scene.stack_above(b, a);
        assert_eq!(scene.stacking_order(), &[c, a, b]);
    }

    #[test]
    fn destroy_reports_watchers_and_drops_clips() {
        let mut scene = MemoryScene::new();
        let clipper = scene.create(ObjectKind::Rectangle);
        let child = scene.create(ObjectKind::Image);
        scene.set_clip(child, Some(clipper));
        assert!(scene.watch_destroy(clipper, ObserverId::new(7)));
        assert!(!scene.watch_destroy(clipper, ObserverId::new(7)));

        let notice = scene.destroy(clipper);
        assert_eq!(notice.as_slice(), &[ObserverId::new(7)]);
        assert_eq!(scene.clip(child), None);
    }

    #[test]
    fn monospace_measurement() {
        let scene = MemoryScene::new();
        assert_eq!(scene.measure_text("", None, 10, None), Size::ZERO);
        assert_eq!(scene.measure_text("abcd", None, 10, None), Size::new(20.0, 10.0));
        assert_eq!(
            scene.measure_text("ab\nabcdef", None, 10, None),
            Size::new(30.0, 20.0)
        );
        // Four characters per 20-unit line: "abcdef" takes two lines.
        assert_eq!(
            scene.measure_text("abcdef", None, 10, Some(20.0)),
            Size::new(20.0, 20.0)
        );
        // A width narrower than one character still fits one per line.
        assert_eq!(
            scene.measure_text("abc", None, 10, Some(1.0)),
            Size::new(5.0, 30.0)
        );
    }
}
