// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene-object capability trait.

use kurbo::{Point, Rect, Size};
use understory_classes::Rgba;

use crate::types::{DestroyNotice, ObjectId, ObjectKind, ObserverId};

/// Scene-object capabilities consumed by a layout engine.
///
/// Implementations own object storage and whatever drawing happens behind it.
/// Every method taking an [`ObjectId`] must tolerate stale handles: setters do
/// nothing and getters return `None` (or a zero value).
///
/// Stacking is a single bottom-to-top order over all live objects. New objects
/// go on top.
pub trait Scene {
    /// Creates an object of the given kind at the top of the stack.
    ///
    /// New objects are visible, have zero geometry, no clip and white color.
    fn create(&mut self, kind: ObjectKind) -> ObjectId;

    /// Destroys an object and returns the observers that were watching it.
    ///
    /// Objects clipped by the destroyed object lose their clip.
    fn destroy(&mut self, obj: ObjectId) -> DestroyNotice;

    /// Returns `true` if `obj` refers to a live object.
    fn is_alive(&self, obj: ObjectId) -> bool;

    /// Returns the declared kind of `obj`.
    fn kind(&self, obj: ObjectId) -> Option<ObjectKind>;

    /// Returns the geometry of `obj`.
    fn geometry(&self, obj: ObjectId) -> Option<Rect>;

    /// Moves the origin of `obj`, keeping its size.
    fn move_to(&mut self, obj: ObjectId, origin: Point);

    /// Resizes `obj`, keeping its origin.
    fn resize(&mut self, obj: ObjectId, size: Size);

    /// Sets or clears the clip object of `obj`.
    fn set_clip(&mut self, obj: ObjectId, clip: Option<ObjectId>);

    /// Returns the clip object of `obj`.
    fn clip(&self, obj: ObjectId) -> Option<ObjectId>;

    /// Moves `obj` to the top of the stack.
    fn raise(&mut self, obj: ObjectId);

    /// Moves `obj` to the bottom of the stack.
    fn lower(&mut self, obj: ObjectId);

    /// Restacks `obj` directly above `sibling`.
    fn stack_above(&mut self, obj: ObjectId, sibling: ObjectId);

    /// Shows or hides `obj`.
    fn set_visible(&mut self, obj: ObjectId, visible: bool);

    /// Sets the color multiplier of `obj`.
    fn set_color(&mut self, obj: ObjectId, color: Rgba);

    /// Sets text content and style of a text-capable object.
    fn set_text(&mut self, obj: ObjectId, text: &str, font: Option<&str>, size: u32);

    /// Measures `text` laid out with the given style.
    ///
    /// With `wrap_width`, lines wrap to that width and the result's height
    /// covers every wrapped line.
    fn measure_text(&self, text: &str, font: Option<&str>, size: u32, wrap_width: Option<f64>)
    -> Size;

    /// Registers `observer` for destruction of `obj`.
    ///
    /// Returns `false` if `obj` is stale or already watched by `observer`.
    fn watch_destroy(&mut self, obj: ObjectId, observer: ObserverId) -> bool;

    /// Unregisters `observer` from destruction of `obj`.
    fn unwatch_destroy(&mut self, obj: ObjectId, observer: ObserverId) -> bool;

    /// Reads opaque per-object data.
    fn data(&self, obj: ObjectId, key: &str) -> Option<i32>;

    /// Writes opaque per-object data.
    fn set_data(&mut self, obj: ObjectId, key: &str, value: i32);

    /// Removes opaque per-object data, returning the old value.
    fn remove_data(&mut self, obj: ObjectId, key: &str) -> Option<i32>;
}
