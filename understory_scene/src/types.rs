// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles and tags shared by every scene implementation.

use smallvec::SmallVec;

/// Identifier for an object in a scene.
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On create, a fresh slot is allocated with generation `1`.
/// - On destroy, the slot is freed; any existing `ObjectId` that pointed to
///   that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new,
///   distinct `ObjectId`.
///
/// Stale handles never alias a different live object because the generation
/// must match. Scenes treat operations on stale handles as no-ops.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectId(u32, u32);

impl ObjectId {
    /// Creates a handle from a slot index and a generation.
    ///
    /// Only scene implementations should need this.
    #[must_use]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self(slot, generation)
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Returns the generation.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.1
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Declared type of a scene object.
///
/// Layout engines use the tag to decide how a swallowed object constrains the
/// part holding it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A solid rectangle.
    Rectangle,
    /// A single-line text run sized by its content.
    Text,
    /// Multi-line text that wraps to its width.
    Textblock,
    /// A raster image.
    Image,
    /// A filled polygon sized by its points.
    Polygon,
    /// A line segment sized by its endpoints.
    Line,
    /// The root object of a layout instance.
    Layout,
}

impl ObjectKind {
    /// Returns `true` for kinds whose size is intrinsic to their content.
    ///
    /// A swallowed object of such a kind pins the part to its current size.
    #[must_use]
    pub const fn is_self_sized(self) -> bool {
        matches!(self, Self::Text | Self::Polygon | Self::Line)
    }
}

/// Identifier of a party watching objects for destruction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Creates an observer identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Observers that must be told an object was destroyed.
///
/// Returned by [`Scene::destroy`](crate::Scene::destroy). Scenes never call
/// back into observers themselves; the caller routes the notice.
pub type DestroyNotice = SmallVec<[ObserverId; 2]>;
