// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scene: the scene-object capability a layout engine drives.
//!
//! A layout engine computes geometry; something else owns the objects that
//! get drawn. This crate is the seam between the two:
//!
//! - [`Scene`]: the capability trait (create/destroy, move, resize, clip,
//!   stacking, visibility, color, text, destruction watching, and opaque
//!   per-object data).
//! - [`ObjectId`]: generational handle to a scene object.
//! - [`ObjectKind`]: declared type tag of an object.
//! - [`ObserverId`] and [`DestroyNotice`]: destruction observers. A scene
//!   returns the observers of a destroyed object instead of calling them,
//!   so the caller decides when and how to route the notice.
//! - [`MemoryScene`]: a headless implementation that only records state.
//!
//! ## Example
//!
//! ```rust
//! use understory_scene::{MemoryScene, ObjectKind, ObserverId, Scene};
//!
//! let mut scene = MemoryScene::new();
//! let obj = scene.create(ObjectKind::Image);
//! scene.watch_destroy(obj, ObserverId::new(1));
//! scene.set_data(obj, "hint", 40);
//! assert_eq!(scene.data(obj, "hint"), Some(40));
//!
//! let notice = scene.destroy(obj);
//! assert_eq!(notice.as_slice(), &[ObserverId::new(1)]);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Enable either the `std` (default)
//! or `libm` feature so Kurbo has a float math backend.

#![no_std]

extern crate alloc;

mod memory;
mod scene;
mod types;

pub use memory::MemoryScene;
pub use scene::Scene;
pub use types::{DestroyNotice, ObjectId, ObjectKind, ObserverId};
