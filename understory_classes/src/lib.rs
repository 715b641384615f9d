// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Classes: scoped color-class and text-class overrides.
//!
//! A *color class* is a named triple of RGBA multipliers (object, outline and
//! shadow). A *text class* is a named font and size override. Both exist in
//! three scope tiers:
//!
//! - **Instance**: a [`ClassSet`] owned by one layout instance.
//! - **Process**: the shared [`ClassRegistry`], which also keeps a reverse
//!   index from class name to the members using it.
//! - **File**: a [`ClassSet`] shipped with the theme data.
//!
//! [`ClassCx`] resolves a name across the tiers in that order; the first hit
//! wins and fields are never merged.
//!
//! ## Fan-out
//!
//! The registry does not own its members. Every mutation returns a
//! [`FanOut`] with the members that must be invalidated, and an unchanged
//! value returns an empty fan-out:
//!
//! ```rust
//! use understory_classes::ClassRegistry;
//!
//! let mut registry = ClassRegistry::<u32>::new();
//! registry.add_color_member("shadow", 1);
//! registry.add_color_member("shadow", 2);
//!
//! let mut touched = registry.set_color_class("shadow", [0, 0, 0, 128], [0; 4], [0; 4]);
//! touched.sort_unstable();
//! assert_eq!(touched.as_slice(), &[1, 2]);
//!
//! assert!(registry.set_color_class("shadow", [0, 0, 0, 128], [0; 4], [0; 4]).is_empty());
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod color;
mod list;
mod registry;
mod resolve;
mod text;

pub use color::{ColorClass, Rgba};
pub use list::{ClassList, ClassSet, NamedClass};
pub use registry::{ClassNames, ClassRegistry, FanOut};
pub use resolve::{ClassCx, ClassScope};
pub use text::TextClass;
