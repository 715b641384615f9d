// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Parts: a part/state layout engine.
//!
//! Theme data describes *collections* of named *parts*. Each part has one or
//! more *descriptions* (its states): anchors relative to the container or to
//! other parts, size limits, alignment, color and text. The [`Engine`]
//! instantiates collections into a [`Scene`](understory_scene::Scene), one
//! scene object per part, and keeps those objects in sync:
//!
//! - **Recalculation**: every geometry-affecting change marks the instance
//!   dirty and recalculates. [`Engine::freeze`] batches changes; the final
//!   [`Engine::thaw`] runs a single pass.
//! - **Classes**: color and text classes from
//!   [`understory_classes`] restyle every instance using them, resolved
//!   instance first, then process, then file.
//! - **Minimum size**: [`Engine::size_min_calc`] grows the instance until
//!   no part is squeezed.
//! - **Dragables**: normalized value, size, step and page per axis.
//! - **Swallow**: externally owned objects placed inside parts, including
//!   the root object of another instance.
//! - **Signals**: glob-matched notifications with cooperative abort through
//!   [`Engine::block`].
//!
//! Handles are never trusted. Operations on a removed instance or a missing
//! part do nothing and return sentinel values.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use kurbo::{Rect, Size};
//! use understory_parts::{
//!     CollectionBuilder, DescriptionBuilder, DragAxis, Engine, PartBuilder, PartKind, ThemeFile,
//! };
//! use understory_scene::MemoryScene;
//!
//! let slider = CollectionBuilder::new("slider")
//!     .part(PartBuilder::new("trough", PartKind::Rectangle))
//!     .part(
//!         PartBuilder::new("knob", PartKind::Rectangle)
//!             .dragable(DragAxis::Forward, DragAxis::Fixed)
//!             .confine("trough")
//!             .description(DescriptionBuilder::new("default", 0.0).min(10.0, 10.0)),
//!     )
//!     .build()
//!     .unwrap();
//! let mut file = ThemeFile::new();
//! file.add_collection(slider).unwrap();
//!
//! let mut engine = Engine::new(MemoryScene::new());
//! let id = engine.add_instance(Rc::new(file), "slider").unwrap();
//! engine.resize(id, Size::new(110.0, 10.0));
//! engine.part_drag_size_set(id, "knob", 0.0, 1.0);
//! engine.part_drag_value_set(id, "knob", 0.5, 0.0);
//! assert_eq!(engine.part_geometry(id, "knob"), Rect::new(50.0, 0.0, 60.0, 10.0));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Enable either the `std` (default)
//! or `libm` feature so Kurbo has a float math backend.

#![no_std]

extern crate alloc;

mod drag;
mod engine;
mod part;
mod recalc;
mod signal;
mod swallow;
mod text;
mod theme;

pub use drag::DragDir;
pub use engine::{Engine, EngineConfig, InstanceId, TextChangeCallback};
pub use signal::{CallbackId, SignalCallback, glob_match};
pub use swallow::{
    AspectMode, HINT_ASPECT_H, HINT_ASPECT_MODE, HINT_ASPECT_W, HINT_MAX_H, HINT_MAX_W,
    HINT_MIN_H, HINT_MIN_W,
};
pub use theme::{
    Anchor, Collection, CollectionBuilder, Description, DescriptionBuilder, DragAxis, Dragable,
    PartBuilder, PartKind, PartTemplate, TextParams, ThemeError, ThemeFile,
};
