// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live, per-instance state of a part.

use alloc::string::String;

use kurbo::{Rect, Size, Vec2};
use understory_classes::Rgba;
use understory_scene::ObjectId;

use crate::swallow::AspectMode;

/// Font and size after text class resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TextStyle {
    pub(crate) font: Option<String>,
    pub(crate) size: u32,
}

/// Constraints of a swallowed object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct SwallowLimits {
    pub(crate) min: Size,
    pub(crate) max: Size,
    pub(crate) aspect: AspectMode,
    pub(crate) aspect_size: Size,
}

impl Default for SwallowLimits {
    fn default() -> Self {
        Self {
            min: Size::ZERO,
            max: Size::new(f64::INFINITY, f64::INFINITY),
            aspect: AspectMode::None,
            aspect_size: Size::ZERO,
        }
    }
}

/// An externally owned object placed in a part.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Swallowed {
    pub(crate) object: ObjectId,
    pub(crate) limits: SwallowLimits,
}

/// Dragable values, all in `0..=1`.
///
/// `value` is stored in layout orientation: reversed axes hold `1 - v`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct DragState {
    pub(crate) value: Vec2,
    pub(crate) size: Vec2,
    pub(crate) step: Vec2,
    pub(crate) page: Vec2,
    pub(crate) down_count: u32,
}

impl Default for DragState {
    fn default() -> Self {
        Self {
            value: Vec2::ZERO,
            size: Vec2::new(1.0, 1.0),
            step: Vec2::ZERO,
            page: Vec2::ZERO,
            down_count: 0,
        }
    }
}

/// One part of one instance.
#[derive(Clone, Debug)]
pub(crate) struct RealPart {
    pub(crate) object: ObjectId,
    /// Resolved geometry, relative to the instance origin.
    pub(crate) geometry: Rect,
    /// Geometry requested by the anchors, before size limits.
    pub(crate) req: Rect,
    pub(crate) desc1: usize,
    pub(crate) desc2: Option<usize>,
    pub(crate) pos: f64,
    pub(crate) chosen: usize,
    pub(crate) color: Rgba,
    pub(crate) visible: bool,
    pub(crate) text: Option<String>,
    /// Cached style, tagged with the description it was resolved for.
    pub(crate) text_style: Option<(usize, TextStyle)>,
    pub(crate) swallow: Option<Swallowed>,
    pub(crate) drag: DragState,
}

impl RealPart {
    pub(crate) fn new(object: ObjectId) -> Self {
        Self {
            object,
            geometry: Rect::ZERO,
            req: Rect::ZERO,
            desc1: 0,
            desc2: None,
            pos: 0.0,
            chosen: 0,
            color: Rgba::WHITE,
            visible: true,
            text: None,
            text_style: None,
            swallow: None,
            drag: DragState::default(),
        }
    }
}
