// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color values and named color classes.

use alloc::string::String;
use core::fmt;

use crate::list::NamedClass;

/// An 8-bit RGBA quadruple.
///
/// Color classes multiply part colors channel by channel, so every channel is
/// kept in `0..=255`. Use [`Rgba::clamped`] to build one from unchecked input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black, the value of a freshly created class.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque white, the identity for [`Rgba::multiply`].
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Creates a color from in-range channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from arbitrary integers, clamping each to `0..=255`.
    ///
    /// ```
    /// use understory_classes::Rgba;
    ///
    /// assert_eq!(Rgba::clamped(-4, 12, 300, 255), Rgba::new(0, 12, 255, 255));
    /// ```
    #[must_use]
    pub fn clamped(r: i32, g: i32, b: i32, a: i32) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
            a: clamp_channel(a),
        }
    }

    /// Same as [`Rgba::clamped`], taking the channels as an array.
    #[must_use]
    pub fn from_channels([r, g, b, a]: [i32; 4]) -> Self {
        Self::clamped(r, g, b, a)
    }

    /// Multiplies two colors channel-wise, treating 255 as 1.0.
    #[must_use]
    pub fn multiply(self, other: Self) -> Self {
        Self {
            r: mul_channel(self.r, other.r),
            g: mul_channel(self.g, other.g),
            b: mul_channel(self.b, other.b),
            a: mul_channel(self.a, other.a),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

fn clamp_channel(v: i32) -> u8 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is clamped into u8 range first"
    )]
    let channel = v.clamp(0, 255) as u8;
    channel
}

fn mul_channel(a: u8, b: u8) -> u8 {
    let product = u16::from(a) * u16::from(b) / 255;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "product of two u8 divided by 255 fits in u8"
    )]
    let channel = product as u8;
    channel
}

/// A named color override.
///
/// The three colors are applied to the part body, the text outline and the
/// text shadow respectively. Outline and shadow only matter for text parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorClass {
    name: String,
    /// Color multiplied into the part body.
    pub object: Rgba,
    /// Color multiplied into a text outline.
    pub outline: Rgba,
    /// Color multiplied into a text shadow.
    pub shadow: Rgba,
}

impl ColorClass {
    /// Creates a color class from already clamped colors.
    #[must_use]
    pub fn new(name: impl Into<String>, object: Rgba, outline: Rgba, shadow: Rgba) -> Self {
        Self {
            name: name.into(),
            object,
            outline,
            shadow,
        }
    }

    /// Creates a color class from twelve unchecked channel values.
    ///
    /// Every channel of every quadruple is clamped to `0..=255`.
    #[must_use]
    pub fn from_channels(
        name: impl Into<String>,
        object: [i32; 4],
        outline: [i32; 4],
        shadow: [i32; 4],
    ) -> Self {
        Self::new(
            name,
            Rgba::from_channels(object),
            Rgba::from_channels(outline),
            Rgba::from_channels(shadow),
        )
    }

    /// Creates a class with every channel at zero.
    #[must_use]
    pub fn transparent(name: impl Into<String>) -> Self {
        Self::new(name, Rgba::TRANSPARENT, Rgba::TRANSPARENT, Rgba::TRANSPARENT)
    }

    /// Returns the class name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if all twelve channels match `other`, ignoring names.
    #[must_use]
    pub fn same_colors(&self, other: &Self) -> bool {
        self.object == other.object && self.outline == other.outline && self.shadow == other.shadow
    }
}

impl NamedClass for ColorClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn same_values(&self, other: &Self) -> bool {
        self.same_colors(other)
    }
}
