// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named text classes (font and size overrides).

use alloc::string::String;

use crate::list::NamedClass;

/// A named font override.
///
/// An empty or missing font leaves the part's own font in place; a size of
/// zero leaves the part's own size in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextClass {
    name: String,
    font: Option<String>,
    size: u32,
}

impl TextClass {
    /// Creates a text class. Negative sizes are clamped to zero.
    ///
    /// ```
    /// use understory_classes::TextClass;
    ///
    /// let tc = TextClass::new("title", Some("Sans:style=Bold"), -3);
    /// assert_eq!(tc.font(), Some("Sans:style=Bold"));
    /// assert_eq!(tc.size(), 0);
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, font: Option<&str>, size: i32) -> Self {
        Self {
            name: name.into(),
            font: font.map(String::from),
            size: size.max(0).unsigned_abs(),
        }
    }

    /// Returns the class name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the font, or `None` when the class does not override it.
    #[must_use]
    pub fn font(&self) -> Option<&str> {
        self.font.as_deref().filter(|f| !f.is_empty())
    }

    /// Returns the font size; `0` means "no override".
    #[must_use]
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns `true` if font and size match `other`, ignoring names.
    ///
    /// A missing font and an empty font are distinct values here, matching
    /// how they were set.
    #[must_use]
    pub fn same_style(&self, other: &Self) -> bool {
        self.size == other.size && self.font == other.font
    }
}

impl NamedClass for TextClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn same_values(&self, other: &Self) -> bool {
        self.same_style(other)
    }
}
