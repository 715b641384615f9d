// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable theme data: collections, part templates and their descriptions.
//!
//! Theme data is normally produced by a loader. The builders here resolve
//! part names to indices once, so the engine never looks a reference up by
//! name while recalculating.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Size, Vec2};
use understory_classes::{ClassSet, Rgba};
use understory_scene::ObjectKind;

/// Type of a part template.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// A solid rectangle.
    Rectangle,
    /// A single-line text run.
    Text,
    /// Multi-line text that wraps to the part width.
    Textblock,
    /// A raster image.
    Image,
    /// A placeholder for an externally owned object.
    Swallow,
}

impl PartKind {
    /// Returns `true` for parts whose text can be set.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::Textblock)
    }

    /// Kind of the scene object backing a part of this kind.
    #[must_use]
    pub const fn object_kind(self) -> ObjectKind {
        match self {
            Self::Rectangle | Self::Swallow => ObjectKind::Rectangle,
            Self::Text => ObjectKind::Text,
            Self::Textblock => ObjectKind::Textblock,
            Self::Image => ObjectKind::Image,
        }
    }
}

/// Whether and how a part can be dragged along one axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DragAxis {
    /// Not dragable along this axis.
    #[default]
    Fixed,
    /// Dragable; value `0` is the start of the range.
    Forward,
    /// Dragable; value `0` is the end of the range.
    Reversed,
}

impl DragAxis {
    /// Returns `true` unless the axis is [`DragAxis::Fixed`].
    #[must_use]
    pub const fn is_dragable(self) -> bool {
        !matches!(self, Self::Fixed)
    }

    /// Direction multiplier applied to step and page increments.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Fixed => 0.0,
            Self::Forward => 1.0,
            Self::Reversed => -1.0,
        }
    }
}

/// Dragable declaration of a part template.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Dragable {
    /// Horizontal axis.
    pub x: DragAxis,
    /// Vertical axis.
    pub y: DragAxis,
    /// Index of the part confining the drag range, if any.
    pub confine: Option<usize>,
}

/// One corner of a description's rectangle.
///
/// The corner sits at `relative` (a fraction of the base rectangle) plus
/// `offset` pixels. The base is the container unless `to_x` / `to_y` name
/// another part, per axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Anchor {
    /// Position as a fraction of the base rectangle.
    pub relative: Vec2,
    /// Pixel offset added after the relative position.
    pub offset: Vec2,
    /// Part whose horizontal extent is the base, if not the container.
    pub to_x: Option<usize>,
    /// Part whose vertical extent is the base, if not the container.
    pub to_y: Option<usize>,
}

impl Anchor {
    /// An anchor at `relative` with no offset, relative to the container.
    #[must_use]
    pub const fn new(relative: Vec2) -> Self {
        Self {
            relative,
            offset: Vec2::ZERO,
            to_x: None,
            to_y: None,
        }
    }
}

/// Text settings of a description.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextParams {
    /// Text shown until the part's text is set.
    pub text: String,
    /// Text class overriding font and size.
    pub text_class: Option<String>,
    /// Font name.
    pub font: Option<String>,
    /// Font size.
    pub size: u32,
    /// Grow the part horizontally to fit its text.
    pub min_x: bool,
    /// Grow the part vertically to fit its text.
    pub min_y: bool,
}

/// A named, valued state of a part.
#[derive(Clone, Debug, PartialEq)]
pub struct Description {
    /// State name; empty means the default state.
    pub name: String,
    /// State value, distinguishing descriptions that share a name.
    pub value: f64,
    /// Top-left corner.
    pub rel1: Anchor,
    /// Bottom-right corner.
    pub rel2: Anchor,
    /// Minimum size.
    pub min: Size,
    /// Maximum size; infinite components are unbounded.
    pub max: Size,
    /// Where the part sits inside its anchored box when min or max resize it.
    pub align: Vec2,
    /// Width is fixed for the minimum-size solver.
    pub fixed_w: bool,
    /// Height is fixed for the minimum-size solver.
    pub fixed_h: bool,
    /// Whether the part is shown.
    pub visible: bool,
    /// Base color, multiplied by the color class.
    pub color: Rgba,
    /// Color class name.
    pub color_class: Option<String>,
    /// Text settings.
    pub text: TextParams,
}

impl Default for Description {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: 0.0,
            rel1: Anchor::new(Vec2::ZERO),
            rel2: Anchor::new(Vec2::new(1.0, 1.0)),
            min: Size::ZERO,
            max: Size::new(f64::INFINITY, f64::INFINITY),
            align: Vec2::new(0.5, 0.5),
            fixed_w: false,
            fixed_h: false,
            visible: true,
            color: Rgba::WHITE,
            color_class: None,
            text: TextParams::default(),
        }
    }
}

impl Description {
    /// Name reported for this state; unnamed states report `"default"`.
    #[must_use]
    pub fn state_name(&self) -> &str {
        if self.name.is_empty() {
            "default"
        } else {
            &self.name
        }
    }

    fn refs(&self) -> impl Iterator<Item = usize> + '_ {
        [self.rel1.to_x, self.rel1.to_y, self.rel2.to_x, self.rel2.to_y]
            .into_iter()
            .flatten()
    }
}

/// Immutable template of one part.
#[derive(Clone, Debug, PartialEq)]
pub struct PartTemplate {
    /// Name, unique within the collection.
    pub name: String,
    /// Kind of part.
    pub kind: PartKind,
    /// Descriptions; the first one is the default state.
    pub descriptions: Vec<Description>,
    /// Dragable declaration.
    pub dragable: Dragable,
    /// Index of the part whose object clips this one.
    pub clip_to: Option<usize>,
}

impl PartTemplate {
    /// Picks a description for a state name and value.
    ///
    /// Prefers an exact name and value match, then the description with the
    /// same name and the nearest value, then the default description.
    #[must_use]
    pub fn find_description(&self, name: &str, value: f64) -> usize {
        let mut nearest: Option<(usize, f64)> = None;
        for (i, desc) in self.descriptions.iter().enumerate() {
            if desc.state_name() != name && desc.name != name {
                continue;
            }
            let distance = if desc.value > value {
                desc.value - value
            } else {
                value - desc.value
            };
            if distance == 0.0 {
                return i;
            }
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((i, distance));
            }
        }
        nearest.map_or(0, |(i, _)| i)
    }

    /// Parts whose geometry must be known before this part's.
    pub(crate) fn dependencies(&self, desc: usize) -> impl Iterator<Item = usize> + '_ {
        self.descriptions
            .get(desc)
            .into_iter()
            .flat_map(Description::refs)
            .chain(self.dragable.confine)
    }
}

/// A group of parts laid out together, instantiated by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection {
    /// Group name.
    pub name: String,
    /// Part templates in stacking order, bottom first.
    pub parts: Vec<PartTemplate>,
    /// Declared minimum size.
    pub min: Size,
    /// Declared maximum size; `0` on an axis means unbounded.
    pub max: Size,
    /// Free-form key/value data.
    pub data: Vec<(String, String)>,
}

impl Collection {
    /// Returns the index of the part named `name`.
    ///
    /// Lookup is a linear scan in part order; collections hold few parts.
    #[must_use]
    pub fn part_index(&self, name: &str) -> Option<usize> {
        self.parts.iter().position(|p| p.name == name)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Checks the invariants the engine relies on.
    ///
    /// Part names must be unique, every part needs at least one description
    /// and every part reference must index a part of this collection.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in part order.
    pub fn validate(&self) -> Result<(), ThemeError> {
        for (i, part) in self.parts.iter().enumerate() {
            if self.parts[..i].iter().any(|p| p.name == part.name) {
                return Err(ThemeError::DuplicatePart {
                    collection: self.name.clone(),
                    part: part.name.clone(),
                });
            }
            if part.descriptions.is_empty() {
                return Err(ThemeError::NoDescriptions {
                    collection: self.name.clone(),
                    part: part.name.clone(),
                });
            }
            let refs = part
                .descriptions
                .iter()
                .flat_map(Description::refs)
                .chain(part.dragable.confine)
                .chain(part.clip_to);
            for index in refs {
                if index >= self.parts.len() {
                    return Err(ThemeError::PartOutOfRange {
                        collection: self.name.clone(),
                        part: part.name.clone(),
                        index,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A loaded theme: file-scope classes and collections.
#[derive(Clone, Debug, Default)]
pub struct ThemeFile {
    /// File-scope color and text classes, the last resolution tier.
    pub classes: ClassSet,
    collections: Vec<Collection>,
}

impl ThemeFile {
    /// Creates an empty theme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::DuplicateCollection`] if a collection with the
    /// same name already exists, or the error of [`Collection::validate`].
    pub fn add_collection(&mut self, collection: Collection) -> Result<(), ThemeError> {
        collection.validate()?;
        if self.collection_index(&collection.name).is_some() {
            return Err(ThemeError::DuplicateCollection {
                collection: collection.name,
            });
        }
        self.collections.push(collection);
        Ok(())
    }

    /// Returns the collection named `name`.
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Returns the index of the collection named `name`.
    #[must_use]
    pub fn collection_index(&self, name: &str) -> Option<usize> {
        self.collections.iter().position(|c| c.name == name)
    }

    /// Iterates collections in insertion order.
    pub fn collections(&self) -> impl Iterator<Item = &Collection> + '_ {
        self.collections.iter()
    }

    pub(crate) fn collection_at(&self, idx: usize) -> &Collection {
        &self.collections[idx]
    }
}

/// Error building theme data.
#[derive(Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// Two parts in one collection share a name.
    DuplicatePart {
        /// Collection name.
        collection: String,
        /// Repeated part name.
        part: String,
    },
    /// A part refers to a part that does not exist.
    UnknownPart {
        /// Collection name.
        collection: String,
        /// Part holding the reference.
        part: String,
        /// Missing part name.
        reference: String,
    },
    /// A part has no descriptions.
    NoDescriptions {
        /// Collection name.
        collection: String,
        /// Part without descriptions.
        part: String,
    },
    /// A part reference indexes past the end of the part list.
    PartOutOfRange {
        /// Collection name.
        collection: String,
        /// Part holding the reference.
        part: String,
        /// Offending index.
        index: usize,
    },
    /// Two collections share a name.
    DuplicateCollection {
        /// Repeated collection name.
        collection: String,
    },
}

impl fmt::Debug for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePart { collection, part } => write!(
                f,
                "ThemeError::DuplicatePart {{ collection: {collection:?}, part: {part:?} }}"
            ),
            Self::UnknownPart {
                collection,
                part,
                reference,
            } => write!(
                f,
                "ThemeError::UnknownPart {{ collection: {collection:?}, part: {part:?}, reference: {reference:?} }}"
            ),
            Self::NoDescriptions { collection, part } => write!(
                f,
                "ThemeError::NoDescriptions {{ collection: {collection:?}, part: {part:?} }}"
            ),
            Self::PartOutOfRange {
                collection,
                part,
                index,
            } => write!(
                f,
                "ThemeError::PartOutOfRange {{ collection: {collection:?}, part: {part:?}, index: {index} }}"
            ),
            Self::DuplicateCollection { collection } => {
                write!(f, "ThemeError::DuplicateCollection {{ collection: {collection:?} }}")
            }
        }
    }
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePart { collection, part } => {
                write!(f, "collection `{collection}` declares part `{part}` twice")
            }
            Self::UnknownPart {
                collection,
                part,
                reference,
            } => write!(
                f,
                "part `{part}` in collection `{collection}` refers to unknown part `{reference}`"
            ),
            Self::NoDescriptions { collection, part } => {
                write!(f, "part `{part}` in collection `{collection}` has no descriptions")
            }
            Self::PartOutOfRange {
                collection,
                part,
                index,
            } => write!(
                f,
                "part `{part}` in collection `{collection}` refers to part index {index}, out of range"
            ),
            Self::DuplicateCollection { collection } => {
                write!(f, "collection `{collection}` is declared twice")
            }
        }
    }
}

impl core::error::Error for ThemeError {}

// -----------------------------------------------------------------------------
// Builders
// -----------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
struct AnchorRefs {
    to_x: Option<String>,
    to_y: Option<String>,
}

/// Builder for a [`Description`].
///
/// # Example
///
/// ```rust
/// use understory_parts::DescriptionBuilder;
///
/// let desc = DescriptionBuilder::new("pressed", 0.0)
///     .rel1((0.0, 0.0), (4.0, 4.0))
///     .rel2((1.0, 1.0), (-4.0, -4.0))
///     .min(20.0, 10.0)
///     .color_class("button_bg");
/// ```
#[derive(Clone, Debug)]
pub struct DescriptionBuilder {
    desc: Description,
    rel1: AnchorRefs,
    rel2: AnchorRefs,
}

impl DescriptionBuilder {
    /// Starts a description for state `name` with `value`.
    ///
    /// Use `"default"` or `""` for the default state.
    #[must_use]
    pub fn new(name: &str, value: f64) -> Self {
        let name = if name == "default" { "" } else { name };
        Self {
            desc: Description {
                name: name.to_string(),
                value,
                ..Description::default()
            },
            rel1: AnchorRefs::default(),
            rel2: AnchorRefs::default(),
        }
    }

    /// Sets the top-left corner.
    #[must_use]
    pub fn rel1(mut self, relative: (f64, f64), offset: (f64, f64)) -> Self {
        self.desc.rel1.relative = Vec2::new(relative.0, relative.1);
        self.desc.rel1.offset = Vec2::new(offset.0, offset.1);
        self
    }

    /// Sets the bottom-right corner.
    #[must_use]
    pub fn rel2(mut self, relative: (f64, f64), offset: (f64, f64)) -> Self {
        self.desc.rel2.relative = Vec2::new(relative.0, relative.1);
        self.desc.rel2.offset = Vec2::new(offset.0, offset.1);
        self
    }

    /// Makes the top-left corner relative to part `part` on both axes.
    #[must_use]
    pub fn rel1_to(mut self, part: &str) -> Self {
        self.rel1.to_x = Some(part.to_string());
        self.rel1.to_y = Some(part.to_string());
        self
    }

    /// Makes the top-left corner relative to part `part` horizontally.
    #[must_use]
    pub fn rel1_to_x(mut self, part: &str) -> Self {
        self.rel1.to_x = Some(part.to_string());
        self
    }

    /// Makes the top-left corner relative to part `part` vertically.
    #[must_use]
    pub fn rel1_to_y(mut self, part: &str) -> Self {
        self.rel1.to_y = Some(part.to_string());
        self
    }

    /// Makes the bottom-right corner relative to part `part` on both axes.
    #[must_use]
    pub fn rel2_to(mut self, part: &str) -> Self {
        self.rel2.to_x = Some(part.to_string());
        self.rel2.to_y = Some(part.to_string());
        self
    }

    /// Makes the bottom-right corner relative to part `part` horizontally.
    #[must_use]
    pub fn rel2_to_x(mut self, part: &str) -> Self {
        self.rel2.to_x = Some(part.to_string());
        self
    }

    /// Makes the bottom-right corner relative to part `part` vertically.
    #[must_use]
    pub fn rel2_to_y(mut self, part: &str) -> Self {
        self.rel2.to_y = Some(part.to_string());
        self
    }

    /// Sets the minimum size.
    #[must_use]
    pub fn min(mut self, w: f64, h: f64) -> Self {
        self.desc.min = Size::new(w.max(0.0), h.max(0.0));
        self
    }

    /// Sets the maximum size. Negative components mean unbounded.
    #[must_use]
    pub fn max(mut self, w: f64, h: f64) -> Self {
        let bound = |v: f64| if v < 0.0 { f64::INFINITY } else { v };
        self.desc.max = Size::new(bound(w), bound(h));
        self
    }

    /// Sets the alignment used when min or max change the size.
    #[must_use]
    pub fn align(mut self, x: f64, y: f64) -> Self {
        self.desc.align = Vec2::new(x, y);
        self
    }

    /// Pins axes for the minimum-size solver.
    #[must_use]
    pub fn fixed(mut self, w: bool, h: bool) -> Self {
        self.desc.fixed_w = w;
        self.desc.fixed_h = h;
        self
    }

    /// Shows or hides the part in this state.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.desc.visible = visible;
        self
    }

    /// Sets the base color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.desc.color = color;
        self
    }

    /// Sets the color class.
    #[must_use]
    pub fn color_class(mut self, name: &str) -> Self {
        self.desc.color_class = Some(name.to_string());
        self
    }

    /// Sets the default text.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.desc.text.text = text.to_string();
        self
    }

    /// Sets the text class.
    #[must_use]
    pub fn text_class(mut self, name: &str) -> Self {
        self.desc.text.text_class = Some(name.to_string());
        self
    }

    /// Sets the font and font size.
    #[must_use]
    pub fn font(mut self, font: &str, size: u32) -> Self {
        self.desc.text.font = Some(font.to_string());
        self.desc.text.size = size;
        self
    }

    /// Lets the text grow the part horizontally and/or vertically.
    #[must_use]
    pub fn text_min(mut self, min_x: bool, min_y: bool) -> Self {
        self.desc.text.min_x = min_x;
        self.desc.text.min_y = min_y;
        self
    }
}

/// Builder for a [`PartTemplate`].
#[derive(Clone, Debug)]
pub struct PartBuilder {
    name: String,
    kind: PartKind,
    descriptions: Vec<DescriptionBuilder>,
    dragable: (DragAxis, DragAxis),
    confine: Option<String>,
    clip_to: Option<String>,
}

impl PartBuilder {
    /// Starts a part named `name`.
    #[must_use]
    pub fn new(name: &str, kind: PartKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            descriptions: Vec::new(),
            dragable: (DragAxis::Fixed, DragAxis::Fixed),
            confine: None,
            clip_to: None,
        }
    }

    /// Adds a description. The first one added is the default state.
    #[must_use]
    pub fn description(mut self, desc: DescriptionBuilder) -> Self {
        self.descriptions.push(desc);
        self
    }

    /// Declares the part dragable.
    #[must_use]
    pub fn dragable(mut self, x: DragAxis, y: DragAxis) -> Self {
        self.dragable = (x, y);
        self
    }

    /// Confines dragging to the extent of part `part`.
    #[must_use]
    pub fn confine(mut self, part: &str) -> Self {
        self.confine = Some(part.to_string());
        self
    }

    /// Clips the part to the object of part `part`.
    #[must_use]
    pub fn clip_to(mut self, part: &str) -> Self {
        self.clip_to = Some(part.to_string());
        self
    }
}

/// Builder for a [`Collection`].
///
/// # Example
///
/// ```rust
/// use understory_parts::{CollectionBuilder, DescriptionBuilder, PartBuilder, PartKind};
///
/// let collection = CollectionBuilder::new("button")
///     .min(40.0, 20.0)
///     .part(PartBuilder::new("bg", PartKind::Rectangle))
///     .part(
///         PartBuilder::new("label", PartKind::Text).description(
///             DescriptionBuilder::new("default", 0.0)
///                 .rel1_to("bg")
///                 .rel2_to("bg")
///                 .text_min(true, true),
///         ),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(collection.part_index("label"), Some(1));
/// ```
#[derive(Clone, Debug)]
pub struct CollectionBuilder {
    name: String,
    parts: Vec<PartBuilder>,
    min: Size,
    max: Size,
    data: Vec<(String, String)>,
}

impl CollectionBuilder {
    /// Starts a collection named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parts: Vec::new(),
            min: Size::ZERO,
            max: Size::ZERO,
            data: Vec::new(),
        }
    }

    /// Sets the declared minimum size.
    #[must_use]
    pub fn min(mut self, w: f64, h: f64) -> Self {
        self.min = Size::new(w.max(0.0), h.max(0.0));
        self
    }

    /// Sets the declared maximum size; `0` on an axis means unbounded.
    #[must_use]
    pub fn max(mut self, w: f64, h: f64) -> Self {
        self.max = Size::new(w.max(0.0), h.max(0.0));
        self
    }

    /// Adds a key/value data item.
    #[must_use]
    pub fn data(mut self, key: &str, value: &str) -> Self {
        self.data.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends a part on top of the previous ones.
    #[must_use]
    pub fn part(mut self, part: PartBuilder) -> Self {
        self.parts.push(part);
        self
    }

    /// Resolves part references and builds the collection.
    ///
    /// Parts without descriptions get a default one covering the container.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::DuplicatePart`] for repeated part names and
    /// [`ThemeError::UnknownPart`] for references to missing parts.
    pub fn build(self) -> Result<Collection, ThemeError> {
        let names: Vec<&str> = self.parts.iter().map(|p| p.name.as_str()).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ThemeError::DuplicatePart {
                    collection: self.name.clone(),
                    part: (*name).to_string(),
                });
            }
        }
        let resolve = |part: &str, reference: &Option<String>| -> Result<Option<usize>, ThemeError> {
            match reference {
                None => Ok(None),
                Some(r) => names.iter().position(|n| n == r).map(Some).ok_or_else(|| {
                    ThemeError::UnknownPart {
                        collection: self.name.clone(),
                        part: part.to_string(),
                        reference: r.clone(),
                    }
                }),
            }
        };

        let mut parts = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            let mut descriptions = Vec::with_capacity(part.descriptions.len().max(1));
            for builder in &part.descriptions {
                let mut desc = builder.desc.clone();
                desc.rel1.to_x = resolve(&part.name, &builder.rel1.to_x)?;
                desc.rel1.to_y = resolve(&part.name, &builder.rel1.to_y)?;
                desc.rel2.to_x = resolve(&part.name, &builder.rel2.to_x)?;
                desc.rel2.to_y = resolve(&part.name, &builder.rel2.to_y)?;
                descriptions.push(desc);
            }
            if descriptions.is_empty() {
                descriptions.push(Description::default());
            }
            parts.push(PartTemplate {
                name: part.name.clone(),
                kind: part.kind,
                descriptions,
                dragable: Dragable {
                    x: part.dragable.0,
                    y: part.dragable.1,
                    confine: resolve(&part.name, &part.confine)?,
                },
                clip_to: resolve(&part.name, &part.clip_to)?,
            });
        }

        Ok(Collection {
            name: self.name.clone(),
            parts,
            min: self.min,
            max: self.max,
            data: self.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states() -> PartTemplate {
        CollectionBuilder::new("c")
            .part(
                PartBuilder::new("p", PartKind::Rectangle)
                    .description(DescriptionBuilder::new("default", 0.0))
                    .description(DescriptionBuilder::new("on", 0.0))
                    .description(DescriptionBuilder::new("on", 1.0)),
            )
            .build()
            .unwrap()
            .parts
            .remove(0)
    }

    #[test]
    fn description_lookup_prefers_exact_then_nearest() {
        let part = states();
        assert_eq!(part.find_description("on", 1.0), 2);
        assert_eq!(part.find_description("on", 0.2), 1);
        assert_eq!(part.find_description("on", 0.8), 2);
        assert_eq!(part.find_description("default", 0.0), 0);
        assert_eq!(part.find_description("missing", 0.0), 0);
    }

    #[test]
    fn default_state_is_reported_by_name() {
        let part = states();
        assert_eq!(part.descriptions[0].state_name(), "default");
        assert_eq!(part.descriptions[1].state_name(), "on");
    }

    #[test]
    fn build_resolves_references() {
        let c = CollectionBuilder::new("c")
            .part(PartBuilder::new("track", PartKind::Rectangle))
            .part(
                PartBuilder::new("knob", PartKind::Rectangle)
                    .description(DescriptionBuilder::new("", 0.0).rel1_to_x("track"))
                    .dragable(DragAxis::Forward, DragAxis::Fixed)
                    .confine("track")
                    .clip_to("track"),
            )
            .build()
            .unwrap();
        let knob = &c.parts[1];
        assert_eq!(knob.descriptions[0].rel1.to_x, Some(0));
        assert_eq!(knob.descriptions[0].rel1.to_y, None);
        assert_eq!(knob.dragable.confine, Some(0));
        assert_eq!(knob.clip_to, Some(0));
        assert_eq!(knob.dependencies(0).collect::<Vec<_>>(), [0, 0]);
    }

    #[test]
    fn build_rejects_bad_names() {
        let dup = CollectionBuilder::new("c")
            .part(PartBuilder::new("a", PartKind::Rectangle))
            .part(PartBuilder::new("a", PartKind::Text))
            .build();
        assert!(matches!(dup, Err(ThemeError::DuplicatePart { .. })));

        let unknown = CollectionBuilder::new("c")
            .part(PartBuilder::new("a", PartKind::Rectangle).clip_to("nope"))
            .build()
            .unwrap_err();
        assert_eq!(
            alloc::format!("{unknown}"),
            "part `a` in collection `c` refers to unknown part `nope`"
        );
    }

    #[test]
    fn duplicate_collections_are_rejected() {
        let mut file = ThemeFile::new();
        let c = CollectionBuilder::new("c").build().unwrap();
        file.add_collection(c.clone()).unwrap();
        assert!(file.add_collection(c).is_err());
        assert_eq!(file.collection_index("c"), Some(0));
    }

    #[test]
    fn hand_built_collections_are_validated() {
        let valid = CollectionBuilder::new("c")
            .part(PartBuilder::new("a", PartKind::Rectangle))
            .part(PartBuilder::new("b", PartKind::Rectangle).clip_to("a"))
            .build()
            .unwrap();
        let mut file = ThemeFile::new();

        let mut empty = valid.clone();
        empty.parts[0].descriptions.clear();
        assert!(matches!(
            file.add_collection(empty),
            Err(ThemeError::NoDescriptions { .. })
        ));

        let mut clip = valid.clone();
        clip.parts[1].clip_to = Some(2);
        let err = file.add_collection(clip).unwrap_err();
        assert_eq!(
            alloc::format!("{err}"),
            "part `b` in collection `c` refers to part index 2, out of range"
        );

        let mut anchor = valid.clone();
        anchor.parts[1].descriptions[0].rel2.to_y = Some(7);
        assert!(matches!(
            file.add_collection(anchor),
            Err(ThemeError::PartOutOfRange { index: 7, .. })
        ));

        let mut confine = valid.clone();
        confine.parts[0].dragable.confine = Some(9);
        assert!(file.add_collection(confine).is_err());

        let mut dup = valid.clone();
        dup.parts[1].name = "a".into();
        assert!(matches!(
            file.add_collection(dup),
            Err(ThemeError::DuplicatePart { .. })
        ));

        assert_eq!(file.collections().count(), 0);
        file.add_collection(valid).unwrap();
        assert_eq!(file.collection_index("c"), Some(0));
    }
}
