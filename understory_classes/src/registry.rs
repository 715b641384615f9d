// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-scoped class registry with reverse membership.

use alloc::string::{String, ToString};
use core::hash::Hash;
use core::iter::FusedIterator;

use hashbrown::hash_map::Keys;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::color::ColorClass;
use crate::text::TextClass;

/// Members that must be invalidated after a registry mutation.
///
/// Empty when the mutation was a no-op.
pub type FanOut<M> = SmallVec<[M; 4]>;

/// Process-scoped color and text classes.
///
/// The registry owns the process tier of class overrides and a reverse index
/// from class name to the members (layout instances) that reference it. It
/// never owns members: mutations return a [`FanOut`] listing who must be
/// invalidated, and the caller does the invalidation before returning to its
/// own caller.
///
/// # Type Parameters
///
/// - `M`: The member identifier, typically an instance handle.
///
/// # Example
///
/// ```
/// use understory_classes::{ClassRegistry, Rgba};
///
/// let mut registry = ClassRegistry::<u32>::new();
/// registry.add_color_member("button", 7);
///
/// let fan_out = registry.set_color_class("button", [255, 0, 0, 255], [0; 4], [0; 4]);
/// assert_eq!(fan_out.as_slice(), &[7]);
///
/// // Same values again: nobody is invalidated.
/// let fan_out = registry.set_color_class("button", [255, 0, 0, 255], [0; 4], [0; 4]);
/// assert!(fan_out.is_empty());
///
/// let cc = registry.color_class("button").unwrap();
/// assert_eq!(cc.object, Rgba::new(255, 0, 0, 255));
/// ```
#[derive(Debug)]
pub struct ClassRegistry<M>
where
    M: Copy + Eq + Hash,
{
    color_classes: HashMap<String, ColorClass>,
    text_classes: HashMap<String, TextClass>,
    color_members: HashMap<String, HashSet<M>>,
    text_members: HashMap<String, HashSet<M>>,
    fontset_append: Option<String>,
}

impl<M> Default for ClassRegistry<M>
where
    M: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ClassRegistry<M>
where
    M: Copy + Eq + Hash,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            color_classes: HashMap::new(),
            text_classes: HashMap::new(),
            color_members: HashMap::new(),
            text_members: HashMap::new(),
            fontset_append: None,
        }
    }

    // -------------------------------------------------------------------------
    // Color classes
    // -------------------------------------------------------------------------

    /// Sets a process-level color class.
    ///
    /// Channels are clamped to `0..=255`. A class that does not exist yet is
    /// created with every channel at zero and then compared, so setting a new
    /// class to all zeros creates it without invalidating anybody.
    ///
    /// Returns the members to invalidate; empty if nothing changed or `name`
    /// is empty.
    pub fn set_color_class(
        &mut self,
        name: &str,
        object: [i32; 4],
        outline: [i32; 4],
        shadow: [i32; 4],
    ) -> FanOut<M> {
        if name.is_empty() {
            return FanOut::new();
        }
        let class = ColorClass::from_channels(name, object, outline, shadow);
        let current = self
            .color_classes
            .entry(name.to_string())
            .or_insert_with(|| ColorClass::transparent(name));
        if current.same_colors(&class) {
            return FanOut::new();
        }
        *current = class;
        self.color_members_of(name)
    }

    /// Removes a process-level color class.
    ///
    /// Returns the members to invalidate; empty if the class did not exist.
    pub fn delete_color_class(&mut self, name: &str) -> FanOut<M> {
        if self.color_classes.remove(name).is_none() {
            return FanOut::new();
        }
        self.color_members_of(name)
    }

    /// Returns the process-level color class named `name`.
    #[must_use]
    pub fn color_class(&self, name: &str) -> Option<&ColorClass> {
        self.color_classes.get(name)
    }

    /// Iterates every defined process-level color class, in no particular order.
    pub fn color_classes(&self) -> impl Iterator<Item = &ColorClass> + '_ {
        self.color_classes.values()
    }

    /// Lists color class names that currently have at least one member.
    ///
    /// The returned iterator is lazy and finite, yields each name exactly
    /// once, and cannot be restarted. Order is unspecified.
    pub fn color_class_names(&self) -> ClassNames<'_, M> {
        ClassNames {
            keys: self.color_members.keys(),
        }
    }

    /// Registers `member` as a user of color class `name`.
    ///
    /// Returns `true` if it was not registered before. Registering twice never
    /// produces duplicate fan-out.
    pub fn add_color_member(&mut self, name: &str, member: M) -> bool {
        add_member(&mut self.color_members, name, member)
    }

    /// Unregisters `member` from color class `name`.
    pub fn remove_color_member(&mut self, name: &str, member: M) -> bool {
        remove_member(&mut self.color_members, name, member)
    }

    /// Iterates the members of color class `name`.
    pub fn color_members(&self, name: &str) -> impl Iterator<Item = M> + '_ {
        self.color_members
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    fn color_members_of(&self, name: &str) -> FanOut<M> {
        self.color_members(name).collect()
    }

    // -------------------------------------------------------------------------
    // Text classes
    // -------------------------------------------------------------------------

    /// Sets a process-level text class.
    ///
    /// A missing font is stored as the empty string and negative sizes are
    /// clamped to zero. Returns the members whose text styles must be
    /// refreshed; empty if nothing changed or `name` is empty.
    pub fn set_text_class(&mut self, name: &str, font: Option<&str>, size: i32) -> FanOut<M> {
        if name.is_empty() {
            return FanOut::new();
        }
        let class = TextClass::new(name, Some(font.unwrap_or("")), size);
        match self.text_classes.get_mut(name) {
            Some(current) if current.same_style(&class) => return FanOut::new(),
            Some(current) => *current = class,
            None => {
                self.text_classes.insert(name.to_string(), class);
            }
        }
        self.text_members_of(name)
    }

    /// Removes a process-level text class.
    pub fn delete_text_class(&mut self, name: &str) -> FanOut<M> {
        if self.text_classes.remove(name).is_none() {
            return FanOut::new();
        }
        self.text_members_of(name)
    }

    /// Returns the process-level text class named `name`.
    #[must_use]
    pub fn text_class(&self, name: &str) -> Option<&TextClass> {
        self.text_classes.get(name)
    }

    /// Iterates every defined process-level text class, in no particular order.
    pub fn text_classes(&self) -> impl Iterator<Item = &TextClass> + '_ {
        self.text_classes.values()
    }

    /// Lists text class names that currently have at least one member.
    pub fn text_class_names(&self) -> ClassNames<'_, M> {
        ClassNames {
            keys: self.text_members.keys(),
        }
    }

    /// Registers `member` as a user of text class `name`.
    pub fn add_text_member(&mut self, name: &str, member: M) -> bool {
        add_member(&mut self.text_members, name, member)
    }

    /// Unregisters `member` from text class `name`.
    pub fn remove_text_member(&mut self, name: &str, member: M) -> bool {
        remove_member(&mut self.text_members, name, member)
    }

    /// Iterates the members of text class `name`.
    pub fn text_members(&self, name: &str) -> impl Iterator<Item = M> + '_ {
        self.text_members
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    fn text_members_of(&self, name: &str) -> FanOut<M> {
        self.text_members(name).collect()
    }

    // -------------------------------------------------------------------------
    // Process-wide settings and teardown
    // -------------------------------------------------------------------------

    /// Returns the font list appended to every resolved font.
    #[must_use]
    pub fn fontset_append(&self) -> Option<&str> {
        self.fontset_append.as_deref()
    }

    /// Sets the font list appended to every resolved font.
    ///
    /// Returns `true` if the value changed.
    pub fn set_fontset_append(&mut self, fonts: Option<&str>) -> bool {
        if self.fontset_append.as_deref() == fonts {
            return false;
        }
        self.fontset_append = fonts.map(String::from);
        true
    }

    /// Drops `member` from every color and text class membership.
    pub fn remove_member(&mut self, member: M) {
        for members in [&mut self.color_members, &mut self.text_members] {
            members.retain(|_, set| {
                set.remove(&member);
                !set.is_empty()
            });
        }
    }

    /// Releases every class, membership and setting.
    pub fn clear(&mut self) {
        self.color_classes.clear();
        self.text_classes.clear();
        self.color_members.clear();
        self.text_members.clear();
        self.fontset_append = None;
    }
}

fn add_member<M: Copy + Eq + Hash>(
    index: &mut HashMap<String, HashSet<M>>,
    name: &str,
    member: M,
) -> bool {
    if name.is_empty() {
        return false;
    }
    match index.get_mut(name) {
        Some(set) => set.insert(member),
        None => {
            let mut set = HashSet::new();
            set.insert(member);
            index.insert(name.to_string(), set);
            true
        }
    }
}

fn remove_member<M: Copy + Eq + Hash>(
    index: &mut HashMap<String, HashSet<M>>,
    name: &str,
    member: M,
) -> bool {
    let Some(set) = index.get_mut(name) else {
        return false;
    };
    let removed = set.remove(&member);
    if set.is_empty() {
        index.remove(name);
    }
    removed
}

/// Iterator over class names with at least one member.
///
/// Returned by [`ClassRegistry::color_class_names`] and
/// [`ClassRegistry::text_class_names`].
#[derive(Clone, Debug)]
pub struct ClassNames<'a, M> {
    keys: Keys<'a, String, HashSet<M>>,
}

impl<'a, M> Iterator for ClassNames<'a, M> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.keys.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<M> ExactSizeIterator for ClassNames<'_, M> {}

impl<M> FusedIterator for ClassNames<'_, M> {}
