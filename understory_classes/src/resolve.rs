// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Three-tier class resolution.

use core::hash::Hash;

use crate::color::ColorClass;
use crate::list::ClassSet;
use crate::registry::ClassRegistry;
use crate::text::TextClass;

/// The tier a class was resolved from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassScope {
    /// The instance's own override list.
    Instance,
    /// The process-wide [`ClassRegistry`].
    Process,
    /// Classes shipped with the theme file.
    File,
}

/// Borrowed view of the three class tiers for one instance.
///
/// Resolution checks the instance tier, then the process tier, then the file
/// tier. The first tier holding the name wins outright; fields are never
/// merged across tiers.
///
/// ```
/// use understory_classes::{ClassCx, ClassRegistry, ClassScope, ClassSet, ColorClass, Rgba};
///
/// let mut local = ClassSet::new();
/// local.colors.set(ColorClass::new("bg", Rgba::WHITE, Rgba::WHITE, Rgba::WHITE));
///
/// let mut registry = ClassRegistry::<u32>::new();
/// registry.set_color_class("bg", [1, 2, 3, 4], [0; 4], [0; 4]);
///
/// let file = ClassSet::new();
/// let cx = ClassCx::new(&local, &registry, &file);
/// let (scope, cc) = cx.color_class("bg").unwrap();
/// assert_eq!(scope, ClassScope::Instance);
/// assert_eq!(cc.object, Rgba::WHITE);
/// ```
#[derive(Debug)]
pub struct ClassCx<'a, M>
where
    M: Copy + Eq + Hash,
{
    local: &'a ClassSet,
    registry: &'a ClassRegistry<M>,
    file: &'a ClassSet,
}

impl<M> Clone for ClassCx<'_, M>
where
    M: Copy + Eq + Hash,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for ClassCx<'_, M> where M: Copy + Eq + Hash {}

impl<'a, M> ClassCx<'a, M>
where
    M: Copy + Eq + Hash,
{
    /// Bundles the three tiers.
    #[must_use]
    pub fn new(local: &'a ClassSet, registry: &'a ClassRegistry<M>, file: &'a ClassSet) -> Self {
        Self {
            local,
            registry,
            file,
        }
    }

    /// Resolves a color class by name.
    #[must_use]
    pub fn color_class(&self, name: &str) -> Option<(ClassScope, &'a ColorClass)> {
        if name.is_empty() {
            return None;
        }
        if let Some(cc) = self.local.colors.get(name) {
            return Some((ClassScope::Instance, cc));
        }
        if let Some(cc) = self.registry.color_class(name) {
            return Some((ClassScope::Process, cc));
        }
        self.file.colors.get(name).map(|cc| (ClassScope::File, cc))
    }

    /// Resolves a text class by name.
    #[must_use]
    pub fn text_class(&self, name: &str) -> Option<(ClassScope, &'a TextClass)> {
        if name.is_empty() {
            return None;
        }
        if let Some(tc) = self.local.texts.get(name) {
            return Some((ClassScope::Instance, tc));
        }
        if let Some(tc) = self.registry.text_class(name) {
            return Some((ClassScope::Process, tc));
        }
        self.file.texts.get(name).map(|tc| (ClassScope::File, tc))
    }

    /// Returns the process-wide font fallback list.
    #[must_use]
    pub fn fontset_append(&self) -> Option<&'a str> {
        self.registry.fontset_append()
    }
}
