// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered, linearly scanned class lists for instance and file scope.

use alloc::vec::Vec;

use crate::color::ColorClass;
use crate::text::TextClass;

/// A class value addressed by name.
pub trait NamedClass {
    /// Returns the unique key of the class.
    fn name(&self) -> &str;

    /// Returns `true` if the override values equal `other`'s, ignoring names.
    fn same_values(&self, other: &Self) -> bool;
}

/// Ordered list of classes keyed by name.
///
/// Lookups are linear scans. Instance and file tiers rarely hold more than a
/// handful of classes, so this keeps insertion order and avoids hashing; an
/// index by name could replace the scan without changing behavior.
#[derive(Clone, Debug)]
pub struct ClassList<T> {
    entries: Vec<T>,
}

impl<T> Default for ClassList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: NamedClass> ClassList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first class named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|c| c.name() == name)
    }

    /// Returns `true` if a class named `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts or updates a class.
    ///
    /// Returns `false` (and leaves the list untouched) when a class with the
    /// same name already holds the same values.
    pub fn set(&mut self, class: T) -> bool {
        match self.entries.iter_mut().find(|c| c.name() == class.name()) {
            Some(existing) if existing.same_values(&class) => false,
            Some(existing) => {
                *existing = class;
                true
            }
            None => {
                self.entries.push(class);
                true
            }
        }
    }

    /// Removes and returns the class named `name`.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        let idx = self.entries.iter().position(|c| c.name() == name)?;
        Some(self.entries.remove(idx))
    }

    /// Returns the number of classes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates classes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter()
    }

    /// Removes every class.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: NamedClass> FromIterator<T> for ClassList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for class in iter {
            list.set(class);
        }
        list
    }
}

/// The color and text classes of one scope tier.
#[derive(Clone, Debug, Default)]
pub struct ClassSet {
    /// Color classes of this tier.
    pub colors: ClassList<ColorClass>,
    /// Text classes of this tier.
    pub texts: ClassList<TextClass>,
}

impl ClassSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn cc(name: &str, v: u8) -> ColorClass {
        let c = Rgba::new(v, v, v, v);
        ColorClass::new(name, c, c, c)
    }

    #[test]
    fn set_reports_changes_only() {
        let mut list = ClassList::new();
        assert!(list.set(cc("a", 1)));
        assert!(!list.set(cc("a", 1)));
        assert!(list.set(cc("a", 2)));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("a").map(|c| c.object.r), Some(2));
    }

    #[test]
    fn keeps_insertion_order() {
        let list: ClassList<_> = [cc("b", 0), cc("a", 0), cc("c", 0)].into_iter().collect();
        let names: Vec<_> = list.iter().map(ColorClass::name).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn remove_missing_is_none() {
        let mut list = ClassList::<ColorClass>::new();
        assert!(list.remove("nope").is_none());
        list.set(cc("x", 3));
        assert_eq!(list.remove("x").map(|c| c.object.g), Some(3));
        assert!(list.is_empty());
    }
}
