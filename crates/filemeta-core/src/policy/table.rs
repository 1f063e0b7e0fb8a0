//! Ordered mapping from pattern to check list.

use rustc_hash::FxHashMap;

use super::syntax::PatternDescriptor;
use crate::checks::BoundCheck;

/// Insertion-ordered map from pattern descriptor to a value (the check list).
///
/// Order is first-match priority, so it is kept in an explicit vector; the
/// hash index only accelerates key lookup. Re-inserting an existing key
/// replaces its value in place and keeps its position.
#[derive(Debug, Clone)]
pub struct PolicyTable<T> {
    entries: Vec<(PatternDescriptor, T)>,
    index: FxHashMap<String, usize>,
}

/// Table of resolved, ready-to-run checks.
pub type CheckTable = PolicyTable<Vec<BoundCheck>>;

/// Table of literal `name(args)` fragments, for editing.
pub type RawTable = PolicyTable<Vec<String>>;

impl<T> PolicyTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Insert or overwrite. Returns the previous value for the key, if any.
    pub fn insert(&mut self, descriptor: PatternDescriptor, value: T) -> Option<T> {
        let key = descriptor.key();
        match self.index.get(&key) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, value)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((descriptor, value));
                None
            }
        }
    }

    pub fn get(&self, descriptor: &PatternDescriptor) -> Option<&T> {
        self.get_by_key(&descriptor.key())
    }

    /// Lookup by canonical `<keyword>:<pattern>` key.
    pub fn get_by_key(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Entries in declaration (priority) order.
    pub fn iter(&self) -> impl Iterator<Item = (&PatternDescriptor, &T)> {
        self.entries.iter().map(|(d, v)| (d, v))
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &PatternDescriptor> {
        self.entries.iter().map(|(d, _)| d)
    }

    /// Canonical keys in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.descriptors().map(PatternDescriptor::key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply `other` on top of `self`, entry by entry.
    pub fn merge(&mut self, other: PolicyTable<T>) {
        for (descriptor, value) in other.entries {
            self.insert(descriptor, value);
        }
    }
}

impl<T> Default for PolicyTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for PolicyTable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T: Eq> Eq for PolicyTable<T> {}

impl<T> IntoIterator for PolicyTable<T> {
    type Item = (PatternDescriptor, T);
    type IntoIter = std::vec::IntoIter<(PatternDescriptor, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T> FromIterator<(PatternDescriptor, T)> for PolicyTable<T> {
    fn from_iter<I: IntoIterator<Item = (PatternDescriptor, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (descriptor, value) in iter {
            table.insert(descriptor, value);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::syntax::SyntaxKind;

    fn glob(p: &str) -> PatternDescriptor {
        PatternDescriptor::new(SyntaxKind::RelativeGlob, p)
    }

    #[test]
    fn redeclaration_overwrites_in_place() {
        let mut table = PolicyTable::new();
        table.insert(glob("*.h"), 1);
        table.insert(glob("*.c"), 2);
        assert_eq!(table.insert(glob("*.h"), 3), Some(1));
        assert_eq!(table.keys(), vec!["relative-glob:*.h", "relative-glob:*.c"]);
        assert_eq!(table.get(&glob("*.h")), Some(&3));
    }

    #[test]
    fn same_text_different_syntax_are_distinct_keys() {
        let mut table = PolicyTable::new();
        table.insert(glob("x"), 1);
        table.insert(PatternDescriptor::new(SyntaxKind::RelativeRegex, "x"), 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_by_key("relative-regex:x"), Some(&2));
    }

    #[test]
    fn merge_keeps_unrelated_entries() {
        let mut base: PolicyTable<i32> = [(glob("a"), 1), (glob("b"), 2)].into_iter().collect();
        let overlay: PolicyTable<i32> = [(glob("b"), 20), (glob("c"), 30)].into_iter().collect();
        base.merge(overlay);
        let values: Vec<i32> = base.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 20, 30]);
    }
}
