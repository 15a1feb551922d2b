//! Batch - one record's worth of path → value entries
//!
//! Entries keep insertion order; the position map only serves lookups, so
//! iteration order never depends on hashing.

use std::collections::HashMap;

/// State of a path within one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState<'b> {
    /// The path has no entry in this batch
    Absent,
    /// The element started but carries no leaf text (yet)
    Open,
    /// The element finished with non-empty leaf text
    Closed(&'b str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    path: String,
    value: Option<String>,
}

/// Ordered mapping from absolute element path to optional leaf value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    entries: Vec<Entry>,
    positions: HashMap<String, usize>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, open or closed
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the path has an entry (open or closed)
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.positions.contains_key(path)
    }

    pub fn state(&self, path: &str) -> EntryState<'_> {
        match self.positions.get(path) {
            None => EntryState::Absent,
            Some(&i) => match &self.entries[i].value {
                None => EntryState::Open,
                Some(v) => EntryState::Closed(v),
            },
        }
    }

    /// Leaf value of a closed entry; open entries read as absent
    pub fn get(&self, path: &str) -> Option<&str> {
        match self.state(path) {
            EntryState::Closed(v) => Some(v),
            _ => None,
        }
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.path.as_str(), e.value.as_deref()))
    }

    /// Insert `path` as open. Caller guarantees the path is absent.
    pub(crate) fn insert_open(&mut self, path: &str) {
        self.insert(path, None);
    }

    /// Set the value of `path`, inserting it if absent. Caller guarantees
    /// the path is not already closed.
    pub(crate) fn set_value(&mut self, path: &str, value: &str) {
        match self.positions.get(path) {
            Some(&i) => self.entries[i].value = Some(value.to_string()),
            None => self.insert(path, Some(value.to_string())),
        }
    }

    fn insert(&mut self, path: &str, value: Option<String>) {
        self.positions.insert(path.to_string(), self.entries.len());
        self.entries.push(Entry {
            path: path.to_string(),
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states() {
        let mut batch = Batch::new();
        assert_eq!(batch.state("/r"), EntryState::Absent);

        batch.insert_open("/r");
        assert_eq!(batch.state("/r"), EntryState::Open);
        assert!(batch.contains("/r"));
        assert_eq!(batch.get("/r"), None);

        batch.set_value("/r", "x");
        assert_eq!(batch.state("/r"), EntryState::Closed("x"));
        assert_eq!(batch.get("/r"), Some("x"));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut batch = Batch::new();
        for path in ["/r", "/r/z", "/r/a", "/r/m"] {
            batch.insert_open(path);
        }
        batch.set_value("/r/a", "1");

        let seen: Vec<_> = batch.iter().collect();
        assert_eq!(
            seen,
            vec![("/r", None), ("/r/z", None), ("/r/a", Some("1")), ("/r/m", None)]
        );
    }
}
