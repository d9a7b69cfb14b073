//! Occurrence counts over extracted identifiers.

use itertools::Itertools;
use indexmap::IndexMap;

/// Identifier -> count, remembering the order keys were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: IndexMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries by descending count; equal counts keep first-seen order.
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        self.counts
            .iter()
            .map(|(k, &v)| (k.as_str(), v))
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for key in iter {
            table.add(key.as_ref());
        }
        table
    }
}
