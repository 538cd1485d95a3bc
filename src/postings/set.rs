use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use super::Postings;
use crate::{Error, GrowthPolicy};

/// Unordered, duplicate-free postings for arbitrary hashable ids.
#[derive(Debug, Clone)]
pub struct SetPostings<K> {
    ids: HashSet<K>,
}

impl<K: Eq + Hash> PartialEq for SetPostings<K> {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids
    }
}

impl<K: Eq + Hash> Eq for SetPostings<K> {}

impl<K> Default for SetPostings<K> {
    fn default() -> Self {
        Self {
            ids: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash> SetPostings<K> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`; returns false if it was already present.
    pub fn insert(&mut self, id: K) -> bool {
        self.ids.insert(id)
    }

    /// Membership test.
    pub fn contains(&self, id: &K) -> bool {
        self.ids.contains(id)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<K: Clone + Ord> SetPostings<K> {
    /// Ids in ascending order.
    pub fn sorted(&self) -> Vec<K> {
        let mut out: Vec<K> = self.ids.iter().cloned().collect();
        out.sort_unstable();
        out
    }
}

impl<K: Eq + Hash> Extend<K> for SetPostings<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

impl<K: Eq + Hash> FromIterator<K> for SetPostings<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<K> Postings for SetPostings<K>
where
    K: Clone + Eq + Hash + Ord + Debug,
{
    type Id = K;
    type Iter<'a> = std::vec::IntoIter<K> where Self: 'a;

    fn seeded(first: K, _growth: &GrowthPolicy) -> Self {
        let mut list = Self::new();
        list.insert(first);
        list
    }

    fn add(&mut self, id: K) -> Result<(), Error> {
        self.insert(id);
        Ok(())
    }

    fn contains(&self, id: &K) -> bool {
        self.ids.contains(id)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.sorted().into_iter()
    }
}
