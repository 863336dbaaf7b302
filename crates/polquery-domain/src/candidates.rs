//! Append-then-finalize result sets.

use std::cmp::Ordering;

/// Accumulates candidates in any order, possibly with duplicates.
#[derive(Clone, Debug)]
pub struct CandidateSetBuilder<T> {
    items: Vec<T>,
}

impl<T> Default for CandidateSetBuilder<T> {
    fn default() -> Self {
        CandidateSetBuilder { items: Vec::new() }
    }
}

impl<T> CandidateSetBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Keeps the items for which `keep` returns `Ok(true)`, preserving order. The first error
    /// aborts and leaves the builder unchanged.
    pub fn try_retain<E>(&mut self, mut keep: impl FnMut(&T) -> Result<bool, E>) -> Result<(), E> {
        let mut flags = Vec::with_capacity(self.items.len());
        for item in &self.items {
            flags.push(keep(item)?);
        }
        let mut flags = flags.into_iter();
        self.items.retain(|_| flags.next().unwrap_or(false));
        Ok(())
    }

    /// Sorts by `compare` and drops items that compare equal to their predecessor.
    pub fn finish_by(mut self, mut compare: impl FnMut(&T, &T) -> Ordering) -> CandidateSet<T> {
        self.items.sort_by(&mut compare);
        self.items.dedup_by(|a, b| compare(a, b) == Ordering::Equal);
        CandidateSet { items: self.items }
    }

    pub fn finish_by_key<K: Ord>(self, mut key: impl FnMut(&T) -> K) -> CandidateSet<T> {
        self.finish_by(|a, b| key(a).cmp(&key(b)))
    }
}

impl<T: Ord> CandidateSetBuilder<T> {
    /// Sorts by identity and removes duplicates.
    pub fn finish(self) -> CandidateSet<T> {
        self.finish_by(T::cmp)
    }
}

impl<T> Extend<T> for CandidateSetBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

/// Sorted, duplicate-free, immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateSet<T> {
    items: Vec<T>,
}

impl<T> Default for CandidateSet<T> {
    fn default() -> Self {
        CandidateSet { items: Vec::new() }
    }
}

impl<T> CandidateSet<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Ord> CandidateSet<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.items.binary_search(item).is_ok()
    }
}

impl<T> IntoIterator for CandidateSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a CandidateSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
