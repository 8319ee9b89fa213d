//! Ordered Index
//!
//! An array-backed collection that keeps its elements either comparator-sorted
//! (binary-search insert and lookup) or in stable insertion order (the
//! comparator is used for identity only, never for placement). One structure,
//! two configurations: container children need either caller-supplied order or
//! fast identity lookup, and sorted query results need cheap in-order
//! materialization.

use std::cmp::Ordering;
use std::sync::Arc;

/// Shared comparator over index elements.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Index-level failure. The tree layer translates this into its own
/// vocabulary before it reaches a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// An element equivalent under the comparator is already present.
    #[error("an equivalent key is already present")]
    KeyCollision,
}

/// Array-backed ordered collection.
///
/// In sorted mode the element sequence is a total order consistent with the
/// comparator between operations. In insertion-order mode elements stay where
/// they were inserted and lookup degrades to a linear scan.
pub struct OrderedIndex<T> {
    entries: Vec<T>,
    cmp: Comparator<T>,
    allow_duplicates: bool,
    preserve_insertion_order: bool,
}

impl<T> OrderedIndex<T> {
    /// Create a comparator-sorted index with unique keys.
    pub fn sorted(cmp: Comparator<T>) -> Self {
        OrderedIndex {
            entries: Vec::new(),
            cmp,
            allow_duplicates: false,
            preserve_insertion_order: false,
        }
    }

    /// Create an index that preserves insertion order, with unique keys.
    pub fn insertion_order(cmp: Comparator<T>) -> Self {
        OrderedIndex {
            entries: Vec::new(),
            cmp,
            allow_duplicates: false,
            preserve_insertion_order: true,
        }
    }

    /// Create an append-only listing that admits duplicate keys. Unique
    /// lookup and removal are unsupported on such an index and panic.
    pub fn listing(cmp: Comparator<T>) -> Self {
        OrderedIndex {
            entries: Vec::new(),
            cmp,
            allow_duplicates: true,
            preserve_insertion_order: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.entries.get(i)
    }

    /// Locate an element equivalent to `key`: `Ok(pos)` when present,
    /// `Err(pos)` with the insertion point otherwise.
    fn position(&self, key: &T) -> Result<usize, usize> {
        if self.preserve_insertion_order {
            self.entries
                .iter()
                .position(|e| (self.cmp)(e, key) == Ordering::Equal)
                .ok_or(self.entries.len())
        } else {
            self.entries.binary_search_by(|e| (self.cmp)(e, key))
        }
    }

    /// Find the unique element equivalent to `key`.
    ///
    /// # Panics
    ///
    /// Panics on a duplicates-allowed index, where no unique element exists.
    pub fn find(&self, key: &T) -> Option<&T> {
        self.assert_unique("find");
        self.position(key).ok().map(|i| &self.entries[i])
    }

    /// Insert one element. On a key collision, `overwrite` replaces in place
    /// and returns the displaced element; otherwise the insert fails and the
    /// index is unchanged. A duplicates-allowed index always appends.
    pub fn insert(&mut self, item: T, overwrite: bool) -> Result<Option<T>, IndexError> {
        if self.allow_duplicates {
            self.entries.push(item);
            return Ok(None);
        }
        match self.position(&item) {
            Ok(i) => {
                if overwrite {
                    Ok(Some(std::mem::replace(&mut self.entries[i], item)))
                } else {
                    Err(IndexError::KeyCollision)
                }
            }
            Err(i) => {
                self.entries.insert(i, item);
                Ok(None)
            }
        }
    }

    /// Insert a batch, all-or-nothing: every collision (against the index or
    /// inside the batch itself) is detected before any element is placed.
    /// Returns the elements displaced by overwrites.
    pub fn insert_many(&mut self, items: Vec<T>, overwrite: bool) -> Result<Vec<T>, IndexError> {
        if !self.allow_duplicates && !overwrite {
            for (n, item) in items.iter().enumerate() {
                if self.position(item).is_ok() {
                    return Err(IndexError::KeyCollision);
                }
                if items[..n]
                    .iter()
                    .any(|prior| (self.cmp)(prior, item) == Ordering::Equal)
                {
                    return Err(IndexError::KeyCollision);
                }
            }
        }
        let mut displaced = Vec::new();
        for item in items {
            // Cannot fail: collisions were ruled out above or overwrite is on
            if let Some(old) = self.insert(item, overwrite)? {
                displaced.push(old);
            }
        }
        Ok(displaced)
    }

    /// Remove the unique element equivalent to `key`, if present.
    ///
    /// # Panics
    ///
    /// Panics on a duplicates-allowed index.
    pub fn remove(&mut self, key: &T) -> Option<T> {
        self.assert_unique("remove");
        match self.position(key) {
            Ok(i) => Some(self.entries.remove(i)),
            Err(_) => None,
        }
    }

    /// Remove every listed key, returning the removed elements.
    pub fn remove_many(&mut self, keys: &[T]) -> Vec<T> {
        keys.iter().filter_map(|k| self.remove(k)).collect()
    }

    fn assert_unique(&self, op: &str) {
        assert!(
            !self.allow_duplicates,
            "unique {} on a duplicates-allowed index",
            op
        );
    }
}

impl<T: Clone> OrderedIndex<T> {
    /// Clone the current element sequence.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.clone()
    }
}
