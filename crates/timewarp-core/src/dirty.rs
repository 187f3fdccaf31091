//! Change log for mostly-static collections.
//!
//! A [`DirtyLog`] records which elements of a large, mostly-static
//! collection (e.g. map line specials) have been mutated since the
//! collection was loaded, along with each element's original value.
//! Keyframe save consults the log to serialize only the mutated subset;
//! keyframe load consults it to reset elements that are dirty *now* but
//! were still clean when the keyframe was captured.

use indexmap::IndexMap;

/// First-touch change log for one collection.
///
/// Keys are element indices; values are the element's value *before its
/// first mutation* (its load-time original). Recording the same index
/// twice keeps the first original — the log answers "what would this
/// element be if it had never been touched", not "what was it last step".
///
/// Iteration order is insertion order (`IndexMap`), which keeps keyframe
/// buffers byte-reproducible across identical runs.
#[derive(Clone, Debug, Default)]
pub struct DirtyLog<T> {
    originals: IndexMap<u32, T>,
}

impl<T: Copy> DirtyLog<T> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            originals: IndexMap::new(),
        }
    }

    /// Record a mutation of `index`, remembering `original` if this is
    /// the first touch. Later touches of the same index are no-ops.
    pub fn record(&mut self, index: u32, original: T) {
        self.originals.entry(index).or_insert(original);
    }

    /// Whether `index` has been mutated since load.
    pub fn is_dirty(&self, index: u32) -> bool {
        self.originals.contains_key(&index)
    }

    /// The load-time original value of `index`, if it is dirty.
    pub fn original(&self, index: u32) -> Option<T> {
        self.originals.get(&index).copied()
    }

    /// Iterate `(index, original)` pairs in first-touch order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, T)> + '_ {
        self.originals.iter().map(|(&i, &v)| (i, v))
    }

    /// Number of dirty elements.
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Whether no element has been mutated.
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Drop entries for which `keep` returns false.
    ///
    /// Used by keyframe load to prune the log back to exactly the set of
    /// indices that were dirty at capture time.
    pub fn retain(&mut self, mut keep: impl FnMut(u32) -> bool) {
        self.originals.retain(|&i, _| keep(i));
    }

    /// Forget all entries. Only valid when the collection itself is
    /// reloaded from scratch.
    pub fn clear(&mut self) {
        self.originals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_touch_wins() {
        let mut log = DirtyLog::new();
        log.record(5, 100i16);
        log.record(5, 42);
        assert_eq!(log.original(5), Some(100));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn iteration_is_insertion_ordered() {
        let mut log = DirtyLog::new();
        log.record(9, 1i16);
        log.record(2, 2);
        log.record(7, 3);
        let indices: Vec<u32> = log.iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![9, 2, 7]);
    }

    #[test]
    fn retain_prunes() {
        let mut log = DirtyLog::new();
        log.record(1, 10i16);
        log.record(2, 20);
        log.record(3, 30);
        log.retain(|i| i != 2);
        assert!(log.is_dirty(1));
        assert!(!log.is_dirty(2));
        assert!(log.is_dirty(3));
    }
}
