//! Step arena index.
//!
//! Maps string step IDs to their integer position in the recipe so every pass
//! works on `Vec`s indexed by position instead of string-keyed maps.

use rustc_hash::FxHashMap;

/// Position of a step in its recipe (u32 for compact adjacency lists).
pub type StepIdx = u32;

/// Index from step ID strings to input positions.
///
/// Every registered step occupies the next position. When the same ID is
/// registered twice, lookups resolve to the first occurrence.
#[derive(Debug, Clone)]
pub struct StepIndex {
    to_int: FxHashMap<String, StepIdx>,
    from_int: Vec<String>,
}

impl StepIndex {
    /// Create a new index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_int: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_int: Vec::with_capacity(capacity),
        }
    }

    /// Register a step ID at the next position.
    ///
    /// Returns the new position and whether the ID was seen for the first time.
    pub fn insert(&mut self, id: &str) -> (StepIdx, bool) {
        let idx = self.from_int.len() as StepIdx;
        self.from_int.push(id.to_string());
        let fresh = !self.to_int.contains_key(id);
        if fresh {
            self.to_int.insert(id.to_string(), idx);
        }
        (idx, fresh)
    }

    /// Get the position of the first step with this ID, if any.
    #[inline]
    pub fn get(&self, id: &str) -> Option<StepIdx> {
        self.to_int.get(id).copied()
    }

    /// Get the ID of the step at a position.
    #[inline]
    pub fn resolve(&self, idx: StepIdx) -> Option<&str> {
        self.from_int.get(idx as usize).map(|s| s.as_str())
    }

    /// Resolve a list of positions, skipping any that are out of range.
    pub fn resolve_all(&self, indices: &[StepIdx]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&idx| self.resolve(idx))
            .map(str::to_string)
            .collect()
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.from_int.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.from_int.is_empty()
    }
}

impl Default for StepIndex {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_resolve() {
        let mut index = StepIndex::with_capacity(4);

        let (a, a_fresh) = index.insert("boil");
        let (b, b_fresh) = index.insert("drain");

        assert!(a_fresh && b_fresh);
        assert_eq!((a, b), (0, 1));
        assert_eq!(index.resolve(a), Some("boil"));
        assert_eq!(index.get("drain"), Some(1));
        assert_eq!(index.get("plate"), None);
    }

    #[test]
    fn test_duplicate_resolves_to_first() {
        let mut index = StepIndex::default();
        index.insert("s1");
        let (dup, fresh) = index.insert("s1");

        assert!(!fresh);
        assert_eq!(dup, 1);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("s1"), Some(0));
        assert_eq!(index.resolve(1), Some("s1"));
    }

    #[test]
    fn test_resolve_all_skips_out_of_range() {
        let mut index = StepIndex::default();
        index.insert("a");
        index.insert("b");
        assert_eq!(index.resolve_all(&[1, 9, 0]), vec!["b", "a"]);
    }
}
