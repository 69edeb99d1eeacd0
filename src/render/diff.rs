//! Membership diff between consecutive break sets

use crate::layout::{BlockId, PageBreakSet};
use smallvec::SmallVec;

/// Blocks that gained or lost a page break between two passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakSetDiff {
    /// Newly breaking blocks, sorted
    pub added: SmallVec<[BlockId; 4]>,
    /// Blocks that no longer break, sorted
    pub removed: SmallVec<[BlockId; 4]>,
}

impl BreakSetDiff {
    /// Compare `current` against `previous` by membership
    pub fn between(previous: &PageBreakSet, current: &PageBreakSet) -> Self {
        let mut added: SmallVec<[BlockId; 4]> = current
            .iter()
            .filter(|id| !previous.contains(id))
            .cloned()
            .collect();
        let mut removed: SmallVec<[BlockId; 4]> = previous
            .iter()
            .filter(|id| !current.contains(id))
            .cloned()
            .collect();
        added.sort();
        removed.sort();

        Self { added, removed }
    }

    /// Whether membership is unchanged
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

impl PageBreakSet {
    /// Membership changes from `previous` to this set
    pub fn diff(&self, previous: &PageBreakSet) -> BreakSetDiff {
        BreakSetDiff::between(previous, self)
    }
}
