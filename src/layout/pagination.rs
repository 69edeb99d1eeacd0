//! Page-break calculation: flow measured blocks into fixed-height pages

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fill ratio of the last page above which the live surface reserves a blank page
pub const DEFAULT_BUFFER_THRESHOLD: f32 = 0.7;

/// Stable identifier of a top-level block in a live document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Result of one pagination pass
#[derive(Debug, Clone, PartialEq)]
pub struct PageBreaks<I> {
    /// Blocks that start a new page, in document order
    pub breaks: Vec<I>,
    /// Index of the first block on each page
    pub page_starts: Vec<usize>,
    /// Number of pages, never zero
    pub page_count: usize,
    /// Height accumulated on the final page
    pub last_page_height: f32,
}

impl<I> PageBreaks<I> {
    /// Range of block indices assigned to each page
    pub fn page_ranges(&self, block_count: usize) -> Vec<std::ops::Range<usize>> {
        self.page_starts
            .iter()
            .enumerate()
            .map(|(page, &start)| {
                let end = self
                    .page_starts
                    .get(page + 1)
                    .copied()
                    .unwrap_or(block_count);
                start..end
            })
            .collect()
    }
}

/// Flow `(id, height)` pairs into pages of `usable_height`.
///
/// A block opens a new page only when the current page already holds
/// something and the block would push it strictly past `usable_height`.
/// The first block on a page always stays, so oversized blocks overflow
/// their page instead of producing an empty one.
pub fn compute_page_breaks<I, It>(blocks: It, usable_height: f32) -> PageBreaks<I>
where
    It: IntoIterator<Item = (I, f32)>,
{
    let mut breaks = Vec::new();
    let mut page_starts = Vec::new();
    let mut current_page_height: f32 = 0.0;
    let mut page_count = 1;

    for (index, (id, height)) in blocks.into_iter().enumerate() {
        let height = sanitize(height);

        if index == 0 {
            page_starts.push(0);
        }

        if current_page_height > 0.0 && current_page_height + height > usable_height {
            breaks.push(id);
            page_starts.push(index);
            page_count += 1;
            current_page_height = height;
        } else {
            current_page_height += height;
        }
    }

    PageBreaks {
        breaks,
        page_starts,
        page_count,
        last_page_height: current_page_height,
    }
}

fn sanitize(height: f32) -> f32 {
    if height.is_finite() {
        height.max(0.0)
    } else {
        0.0
    }
}

/// Extra trailing page reserved on the live surface while the last page fills up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferPagePolicy {
    /// Fill ratio of the last page that triggers the extra page
    pub threshold: f32,
}

impl Default for BufferPagePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BUFFER_THRESHOLD,
        }
    }
}

impl BufferPagePolicy {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Pages the live surface should present, including a buffer page
    pub fn surface_page_count<I>(&self, breaks: &PageBreaks<I>, usable_height: f32) -> usize {
        if usable_height > 0.0 && breaks.last_page_height / usable_height > self.threshold {
            breaks.page_count + 1
        } else {
            breaks.page_count
        }
    }
}

/// Blocks that must begin a new page.
///
/// Equality compares membership only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageBreakSet {
    ids: FxHashSet<BlockId>,
}

impl PageBreakSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockId> {
        self.ids.iter()
    }

    /// Members in a stable order, for serialization and logs
    pub fn sorted_ids(&self) -> Vec<BlockId> {
        let mut ids: Vec<_> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}

impl From<PageBreaks<BlockId>> for PageBreakSet {
    fn from(breaks: PageBreaks<BlockId>) -> Self {
        breaks.breaks.into_iter().collect()
    }
}

impl FromIterator<BlockId> for PageBreakSet {
    fn from_iter<T: IntoIterator<Item = BlockId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USABLE: f32 = 983.0;

    fn blocks(heights: &[f32]) -> Vec<(BlockId, f32)> {
        heights
            .iter()
            .enumerate()
            .map(|(i, &h)| (BlockId(format!("block{}", i + 1)), h))
            .collect()
    }

    #[test]
    fn test_empty_document() {
        let result = compute_page_breaks(Vec::<(BlockId, f32)>::new(), USABLE);
        assert!(result.breaks.is_empty());
        assert!(result.page_starts.is_empty());
        assert_eq!(result.page_count, 1);
        assert_eq!(result.last_page_height, 0.0);
    }

    #[test]
    fn test_exact_fit() {
        let result = compute_page_breaks(blocks(&[500.0, 483.0]), USABLE);
        assert!(result.breaks.is_empty());
        assert_eq!(result.page_count, 1);
    }

    #[test]
    fn test_one_pixel_overflow() {
        let result = compute_page_breaks(blocks(&[500.0, 484.0]), USABLE);
        assert_eq!(result.breaks, vec![BlockId::new("block2")]);
        assert_eq!(result.page_starts, vec![0, 1]);
        assert_eq!(result.page_count, 2);
        assert_eq!(result.last_page_height, 484.0);
    }

    #[test]
    fn test_oversized_first_block() {
        let result = compute_page_breaks(blocks(&[1500.0]), USABLE);
        assert!(result.breaks.is_empty());
        assert_eq!(result.page_count, 1);
    }

    #[test]
    fn test_oversized_block_mid_document() {
        let result = compute_page_breaks(blocks(&[100.0, 1500.0, 100.0]), USABLE);
        // The oversized block opens page 2 and overflows it; the next block moves on
        assert_eq!(
            result.breaks,
            vec![BlockId::new("block2"), BlockId::new("block3")]
        );
        assert_eq!(result.page_count, 3);
    }

    #[test]
    fn test_zero_height_blocks_never_break() {
        let result = compute_page_breaks(blocks(&[0.0, 0.0, 983.0, 0.0]), USABLE);
        assert!(result.breaks.is_empty());
        assert_eq!(result.page_count, 1);
    }

    #[test]
    fn test_invalid_heights_count_as_zero() {
        let result = compute_page_breaks(blocks(&[f32::NAN, -20.0, f32::INFINITY, 983.0]), USABLE);
        assert!(result.breaks.is_empty());
        assert_eq!(result.last_page_height, 983.0);
    }

    #[test]
    fn test_page_ranges() {
        let result = compute_page_breaks(blocks(&[600.0, 600.0, 300.0, 600.0]), USABLE);
        assert_eq!(result.page_ranges(4), vec![0..1, 1..3, 3..4]);
    }

    #[test]
    fn test_buffer_page_heuristic() {
        let policy = BufferPagePolicy::default();

        let result = compute_page_breaks(blocks(&[700.0]), USABLE);
        assert!(result.breaks.is_empty());
        assert_eq!(policy.surface_page_count(&result, USABLE), 2);

        let result = compute_page_breaks(blocks(&[600.0]), USABLE);
        assert_eq!(policy.surface_page_count(&result, USABLE), 1);

        let result = compute_page_breaks(Vec::<(BlockId, f32)>::new(), USABLE);
        assert_eq!(policy.surface_page_count(&result, USABLE), 1);
    }

    #[test]
    fn test_break_set_membership_equality() {
        let a: PageBreakSet = vec![BlockId::new("a"), BlockId::new("b")].into_iter().collect();
        let b: PageBreakSet = vec![BlockId::new("b"), BlockId::new("a")].into_iter().collect();
        assert_eq!(a, b);
        assert!(a.contains(&BlockId::new("a")));
        assert_eq!(a.sorted_ids(), vec![BlockId::new("a"), BlockId::new("b")]);
    }
}
