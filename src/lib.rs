//! Lesson Pages: page layout for a continuously edited document
//!
//! This crate provides the pagination core for a lesson editor:
//! - Page geometry and typography shared by every rendering path
//! - Block measurement (bounding box plus vertical margins)
//! - Greedy page-break calculation over measured blocks
//! - A debounced live controller that keeps breaks and surface height in sync
//! - Offline pagination of static HTML into page chunks for preview and export
//! - Page-break decorations for the editing surface

pub mod config;
pub mod error;
pub mod layout;
pub mod live;
pub mod measure;
pub mod offscreen;
pub mod preview;
pub mod render;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export WASM types for direct use
#[cfg(target_arch = "wasm32")]
pub use wasm::LivePaginator;

// Re-export primary types
pub use config::PaginationConfig;
pub use error::{PaginationError, Result};
pub use layout::{
    compute_page_breaks, BlockId, Margins, PageBreakSet, PageBreaks, PageDimensions, Typography,
    A4, PAGE_GAP,
};
pub use live::{
    EditingSurface, PaginationController, PassOutcome, SurfaceBlock, Trigger, TriggerHandle,
};
pub use measure::{measure_block, BlockBox};
pub use offscreen::{FlowRenderer, OffscreenContainer, OffscreenRenderer};
pub use preview::{paginate_html, PageChunk, Paginator, PrintDocument};
pub use render::{PageBreakDecoration, PageBreakRenderer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_and_preview_agree() {
        let html = "<p>Intro paragraph.</p><h2>Section</h2><p>Body text.</p>";
        let chunks = paginate_html(html).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].html, html);

        // Same heights through the calculator used by the live controller
        let breaks = compute_page_breaks(
            [("a", 400.0), ("b", 400.0), ("c", 400.0)],
            A4.usable_height(),
        );
        assert_eq!(breaks.page_count, 2);
        assert_eq!(breaks.breaks, vec!["c"]);
    }
}
