//! Page geometry, typography, text reflow and page-break calculation

pub mod dimensions;
mod line_break;
pub mod pagination;
pub mod typography;

pub use dimensions::{paper_surface_height, Margins, PageDimensions, A4, PAGE_GAP};
pub use line_break::LineBreaker;
pub use pagination::{
    compute_page_breaks, BlockId, BufferPagePolicy, PageBreakSet, PageBreaks,
    DEFAULT_BUFFER_THRESHOLD,
};
pub use typography::{FontMetrics, Typography};
