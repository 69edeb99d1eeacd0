//! Render output: page-break presentation and break-set diff

mod diff;
mod page_break;

pub use diff::BreakSetDiff;
pub use page_break::{
    DecoratedBlock, PageBreakDecoration, PageBreakMarker, PageBreakRenderer, PAGE_BREAK_CLASS,
};
