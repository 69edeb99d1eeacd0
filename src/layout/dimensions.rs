//! Fixed page geometry shared by the live surface, preview and export

use crate::error::{PaginationError, Result};
use serde::{Deserialize, Serialize};

/// Visual gap between consecutive pages on the live surface
pub const PAGE_GAP: f32 = 24.0;

/// A4 (210mm x 297mm) at 96 DPI, reduced by the editor's 70px content padding
pub const A4: PageDimensions = PageDimensions {
    width: 794.0,
    height: 1123.0,
    margin: Margins {
        top: 70.0,
        bottom: 70.0,
        left: 70.0,
        right: 70.0,
    },
};

/// Page margins in layout pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    /// Same margin on every side
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

/// Page size and margins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
    pub margin: Margins,
}

impl Default for PageDimensions {
    fn default() -> Self {
        A4
    }
}

impl PageDimensions {
    /// Height available to content on one page
    pub fn usable_height(&self) -> f32 {
        self.height - self.margin.top - self.margin.bottom
    }

    /// Width available to content on one page
    pub fn usable_width(&self) -> f32 {
        self.width - self.margin.left - self.margin.right
    }

    /// Reject geometry that leaves no room for content
    pub fn validate(&self) -> Result<()> {
        if !(self.usable_height() > 0.0) {
            return Err(PaginationError::InvalidGeometry(format!(
                "usable height must be positive, got {}",
                self.usable_height()
            )));
        }
        if !(self.usable_width() > 0.0) {
            return Err(PaginationError::InvalidGeometry(format!(
                "usable width must be positive, got {}",
                self.usable_width()
            )));
        }
        Ok(())
    }
}

/// Total height of a surface showing `pages` pages separated by `gap`.
///
/// Always presents at least one page.
pub fn paper_surface_height(pages: usize, page_height: f32, gap: f32) -> f32 {
    let pages = pages.max(1);
    pages as f32 * page_height + (pages - 1) as f32 * gap
}
