//! Offline pagination of static HTML for preview and export
//!
//! Renders the document once into a disposable off-screen container at the
//! usable page width, measures every top-level element, feeds the heights
//! through [`compute_page_breaks`] and slices the elements' outer HTML into
//! page-sized chunks. Nothing is cached between calls.

mod print;

pub use print::{page_label, PrintDocument};

use crate::config::PaginationConfig;
use crate::error::Result;
use crate::layout::{compute_page_breaks, PageDimensions, Typography};
use crate::measure::measure_block;
use crate::offscreen::{FlowRenderer, OffscreenContainer, OffscreenRenderer};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// HTML assigned to one output page.
///
/// `html` is the re-serialized outer HTML of the page's top-level elements
/// (`outerHTML` in the browser), so it matches the input up to serialization:
/// attribute quoting and character escaping are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChunk {
    /// 1-based page number
    pub page_number: usize,
    pub html: String,
}

/// Splits static HTML into page chunks
#[derive(Debug, Clone)]
pub struct Paginator<R> {
    renderer: R,
    dimensions: PageDimensions,
    typography: Typography,
}

impl Paginator<FlowRenderer> {
    /// Paginator using the native text-flow renderer
    pub fn with_config(config: &PaginationConfig) -> Self {
        Self::new(
            FlowRenderer::new(),
            config.dimensions,
            config.typography.clone(),
        )
    }
}

impl<R: OffscreenRenderer> Paginator<R> {
    pub fn new(renderer: R, dimensions: PageDimensions, typography: Typography) -> Self {
        Self {
            renderer,
            dimensions,
            typography,
        }
    }

    pub fn dimensions(&self) -> &PageDimensions {
        &self.dimensions
    }

    /// Split `html` into page chunks.
    ///
    /// Always returns at least one chunk; input without any top-level
    /// element comes back unchanged as a single page.
    pub fn paginate(&self, html: &str) -> Result<Vec<PageChunk>> {
        // Dropped at the end of this call, detaching the rendering nodes
        let container =
            self.renderer
                .render(html, self.dimensions.usable_width(), &self.typography)?;
        let children = container.children();

        if children.is_empty() {
            return Ok(vec![PageChunk {
                page_number: 1,
                html: html.to_string(),
            }]);
        }

        let heights = children
            .iter()
            .enumerate()
            .map(|(index, child)| (index, measure_block(&child.node)));
        let breaks = compute_page_breaks(heights, self.dimensions.usable_height());

        let chunks: Vec<_> = breaks
            .page_ranges(children.len())
            .into_iter()
            .enumerate()
            .map(|(page, range)| PageChunk {
                page_number: page + 1,
                html: children[range]
                    .iter()
                    .map(|child| child.outer_html.as_str())
                    .collect(),
            })
            .collect();

        debug!(
            blocks = children.len(),
            pages = chunks.len(),
            "paginated static html"
        );
        Ok(chunks)
    }
}

/// Paginate `html` with the default A4 geometry and editor typography
pub fn paginate_html(html: &str) -> Result<Vec<PageChunk>> {
    Paginator::with_config(&PaginationConfig::default()).paginate(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Margins;

    fn small_page() -> PageDimensions {
        // 100px of usable height: three 57.6px paragraphs cannot share a page
        PageDimensions {
            width: 400.0,
            height: 140.0,
            margin: Margins::uniform(20.0),
        }
    }

    fn paginator() -> Paginator<FlowRenderer> {
        Paginator::new(FlowRenderer::new(), small_page(), Typography::default())
    }

    #[test]
    fn test_empty_input_yields_one_page() {
        let chunks = paginate_html("").unwrap();
        assert_eq!(
            chunks,
            vec![PageChunk {
                page_number: 1,
                html: String::new()
            }]
        );
    }

    #[test]
    fn test_text_only_input_is_wrapped_unchanged() {
        let chunks = paginate_html("just text").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].html, "just text");
    }

    #[test]
    fn test_short_document_single_page() {
        let chunks = paginate_html("<h1>Lesson</h1><p>Intro</p>").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].html, "<h1>Lesson</h1><p>Intro</p>");
    }

    #[test]
    fn test_splits_into_pages() {
        let chunks = paginator().paginate("<p>a</p><p>b</p><p>c</p>").unwrap();
        let html: Vec<_> = chunks.iter().map(|c| c.html.as_str()).collect();
        assert_eq!(html, vec!["<p>a</p>", "<p>b</p>", "<p>c</p>"]);
        let numbers: Vec<_> = chunks.iter().map(|c| c.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_oversized_block_keeps_own_page() {
        let long = "word ".repeat(400);
        let html = format!("<p>{}</p><p>after</p>", long.trim_end());
        let chunks = paginator().paginate(&html).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].html, "<p>after</p>");
    }

    #[test]
    fn test_deeply_nested_document() {
        let html = format!("{}x{}", "<div>".repeat(3000), "</div>".repeat(3000));
        let chunks = paginate_html(&html).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].html, html);
    }

    #[test]
    fn test_concatenation_preserves_elements() {
        let html = "<h2>One</h2><p>a</p><ul><li>x</li></ul><p>b</p><blockquote>q</blockquote>";
        let chunks = paginator().paginate(html).unwrap();
        assert!(chunks.len() > 1);
        let joined: String = chunks.iter().map(|c| c.html.as_str()).collect();
        assert_eq!(joined, html);
    }
}
