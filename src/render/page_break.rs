//! Page-boundary markers rendered inside the editor's own block pipeline
//!
//! Markers are produced while the editor renders its blocks rather than
//! injected into the DOM afterwards, so they survive re-rendering.

use crate::layout::{BlockId, PageBreakSet};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// CSS class of the marker element
pub const PAGE_BREAK_CLASS: &str = "page-break";

/// Visual boundary drawn above a block that opens a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBreakMarker {
    /// 1-based number of the page the block opens
    pub page_number: usize,
    /// Height of the gap between pages
    pub gap: f32,
}

impl PageBreakMarker {
    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"{}\" contenteditable=\"false\" data-page-break=\"{}\" style=\"height: {}px\"></div>",
            PAGE_BREAK_CLASS, self.page_number, self.gap
        )
    }
}

/// A block as rendered by the editor, with its optional marker
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedBlock<'a> {
    pub id: &'a BlockId,
    pub html: &'a str,
    pub page_break: Option<PageBreakMarker>,
}

impl<'a> DecoratedBlock<'a> {
    /// Block HTML, preceded by the marker when the block opens a page
    pub fn to_html(&self) -> Cow<'a, str> {
        match &self.page_break {
            Some(marker) => Cow::Owned(format!("{}{}", marker.to_html(), self.html)),
            None => Cow::Borrowed(self.html),
        }
    }
}

/// Widget-style decoration for editors that overlay markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreakDecoration {
    /// Block the marker is placed before
    pub before: BlockId,
    pub page_number: usize,
}

/// Consults the current break set while blocks render
#[derive(Debug, Clone, Copy)]
pub struct PageBreakRenderer<'a> {
    breaks: &'a PageBreakSet,
    gap: f32,
}

impl<'a> PageBreakRenderer<'a> {
    pub fn new(breaks: &'a PageBreakSet, gap: f32) -> Self {
        Self { breaks, gap }
    }

    /// Attach markers to blocks given in document order.
    ///
    /// The first block never receives a marker, even if a stale break set
    /// still lists it.
    pub fn decorate<'b, I>(&self, blocks: I) -> Vec<DecoratedBlock<'b>>
    where
        I: IntoIterator<Item = (&'b BlockId, &'b str)>,
    {
        let mut page_number = 1;
        blocks
            .into_iter()
            .enumerate()
            .map(|(index, (id, html))| {
                let page_break = (index > 0 && self.breaks.contains(id)).then(|| {
                    page_number += 1;
                    PageBreakMarker {
                        page_number,
                        gap: self.gap,
                    }
                });
                DecoratedBlock {
                    id,
                    html,
                    page_break,
                }
            })
            .collect()
    }

    /// Render blocks given in document order into one HTML string
    pub fn render_blocks<'b, I>(&self, blocks: I) -> String
    where
        I: IntoIterator<Item = (&'b BlockId, &'b str)>,
    {
        self.decorate(blocks)
            .iter()
            .map(|block| block.to_html())
            .collect()
    }

    /// Decorations for blocks identified in document order
    pub fn decorations<'b, I>(&self, ids: I) -> Vec<PageBreakDecoration>
    where
        I: IntoIterator<Item = &'b BlockId>,
    {
        let mut page_number = 1;
        ids.into_iter()
            .enumerate()
            .filter(|(index, id)| *index > 0 && self.breaks.contains(id))
            .map(|(_, id)| {
                page_number += 1;
                PageBreakDecoration {
                    before: id.clone(),
                    page_number,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<BlockId> {
        names.iter().map(|name| BlockId::new(*name)).collect()
    }

    #[test]
    fn test_unbroken_blocks_render_unchanged() {
        let breaks = PageBreakSet::new();
        let renderer = PageBreakRenderer::new(&breaks, 24.0);
        let blocks = ids(&["a", "b"]);
        let html = renderer.render_blocks(blocks.iter().zip(["<p>a</p>", "<p>b</p>"]));
        assert_eq!(html, "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_marker_before_breaking_block() {
        let breaks: PageBreakSet = ids(&["c"]).into_iter().collect();
        let renderer = PageBreakRenderer::new(&breaks, 24.0);
        let blocks = ids(&["a", "b", "c"]);
        let decorated = renderer.decorate(blocks.iter().zip(["<p>a</p>", "<p>b</p>", "<p>c</p>"]));

        assert!(decorated[0].page_break.is_none());
        assert!(decorated[1].page_break.is_none());
        assert_eq!(
            decorated[2].page_break,
            Some(PageBreakMarker {
                page_number: 2,
                gap: 24.0
            })
        );
        assert_eq!(
            decorated[2].to_html(),
            "<div class=\"page-break\" contenteditable=\"false\" data-page-break=\"2\" style=\"height: 24px\"></div><p>c</p>"
        );
    }

    #[test]
    fn test_first_block_never_marked() {
        let breaks: PageBreakSet = ids(&["a", "c"]).into_iter().collect();
        let renderer = PageBreakRenderer::new(&breaks, 24.0);
        let blocks = ids(&["a", "b", "c"]);

        let decorations = renderer.decorations(&blocks);
        assert_eq!(
            decorations,
            vec![PageBreakDecoration {
                before: BlockId::new("c"),
                page_number: 2
            }]
        );
    }
}
