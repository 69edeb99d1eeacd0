//! Standalone print document for PDF export

use crate::layout::{PageDimensions, Typography};
use crate::preview::PageChunk;
use std::fmt::Write;

/// Footer text for page `number` of `total`
pub fn page_label(number: usize, total: usize) -> String {
    format!("Page {} of {}", number, total)
}

/// Page chunks laid out at true physical page size
#[derive(Debug, Clone)]
pub struct PrintDocument<'a> {
    chunks: &'a [PageChunk],
    dimensions: PageDimensions,
    typography: &'a Typography,
}

impl<'a> PrintDocument<'a> {
    pub fn new(
        chunks: &'a [PageChunk],
        dimensions: PageDimensions,
        typography: &'a Typography,
    ) -> Self {
        Self {
            chunks,
            dimensions,
            typography,
        }
    }

    pub fn page_count(&self) -> usize {
        self.chunks.len().max(1)
    }

    /// Render the full HTML document, one `section.page` per chunk
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
        out.push_str(&self.stylesheet());
        out.push_str("</style>\n</head>\n<body>\n");

        let total = self.page_count();
        for chunk in self.chunks {
            let _ = write!(
                out,
                "<section class=\"page\" data-page=\"{number}\">\n\
                 <div class=\"page-content\">{html}</div>\n\
                 <footer class=\"page-footer\">{label}</footer>\n\
                 </section>\n",
                number = chunk.page_number,
                html = chunk.html,
                label = page_label(chunk.page_number, total),
            );
        }

        out.push_str("</body>\n</html>\n");
        out
    }

    fn stylesheet(&self) -> String {
        let dims = &self.dimensions;
        let margin = &dims.margin;
        let mut css = String::new();

        let _ = writeln!(
            css,
            "@page {{ size: {}px {}px; margin: 0; }}",
            dims.width, dims.height
        );
        let _ = writeln!(css, "body {{ margin: 0; {} }}", self.typography.css_declarations());
        let _ = writeln!(
            css,
            ".page {{ position: relative; box-sizing: border-box; overflow: hidden; \
             width: {}px; height: {}px; padding: {}px {}px {}px {}px; \
             page-break-after: always; break-after: page; }}",
            dims.width, dims.height, margin.top, margin.right, margin.bottom, margin.left
        );
        let _ = writeln!(css, ".page:last-child {{ page-break-after: auto; break-after: auto; }}");
        let _ = writeln!(
            css,
            ".page-footer {{ position: absolute; left: 0; right: 0; bottom: {}px; \
             text-align: center; font-size: 0.75em; opacity: 0.7; }}",
            margin.bottom / 2.0
        );
        css
    }
}
