//! Line breaking for off-screen text flow

use crate::layout::typography::FontMetrics;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Line breaker
#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Count the lines `text` occupies when wrapped at `max_width`.
    ///
    /// Wraps at Unicode break opportunities, honours explicit newlines and
    /// splits words wider than a line at grapheme boundaries. A trailing
    /// newline does not open an extra line. Empty text occupies no lines.
    pub fn line_count(&self, text: &str, max_width: f32, metrics: &FontMetrics) -> usize {
        if text.is_empty() {
            return 0;
        }

        let max_width = max_width.max(0.0);
        let mut lines = 0;
        let mut x: f32 = 0.0;
        let mut line_open = false;
        let mut segment_start = 0;

        for (break_offset, opportunity) in linebreaks(text) {
            let segment = &text[segment_start..break_offset];
            segment_start = break_offset;

            // Trailing whitespace may hang past the edge
            let visible = segment.trim_end();
            let fit_width = self.measure(visible, metrics);
            let advance = self.measure(segment, metrics);

            if line_open && x + fit_width > max_width {
                lines += 1;
                x = 0.0;
                line_open = false;
            }

            if !line_open && fit_width > max_width {
                let (full_lines, remainder) = self.wrap_graphemes(visible, max_width, metrics);
                lines += full_lines;
                x = remainder + (advance - fit_width);
            } else {
                x += advance;
            }
            line_open = true;

            if opportunity == BreakOpportunity::Mandatory {
                lines += 1;
                x = 0.0;
                line_open = false;
            }
        }

        if line_open {
            lines += 1;
        }

        lines
    }

    /// Width of a run of text on a single line
    pub fn measure(&self, text: &str, metrics: &FontMetrics) -> f32 {
        text.graphemes(true)
            .map(|grapheme| self.grapheme_width(grapheme, metrics))
            .sum()
    }

    fn grapheme_width(&self, grapheme: &str, metrics: &FontMetrics) -> f32 {
        if grapheme == "\t" {
            metrics.default_width * 4.0
        } else if grapheme.chars().all(|c| c.is_control()) {
            0.0
        } else {
            grapheme.chars().map(|c| metrics.width(c)).sum()
        }
    }

    /// Emergency breaks inside a word; returns completed lines and the
    /// width left on the last, still open line
    fn wrap_graphemes(&self, text: &str, max_width: f32, metrics: &FontMetrics) -> (usize, f32) {
        let mut full_lines = 0;
        let mut x: f32 = 0.0;

        for grapheme in text.graphemes(true) {
            let width = self.grapheme_width(grapheme, metrics);
            if x > 0.0 && x + width > max_width {
                full_lines += 1;
                x = 0.0;
            }
            x += width;
        }

        (full_lines, x)
    }
}
