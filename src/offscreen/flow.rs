//! Text-flow renderer for targets without a browser layout engine
//!
//! Parses HTML with `scraper` and lays each top-level element out with the
//! editor's default block styles: headings, paragraphs, lists, quotes,
//! preformatted text, tables, images and rules. Vertical margins are taken
//! in em of the block's own font size and are never collapsed.

use crate::error::Result;
use crate::layout::{LineBreaker, Typography};
use crate::measure::{measure_block, BlockBox};
use crate::offscreen::{OffscreenContainer, OffscreenRenderer, RenderedChild};
use scraper::{ElementRef, Html, Node};
use tracing::{debug, trace};

/// Horizontal indent of list and quote content
const INDENT_WIDTH: f32 = 40.0;

/// Padding inside table cells
const CELL_PADDING: f32 = 8.0;

/// Table border width
const CELL_BORDER: f32 = 1.0;

/// Height of a horizontal rule
const RULE_HEIGHT: f32 = 2.0;

/// Height / width ratio assumed for images without intrinsic size attributes
const DEFAULT_IMAGE_ASPECT: f32 = 0.5625;

/// Block nesting laid out as blocks; deeper content flows as inline text
const MAX_NESTING: usize = 128;

/// How a block's content is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowKind {
    /// Inline text interleaved with child blocks
    Flow,
    Preformatted,
    Table,
    Image,
    Rule,
}

#[derive(Debug, Clone, Copy)]
struct BlockStyle {
    kind: FlowKind,
    /// Font size relative to the base size; `None` inherits
    font_scale: Option<f32>,
    margin_top_em: f32,
    margin_bottom_em: f32,
    /// Total horizontal space taken from the content width
    indent: f32,
}

impl BlockStyle {
    const fn flow(font_scale: Option<f32>, margin_em: f32, indent: f32) -> Self {
        Self {
            kind: FlowKind::Flow,
            font_scale,
            margin_top_em: margin_em,
            margin_bottom_em: margin_em,
            indent,
        }
    }

    const fn leaf(kind: FlowKind, margin_em: f32) -> Self {
        Self {
            kind,
            font_scale: None,
            margin_top_em: margin_em,
            margin_bottom_em: margin_em,
            indent: 0.0,
        }
    }
}

/// Default style of a block-level tag; `None` for inline content
fn block_style(tag: &str) -> Option<BlockStyle> {
    let style = match tag {
        "h1" => BlockStyle::flow(Some(2.0), 0.67, 0.0),
        "h2" => BlockStyle::flow(Some(1.5), 0.83, 0.0),
        "h3" => BlockStyle::flow(Some(1.17), 1.0, 0.0),
        "h4" => BlockStyle::flow(Some(1.0), 1.33, 0.0),
        "h5" => BlockStyle::flow(Some(0.83), 1.67, 0.0),
        "h6" => BlockStyle::flow(Some(0.67), 2.33, 0.0),
        "p" | "dl" => BlockStyle::flow(None, 1.0, 0.0),
        "ul" | "ol" => BlockStyle::flow(None, 1.0, INDENT_WIDTH),
        "blockquote" | "figure" => BlockStyle::flow(None, 1.0, INDENT_WIDTH * 2.0),
        "dd" => BlockStyle::flow(None, 0.0, INDENT_WIDTH),
        "li" | "div" | "section" | "article" | "aside" | "header" | "footer" | "main"
        | "nav" | "figcaption" | "details" | "summary" | "dt" | "address" => {
            BlockStyle::flow(None, 0.0, 0.0)
        }
        "pre" => BlockStyle::leaf(FlowKind::Preformatted, 1.0),
        "table" => BlockStyle::leaf(FlowKind::Table, 0.0),
        "img" => BlockStyle::leaf(FlowKind::Image, 0.0),
        "hr" => BlockStyle::leaf(FlowKind::Rule, 0.5),
        _ => return None,
    };
    Some(style)
}

/// Laid-out geometry of one element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowBox {
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl BlockBox for FlowBox {
    fn bounding_height(&self) -> Option<f32> {
        Some(self.height)
    }

    fn margin_top(&self) -> Option<f32> {
        Some(self.margin_top)
    }

    fn margin_bottom(&self) -> Option<f32> {
        Some(self.margin_bottom)
    }
}

/// Off-screen container produced by [`FlowRenderer`]
#[derive(Debug)]
pub struct FlowContainer {
    children: Vec<RenderedChild<FlowBox>>,
}

impl OffscreenContainer for FlowContainer {
    type Block = FlowBox;

    fn children(&self) -> Vec<RenderedChild<FlowBox>> {
        self.children.clone()
    }
}

impl Drop for FlowContainer {
    fn drop(&mut self) {
        trace!(children = self.children.len(), "released flow container");
    }
}

/// Renderer estimating layout from typography and text reflow
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowRenderer {
    line_breaker: LineBreaker,
}

impl FlowRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OffscreenRenderer for FlowRenderer {
    type Container = FlowContainer;

    fn render(&self, html: &str, width: f32, typography: &Typography) -> Result<FlowContainer> {
        let fragment = Html::parse_fragment(html);
        let flow = Flow {
            typography,
            line_breaker: self.line_breaker,
        };

        let children: Vec<_> = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .map(|element| RenderedChild {
                outer_html: element.html(),
                node: flow.layout_element(element, width, 1.0, 0),
            })
            .collect();

        debug!(children = children.len(), width, "rendered flow container");
        Ok(FlowContainer { children })
    }
}

/// Layout pass over one fragment
struct Flow<'a> {
    typography: &'a Typography,
    line_breaker: LineBreaker,
}

impl Flow<'_> {
    fn layout_element(
        &self,
        element: ElementRef<'_>,
        width: f32,
        parent_scale: f32,
        depth: usize,
    ) -> FlowBox {
        // Stray inline content at block level becomes an anonymous block
        let style =
            block_style(element.value().name()).unwrap_or(BlockStyle::flow(None, 0.0, 0.0));
        let scale = style.font_scale.unwrap_or(parent_scale);
        let font_px = self.typography.font_size * scale;
        let inner_width = (width - style.indent).max(0.0);

        let height = match style.kind {
            FlowKind::Flow => self.flow_height(element, inner_width, scale, depth),
            FlowKind::Preformatted => self.preformatted_height(element, scale),
            FlowKind::Table => self.table_height(element, inner_width, scale, depth),
            FlowKind::Image => image_height(element, inner_width),
            FlowKind::Rule => RULE_HEIGHT,
        };

        FlowBox {
            height,
            margin_top: style.margin_top_em * font_px,
            margin_bottom: style.margin_bottom_em * font_px,
        }
    }

    fn flow_height(&self, element: ElementRef<'_>, width: f32, scale: f32, depth: usize) -> f32 {
        let mut height = 0.0;
        let mut inline = InlineText::default();

        for child in element.children() {
            match child.value() {
                Node::Text(text) => inline.push_text(text),
                Node::Element(data) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if data.name() == "br" {
                        inline.push_break();
                    } else if block_style(data.name()).is_some() && depth + 1 < MAX_NESTING {
                        height += self.inline_height(&mut inline, width, scale);
                        let block = self.layout_element(child, width, scale, depth + 1);
                        height += measure_block(&block);
                    } else {
                        collect_inline(child, &mut inline);
                    }
                }
                _ => {}
            }
        }

        height + self.inline_height(&mut inline, width, scale)
    }

    fn inline_height(&self, inline: &mut InlineText, width: f32, scale: f32) -> f32 {
        let text = inline.take();
        let metrics = self.typography.metrics(scale);
        let lines = self.line_breaker.line_count(&text, width, &metrics);
        lines as f32 * metrics.line_height
    }

    fn preformatted_height(&self, element: ElementRef<'_>, scale: f32) -> f32 {
        let text: String = element.text().collect();
        if text.is_empty() {
            return 0.0;
        }
        let lines = text.trim_end_matches('\n').split('\n').count();
        lines as f32 * self.typography.monospace_metrics(scale).line_height
    }

    fn table_height(&self, table: ElementRef<'_>, width: f32, scale: f32, depth: usize) -> f32 {
        let rows = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|row| row.value().name() == "tr" && owning_table(*row) == Some(table));

        let rows_height: f32 = rows
            .map(|row| {
                let cells: Vec<_> = row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .collect();
                if cells.is_empty() {
                    return 0.0;
                }

                let cell_width = (width / cells.len() as f32 - 2.0 * CELL_PADDING).max(0.0);
                let content = cells
                    .iter()
                    .map(|cell| self.flow_height(*cell, cell_width, scale, depth + 1))
                    .fold(0.0, f32::max);
                content + 2.0 * CELL_PADDING + CELL_BORDER
            })
            .sum();

        rows_height + CELL_BORDER
    }
}

/// Nearest enclosing table of a row
fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

fn image_height(image: ElementRef<'_>, max_width: f32) -> f32 {
    let dimension = |name: &str| {
        image
            .value()
            .attr(name)
            .and_then(|value| value.trim().trim_end_matches("px").parse::<f32>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
    };

    match (dimension("width"), dimension("height")) {
        (Some(width), Some(height)) if width > max_width => height * max_width / width,
        (_, Some(height)) => height,
        (Some(width), None) => width.min(max_width) * DEFAULT_IMAGE_ASPECT,
        (None, None) => max_width * DEFAULT_IMAGE_ASPECT,
    }
}

fn collect_inline(element: ElementRef<'_>, inline: &mut InlineText) {
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => inline.push_text(text),
            Node::Element(data) if data.name() == "br" => inline.push_break(),
            _ => {}
        }
    }
}

/// Inline text with HTML whitespace collapsing applied
#[derive(Debug, Default)]
struct InlineText {
    text: String,
    pending_space: bool,
}

impl InlineText {
    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.pending_space = !self.text.is_empty() && !self.text.ends_with('\n');
            } else {
                if self.pending_space {
                    self.text.push(' ');
                    self.pending_space = false;
                }
                self.text.push(c);
            }
        }
    }

    fn push_break(&mut self) {
        self.text.push('\n');
        self.pending_space = false;
    }

    fn take(&mut self) -> String {
        self.pending_space = false;
        std::mem::take(&mut self.text)
    }
}
