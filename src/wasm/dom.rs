//! DOM adapters: live surface, block measurement and off-screen container

use crate::error::{PaginationError, Result};
use crate::layout::{BlockId, Typography};
use crate::live::{EditingSurface, SurfaceBlock};
use crate::measure::{parse_css_px, BlockBox};
use crate::offscreen::{OffscreenContainer, OffscreenRenderer, RenderedChild};
use crate::render::PAGE_BREAK_CLASS;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

pub(crate) fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// A rendered block element
#[derive(Debug, Clone)]
pub struct DomBlock {
    element: Element,
}

impl DomBlock {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    fn computed_px(&self, property: &str) -> Option<f32> {
        let window = web_sys::window()?;
        let style = window.get_computed_style(&self.element).ok()??;
        parse_css_px(&style.get_property_value(property).ok()?)
    }
}

impl BlockBox for DomBlock {
    fn bounding_height(&self) -> Option<f32> {
        if !self.element.is_connected() {
            return None;
        }
        Some(self.element.get_bounding_client_rect().height() as f32)
    }

    fn margin_top(&self) -> Option<f32> {
        self.computed_px("margin-top")
    }

    fn margin_bottom(&self) -> Option<f32> {
        self.computed_px("margin-bottom")
    }
}

/// Stable id of a top-level block, falling back to its position among blocks
fn block_id(element: &Element, position: usize) -> BlockId {
    element
        .get_attribute("data-block-id")
        .or_else(|| element.get_attribute("data-id"))
        .map(BlockId)
        .unwrap_or_else(|| BlockId(format!("block-{}", position)))
}

/// Page-break markers rendered into the surface take no page space of their own
fn is_page_break_marker(element: &Element) -> bool {
    element.has_attribute("data-page-break")
        || element.get_attribute("class").is_some_and(|class| {
            class
                .split_whitespace()
                .any(|name| name == PAGE_BREAK_CLASS)
        })
}

/// Top-level block elements of `root` in document order, markers excluded
pub(crate) fn block_elements(root: &Element) -> Vec<Element> {
    let children = root.children();
    (0..children.length())
        .filter_map(|index| children.item(index))
        .filter(|element| !is_page_break_marker(element))
        .collect()
}

/// The editor's root element
#[derive(Debug, Clone)]
pub struct DomSurface {
    root: HtmlElement,
}

impl DomSurface {
    pub fn new(root: HtmlElement) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }
}

impl EditingSurface for DomSurface {
    type Block = DomBlock;

    fn is_attached(&self) -> bool {
        self.root.is_connected()
    }

    fn top_level_blocks(&self) -> Result<Vec<SurfaceBlock<DomBlock>>> {
        if !self.root.is_connected() {
            return Err(PaginationError::Detached);
        }
        Ok(block_elements(&self.root)
            .into_iter()
            .enumerate()
            .map(|(position, element)| SurfaceBlock {
                id: block_id(&element, position),
                node: DomBlock::new(element),
            })
            .collect())
    }

    fn set_height(&mut self, height: f32) -> Result<()> {
        self.root
            .style()
            .set_property("height", &format!("{}px", height))
            .map_err(|err| PaginationError::Dom(js_error(&err)))
    }
}

/// Hidden container appended to `document.body`; removed on drop
pub struct DomContainer {
    element: HtmlElement,
}

impl OffscreenContainer for DomContainer {
    type Block = DomBlock;

    fn children(&self) -> Vec<RenderedChild<DomBlock>> {
        let children = self.element.children();
        (0..children.length())
            .filter_map(|index| children.item(index))
            .map(|element| RenderedChild {
                outer_html: element.outer_html(),
                node: DomBlock::new(element),
            })
            .collect()
    }
}

impl Drop for DomContainer {
    fn drop(&mut self) {
        self.element.remove();
    }
}

/// Renders into a hidden, fixed-width container using the editor typography
#[derive(Debug, Default, Clone, Copy)]
pub struct DomRenderer;

impl OffscreenRenderer for DomRenderer {
    type Container = DomContainer;

    fn render(&self, html: &str, width: f32, typography: &Typography) -> Result<DomContainer> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| PaginationError::Render("no document available".to_string()))?;
        let body = document
            .body()
            .ok_or_else(|| PaginationError::Render("document has no body".to_string()))?;

        let element: HtmlElement = document
            .create_element("div")
            .map_err(|err| PaginationError::Render(js_error(&err)))?
            .dyn_into()
            .map_err(|_| PaginationError::Render("container is not an HTML element".to_string()))?;
        let container = DomContainer { element };

        container
            .element
            .set_attribute("aria-hidden", "true")
            .map_err(|err| PaginationError::Render(js_error(&err)))?;
        container.element.style().set_css_text(&format!(
            "position: absolute; left: -10000px; top: 0; visibility: hidden; \
             pointer-events: none; width: {}px; {}",
            width,
            typography.css_declarations()
        ));
        container.element.set_inner_html(html);
        body.append_child(&container.element)
            .map_err(|err| PaginationError::Render(js_error(&err)))?;

        Ok(container)
    }
}
