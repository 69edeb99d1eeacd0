//! Off-screen rendering substrate for static HTML
//!
//! A renderer lays HTML out in a disposable container at a fixed width.
//! The container lives exactly as long as the value returned by
//! [`OffscreenRenderer::render`]; implementations detach their rendering
//! nodes when it is dropped, on success and error paths alike.

mod flow;

pub use flow::{FlowBox, FlowContainer, FlowRenderer};

use crate::error::Result;
use crate::layout::Typography;
use crate::measure::BlockBox;

/// One immediate child of an off-screen container
#[derive(Debug, Clone)]
pub struct RenderedChild<B> {
    /// Serialized outer HTML of the element
    pub outer_html: String,
    /// Rendered node to measure
    pub node: B,
}

/// A rendered, disposable container
pub trait OffscreenContainer {
    type Block: BlockBox;

    /// Immediate child elements in document order
    fn children(&self) -> Vec<RenderedChild<Self::Block>>;
}

/// Renders HTML into an off-screen container
pub trait OffscreenRenderer {
    type Container: OffscreenContainer;

    fn render(&self, html: &str, width: f32, typography: &Typography) -> Result<Self::Container>;
}
