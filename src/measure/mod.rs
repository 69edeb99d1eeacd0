//! Block height measurement
//!
//! A block consumes its bounding-box height plus both of its own vertical
//! margins. Adjacent margins are summed, never collapsed, so the live and
//! off-screen paths agree on every page boundary.

/// A rendered block-level element that can report its geometry
pub trait BlockBox {
    /// Border-box height, or `None` when the element is detached
    fn bounding_height(&self) -> Option<f32>;

    fn margin_top(&self) -> Option<f32>;

    fn margin_bottom(&self) -> Option<f32>;
}

impl<B: BlockBox + ?Sized> BlockBox for &B {
    fn bounding_height(&self) -> Option<f32> {
        (**self).bounding_height()
    }

    fn margin_top(&self) -> Option<f32> {
        (**self).margin_top()
    }

    fn margin_bottom(&self) -> Option<f32> {
        (**self).margin_bottom()
    }
}

/// Page space consumed by `block`.
///
/// Unmeasurable parts contribute zero; a detached block measures zero.
pub fn measure_block<B: BlockBox + ?Sized>(block: &B) -> f32 {
    let Some(height) = block.bounding_height().and_then(non_negative) else {
        return 0.0;
    };

    let top = block.margin_top().and_then(non_negative).unwrap_or(0.0);
    let bottom = block.margin_bottom().and_then(non_negative).unwrap_or(0.0);

    height + top + bottom
}

fn non_negative(value: f32) -> Option<f32> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Parse a computed CSS length such as `"12.5px"`.
///
/// Computed styles always resolve margins to pixels; anything else yields `None`.
pub fn parse_css_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    if number.is_empty() {
        return None;
    }
    number.parse::<f32>().ok().filter(|v| v.is_finite())
}
