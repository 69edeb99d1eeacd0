//! Pagination configuration

use crate::error::{PaginationError, Result};
use crate::layout::{
    BufferPagePolicy, PageDimensions, Typography, A4, DEFAULT_BUFFER_THRESHOLD, PAGE_GAP,
};
use serde::{Deserialize, Serialize};

/// Debounce applied to live triggers, roughly one display frame
pub const DEFAULT_DEBOUNCE_MS: f64 = 16.0;

/// Characters that would end a CSS declaration or the surrounding markup
const CSS_VALUE_FORBIDDEN: &[char] = &[';', '{', '}', '<'];

/// Settings shared by the live controller, the preview paginator and export.
///
/// Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    pub dimensions: PageDimensions,
    /// Visual gap between pages on the live surface
    pub page_gap: f32,
    pub debounce_ms: f64,
    /// Last-page fill ratio that reserves a blank buffer page
    pub buffer_threshold: f32,
    pub typography: Typography,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            dimensions: A4,
            page_gap: PAGE_GAP,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            buffer_threshold: DEFAULT_BUFFER_THRESHOLD,
            typography: Typography::default(),
        }
    }
}

impl PaginationConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.dimensions.validate()?;

        if !(self.buffer_threshold > 0.0 && self.buffer_threshold <= 1.0) {
            return Err(PaginationError::InvalidConfig(format!(
                "buffer threshold must be in (0, 1], got {}",
                self.buffer_threshold
            )));
        }
        if !(self.page_gap >= 0.0) {
            return Err(PaginationError::InvalidConfig(format!(
                "page gap must not be negative, got {}",
                self.page_gap
            )));
        }
        if !(self.debounce_ms >= 0.0) {
            return Err(PaginationError::InvalidConfig(format!(
                "debounce must not be negative, got {}",
                self.debounce_ms
            )));
        }
        if !(self.typography.font_size > 0.0 && self.typography.line_height > 0.0) {
            return Err(PaginationError::InvalidConfig(
                "font size and line height must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("font family", &self.typography.font_family),
            ("color", &self.typography.color),
        ] {
            if value.contains(CSS_VALUE_FORBIDDEN) {
                return Err(PaginationError::InvalidConfig(format!(
                    "{} must be a single CSS value, got {:?}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn buffer_policy(&self) -> BufferPagePolicy {
        BufferPagePolicy::new(self.buffer_threshold)
    }
}
