//! Typography shared by the live editor and off-screen measurement

use serde::{Deserialize, Serialize};

/// Font settings the editor surface renders with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub font_family: String,
    /// Font size in layout pixels
    pub font_size: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    pub color: String,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Inter, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 16.0,
            line_height: 1.6,
            color: "#1f2937".to_string(),
        }
    }
}

impl Typography {
    /// Line height in pixels for text scaled by `scale` relative to the base size
    pub fn line_height_px(&self, scale: f32) -> f32 {
        self.font_size * scale * self.line_height
    }

    /// Proportional metrics for text scaled by `scale`
    pub fn metrics(&self, scale: f32) -> FontMetrics {
        FontMetrics::proportional(self.font_size * scale, self.line_height_px(scale))
    }

    /// Fixed-pitch metrics for preformatted text
    pub fn monospace_metrics(&self, scale: f32) -> FontMetrics {
        let size = self.font_size * scale;
        FontMetrics::new(self.line_height_px(scale), vec![size * 0.6; 128], size * 0.6)
    }

    /// CSS declarations applying this typography to a container
    pub fn css_declarations(&self) -> String {
        format!(
            "font-family: {}; font-size: {}px; line-height: {}; color: {};",
            self.font_family, self.font_size, self.line_height, self.color
        )
    }
}

/// Metrics needed for text layout
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        let typography = Typography::default();
        typography.metrics(1.0)
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Approximate advance widths of a humanist sans-serif at `font_size`
    pub fn proportional(font_size: f32, line_height: f32) -> Self {
        let char_widths = (0u8..128)
            .map(|b| {
                let em = match b {
                    b' ' | b'i' | b'l' | b'j' | b'.' | b',' | b'\'' | b'!' | b'|' | b':'
                    | b';' => 0.28,
                    b'f' | b't' | b'r' | b'(' | b')' | b'[' | b']' | b'-' => 0.36,
                    b'm' | b'w' => 0.82,
                    b'M' | b'W' => 0.9,
                    b'0'..=b'9' => 0.55,
                    b'A'..=b'Z' => 0.66,
                    b'a'..=b'z' => 0.52,
                    0..=31 | 127 => 0.0,
                    _ => 0.5,
                };
                em * font_size
            })
            .collect();

        Self {
            line_height,
            char_widths,
            default_width: font_size * 0.6,
        }
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }
}
