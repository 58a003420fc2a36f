//! # Style Primitives
//!
//! The small set of visual properties the layout engine needs: colors,
//! horizontal alignment, text style, and stroke style. There is no cascade
//! here. Every draw call carries its fully resolved style.

use serde::{Deserialize, Serialize};

use crate::font::FontFamily;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "default_alpha")]
    pub a: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a color from 0-255 channel values.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Horizontal alignment of content inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Font weight. Standard PDF fonts only come in regular and bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Fully resolved text style. Font size is in points; everything else on the
/// surface is in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub family: FontFamily,
    pub weight: FontWeight,
    pub size: f64,
    pub color: Color,
    /// Line height as a multiplier of the font size.
    pub line_height: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::Helvetica,
            weight: FontWeight::Normal,
            size: 10.0,
            color: Color::BLACK,
            line_height: 1.15,
        }
    }
}

impl TextStyle {
    pub fn sized(size: f64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }

    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    /// Font size converted to millimetres.
    pub fn size_mm(&self) -> f64 {
        crate::font::pt_to_mm(self.size)
    }

    /// Distance between consecutive baselines, in millimetres.
    pub fn line_advance(&self) -> f64 {
        self.size_mm() * self.line_height
    }
}

/// Stroke style for lines and rectangle outlines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stroke {
    pub color: Color,
    /// Line width in millimetres.
    pub width: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: Color::rgb8(200, 200, 200),
            width: 0.1,
        }
    }
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb8_scales_channels() {
        let grey = Color::rgb8(240, 240, 240);
        assert!((grey.r - 240.0 / 255.0).abs() < 1e-9);
        assert_eq!(grey.a, 1.0);
        assert_eq!(Color::rgb8(0, 0, 0), Color::BLACK);
    }

    #[test]
    fn missing_alpha_defaults_to_opaque() {
        let c: Color = serde_json::from_str(r#"{"r":0.5,"g":0.5,"b":0.5}"#).unwrap();
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn align_deserializes_lowercase() {
        let a: Align = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(a, Align::Right);
    }

    #[test]
    fn line_advance_scales_with_size() {
        let s = TextStyle::sized(10.0);
        assert!((s.size_mm() - 3.5278).abs() < 0.001);
        assert!((s.line_advance() - 3.5278 * 1.15).abs() < 0.001);
    }
}
