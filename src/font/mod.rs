//! # Font Management
//!
//! docket draws with the standard PDF fonts (Helvetica and Courier, regular
//! and bold), which need no embedding. This module maps a resolved text style
//! onto one of those fonts and measures strings with real AFM widths so that
//! right- and center-aligned cells line up.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use serde::{Deserialize, Serialize};

use crate::style::{FontWeight, TextStyle};

/// Millimetres per PDF point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

pub fn pt_to_mm(pt: f64) -> f64 {
    pt * MM_PER_PT
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_PT
}

/// Font families available to documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Courier,
}

/// The standard PDF fonts docket can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold => StandardFontMetrics::HELVETICA_BOLD,
            Self::Courier | Self::CourierBold => StandardFontMetrics::COURIER,
        }
    }

    /// Resolve a family + weight pair.
    pub fn resolve(family: FontFamily, weight: FontWeight) -> Self {
        match (family, weight) {
            (FontFamily::Helvetica, FontWeight::Normal) => Self::Helvetica,
            (FontFamily::Helvetica, FontWeight::Bold) => Self::HelveticaBold,
            (FontFamily::Courier, FontWeight::Normal) => Self::Courier,
            (FontFamily::Courier, FontWeight::Bold) => Self::CourierBold,
        }
    }

    /// Ascent as a fraction of the font size (from the AFM Ascender).
    pub fn ascent(&self) -> f64 {
        match self {
            Self::Helvetica | Self::HelveticaBold => 0.718,
            Self::Courier | Self::CourierBold => 0.629,
        }
    }
}

/// Shared font context used by the surface and the PDF serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Measure the width of a string in millimetres.
    pub fn measure(&self, text: &str, style: &TextStyle) -> f64 {
        let font = StandardFont::resolve(style.family, style.weight);
        pt_to_mm(font.metrics().measure_string(text, style.size, 0.0))
    }

    /// Cap-height-ish ascent of the style's font, in millimetres.
    pub fn ascent(&self, style: &TextStyle) -> f64 {
        StandardFont::resolve(style.family, style.weight).ascent() * style.size_mm()
    }
}
