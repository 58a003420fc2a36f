//! # Page Footers
//!
//! Stamps a separator and "Page i of N" (plus optional thank-you text and a
//! generation timestamp) on every page. It has to run last: N is read from
//! the surface at call time, and anything appended afterwards would carry a
//! stale count.

use serde::{Deserialize, Serialize};

use super::box_model::align_x;
use crate::error::Result;
use crate::style::{Align, Stroke, TextStyle};
use crate::surface::Surface;

/// What goes in the footer band, and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterSpec {
    /// Left edge of the footer band (mm).
    pub left: f64,
    /// Right edge of the footer band (mm).
    pub right: f64,
    /// Separator distance above the page bottom.
    pub separator_offset: f64,
    /// Baseline distance above the page bottom.
    pub text_offset: f64,
    pub separator: Option<Stroke>,
    pub text: TextStyle,
    /// Centred between page number and timestamp.
    pub thank_you: Option<String>,
    /// Right-aligned, typically "Generated on ...".
    pub timestamp: Option<String>,
}

impl Default for FooterSpec {
    fn default() -> Self {
        Self {
            left: 10.0,
            right: 200.0,
            separator_offset: 14.0,
            text_offset: 5.0,
            separator: Some(Stroke::default()),
            text: TextStyle::sized(8.0),
            thank_you: None,
            timestamp: None,
        }
    }
}

/// The usual "Page i of N" label.
pub fn page_of(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

/// Stamp the footer on every page and return the page count.
///
/// `page_label` gets the 1-based page number and the total. The page that
/// was current before the call is current again afterwards.
pub fn stamp_all<F>(surface: &mut dyn Surface, footer: &FooterSpec, page_label: F) -> Result<usize>
where
    F: Fn(usize, usize) -> String,
{
    let total = surface.page_count();
    let previous = surface.current_page();
    let (_, page_height) = surface.page_size();
    let separator_y = page_height - footer.separator_offset;
    let baseline = page_height - footer.text_offset;
    let width = footer.right - footer.left;

    for index in 0..total {
        surface.set_page(index)?;

        if let Some(stroke) = &footer.separator {
            surface.line(footer.left, separator_y, footer.right, separator_y, stroke);
        }

        surface.text(footer.left, baseline, &page_label(index + 1, total), &footer.text);

        if let Some(thanks) = &footer.thank_you {
            let w = surface.measure_text(thanks, &footer.text);
            let x = align_x(footer.left, width, w, Align::Center);
            surface.text(x, baseline, thanks, &footer.text);
        }

        if let Some(stamp) = &footer.timestamp {
            let w = surface.measure_text(stamp, &footer.text);
            let x = align_x(footer.left, width, w, Align::Right);
            surface.text(x, baseline, stamp, &footer.text);
        }
    }

    surface.set_page(previous)?;
    log::debug!("stamped footers on {} pages", total);
    Ok(total)
}
