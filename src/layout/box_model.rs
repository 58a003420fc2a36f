//! # Box Model
//!
//! Pure geometry: column partitioning, padding, and placing a line of text
//! inside a rectangle. Nothing here touches a surface except to measure.

use serde::{Deserialize, Serialize};

use crate::model::Edges;
use crate::style::Align;

/// A rectangle in page coordinates (mm, top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Shrink by `padding` on every side. Never produces negative sizes.
    pub fn inset(&self, padding: &Edges) -> Rect {
        Rect {
            x: self.x + padding.left,
            y: self.y + padding.top,
            width: (self.width - padding.horizontal()).max(0.0),
            height: (self.height - padding.vertical()).max(0.0),
        }
    }
}

/// Width and alignment of one table column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Width in mm. `0` shares whatever width the fixed columns leave.
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub align: Align,
}

impl ColumnSpec {
    pub fn new(width: f64, align: Align) -> Self {
        Self { width, align }
    }

    pub fn left(width: f64) -> Self {
        Self::new(width, Align::Left)
    }

    pub fn right(width: f64) -> Self {
        Self::new(width, Align::Right)
    }

    pub fn center(width: f64) -> Self {
        Self::new(width, Align::Center)
    }
}

/// Resolve column widths so they sum to at most `available`.
///
/// Zero-width ("auto") columns share the leftover space equally. If the fixed
/// widths alone overflow, every column shrinks in proportion to its width.
pub fn partition_columns(specs: &[ColumnSpec], available: f64) -> Vec<f64> {
    let mut widths: Vec<(f64, f64)> = specs
        .iter()
        .map(|s| {
            let w = s.width.max(0.0);
            (w, if w == 0.0 { 1.0 } else { 0.0 })
        })
        .collect();

    let fixed: f64 = widths.iter().map(|(w, _)| w).sum();
    let remaining = available - fixed;
    if remaining >= 0.0 {
        distribute_grow(&mut widths, remaining);
    } else {
        let mut shrinkable: Vec<(f64, f64)> = widths.iter().map(|(w, _)| (*w, 1.0)).collect();
        distribute_shrink(&mut shrinkable, remaining);
        widths = shrinkable;
    }
    widths.into_iter().map(|(w, _)| w).collect()
}

/// Left edges of consecutive columns starting at `x`.
pub fn column_offsets(x: f64, widths: &[f64]) -> Vec<f64> {
    widths
        .iter()
        .scan(x, |edge, w| {
            let left = *edge;
            *edge += w;
            Some(left)
        })
        .collect()
}

/// Distribute remaining space among items based on grow factors.
fn distribute_grow(items: &mut [(f64, f64)], remaining: f64) {
    // items: [(current_width, grow)]
    let total_grow: f64 = items.iter().map(|(_, g)| g).sum();
    if total_grow <= 0.0 || remaining <= 0.0 {
        return;
    }
    for (width, grow) in items.iter_mut() {
        *width += remaining * (*grow / total_grow);
    }
}

/// Shrink items to fit, weighted by width times shrink factor.
fn distribute_shrink(items: &mut [(f64, f64)], overflow: f64) {
    // items: [(current_width, shrink)]
    let total_shrink_weighted: f64 = items.iter().map(|(w, s)| w * s).sum();
    if total_shrink_weighted <= 0.0 || overflow >= 0.0 {
        return;
    }
    let overflow = overflow.abs();
    for (width, shrink) in items.iter_mut() {
        let factor = (*width * *shrink) / total_shrink_weighted;
        *width -= overflow * factor;
        *width = width.max(0.0);
    }
}

/// X coordinate for a run of `text_width` aligned inside `[x, x + width]`.
pub fn align_x(x: f64, width: f64, text_width: f64, align: Align) -> f64 {
    match align {
        Align::Left => x,
        Align::Center => x + (width - text_width) / 2.0,
        Align::Right => x + width - text_width,
    }
}

/// Baseline that vertically centres one line of text in `rect`.
///
/// `ascent` is the font's ascent in mm; the visual line is treated as
/// extending from the baseline up by the ascent.
pub fn centered_baseline(rect: &Rect, ascent: f64) -> f64 {
    rect.y + (rect.height + ascent) / 2.0
}
