//! # Post-Table Anchoring
//!
//! Blocks drawn after the table (totals, payment terms, signature) are
//! positioned relative to wherever the table ended: same page, top edge at
//! `cursor.y + offset`. Placement itself never paginates. A block that runs
//! past the bottom margin is still drawn where it was anchored; callers that
//! want to avoid that call [`ensure_room`] first.

use super::box_model::{align_x, centered_baseline, Rect};
use super::{next_page, Cursor};
use crate::error::Result;
use crate::model::Edges;
use crate::style::{Align, Stroke, TextStyle};
use crate::surface::Surface;
use crate::text;

/// Something that can be drawn at a given top edge.
pub trait Block {
    /// Vertical space the block occupies, in mm.
    fn height(&self, surface: &dyn Surface) -> f64;

    /// Draw on the surface's current page with the top edge at `top`.
    fn draw(&self, surface: &mut dyn Surface, top: f64);
}

/// Draw `block` on `cursor.page_index` with its top at `cursor.y + offset`.
/// Returns the cursor at the block's bottom edge.
pub fn place_block(
    surface: &mut dyn Surface,
    cursor: Cursor,
    block: &dyn Block,
    offset: f64,
) -> Result<Cursor> {
    surface.set_page(cursor.page_index)?;
    let top = cursor.y + offset;
    let height = block.height(surface);
    block.draw(surface, top);
    Ok(Cursor::new(cursor.page_index, top + height))
}

/// Whether `needed` mm fit between `cursor` and the bottom margin.
pub fn fits_below(cursor: Cursor, needed: f64, page_height: f64, margin: &Edges) -> bool {
    cursor.y + needed <= page_height - margin.bottom
}

/// Move to the top of the next page if `needed` mm don't fit below `cursor`.
pub fn ensure_room(
    surface: &mut dyn Surface,
    cursor: Cursor,
    needed: f64,
    margin: &Edges,
) -> Result<Cursor> {
    let (_, page_height) = surface.page_size();
    if fits_below(cursor, needed, page_height, margin) {
        return Ok(cursor);
    }
    surface.set_page(cursor.page_index)?;
    let page = next_page(surface)?;
    log::debug!("moving block of {:.1}mm to page {}", needed, page + 1);
    Ok(Cursor::new(page, margin.top))
}

/// One label/amount pair in a [`TotalsBlock`].
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsLine {
    pub label: String,
    pub amount: String,
    /// Bold, with a rule above it. Used for the grand total.
    pub emphasis: bool,
}

/// A boxed, right-hand column of labelled amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsBlock {
    pub lines: Vec<TotalsLine>,
    /// X of the block's right edge.
    pub right: f64,
    pub width: f64,
    pub line_height: f64,
    pub padding: f64,
    pub text: TextStyle,
    pub border: Option<Stroke>,
}

impl TotalsBlock {
    pub fn new(right: f64, width: f64) -> Self {
        Self {
            lines: Vec::new(),
            right,
            width,
            line_height: 7.0,
            padding: 2.0,
            text: TextStyle::sized(10.0),
            border: Some(Stroke::default()),
        }
    }

    pub fn line(mut self, label: &str, amount: &str) -> Self {
        self.lines.push(TotalsLine {
            label: label.to_string(),
            amount: amount.to_string(),
            emphasis: false,
        });
        self
    }

    pub fn emphasis(mut self, label: &str, amount: &str) -> Self {
        self.lines.push(TotalsLine {
            label: label.to_string(),
            amount: amount.to_string(),
            emphasis: true,
        });
        self
    }
}

impl Block for TotalsBlock {
    fn height(&self, _surface: &dyn Surface) -> f64 {
        self.lines.len() as f64 * self.line_height
    }

    fn draw(&self, surface: &mut dyn Surface, top: f64) {
        let x = self.right - self.width;
        let rule = self.border.unwrap_or_default();

        for (i, line) in self.lines.iter().enumerate() {
            let row = Rect::new(x, top + i as f64 * self.line_height, self.width, self.line_height);
            let style = if line.emphasis {
                self.text.bold()
            } else {
                self.text
            };
            if line.emphasis && i > 0 {
                surface.line(row.x, row.y, row.right(), row.y, &rule);
            }
            let baseline = centered_baseline(&row, surface.ascent(&style));
            surface.text(row.x + self.padding, baseline, &line.label, &style);
            let amount_width = surface.measure_text(&line.amount, &style);
            let ax = align_x(
                row.x + self.padding,
                row.width - 2.0 * self.padding,
                amount_width,
                Align::Right,
            );
            surface.text(ax, baseline, &line.amount, &style);
        }

        if let Some(border) = &self.border {
            let height = self.lines.len() as f64 * self.line_height;
            surface.rect(x, top, self.width, height, None, Some(border));
        }
    }
}

/// A heading followed by wrapped paragraphs.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub heading: Option<String>,
    pub paragraphs: Vec<String>,
    pub x: f64,
    pub width: f64,
    pub heading_style: TextStyle,
    pub body_style: TextStyle,
    /// Extra space between paragraphs.
    pub paragraph_gap: f64,
}

impl TextBlock {
    pub fn new(x: f64, width: f64) -> Self {
        Self {
            heading: None,
            paragraphs: Vec::new(),
            x,
            width,
            heading_style: TextStyle::sized(10.0).bold(),
            body_style: TextStyle::sized(9.0),
            paragraph_gap: 1.0,
        }
    }

    pub fn heading(mut self, heading: &str) -> Self {
        self.heading = Some(heading.to_string());
        self
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.push(text.to_string());
        self
    }

    /// Every line to draw, with its style and offset from the block top to
    /// the top of its line box.
    fn lines(&self, surface: &dyn Surface) -> (Vec<(String, TextStyle, f64)>, f64) {
        let mut out = Vec::new();
        let mut y = 0.0;
        if let Some(heading) = &self.heading {
            out.push((heading.clone(), self.heading_style, y));
            y += self.heading_style.line_advance();
        }
        for (i, paragraph) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                y += self.paragraph_gap;
            }
            for line in text::wrap(surface.fonts(), paragraph, &self.body_style, self.width) {
                out.push((line, self.body_style, y));
                y += self.body_style.line_advance();
            }
        }
        (out, y)
    }
}

impl Block for TextBlock {
    fn height(&self, surface: &dyn Surface) -> f64 {
        self.lines(surface).1
    }

    fn draw(&self, surface: &mut dyn Surface, top: f64) {
        let (lines, _) = self.lines(surface);
        for (content, style, offset) in lines {
            let baseline = top + offset + surface.ascent(&style);
            surface.text(self.x, baseline, &content, &style);
        }
    }
}

/// Closing lines and a "For <company>" signatory line.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureBlock {
    pub closing: Vec<String>,
    pub signatory: Option<String>,
    pub x: f64,
    /// Baseline-to-baseline distance.
    pub line_gap: f64,
    pub style: TextStyle,
}

impl SignatureBlock {
    pub fn new(x: f64) -> Self {
        Self {
            closing: vec!["Thanking You,".to_string(), "Yours Faithfully,".to_string()],
            signatory: None,
            x,
            line_gap: 4.0,
            style: TextStyle::sized(10.0),
        }
    }

    pub fn signatory(mut self, name: &str) -> Self {
        self.signatory = Some(name.to_string());
        self
    }

    fn line_count(&self) -> usize {
        self.closing.len() + usize::from(self.signatory.is_some())
    }
}

impl Block for SignatureBlock {
    fn height(&self, surface: &dyn Surface) -> f64 {
        match self.line_count() {
            0 => 0.0,
            n => (n - 1) as f64 * self.line_gap + self.style.size_mm().max(surface.ascent(&self.style)),
        }
    }

    fn draw(&self, surface: &mut dyn Surface, top: f64) {
        let mut baseline = top + surface.ascent(&self.style);
        for line in &self.closing {
            surface.text(self.x, baseline, line, &self.style);
            baseline += self.line_gap;
        }
        if let Some(name) = &self.signatory {
            let prefix = "For ";
            surface.text(self.x, baseline, prefix, &self.style);
            let name_x = self.x + surface.measure_text(prefix, &self.style);
            surface.text(name_x, baseline, name, &self.style.bold());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSize;
    use crate::surface::{DrawCommand, PageSurface};

    fn surface_with_pages(n: usize) -> PageSurface {
        let mut surface = PageSurface::new(PageSize::A4);
        for _ in 1..n {
            surface.add_page();
        }
        surface
    }

    fn text_y(surface: &PageSurface, page: usize, needle: &str) -> f64 {
        match surface.pages()[page].find_text(needle) {
            Some(DrawCommand::Text { y, .. }) => *y,
            other => panic!("{:?} not found on page {}: {:?}", needle, page, other),
        }
    }

    #[test]
    fn block_is_anchored_below_cursor_on_cursor_page() {
        let mut surface = surface_with_pages(3);
        let block = TotalsBlock::new(200.0, 70.0).emphasis("Grand Total", "28,000.00");
        let end = place_block(&mut surface, Cursor::new(2, 150.0), &block, 15.0).unwrap();

        assert_eq!(end, Cursor::new(2, 165.0 + 7.0));
        assert!(!surface.pages()[0].contains_text("Grand Total"));
        let y = text_y(&surface, 2, "Grand Total");
        assert!(y > 165.0 && y < 172.0);
        let border_top = surface.pages()[2].elements.iter().find_map(|el| match el {
            DrawCommand::Rect { y, stroke: Some(_), .. } => Some(*y),
            _ => None,
        });
        assert_eq!(border_top, Some(165.0));
    }

    #[test]
    fn placement_does_not_paginate() {
        let mut surface = surface_with_pages(1);
        let block = TextBlock::new(13.0, 180.0)
            .heading("Payment Terms")
            .paragraph("Net 30 days");
        let end = place_block(&mut surface, Cursor::new(0, 290.0), &block, 5.0).unwrap();
        assert_eq!(surface.page_count(), 1);
        assert_eq!(end.page_index, 0);
        assert!(end.y > 297.0);
        assert!(surface.pages()[0].contains_text("Net 30 days"));
    }

    #[test]
    fn place_block_rejects_missing_page() {
        let mut surface = surface_with_pages(1);
        let block = SignatureBlock::new(13.0);
        assert!(place_block(&mut surface, Cursor::new(4, 10.0), &block, 0.0).is_err());
    }

    #[test]
    fn ensure_room_keeps_cursor_when_it_fits() {
        let mut surface = surface_with_pages(1);
        let margin = Edges::new(18.0, 10.0, 20.0, 13.0);
        let cursor = Cursor::new(0, 200.0);
        assert_eq!(ensure_room(&mut surface, cursor, 30.0, &margin).unwrap(), cursor);
        assert_eq!(surface.page_count(), 1);
    }

    #[test]
    fn footer_band_does_not_count_as_room() {
        let margin = Edges::new(18.0, 10.0, 20.0, 13.0);
        // Bottom margin starts at 277 on A4; the page edge is 297.
        assert!(fits_below(Cursor::new(0, 270.0), 7.0, 297.0, &margin));
        assert!(!fits_below(Cursor::new(0, 271.0), 7.0, 297.0, &margin));
        assert!(!fits_below(Cursor::new(0, 280.0), 10.0, 297.0, &margin));
    }

    #[test]
    fn ensure_room_moves_to_next_page() {
        let mut surface = surface_with_pages(1);
        let margin = Edges::new(18.0, 10.0, 20.0, 13.0);
        let moved = ensure_room(&mut surface, Cursor::new(0, 260.0), 30.0, &margin).unwrap();
        assert_eq!(moved, Cursor::new(1, 18.0));
        assert_eq!(surface.page_count(), 2);
    }

    #[test]
    fn totals_amounts_are_right_aligned() {
        let mut surface = surface_with_pages(1);
        let block = TotalsBlock::new(200.0, 70.0)
            .line("Sub Total", "28,000.00")
            .line("GST 18%", "5,040.00")
            .emphasis("Grand Total", "33,040.00");
        let end = place_block(&mut surface, Cursor::new(0, 100.0), &block, 5.0).unwrap();
        assert_eq!(end.y, 105.0 + 21.0);

        for amount in ["28,000.00", "5,040.00", "33,040.00"] {
            let (x, style) = match surface.pages()[0].find_text(amount) {
                Some(DrawCommand::Text { x, style, .. }) => (*x, *style),
                other => panic!("missing {}: {:?}", amount, other),
            };
            let right = x + surface.measure_text(amount, &style);
            assert!((right - 198.0).abs() < 1e-9, "{} ends at {}", amount, right);
        }
        // One rule above the grand total.
        let rules = surface.pages()[0]
            .elements
            .iter()
            .filter(|el| matches!(el, DrawCommand::Line { .. }))
            .count();
        assert_eq!(rules, 1);
    }

    #[test]
    fn text_block_wraps_paragraphs() {
        let surface = surface_with_pages(1);
        let short = TextBlock::new(13.0, 60.0).paragraph("Net 30 days");
        let long = TextBlock::new(13.0, 60.0).paragraph(
            "Payment within thirty days of the invoice date by bank transfer to the account below",
        );
        assert!(long.height(&surface) > short.height(&surface));
    }

    #[test]
    fn signature_lines_are_spaced() {
        let mut surface = surface_with_pages(1);
        let block = SignatureBlock::new(13.0).signatory("Aalam Info Solutions LLP");
        place_block(&mut surface, Cursor::new(0, 120.0), &block, 10.0).unwrap();

        let first = text_y(&surface, 0, "Thanking You,");
        let second = text_y(&surface, 0, "Yours Faithfully,");
        let last = text_y(&surface, 0, "For ");
        assert!((second - first - 4.0).abs() < 1e-9);
        assert!((last - second - 4.0).abs() < 1e-9);
        match surface.pages()[0].find_text("Aalam Info Solutions LLP") {
            Some(DrawCommand::Text { x, style, .. }) => {
                assert!(*x > 13.0);
                assert_eq!(style.weight, crate::style::FontWeight::Bold);
            }
            other => panic!("signatory missing: {:?}", other),
        }
    }
}
