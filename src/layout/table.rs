//! # Table Flow
//!
//! Paginates a header row plus an arbitrary number of body rows down the
//! page. When a row doesn't fit above the bottom margin, drawing moves to the
//! next page, the header is redrawn at the top, and flow continues. Rows are
//! never split across pages.
//!
//! Zebra striping is keyed by each row's ordinal in the whole table, so the
//! alternation carries across page breaks instead of restarting per page.

use serde::{Deserialize, Serialize};

use super::box_model::{align_x, centered_baseline, column_offsets, partition_columns};
use super::box_model::{ColumnSpec, Rect};
use super::page_break::{decide_row, decide_table_start, BreakDecision};
use super::{next_page, Cursor, TableRenderResult};
use crate::error::{DocketError, Result};
use crate::model::Edges;
use crate::style::{Color, Stroke, TextStyle};
use crate::surface::Surface;
use crate::text;

/// How a cell handles text wider than its column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellOverflow {
    /// One line, shortened with an ellipsis.
    #[default]
    Clip,
    /// Wrapped onto several lines; the row grows to fit.
    Wrap,
}

/// Visual and geometric parameters for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableStyle {
    pub header_fill: Option<Color>,
    pub header_text: TextStyle,
    pub body_text: TextStyle,
    /// Background of even-ordinal rows (0, 2, 4, ...).
    pub body_fill: Option<Color>,
    /// Background of odd-ordinal rows.
    pub stripe_fill: Option<Color>,
    pub row_height: f64,
    pub header_height: f64,
    /// Inner padding of every cell.
    pub padding: Edges,
    /// Cell outlines. `None` draws no grid.
    pub grid: Option<Stroke>,
    pub overflow: CellOverflow,
    /// Page margins. Left/right bound the table width, top is where the flow
    /// resumes after a page break, bottom is the lowest a row may reach.
    ///
    /// Not part of the serialized style: configs set margins once, through
    /// `PageGeometry::margin`, and the composer copies them in here.
    #[serde(skip)]
    pub margin: Edges,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_fill: Some(Color::rgb8(240, 240, 240)),
            header_text: TextStyle::sized(10.0).bold(),
            body_text: TextStyle::sized(10.0),
            body_fill: None,
            stripe_fill: Some(Color::rgb8(245, 245, 245)),
            row_height: 7.0,
            header_height: 8.0,
            padding: Edges::new(1.0, 2.0, 1.0, 2.0),
            grid: Some(Stroke::default()),
            overflow: CellOverflow::Clip,
            margin: Edges::new(18.0, 10.0, 20.0, 13.0),
        }
    }
}

/// Check every row has exactly one cell per column.
pub fn validate_shape(header: &[String], rows: &[Vec<String>], columns: &[ColumnSpec]) -> Result<()> {
    let expected = columns.len();
    if header.len() != expected {
        return Err(DocketError::ShapeMismatch {
            context: "table header".to_string(),
            expected,
            found: header.len(),
        });
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(DocketError::ShapeMismatch {
                context: format!("table row {}", i + 1),
                expected,
                found: row.len(),
            });
        }
    }
    Ok(())
}

/// Resolved column geometry shared by every row.
struct Columns<'a> {
    specs: &'a [ColumnSpec],
    widths: Vec<f64>,
    offsets: Vec<f64>,
}

/// Draw `header` and `rows` starting at `start`, paginating as needed.
///
/// Drawing continues on existing later pages if there are any, otherwise
/// pages are appended. The shape is validated before anything is drawn.
pub fn render_table(
    surface: &mut dyn Surface,
    header: &[String],
    rows: &[Vec<String>],
    columns: &[ColumnSpec],
    style: &TableStyle,
    start: Cursor,
) -> Result<TableRenderResult> {
    validate_shape(header, rows, columns)?;
    surface.set_page(start.page_index)?;

    let (page_width, page_height) = surface.page_size();
    let limit = page_height - style.margin.bottom;
    let widths = partition_columns(columns, page_width - style.margin.horizontal());
    let cols = Columns {
        specs: columns,
        offsets: column_offsets(style.margin.left, &widths),
        widths,
    };

    let mut y = start.y;
    let mut pages_added = 0;

    let first_row_height = rows.first().map(|row| row_height(surface, row, &cols, style));
    if decide_table_start(y, style.header_height, first_row_height, limit, style.margin.top)
        == BreakDecision::MoveToNextPage
    {
        let page = next_page(surface)?;
        log::debug!("table header kept with first row, starting on page {}", page + 1);
        pages_added += 1;
        y = style.margin.top;
    }

    let mut fresh_page = y <= style.margin.top;
    draw_header(surface, header, &cols, style, y);
    y += style.header_height;

    for (ordinal, row) in rows.iter().enumerate() {
        let height = row_height(surface, row, &cols, style);

        if decide_row(y, height, limit, fresh_page) == BreakDecision::MoveToNextPage {
            let page = next_page(surface)?;
            log::debug!("table row {} moves to page {}", ordinal + 1, page + 1);
            pages_added += 1;
            y = style.margin.top;
            draw_header(surface, header, &cols, style, y);
            y += style.header_height;
            fresh_page = true;
        } else if fresh_page && y + height > limit {
            log::debug!(
                "table row {} is taller than a page ({:.1}mm), drawing it anyway",
                ordinal + 1,
                height
            );
        }

        let fill = if ordinal % 2 == 1 {
            style.stripe_fill
        } else {
            style.body_fill
        };
        draw_body_row(surface, row, &cols, style, y, height, fill);
        y += height;
        fresh_page = false;
    }

    Ok(TableRenderResult {
        final_cursor: Cursor::new(surface.current_page(), y),
        pages_added,
        rows_drawn: rows.len(),
    })
}

/// Height of one body row. Fixed unless wrapping needs more lines.
fn row_height(surface: &dyn Surface, row: &[String], cols: &Columns, style: &TableStyle) -> f64 {
    if style.overflow == CellOverflow::Clip {
        return style.row_height;
    }
    let line_count = row
        .iter()
        .zip(&cols.widths)
        .map(|(cell, width)| {
            let inner = (width - style.padding.horizontal()).max(0.0);
            text::wrap(surface.fonts(), cell, &style.body_text, inner).len()
        })
        .max()
        .unwrap_or(1);
    let needed = line_count as f64 * style.body_text.line_advance() + style.padding.vertical();
    needed.max(style.row_height)
}

fn draw_header(
    surface: &mut dyn Surface,
    labels: &[String],
    cols: &Columns,
    style: &TableStyle,
    y: f64,
) {
    let total_width: f64 = cols.widths.iter().sum();
    let x = cols.offsets.first().copied().unwrap_or(style.margin.left);
    surface.rect(x, y, total_width, style.header_height, style.header_fill, None);

    for (i, label) in labels.iter().enumerate() {
        let cell = Rect::new(cols.offsets[i], y, cols.widths[i], style.header_height);
        draw_grid(surface, &cell, style);
        let inner = cell.inset(&style.padding);
        let content = text::clip(surface.fonts(), label, &style.header_text, inner.width);
        let baseline = centered_baseline(&inner, surface.ascent(&style.header_text));
        let width = surface.measure_text(&content, &style.header_text);
        let tx = align_x(inner.x, inner.width, width, cols.specs[i].align);
        surface.text(tx, baseline, &content, &style.header_text);
    }
}

fn draw_body_row(
    surface: &mut dyn Surface,
    cells: &[String],
    cols: &Columns,
    style: &TableStyle,
    y: f64,
    height: f64,
    fill: Option<Color>,
) {
    let total_width: f64 = cols.widths.iter().sum();
    let x = cols.offsets.first().copied().unwrap_or(style.margin.left);
    surface.rect(x, y, total_width, height, fill, None);

    let ascent = surface.ascent(&style.body_text);
    for (i, value) in cells.iter().enumerate() {
        let cell = Rect::new(cols.offsets[i], y, cols.widths[i], height);
        draw_grid(surface, &cell, style);
        let inner = cell.inset(&style.padding);
        let align = cols.specs[i].align;

        match style.overflow {
            CellOverflow::Clip => {
                let content = text::clip(surface.fonts(), value, &style.body_text, inner.width);
                let width = surface.measure_text(&content, &style.body_text);
                let tx = align_x(inner.x, inner.width, width, align);
                surface.text(tx, centered_baseline(&inner, ascent), &content, &style.body_text);
            }
            CellOverflow::Wrap => {
                let lines = text::wrap(surface.fonts(), value, &style.body_text, inner.width);
                let advance = style.body_text.line_advance();
                let block = Rect::new(inner.x, inner.y, inner.width, style.row_height - style.padding.vertical());
                let mut baseline = if lines.len() == 1 {
                    centered_baseline(&block, ascent)
                } else {
                    inner.y + ascent
                };
                for line in &lines {
                    let width = surface.measure_text(line, &style.body_text);
                    let tx = align_x(inner.x, inner.width, width, align);
                    surface.text(tx, baseline, line, &style.body_text);
                    baseline += advance;
                }
            }
        }
    }
}

fn draw_grid(surface: &mut dyn Surface, cell: &Rect, style: &TableStyle) {
    if let Some(stroke) = &style.grid {
        surface.rect(cell.x, cell.y, cell.width, cell.height, None, Some(stroke));
    }
}
