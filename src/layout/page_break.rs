//! # Page Break Decisions
//!
//! The rules the table flow uses to decide whether the next row goes on the
//! current page. Rows are atomic: they are either placed whole or moved whole.

/// What to do with the next piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Place it on the current page.
    Place,
    /// Start a new page and place it there.
    MoveToNextPage,
}

/// Decide where a row of `height` goes, given the current `y` and the lowest
/// Y content may reach (`limit`).
///
/// `page_is_fresh` means nothing but the repeated header has been drawn on
/// this page yet. A row that doesn't fit on a fresh page will not fit on any
/// page, so it is placed anyway instead of looping on page breaks forever.
pub fn decide_row(y: f64, height: f64, limit: f64, page_is_fresh: bool) -> BreakDecision {
    if y + height <= limit || page_is_fresh {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    }
}

/// Decide whether a table header may start at `y`.
///
/// The header is kept together with the first body row: if both don't fit
/// and we're below the top of the body area, the table starts on a new page.
pub fn decide_table_start(
    y: f64,
    header_height: f64,
    first_row_height: Option<f64>,
    limit: f64,
    top: f64,
) -> BreakDecision {
    let needed = header_height + first_row_height.unwrap_or(0.0);
    if y + needed <= limit || y <= top {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    }
}
