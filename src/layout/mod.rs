//! # Layout Engine
//!
//! Everything that decides *where* things go on the page. The engine is
//! page-native: content is placed on a fixed-size page and, when the next
//! row doesn't fit, the engine moves to the following page and keeps going.
//!
//! The only mutable layout state threaded between components is a
//! [`Cursor`]: the table flow returns one, the anchor resolver consumes it
//! to place blocks below the table, and the footer stamper runs last, once
//! the page count is final.

pub mod anchor;
pub mod box_model;
pub mod footer;
pub mod page_break;
pub mod table;

use crate::error::Result;
use crate::surface::Surface;

/// A position in the document: which page, and how far down it (mm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page_index: usize,
    pub y: f64,
}

impl Cursor {
    pub fn new(page_index: usize, y: f64) -> Self {
        Self { page_index, y }
    }
}

/// What the table flow reports back once every row is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRenderResult {
    /// Page and Y just below the last drawn row (or the header if no rows).
    pub final_cursor: Cursor,
    /// Page breaks the table took.
    pub pages_added: usize,
    pub rows_drawn: usize,
}

/// Move drawing to the page after the current one, appending a page if the
/// current page is the last. Returns the new page index.
pub fn next_page(surface: &mut dyn Surface) -> Result<usize> {
    let next = surface.current_page() + 1;
    if next < surface.page_count() {
        surface.set_page(next)?;
        Ok(next)
    } else {
        Ok(surface.add_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSize;
    use crate::surface::PageSurface;

    #[test]
    fn next_page_appends_at_end() {
        let mut surface = PageSurface::new(PageSize::A4);
        assert_eq!(next_page(&mut surface).unwrap(), 1);
        assert_eq!(surface.page_count(), 2);
    }

    #[test]
    fn next_page_reuses_existing_page() {
        let mut surface = PageSurface::new(PageSize::A4);
        surface.add_page();
        surface.set_page(0).unwrap();
        assert_eq!(next_page(&mut surface).unwrap(), 1);
        assert_eq!(surface.page_count(), 2);
        assert_eq!(surface.current_page(), 1);
    }
}
