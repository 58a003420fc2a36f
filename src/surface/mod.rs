//! # Drawing Surface
//!
//! The abstract canvas every layout component draws on. A surface owns an
//! ordered list of fixed-size pages and a current-page pointer; all drawing
//! happens at absolute coordinates on the current page.
//!
//! Coordinates are millimetres with the origin at the top-left corner of the
//! page and Y growing downward. Text is positioned by its baseline. The PDF
//! serializer flips into PDF user space at the very end.
//!
//! `PageSurface` is the in-memory implementation: it records draw commands
//! per page so they can be inspected (tests, debugging) and serialized.

use std::sync::Arc;

use crate::error::{DocketError, Result};
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::model::PageSize;
use crate::style::{Color, Stroke, TextStyle};

/// Absolute-positioning canvas with page management.
pub trait Surface {
    /// Physical page dimensions (width, height) in mm. Constant per document.
    fn page_size(&self) -> (f64, f64);

    fn page_count(&self) -> usize;

    /// Zero-based index of the page drawing currently goes to.
    fn current_page(&self) -> usize;

    /// Append a blank page and make it current. Returns its index.
    fn add_page(&mut self) -> usize;

    /// Make an existing page current.
    fn set_page(&mut self, index: usize) -> Result<()>;

    /// Place a single line of text with its baseline at `y`.
    fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle);

    fn image(&mut self, x: f64, y: f64, width: f64, height: f64, image: Arc<LoadedImage>);

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &Stroke);

    /// Draw a rectangle, filled and/or outlined.
    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<&Stroke>,
    );

    /// Width of `content` in mm when drawn with `style`.
    fn measure_text(&self, content: &str, style: &TextStyle) -> f64;

    /// Distance from the top of a line box to its baseline, in mm.
    fn ascent(&self, style: &TextStyle) -> f64;

    /// The font context used for measurement.
    fn fonts(&self) -> &FontContext;
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        x: f64,
        y: f64,
        content: String,
        style: TextStyle,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Stroke,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: Arc<LoadedImage>,
    },
}

/// A page of recorded draw commands, in paint order.
#[derive(Debug, Clone, Default)]
pub struct SurfacePage {
    pub elements: Vec<DrawCommand>,
}

impl SurfacePage {
    /// All text strings on this page, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|el| match el {
            DrawCommand::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// The first text command whose content equals `needle`.
    pub fn find_text(&self, needle: &str) -> Option<&DrawCommand> {
        self.elements
            .iter()
            .find(|el| matches!(el, DrawCommand::Text { content, .. } if content == needle))
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.find_text(needle).is_some()
    }
}

/// In-memory surface backed by a page list.
#[derive(Debug, Clone)]
pub struct PageSurface {
    width: f64,
    height: f64,
    pages: Vec<SurfacePage>,
    current: usize,
    fonts: FontContext,
}

impl PageSurface {
    /// A surface with one blank page.
    pub fn new(size: PageSize) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            pages: vec![SurfacePage::default()],
            current: 0,
            fonts: FontContext::new(),
        }
    }

    pub fn pages(&self) -> &[SurfacePage] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&SurfacePage> {
        self.pages.get(index)
    }

    fn push(&mut self, command: DrawCommand) {
        self.pages[self.current].elements.push(command);
    }
}

impl Surface for PageSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn add_page(&mut self) -> usize {
        self.pages.push(SurfacePage::default());
        self.current = self.pages.len() - 1;
        self.current
    }

    fn set_page(&mut self, index: usize) -> Result<()> {
        if index >= self.pages.len() {
            return Err(DocketError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        if content.is_empty() {
            return;
        }
        self.push(DrawCommand::Text {
            x,
            y,
            content: content.to_string(),
            style: *style,
        });
    }

    fn image(&mut self, x: f64, y: f64, width: f64, height: f64, image: Arc<LoadedImage>) {
        self.push(DrawCommand::Image {
            x,
            y,
            width,
            height,
            image,
        });
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &Stroke) {
        self.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            stroke: *stroke,
        });
    }

    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<&Stroke>,
    ) {
        if fill.is_none() && stroke.is_none() {
            return;
        }
        self.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke: stroke.copied(),
        });
    }

    fn measure_text(&self, content: &str, style: &TextStyle) -> f64 {
        self.fonts.measure(content, style)
    }

    fn ascent(&self, style: &TextStyle) -> f64 {
        self.fonts.ascent(style)
    }

    fn fonts(&self) -> &FontContext {
        &self.fonts
    }
}
