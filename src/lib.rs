//! # Docket
//!
//! A page-native layout engine for RFQ and invoice PDFs.
//!
//! Business documents have a fixed shape: a header, some party boxes, an
//! item table of unknown length and a totals block that has to land right
//! after the last row. Docket treats the page as the unit of layout. The
//! table flows *into* pages with its header repeated on each one, and the
//! blocks that follow anchor to wherever the table actually ended.
//!
//! ## Architecture
//!
//! ```text
//! Records + config (JSON/API)
//!       ↓
//!   [model]    Record group, lenient line items, totals
//!       ↓
//!   [compose]  Fixed header regions, presets, amount formatting
//!       ↓
//!   [layout]   Paginated table, anchored blocks, footers
//!       ↓
//!   [surface]  Multi-page drawing commands
//!       ↓
//!   [pdf]      Serialize to PDF bytes
//! ```

pub mod compose;
pub mod error;
pub mod font;
pub mod format;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod surface;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use chrono::NaiveDateTime;

use compose::{ComposerConfig, DocumentComposer, GeneratedDocument};
use error::Result;
use model::RecordGroup;

/// Generate a document from records using the current local time.
///
/// This is the primary entry point.
pub fn generate(records: &RecordGroup, config: &ComposerConfig) -> Result<GeneratedDocument> {
    DocumentComposer::new(config.clone()).generate(records)
}

/// Generate a document as if the current time were `now`.
pub fn generate_at(
    records: &RecordGroup,
    config: &ComposerConfig,
    now: NaiveDateTime,
) -> Result<GeneratedDocument> {
    DocumentComposer::new(config.clone()).generate_at(records, now)
}

/// Generate from JSON records and an optional JSON config overlay.
pub fn generate_json(records_json: &str, config_json: Option<&str>) -> Result<GeneratedDocument> {
    let records: RecordGroup = serde_json::from_str(records_json)?;
    let config = match config_json {
        Some(json) => ComposerConfig::from_json(json)?,
        None => ComposerConfig::default(),
    };
    generate(&records, &config)
}
