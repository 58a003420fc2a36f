//! Structured error types for the docket layout engine.
//!
//! Only one variant aborts a generation call in practice: `ShapeMismatch`.
//! `ResourceUnavailable` is produced by the image loader and recovered by the
//! composer with a placeholder; it never escapes `generate`.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DocketError>;

/// The unified error type returned by all public docket API functions.
#[derive(Debug, Error)]
pub enum DocketError {
    /// Column specs, header labels and row cells disagree on cardinality.
    #[error("Shape mismatch in {context}: expected {expected} cells, found {found}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// An optional visual asset (the logo) could not be loaded.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// A page index outside the surface's page list was selected.
    #[error("Page {index} is out of range (surface has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// JSON input or configuration failed to parse.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// PDF serialization failed.
    #[error("Render error: {0}")]
    Render(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for DocketError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the record schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        DocketError::Parse { source: e, hint }
    }
}
