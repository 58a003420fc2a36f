//! Integration tests for the docket generation pipeline.
//!
//! These tests exercise the full path from records to PDF output.
//! They verify:
//! - JSON records and configs deserialize, with lenient line items
//! - The item table paginates and repeats its header
//! - Totals anchor to wherever the table ended
//! - Every page carries a correct "Page i of N" footer
//! - PDF output is structurally valid and deterministic

use std::io::Cursor as IoCursor;

use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime};

use docket::compose::{ComposerConfig, DocumentComposer};
use docket::error::DocketError;
use docket::model::*;
use docket::surface::{DrawCommand, PageSurface, Surface};

// ─── Helpers ────────────────────────────────────────────────────

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(18, 39, 0)
        .unwrap()
}

fn sample_records(items: Vec<LineItem>) -> RecordGroup {
    RecordGroup {
        meta: DocumentMeta {
            number: "RFQ20240092".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 8),
            reference: None,
        },
        company: Some(PartyInfo {
            address_lines: vec!["Head Office".to_string(), "CHENNAI".to_string()],
            contact_person: Some("Nithish Kumar CP".to_string()),
            ..PartyInfo::new("Aalam Info Solutions LLP")
        }),
        vendor: Some(PartyInfo {
            address_lines: vec!["14/203, Kallakulam, Seenapuram".to_string()],
            postal_code: Some("638057".to_string()),
            ..PartyInfo::new("Velavan B")
        }),
        customer: None,
        line_items: items,
    }
}

fn two_items() -> Vec<LineItem> {
    vec![
        LineItem::new("Water Tanks", 15.0, 1200.0).with_uom("Liters"),
        LineItem::new("Bookshelves", 2.0, 5000.0).with_uom("Units"),
    ]
}

fn numbered_items(n: usize) -> Vec<LineItem> {
    (1..=n)
        .map(|i| LineItem::new(&format!("Item {}", i), 2.0, 10.0))
        .collect()
}

fn compose(records: &RecordGroup, config: ComposerConfig) -> PageSurface {
    DocumentComposer::new(config).compose(records, now()).unwrap()
}

fn text_y(surface: &PageSurface, page: usize, needle: &str) -> Option<f64> {
    match surface.pages()[page].find_text(needle) {
        Some(DrawCommand::Text { y, .. }) => Some(*y),
        _ => None,
    }
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn count(bytes: &[u8], needle: &[u8]) -> usize {
    bytes.windows(needle.len()).filter(|w| *w == needle).count()
}

// ─── End-to-End ─────────────────────────────────────────────────

#[test]
fn test_two_item_rfq_fits_one_page() {
    let doc = docket::generate_at(
        &sample_records(two_items()),
        &ComposerConfig::rfq(),
        now(),
    )
    .unwrap();
    assert_valid_pdf(&doc.bytes);
    assert_eq!(doc.page_count, 1);
    assert_eq!(count(&doc.bytes, b"/Type /Page "), 1);

    let surface = compose(&sample_records(two_items()), ComposerConfig::rfq());
    let page = &surface.pages()[0];
    assert!(page.contains_text("18,000.00"));
    assert!(page.contains_text("10,000.00"));
    assert!(page.contains_text("28,000.00"));
    assert!(page.contains_text("Feb 01, 2024"));
    assert!(page.contains_text("Page 1 of 1"));
}

#[test]
fn test_generation_is_deterministic() {
    let records = sample_records(numbered_items(40));
    let a = docket::generate_at(&records, &ComposerConfig::invoice(), now()).unwrap();
    let b = docket::generate_at(&records, &ComposerConfig::invoice(), now()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_empty_item_list_still_renders() {
    let surface = compose(&sample_records(vec![]), ComposerConfig::rfq());
    assert_eq!(surface.page_count(), 1);
    let page = &surface.pages()[0];
    assert!(page.contains_text("Item Name"));
    assert!(page.contains_text("0.00"));
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_two_hundred_items_span_many_pages() {
    let mut config = ComposerConfig::rfq();
    config.table_style.row_height = 16.0;
    let surface = compose(&sample_records(numbered_items(200)), config);

    // 11 rows fit under the letter, then 15 per page.
    let n = surface.page_count();
    assert!(n >= 14, "expected at least 14 pages, got {}", n);

    for (i, page) in surface.pages().iter().enumerate() {
        assert_eq!(
            page.texts().filter(|t| *t == "Item Name").count(),
            1,
            "table header missing on page {}",
            i + 1
        );
        assert!(page.contains_text(&format!("Page {} of {}", i + 1, n)));
        let has_totals = page.contains_text("Grand Total");
        assert_eq!(has_totals, i == n - 1, "totals on page {}", i + 1);
    }

    // Every item appears exactly once across the document.
    for i in [1, 11, 12, 100, 200] {
        let name = format!("Item {}", i);
        let hits: usize = surface
            .pages()
            .iter()
            .map(|p| p.texts().filter(|t| *t == name).count())
            .sum();
        assert_eq!(hits, 1, "{}", name);
    }
}

#[test]
fn test_rows_never_cross_the_bottom_margin() {
    let surface = compose(&sample_records(numbered_items(120)), ComposerConfig::rfq());
    for page in surface.pages() {
        for el in &page.elements {
            if let DrawCommand::Rect { y, height, .. } = el {
                if *height == 7.0 {
                    assert!(y + height <= 277.0 + 1e-9, "row at {}", y);
                }
            }
        }
    }
}

#[test]
fn test_continuation_pages_start_at_top_margin() {
    let surface = compose(&sample_records(numbered_items(30)), ComposerConfig::rfq());
    assert_eq!(surface.page_count(), 2);
    // Items 26.. land on page 2 below a repeated header at y=18.
    let header = surface.pages()[1].elements.iter().find_map(|el| match el {
        DrawCommand::Rect { y, height, fill: Some(_), .. } if *height == 8.0 => Some(*y),
        _ => None,
    });
    assert_eq!(header, Some(18.0));
    assert!(surface.pages()[1].contains_text("Item 26"));
    assert!(!surface.pages()[0].contains_text("Item 26"));
}

#[test]
fn test_totals_follow_the_table_on_the_last_page() {
    let surface = compose(&sample_records(numbered_items(30)), ComposerConfig::rfq());
    // Page 2 holds 5 rows: 18 + 8 + 5 * 7 = 61, totals start 5 below.
    let y = text_y(&surface, 1, "Grand Total").expect("grand total on page 2");
    assert!(y > 66.0 && y < 73.0, "grand total baseline {}", y);
    assert!(text_y(&surface, 1, "Thanking You,").unwrap() > y);
}

#[test]
fn test_invoice_starts_table_higher() {
    let surface = compose(&sample_records(numbered_items(27)), ComposerConfig::invoice());
    // 76 + 8 + 27 * 7 = 273 fits; the same items overflow an RFQ.
    let invoice_pages = surface.page_count();
    let rfq_pages = compose(&sample_records(numbered_items(27)), ComposerConfig::rfq()).page_count();
    assert_eq!(rfq_pages, 2);
    assert!(surface.pages()[0].contains_text("Item 27"));
    assert_eq!(invoice_pages, 1);
}

#[test]
fn test_margins_come_from_page_geometry() {
    fn continuation_header_y(surface: &PageSurface) -> Option<f64> {
        surface.pages()[1].elements.iter().find_map(|el| match el {
            DrawCommand::Rect { y, height, fill: Some(_), .. } if *height == 8.0 => Some(*y),
            _ => None,
        })
    }

    // A margin under tableStyle is not a config field and is ignored.
    let config = ComposerConfig::from_json(r#"{"tableStyle": {"margin": {"top": 60}}}"#).unwrap();
    assert_eq!(config.table_style.margin, ComposerConfig::rfq().table_style.margin);
    let surface = compose(&sample_records(numbered_items(30)), config);
    assert_eq!(continuation_header_y(&surface), Some(18.0));

    let config = ComposerConfig::from_json(r#"{"geometry": {"margin": {"top": 60}}}"#).unwrap();
    assert_eq!(config.geometry.margin.bottom, 20.0);
    let surface = compose(&sample_records(numbered_items(30)), config);
    assert_eq!(surface.page_count(), 2);
    assert_eq!(continuation_header_y(&surface), Some(60.0));
    assert!(surface.pages()[1].contains_text("Item 26"));
}

// ─── Failures and Fallbacks ─────────────────────────────────────

#[test]
fn test_unreadable_logo_uses_placeholder() {
    let mut config = ComposerConfig::rfq();
    config.logo = Some("data:image/png;base64,bm90IGFuIGltYWdl".to_string());
    let doc = DocumentComposer::new(config.clone())
        .generate_at(&sample_records(two_items()), now())
        .unwrap();
    assert_valid_pdf(&doc.bytes);

    let surface = compose(&sample_records(two_items()), config);
    let page = &surface.pages()[0];
    assert!(page.contains_text("AIS"));
    assert!(!page.elements.iter().any(|el| matches!(el, DrawCommand::Image { .. })));
}

#[test]
fn test_logo_is_fitted_into_its_frame() {
    let mut png = Vec::new();
    image::RgbImage::from_pixel(4, 2, image::Rgb([200, 30, 30]))
        .write_to(&mut IoCursor::new(&mut png), image::ImageOutputFormat::Png)
        .unwrap();
    let mut config = ComposerConfig::rfq();
    config.logo = Some(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&png)
    ));

    let surface = compose(&sample_records(two_items()), config.clone());
    let image = surface.pages()[0].elements.iter().find_map(|el| match el {
        DrawCommand::Image { x, y, width, height, .. } => Some((*x, *y, *width, *height)),
        _ => None,
    });
    assert_eq!(image, Some((10.0, 5.0, 24.0, 12.0)));
    assert!(!surface.pages()[0].contains_text("AIS"));

    let doc = docket::generate_at(&sample_records(two_items()), &config, now()).unwrap();
    assert_eq!(count(&doc.bytes, b"/Subtype /Image"), 1);
}

#[test]
fn test_config_shape_mismatch_is_rejected() {
    let mut config = ComposerConfig::invoice();
    config.item_table.columns.pop();
    let err = docket::generate_at(&sample_records(two_items()), &config, now()).unwrap_err();
    match err {
        DocketError::ShapeMismatch { expected, found, .. } => {
            assert_eq!(expected, 5);
            assert_eq!(found, 6);
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ─── JSON Entry Points ──────────────────────────────────────────

#[test]
fn test_json_records_are_lenient() {
    let json = r#"{
        "meta": { "number": "RFQ-7" },
        "lineItems": [
            { "name": "Water Tanks", "quantity": "15", "uom": "Liters", "unitPrice": "1,200" },
            { "name": "Mystery", "quantity": "lots", "unitPrice": 99 },
            { "itemName": "Bookshelves", "quantity": 2, "unitPrice": 5000 }
        ]
    }"#;
    let records: RecordGroup = serde_json::from_str(json).unwrap();
    assert_eq!(records.line_items[1].total, 0.0);
    assert_eq!(records.line_items[2].name, "Bookshelves");

    let surface = compose(&records, ComposerConfig::rfq());
    assert!(surface.pages()[0].contains_text("28,000.00"));

    let doc = docket::generate_json(json, None).unwrap();
    assert_valid_pdf(&doc.bytes);
    assert!(doc.filename.starts_with("RFQ_RFQ-7_"));
}

#[test]
fn test_json_config_selects_invoice() {
    let records = r#"{ "meta": { "number": "INV-1" }, "lineItems": [ { "name": "A", "quantity": 1, "unitPrice": 100 } ] }"#;
    let config = r#"{ "kind": "invoice", "currencySymbol": "$", "showTimestamp": false }"#;
    let doc = docket::generate_json(records, Some(config)).unwrap();
    assert!(doc.filename.starts_with("Invoice_INV-1_"));
    assert_eq!(doc.page_count, 1);

    let config = ComposerConfig::from_json(config).unwrap();
    let parsed: RecordGroup = serde_json::from_str(records).unwrap();
    let surface = compose(&parsed, config);
    let page = &surface.pages()[0];
    assert!(page.contains_text("$ 118.00"));
    assert!(!page.texts().any(|t| t.starts_with("Generated on")));
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    let err = docket::generate_json("{ not json", None).unwrap_err();
    assert!(matches!(err, DocketError::Parse { .. }));
}
