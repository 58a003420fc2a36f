//! # Document Composer
//!
//! Turns one [`RecordGroup`] into a finished document:
//!
//! ```text
//! header (logo, title, contact, metadata) -> party boxes -> letter
//!   -> item table (paginated) -> totals / terms / signature (anchored)
//!   -> footers on every page -> PDF bytes
//! ```
//!
//! The regions above the table sit at fixed coordinates from
//! [`PageGeometry`]. The table flows from `table_start_y` across as many
//! pages as it needs, and everything after it hangs off the cursor the table
//! returns. Footers go on last, once the page count can no longer change.

pub mod config;

pub use config::{
    ComposerConfig, DocumentKind, DocumentLabels, ItemField, ItemTableConfig, Letter, PageGeometry,
};

use std::sync::Arc;

use base64::Engine;
use chrono::{Local, NaiveDateTime};

use crate::error::{DocketError, Result};
use crate::format::{
    format_amount, format_date, format_money, format_quantity, format_timestamp,
    suggested_filename,
};
use crate::image_loader::load_image;
use crate::layout::anchor::{
    ensure_room, fits_below, place_block, Block, SignatureBlock, TextBlock, TotalsBlock,
};
use crate::layout::box_model::{align_x, centered_baseline, Rect};
use crate::layout::footer::{page_of, stamp_all, FooterSpec};
use crate::layout::table::{render_table, validate_shape, TableStyle};
use crate::layout::Cursor;
use crate::model::{LineItem, PartyInfo, RecordGroup, TaxRate, Totals};
use crate::pdf::{PdfMetadata, PdfWriter};
use crate::style::{Align, Stroke, TextStyle};
use crate::surface::{PageSurface, Surface};
use crate::text;

/// A finished document.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    /// Suggested name, e.g. `RFQ_RFQ20240092_20261016_183900.pdf`.
    pub filename: String,
    pub page_count: usize,
}

impl GeneratedDocument {
    /// `data:application/pdf;filename=...;base64,...` for preview sinks.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:application/pdf;filename={};base64,{}",
            self.filename,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Text placeholder drawn where the logo would go.
pub fn logo_placeholder(company: Option<&PartyInfo>) -> String {
    company
        .map(PartyInfo::initials)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "LOGO".to_string())
}

/// Cell strings for each line item, one per configured field.
pub fn item_rows(items: &[LineItem], fields: &[ItemField]) -> Vec<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            fields
                .iter()
                .map(|field| match field {
                    ItemField::Ordinal => (i + 1).to_string(),
                    ItemField::Name => item.name.clone(),
                    ItemField::Quantity => format_quantity(item.quantity),
                    ItemField::Uom => item.uom.clone().unwrap_or_default(),
                    ItemField::UnitPrice => format_amount(item.unit_price),
                    ItemField::Total => format_amount(item.total),
                })
                .collect()
        })
        .collect()
}

pub struct DocumentComposer {
    config: ComposerConfig,
}

impl DocumentComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Generate with the current local time for dates, footer and filename.
    pub fn generate(&self, records: &RecordGroup) -> Result<GeneratedDocument> {
        self.generate_at(records, Local::now().naive_local())
    }

    /// Generate as if the current time were `now`. Output is a pure function
    /// of `records`, the config and `now`.
    pub fn generate_at(&self, records: &RecordGroup, now: NaiveDateTime) -> Result<GeneratedDocument> {
        let surface = self.compose(records, now)?;
        let metadata = PdfMetadata {
            title: Some(self.config.title.clone()),
            author: records.company.as_ref().map(|c| c.name.clone()),
            subject: Some(records.meta.number.clone()).filter(|n| !n.is_empty()),
            created: Some(now),
        };
        let bytes = PdfWriter::new().write(&surface, &metadata)?;
        let filename = suggested_filename(&self.config.filename_prefix, &records.meta.number, now);
        log::info!(
            "generated {} ({} pages, {} bytes)",
            filename,
            surface.page_count(),
            bytes.len()
        );
        Ok(GeneratedDocument {
            bytes,
            filename,
            page_count: surface.page_count(),
        })
    }

    /// Lay the document out on a fresh surface without serializing it.
    pub fn compose(&self, records: &RecordGroup, now: NaiveDateTime) -> Result<PageSurface> {
        let table = &self.config.item_table;
        if table.fields.len() != table.columns.len() {
            return Err(DocketError::ShapeMismatch {
                context: "item table fields".to_string(),
                expected: table.columns.len(),
                found: table.fields.len(),
            });
        }
        let rows = item_rows(&records.line_items, &table.fields);
        validate_shape(&table.labels, &rows, &table.columns)?;

        let geometry = &self.config.geometry;
        let mut surface = PageSurface::new(geometry.page_size);

        self.draw_header(&mut surface, records, now);
        self.draw_party_boxes(&mut surface, records);
        if let Some(letter) = &self.config.letter {
            self.draw_letter(&mut surface, letter);
        }

        let style = TableStyle {
            margin: geometry.margin,
            ..self.config.table_style.clone()
        };
        let result = render_table(
            &mut surface,
            &table.labels,
            &rows,
            &table.columns,
            &style,
            Cursor::new(0, geometry.table_start_y),
        )?;
        log::debug!(
            "item table: {} rows, {} page breaks, ends on page {} at y={:.1}",
            result.rows_drawn,
            result.pages_added,
            result.final_cursor.page_index + 1,
            result.final_cursor.y
        );

        let taxes: &[TaxRate] = if self.config.include_tax {
            &self.config.taxes
        } else {
            &[]
        };
        let totals = Totals::compute(&records.line_items, taxes);

        let mut cursor = result.final_cursor;
        cursor = self.place(&mut surface, cursor, &self.totals_block(&totals), geometry.totals_offset)?;
        if let Some(terms) = self.terms_block() {
            cursor = self.place(&mut surface, cursor, &terms, geometry.terms_offset)?;
        }
        if self.config.include_signature {
            let mut signature = SignatureBlock::new(geometry.margin.left);
            if let Some(company) = &records.company {
                signature = signature.signatory(&company.name);
            }
            self.place(&mut surface, cursor, &signature, geometry.signature_offset)?;
        }

        let footer = FooterSpec {
            left: geometry.rule_left,
            right: geometry.rule_right,
            separator_offset: geometry.footer_separator_offset,
            text_offset: geometry.footer_text_offset,
            thank_you: self.config.thank_you.clone(),
            timestamp: self.config.show_timestamp.then(|| format_timestamp(now)),
            ..FooterSpec::default()
        };
        stamp_all(&mut surface, &footer, page_of)?;

        Ok(surface)
    }

    /// Anchor `block` below `cursor`, first moving to a new page when the
    /// overflow guard is on and the block wouldn't fit.
    fn place(
        &self,
        surface: &mut dyn Surface,
        cursor: Cursor,
        block: &dyn Block,
        offset: f64,
    ) -> Result<Cursor> {
        let needed = offset + block.height(surface);
        let margin = &self.config.geometry.margin;
        let (_, page_height) = surface.page_size();
        if !fits_below(cursor, needed, page_height, margin) {
            if self.config.guard_block_overflow {
                let room = ensure_room(surface, cursor, needed, margin)?;
                return place_block(surface, room, block, 0.0);
            }
            log::debug!(
                "block at y={:.1} on page {} runs into the footer band",
                cursor.y + offset,
                cursor.page_index + 1
            );
        }
        place_block(surface, cursor, block, offset)
    }

    fn totals_block(&self, totals: &Totals) -> TotalsBlock {
        let geometry = &self.config.geometry;
        let labels = &self.config.labels;
        let symbol = &self.config.currency_symbol;
        let (page_width, _) = geometry.page_size.dimensions();

        let mut block = TotalsBlock::new(page_width - geometry.margin.right, geometry.totals_width);
        if !totals.taxes.is_empty() {
            block = block.line(&labels.subtotal, &format_money(totals.subtotal, symbol));
            for tax in &totals.taxes {
                let label = format!("{} ({}%)", tax.label, format_quantity(tax.rate));
                block = block.line(&label, &format_money(tax.amount, symbol));
            }
        }
        block.emphasis(&labels.grand_total, &format_money(totals.grand_total, symbol))
    }

    fn terms_block(&self) -> Option<TextBlock> {
        if self.config.payment_terms.is_empty() {
            return None;
        }
        let geometry = &self.config.geometry;
        let (page_width, _) = geometry.page_size.dimensions();
        let width = page_width - geometry.margin.horizontal();
        let block = self
            .config
            .payment_terms
            .iter()
            .fold(TextBlock::new(geometry.margin.left, width), |b, p| b.paragraph(p))
            .heading(&self.config.labels.payment_terms);
        Some(block)
    }

    fn draw_header(&self, surface: &mut PageSurface, records: &RecordGroup, now: NaiveDateTime) {
        let geometry = &self.config.geometry;
        let labels = &self.config.labels;
        let rule = Stroke::default();
        let bold = TextStyle::sized(10.0).bold();
        let normal = TextStyle::sized(10.0);

        self.draw_logo(surface, records.company.as_ref());

        let title_width = surface.measure_text(&self.config.title, &bold);
        let title_x = align_x(geometry.meta_x, geometry.rule_right - geometry.meta_x, title_width, Align::Right);
        surface.text(title_x, geometry.title_y, &self.config.title, &bold);

        if let Some(reference) = records.meta.reference.as_deref().filter(|r| !r.is_empty()) {
            let small = TextStyle::sized(8.0);
            let content = format!("{}: {}", labels.reference, reference);
            let w = surface.measure_text(&content, &small);
            let x = align_x(geometry.meta_x, geometry.rule_right - geometry.meta_x, w, Align::Right);
            surface.text(x, geometry.title_y + geometry.line_gap, &content, &small);
        }

        surface.line(geometry.rule_left, geometry.header_rule_y, geometry.rule_right, geometry.header_rule_y, &rule);

        // Company contact, top left.
        if let Some(company) = &records.company {
            if let Some(person) = company.contact_person.as_deref() {
                let x = geometry.margin.left;
                let mut y = geometry.meta_y;
                surface.text(x, y, &labels.contact_person, &bold);
                y += geometry.line_gap + 1.0;
                surface.text(x, y, person, &normal);
                if let Some(reach) = company.phone.as_deref().or(company.email.as_deref()) {
                    y += geometry.line_gap;
                    surface.text(x, y, reach, &normal);
                }
            }
        }

        let date = records.meta.date.unwrap_or_else(|| now.date());
        let due = records
            .meta
            .due_date
            .map(format_date)
            .unwrap_or_else(|| "-".to_string());
        let metadata = [
            (&labels.number, records.meta.number.clone()),
            (&labels.date, format_date(date)),
            (&labels.due_date, due),
        ];
        let value_width = geometry.rule_right - geometry.meta_value_x;
        for (i, (label, value)) in metadata.iter().enumerate() {
            let y = geometry.meta_y + i as f64 * geometry.line_gap;
            surface.text(geometry.meta_x, y, &format!("{} :", label), &bold);
            let value = text::clip(surface.fonts(), value, &normal, value_width);
            surface.text(geometry.meta_value_x, y, &value, &normal);
        }

        surface.line(geometry.rule_left, geometry.meta_rule_y, geometry.rule_right, geometry.meta_rule_y, &rule);
    }

    /// The configured logo, or a placeholder if there is none or it can't
    /// be loaded.
    fn draw_logo(&self, surface: &mut PageSurface, company: Option<&PartyInfo>) {
        let frame = self.config.geometry.logo;
        if let Some(src) = &self.config.logo {
            match load_image(src) {
                Ok(image) => {
                    let ratio = image.aspect_ratio();
                    let (mut width, mut height) = (frame.width, frame.width * ratio);
                    if height > frame.height && ratio > 0.0 {
                        height = frame.height;
                        width = height / ratio;
                    }
                    surface.image(frame.x, frame.y, width, height, Arc::new(image));
                    return;
                }
                Err(e) => log::warn!("logo unavailable, drawing placeholder: {}", e),
            }
        }
        let style = TextStyle::sized(14.0).bold();
        let baseline = centered_baseline(&frame, surface.ascent(&style));
        surface.text(frame.x, baseline, &logo_placeholder(company), &style);
    }

    /// Vendor, customer and company boxes, left to right, below the
    /// metadata rule.
    fn draw_party_boxes(&self, surface: &mut PageSurface, records: &RecordGroup) {
        let config = &self.config;
        let geometry = &config.geometry;
        let labels = &config.labels;

        let mut boxes: Vec<(&str, &PartyInfo, bool)> = Vec::new();
        if config.include_vendor_block {
            if let Some(vendor) = &records.vendor {
                boxes.push((labels.vendor_heading.as_str(), vendor, true));
            }
        }
        if config.include_customer_block {
            if let Some(customer) = &records.customer {
                boxes.push((labels.customer_heading.as_str(), customer, true));
            }
        }
        if config.include_company_block {
            if let Some(company) = &records.company {
                // The company contact is already in the header.
                boxes.push((labels.company_heading.as_str(), company, false));
            }
        }
        if boxes.is_empty() {
            return;
        }

        let left = geometry.margin.left;
        let xs: Vec<f64> = match boxes.len() {
            1 => vec![left],
            2 => vec![left, geometry.meta_x],
            n => {
                let step = (geometry.rule_right - left) / n as f64;
                (0..n).map(|i| left + i as f64 * step).collect()
            }
        };
        let bottom = match &config.letter {
            Some(_) => geometry.letter_y - geometry.line_gap,
            None => geometry.table_start_y - geometry.line_gap,
        };

        for (i, (heading, party, with_contact)) in boxes.iter().enumerate() {
            let right = xs.get(i + 1).map(|x| x - 5.0).unwrap_or(geometry.rule_right);
            let frame = Rect::new(xs[i], geometry.info_y, right - xs[i], bottom - geometry.info_y);
            self.draw_party(surface, &frame, heading, party, *with_contact);
        }
    }

    fn draw_party(
        &self,
        surface: &mut PageSurface,
        frame: &Rect,
        heading: &str,
        party: &PartyInfo,
        with_contact: bool,
    ) {
        let labels = &self.config.labels;
        let gap = self.config.geometry.line_gap;
        let bold = TextStyle::sized(10.0).bold();
        let normal = TextStyle::sized(10.0);

        let mut lines: Vec<(String, TextStyle)> = vec![(party.name.clone(), bold)];
        lines.extend(party.address_lines.iter().map(|l| (l.clone(), normal)));
        if let Some(code) = party.postal_code.as_deref().filter(|c| !c.is_empty()) {
            lines.push((format!("{}{}", labels.postal_prefix, code), normal));
        }
        if with_contact {
            if let Some(person) = party.contact_person.as_deref() {
                lines.push((labels.contact_person.clone(), bold));
                lines.push((person.to_string(), normal));
            }
            let phone = party.phone.as_deref().filter(|p| !p.trim().is_empty());
            let fallback = (party.contact_person.is_some() && !labels.missing_phone.is_empty())
                .then_some(labels.missing_phone.as_str());
            if let Some(phone) = phone.or(fallback) {
                lines.push((phone.to_string(), normal));
            }
            if let Some(email) = party.email.as_deref() {
                lines.push((email.to_string(), normal));
            }
        }

        surface.text(frame.x, frame.y, heading, &bold);
        let mut y = frame.y + gap + 1.0;
        for (i, (content, style)) in lines.iter().enumerate() {
            if y > frame.bottom() {
                log::debug!(
                    "party box '{}' is full, dropping {} lines",
                    heading,
                    lines.len() - i
                );
                break;
            }
            let content = text::clip(surface.fonts(), content, style, frame.width);
            surface.text(frame.x, y, &content, style);
            y += gap;
        }
    }

    fn draw_letter(&self, surface: &mut PageSurface, letter: &Letter) {
        let geometry = &self.config.geometry;
        let (page_width, _) = geometry.page_size.dimensions();
        let width = page_width - geometry.margin.horizontal();
        let x = geometry.margin.left;

        surface.text(x, geometry.letter_y, &letter.salutation, &TextStyle::sized(10.0).bold());

        let body = TextStyle::sized(9.0);
        let mut y = geometry.letter_y + 7.0;
        for line in text::wrap(surface.fonts(), &letter.body, &body, width) {
            surface.text(x, y, &line, &body);
            y += body.line_advance();
        }
    }
}
