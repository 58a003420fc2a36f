//! Composer configuration and the two document presets.
//!
//! Every field has a default, so a JSON config only needs to name what it
//! changes. [`ComposerConfig::from_json`] picks the preset named by `kind`
//! and overlays the given fields on top of it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::layout::box_model::{ColumnSpec, Rect};
use crate::layout::table::TableStyle;
use crate::model::{Edges, PageSize, TaxRate};

/// Which kind of document is being produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Rfq,
    Invoice,
}

/// Fixed text printed by the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentLabels {
    pub number: String,
    pub date: String,
    pub due_date: String,
    pub reference: String,
    pub contact_person: String,
    pub vendor_heading: String,
    pub customer_heading: String,
    pub company_heading: String,
    /// Printed before a party's postal code.
    pub postal_prefix: String,
    /// Printed under a contact person who has no phone number. Empty
    /// leaves the line out.
    pub missing_phone: String,
    pub subtotal: String,
    pub grand_total: String,
    pub payment_terms: String,
}

impl Default for DocumentLabels {
    fn default() -> Self {
        Self {
            number: "RFQ No".to_string(),
            date: "RFQ Date".to_string(),
            due_date: "Due Date".to_string(),
            reference: "Ref".to_string(),
            contact_person: "Contact Person".to_string(),
            vendor_heading: "To".to_string(),
            customer_heading: "Bill To".to_string(),
            company_heading: "Purchase Centre Address :".to_string(),
            postal_prefix: "P.O BOX : ".to_string(),
            missing_phone: "N/A".to_string(),
            subtotal: "Sub Total".to_string(),
            grand_total: "Grand Total".to_string(),
            payment_terms: "Payment Terms".to_string(),
        }
    }
}

/// A line-item field shown in one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemField {
    /// 1-based position in the item list.
    Ordinal,
    Name,
    Quantity,
    Uom,
    UnitPrice,
    Total,
}

/// Item table columns: one label, [`ColumnSpec`] and field per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemTableConfig {
    pub labels: Vec<String>,
    pub columns: Vec<ColumnSpec>,
    pub fields: Vec<ItemField>,
}

impl Default for ItemTableConfig {
    fn default() -> Self {
        Self::rfq()
    }
}

impl ItemTableConfig {
    pub fn rfq() -> Self {
        Self {
            labels: labels(&["S.No", "Item Name", "Quantity", "UOM", "Total"]),
            columns: vec![
                ColumnSpec::left(15.0),
                ColumnSpec::left(84.0),
                ColumnSpec::right(26.0),
                ColumnSpec::left(26.0),
                ColumnSpec::right(36.0),
            ],
            fields: vec![
                ItemField::Ordinal,
                ItemField::Name,
                ItemField::Quantity,
                ItemField::Uom,
                ItemField::Total,
            ],
        }
    }

    pub fn invoice() -> Self {
        Self {
            labels: labels(&["S.No", "Item Name", "Quantity", "UOM", "Unit Price", "Total"]),
            columns: vec![
                ColumnSpec::left(14.0),
                ColumnSpec::left(67.0),
                ColumnSpec::right(22.0),
                ColumnSpec::left(22.0),
                ColumnSpec::right(30.0),
                ColumnSpec::right(32.0),
            ],
            fields: vec![
                ItemField::Ordinal,
                ItemField::Name,
                ItemField::Quantity,
                ItemField::Uom,
                ItemField::UnitPrice,
                ItemField::Total,
            ],
        }
    }
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fixed positions of everything outside the flowing table (mm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub page_size: PageSize,
    /// Body area. The table resumes at `top` after a break and never
    /// draws below `bottom`.
    pub margin: Edges,
    pub table_start_y: f64,
    pub logo: Rect,
    /// Baseline of the document title.
    pub title_y: f64,
    /// Horizontal extent of separator rules and the footer band.
    pub rule_left: f64,
    pub rule_right: f64,
    pub header_rule_y: f64,
    pub meta_rule_y: f64,
    /// Metadata box: label column, value column, first baseline.
    pub meta_x: f64,
    pub meta_value_x: f64,
    pub meta_y: f64,
    /// Baseline distance for stacked header lines.
    pub line_gap: f64,
    /// First baseline of the party boxes.
    pub info_y: f64,
    /// Baseline of the salutation; the letter body follows.
    pub letter_y: f64,
    pub totals_width: f64,
    /// Gap between the table's last row and the totals block.
    pub totals_offset: f64,
    /// Gap between the totals and the payment terms.
    pub terms_offset: f64,
    /// Gap above the signature.
    pub signature_offset: f64,
    pub footer_separator_offset: f64,
    pub footer_text_offset: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: Edges::new(18.0, 10.0, 20.0, 13.0),
            table_start_y: 88.0,
            logo: Rect::new(10.0, 5.0, 40.0, 12.0),
            title_y: 12.0,
            rule_left: 10.0,
            rule_right: 200.0,
            header_rule_y: 18.0,
            meta_rule_y: 34.0,
            meta_x: 130.0,
            meta_value_x: 155.0,
            meta_y: 23.0,
            line_gap: 4.0,
            info_y: 39.0,
            letter_y: 72.0,
            totals_width: 70.0,
            totals_offset: 5.0,
            terms_offset: 6.0,
            signature_offset: 12.0,
            footer_separator_offset: 14.0,
            footer_text_offset: 5.0,
        }
    }
}

/// Salutation and introductory paragraph printed above the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Letter {
    pub salutation: String,
    pub body: String,
}

impl Default for Letter {
    fn default() -> Self {
        Self {
            salutation: "Dear Sir,".to_string(),
            body: "Please send your most competitive offer mentioning your Terms & Conditions \
                   before the due date. You can send the same to the above mentioned e-mail/fax."
                .to_string(),
        }
    }
}

/// Everything that distinguishes one document layout from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposerConfig {
    pub kind: DocumentKind,
    pub title: String,
    pub labels: DocumentLabels,
    pub include_tax: bool,
    pub taxes: Vec<TaxRate>,
    pub include_company_block: bool,
    pub include_vendor_block: bool,
    pub include_customer_block: bool,
    pub include_signature: bool,
    pub letter: Option<Letter>,
    pub payment_terms: Vec<String>,
    pub thank_you: Option<String>,
    /// Prefix for amounts in the totals block. Empty prints bare numbers.
    pub currency_symbol: String,
    pub item_table: ItemTableConfig,
    pub geometry: PageGeometry,
    pub table_style: TableStyle,
    /// Move post-table blocks to a new page instead of letting them run
    /// past the bottom margin.
    pub guard_block_overflow: bool,
    pub filename_prefix: String,
    /// Logo source: data URI, file path or raw base64.
    pub logo: Option<String>,
    /// Print "Generated on ..." in the footer.
    pub show_timestamp: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::rfq()
    }
}

impl ComposerConfig {
    /// Request for quotation: vendor letter, no tax, signature.
    pub fn rfq() -> Self {
        Self {
            kind: DocumentKind::Rfq,
            title: "REQUEST FOR QUOTATION".to_string(),
            labels: DocumentLabels::default(),
            include_tax: false,
            taxes: Vec::new(),
            include_company_block: true,
            include_vendor_block: true,
            include_customer_block: false,
            include_signature: true,
            letter: Some(Letter::default()),
            payment_terms: Vec::new(),
            thank_you: None,
            currency_symbol: String::new(),
            item_table: ItemTableConfig::rfq(),
            geometry: PageGeometry::default(),
            table_style: TableStyle::default(),
            guard_block_overflow: false,
            filename_prefix: "RFQ".to_string(),
            logo: None,
            show_timestamp: true,
        }
    }

    /// Invoice: customer block, taxes, payment terms, thank-you footer.
    pub fn invoice() -> Self {
        Self {
            kind: DocumentKind::Invoice,
            title: "INVOICE".to_string(),
            labels: DocumentLabels {
                number: "Invoice No".to_string(),
                date: "Invoice Date".to_string(),
                company_heading: "From".to_string(),
                ..DocumentLabels::default()
            },
            include_tax: true,
            taxes: vec![TaxRate::new("CGST", 9.0), TaxRate::new("SGST", 9.0)],
            include_company_block: true,
            include_vendor_block: false,
            include_customer_block: true,
            include_signature: false,
            letter: None,
            payment_terms: vec!["Payment is due within 30 days of the invoice date.".to_string()],
            thank_you: Some("Thank you for your business!".to_string()),
            currency_symbol: "Rs.".to_string(),
            item_table: ItemTableConfig::invoice(),
            geometry: PageGeometry {
                table_start_y: 76.0,
                ..PageGeometry::default()
            },
            table_style: TableStyle::default(),
            guard_block_overflow: false,
            filename_prefix: "Invoice".to_string(),
            logo: None,
            show_timestamp: true,
        }
    }

    pub fn preset(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Rfq => Self::rfq(),
            DocumentKind::Invoice => Self::invoice(),
        }
    }

    /// Parse a JSON config, filling unspecified fields from the preset
    /// named by its `kind` (RFQ when absent).
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Same as [`ComposerConfig::from_json`] for an already parsed value.
    /// `null` selects the RFQ preset unchanged.
    pub fn from_value(overlay: Value) -> Result<Self> {
        if overlay.is_null() {
            return Ok(Self::default());
        }
        let kind = match overlay.get("kind") {
            Some(k) => serde_json::from_value(k.clone())?,
            None => DocumentKind::default(),
        };
        let mut base = serde_json::to_value(Self::preset(kind))?;
        merge(&mut base, overlay);
        Ok(serde_json::from_value(base)?)
    }
}

/// Recursively overlay `patch` onto `base`. Objects merge key by key;
/// anything else (arrays included) replaces.
fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
