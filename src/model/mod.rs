//! # Record Model
//!
//! The input representation for the composer: one immutable record group per
//! generation call. Records arrive already collected by whatever form or API
//! sits in front of docket; the engine only reads them.
//!
//! Numeric line-item fields are parsed leniently. A blank, missing or
//! malformed quantity or unit price becomes `0` instead of failing the
//! whole document, and each item's total is always recomputed from the two.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Standard page sizes in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Everything a document is generated from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordGroup {
    #[serde(default)]
    pub meta: DocumentMeta,
    #[serde(default)]
    pub company: Option<PartyInfo>,
    #[serde(default)]
    pub vendor: Option<PartyInfo>,
    #[serde(default)]
    pub customer: Option<PartyInfo>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Document number and dates shown in the metadata box.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default)]
    pub number: String,
    /// Issue date. When absent the generation date is shown.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Free-form reference (PO number, project code).
    #[serde(default)]
    pub reference: Option<String>,
}

/// A company, vendor or customer block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInfo {
    pub name: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl PartyInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Initials of the party name, used as a logo placeholder.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|w| w.chars().find(|c| c.is_alphanumeric()))
            .flat_map(char::to_uppercase)
            .take(3)
            .collect()
    }
}

/// One row of the item table.
///
/// `total` always equals `round(quantity * unit_price, 2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawLineItem")]
pub struct LineItem {
    pub name: String,
    pub quantity: f64,
    pub uom: Option<String>,
    pub unit_price: f64,
    pub total: f64,
}

impl LineItem {
    pub fn new(name: &str, quantity: f64, unit_price: f64) -> Self {
        let quantity = finite_or_zero(quantity);
        let unit_price = finite_or_zero(unit_price);
        Self {
            name: name.to_string(),
            quantity,
            uom: None,
            unit_price,
            total: round2(quantity * unit_price),
        }
    }

    pub fn with_uom(mut self, uom: &str) -> Self {
        self.uom = Some(uom.to_string());
        self
    }
}

/// Wire shape of a line item before coercion.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLineItem {
    #[serde(default, alias = "itemName")]
    name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    quantity: f64,
    #[serde(default)]
    uom: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    unit_price: f64,
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        let mut item = LineItem::new(&raw.name, raw.quantity, raw.unit_price);
        item.uom = raw.uom.filter(|u| !u.trim().is_empty());
        item
    }
}

/// Parse a numeric form field. Anything that isn't a finite number is `0`.
pub fn coerce_number(input: &str) -> f64 {
    input
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Round half away from zero to two decimals.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        serde_json::Value::String(s) => coerce_number(&s),
        _ => 0.0,
    })
}

/// A tax applied to the subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    pub label: String,
    /// Percentage, e.g. `18.0` for 18%.
    pub rate: f64,
}

impl TaxRate {
    pub fn new(label: &str, rate: f64) -> Self {
        Self {
            label: label.to_string(),
            rate,
        }
    }
}

/// One computed tax line.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxLine {
    pub label: String,
    pub rate: f64,
    pub amount: f64,
}

/// Document totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub taxes: Vec<TaxLine>,
    pub grand_total: f64,
}

impl Totals {
    /// Sum the item totals and apply each tax to the subtotal.
    pub fn compute(items: &[LineItem], taxes: &[TaxRate]) -> Self {
        let subtotal = round2(items.iter().map(|i| i.total).sum());
        let taxes: Vec<TaxLine> = taxes
            .iter()
            .map(|t| TaxLine {
                label: t.label.clone(),
                rate: t.rate,
                amount: round2(subtotal * finite_or_zero(t.rate) / 100.0),
            })
            .collect();
        let grand_total = round2(subtotal + taxes.iter().map(|t| t.amount).sum::<f64>());
        Self {
            subtotal,
            taxes,
            grand_total,
        }
    }
}
