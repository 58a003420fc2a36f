use wasm_bindgen::prelude::*;

use crate::compose::ComposerConfig;
use crate::model::RecordGroup;

/// Generate PDF bytes from JSON records and an optional JSON config.
#[wasm_bindgen]
pub fn generate_pdf(records_json: &str, config_json: Option<String>) -> Result<Vec<u8>, JsValue> {
    crate::generate_json(records_json, config_json.as_deref())
        .map(|doc| doc.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Same as [`generate_pdf`] but takes JS objects. The config overlays the
/// preset named by its `kind`; undefined or null means the RFQ preset.
#[wasm_bindgen]
pub fn generate_pdf_value(records: JsValue, config: JsValue) -> Result<Vec<u8>, JsValue> {
    let records: RecordGroup = serde_wasm_bindgen::from_value(records)?;
    let config = if config.is_undefined() || config.is_null() {
        ComposerConfig::default()
    } else {
        let overlay: serde_json::Value = serde_wasm_bindgen::from_value(config)?;
        ComposerConfig::from_value(overlay).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    crate::generate(&records, &config)
        .map(|doc| doc.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// `data:application/pdf;...` string for an `<iframe>` preview.
#[wasm_bindgen]
pub fn generate_pdf_data_uri(records_json: &str, config_json: Option<String>) -> Result<String, JsValue> {
    crate::generate_json(records_json, config_json.as_deref())
        .map(|doc| doc.to_data_uri())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
