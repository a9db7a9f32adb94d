//! WASM bindings for an in-browser settings editor.
//!
//! Build with: `wasm-pack build --target web --features wasm`
//!
//! There is no windowing toolkit in the browser, so generation runs
//! headless and the built-in fragments are used.

use wasm_bindgen::prelude::*;

use crate::display::Headless;
use crate::document::Document;
use crate::runtime::BuiltinTemplates;

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// Generate the Python script from a JSON experiment document.
///
/// Throws a JS error when the document or its experiment info is invalid.
#[wasm_bindgen]
pub fn generate_script(document: &str, timestamp: &str) -> Result<String, JsError> {
    crate::generate_document(document, timestamp, &Headless, &BuiltinTemplates)
        .map(|out| out.script)
        .map_err(js_err)
}

/// Generate the browser page from a JSON experiment document.
#[wasm_bindgen]
pub fn generate_browser(document: &str, timestamp: &str) -> Result<String, JsError> {
    crate::generate_document(document, timestamp, &Headless, &BuiltinTemplates)
        .map(|out| out.browser)
        .map_err(js_err)
}

/// The built Parameter Set (labels, hints, allowed values) as JSON, for
/// rendering an editor form.
#[wasm_bindgen]
pub fn params_json(document: &str) -> Result<String, JsError> {
    let params = Document::from_json(document)
        .and_then(|doc| doc.params())
        .map_err(js_err)?;
    serde_json::to_string(&params).map_err(js_err)
}

/// Validate a document.
///
/// Returns JSON: `{"valid": true, "warnings": [...]}` or
/// `{"valid": false, "error": "..."}`.
#[wasm_bindgen]
pub fn validate(document: &str) -> String {
    let result = crate::generate_document(document, "", &Headless, &BuiltinTemplates);
    let value = match result {
        Ok(out) => serde_json::json!({ "valid": true, "warnings": out.warnings }),
        Err(e) => serde_json::json!({ "valid": false, "error": e.to_string() }),
    };
    value.to_string()
}
