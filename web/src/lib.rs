//! Bindings which let a web page render seals without leaving the browser

use sealgen::SealConfig;
use wasm_bindgen::prelude::*;

/// Renders the seal described by `config_json` (the same JSON accepted by the `sealgen` binary)
/// to an SVG string.  Invalid configurations are reported as a JS error.
#[wasm_bindgen]
pub fn render_seal_svg(config_json: &str) -> Result<String, JsValue> {
    let config = SealConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(sealgen::render_seal_document(&config))
}

/// The JSON for a default seal, for pre-filling an editor
#[wasm_bindgen]
pub fn default_config_json() -> Result<String, JsValue> {
    SealConfig::default()
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
