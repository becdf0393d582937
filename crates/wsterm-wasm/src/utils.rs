//! ブラウザ環境のユーティリティ

use js_sys::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Window};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}

/// ページの protocol（`"https:"` など）。取れなければ `"http:"` 扱い
pub fn page_protocol() -> String {
    window()
        .ok()
        .and_then(|w| w.location().protocol().ok())
        .unwrap_or_else(|| "http:".to_string())
}

/// ページの host（`"example.com:8080"` など）
pub fn page_host() -> Result<String, JsValue> {
    window()?
        .location()
        .host()
        .map_err(|_| JsValue::from_str("Failed to get host"))
}

/// JS の例外値を表示用の文字列にする
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<Error>() {
        return String::from(err.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
