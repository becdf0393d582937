//! # wsterm-wasm
//!
//! wasm-bindgen エクスポート：ブラウザのページから呼び出す公開 API。
//! WebSocket・タイマー・DOM といったブラウザ API はすべてこのクレートに閉じ込め、
//! 状態と判断は `wsterm-session` 以下の no_std クレートに任せる。
//!
//! ## 使用方法（JavaScript）
//!
//! ```javascript
//! import init, { TerminalClient } from './pkg/wsterm_wasm.js';
//!
//! await init();
//!
//! // 省略したフィールドは既定値（Raw モード、5 回まで再接続、2000ms 間隔）
//! const client = new TerminalClient(JSON.stringify({ mode: "raw" }));
//! client.start();
//!
//! // 手動操作
//! client.clear();
//! client.reconnect();
//! console.log(JSON.parse(client.getStats()));
//! ```
//!
//! ## 必要な DOM 要素
//!
//! | id | 役割 |
//! |---|---|
//! | `terminal` | スクロール領域（クリックでフォーカス） |
//! | `output` | 出力の追加先 |
//! | `status-indicator` | 接続中は `connected` クラスが付く |
//! | `status-text` | フェーズ文字列 |
//! | `clear-btn` | クリアボタン（任意） |
//! | `input-line` | Line モードの入力中の行（任意） |

use std::sync::Once;

use wasm_bindgen::prelude::*;

pub mod client;
pub mod dom;
pub mod keyboard;
pub mod timer;
pub mod transport;
pub mod utils;

pub use client::TerminalClient;

static INIT: Once = Once::new();

/// パニックフックとコンソールロガーを設定する
///
/// 何度呼んでもよい（2 回目以降は何もしない）。`TerminalClient` の生成時にも呼ばれる。
#[wasm_bindgen(js_name = "initLogging")]
pub fn init_logging() {
    INIT.call_once(|| {
        init_panic_hook();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
        log::info!("wsterm-wasm {} initialized", env!("CARGO_PKG_VERSION"));
    });
}

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
