//! # wsterm-session
//!
//! Session Client: 入力エンコーダーと接続状態機械を組み合わせ、
//! 受信データを表示先へ、接続状態の変化をステータス表示へ流す。
//!
//! ## データフロー
//!
//! ```text
//! 送信:
//!   Input Source → handle_key/handle_input → InputEncoder → ConnectionMachine::send → Transport
//!
//! 受信:
//!   Transport → on_message → ConnectionMachine → Utf8Assembler → DisplaySink::append + scroll_to_end
//!
//! ライフサイクル:
//!   Transport / タイマー → on_open/on_error/on_close/on_retry_timer
//!     → ConnectionEvent → DisplaySink（info/error 行）+ StatusReporter
//! ```
//!
//! エラーはこの層で表示行とステータスに変換し、呼び出し側には返さない。

#![no_std]
extern crate alloc;

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod utf8;

pub use client::{InputOutcome, SessionClient};
pub use config::{endpoint_url, ClientConfig};
pub use display::{DisplaySink, Status, StatusReporter, Style};
pub use error::ConfigError;
pub use utf8::Utf8Assembler;

/// 既定のエンドポイントパス
pub const DEFAULT_ENDPOINT_PATH: &str = "/ws";
