//! # wsterm-input
//!
//! キー入力をリモートシェルが期待するバイト列に変換するレイヤー。
//!
//! ## 入力モード
//!
//! - **Raw**: 1 キーごとに即座にフレームを送る。エコーはリモート側の責任。
//! - **Line**: 印字可能文字はクライアント側の行バッファに溜め、
//!   Enter で「バッファ + `\n`」を 1 フレームとして送る。
//!
//! ## 変換表
//!
//! ```text
//! InputEvent            Raw          Line
//! Printable(c)          UTF-8(c)     バッファに追加（送信なし）
//! Control(Interrupt)    0x03         0x03 即送信（バッファ破棄）
//! Control(Eof)          0x04         0x04 即送信
//! Edit(Backspace)       0x7F         バッファ末尾 1 文字削除（送信なし）
//! Edit(Tab)             0x09         0x09 即送信
//! Submit                0x0A         バッファ + 0x0A を 1 フレームで送信
//! ```

#![no_std]
extern crate alloc;

pub mod encoder;
pub mod event;
pub mod frame;
pub mod line;

pub use encoder::{encode_raw, InputEncoder};
pub use event::{decode_key, ControlKey, EditKey, InputEvent, InputMode, KeyAction, KeyModifiers};
pub use frame::OutboundFrame;
pub use line::LineBuffer;

/// 割り込み（Ctrl+C）
pub const BYTE_INTERRUPT: u8 = 0x03;

/// EOF（Ctrl+D）
pub const BYTE_EOF: u8 = 0x04;

/// 水平タブ
pub const BYTE_TAB: u8 = 0x09;

/// 行終端（Enter）
pub const BYTE_NEWLINE: u8 = 0x0A;

/// DEL（Backspace）
pub const BYTE_DELETE: u8 = 0x7F;

/// 行バッファの既定上限（バイト）
///
/// リモートシェル側のクライアントごとの入力バッファと同じ大きさ。
pub const DEFAULT_MAX_LINE_LEN: usize = 512;
