//! 入力イベント → 送信フレームの変換

use crate::event::{ControlKey, EditKey, InputEvent, InputMode};
use crate::frame::OutboundFrame;
use crate::line::LineBuffer;
use crate::{BYTE_DELETE, BYTE_EOF, BYTE_INTERRUPT, BYTE_NEWLINE, BYTE_TAB};

/// Raw モードの変換（純粋関数）
///
/// すべてのイベントがちょうど 1 フレームになる。
pub fn encode_raw(event: InputEvent) -> OutboundFrame {
    match event {
        InputEvent::Printable(c) => OutboundFrame::from_char(c),
        InputEvent::Control(ControlKey::Interrupt) => OutboundFrame::byte(BYTE_INTERRUPT),
        InputEvent::Control(ControlKey::Eof) => OutboundFrame::byte(BYTE_EOF),
        InputEvent::Edit(EditKey::Backspace) => OutboundFrame::byte(BYTE_DELETE),
        InputEvent::Edit(EditKey::Tab) => OutboundFrame::byte(BYTE_TAB),
        InputEvent::Submit => OutboundFrame::byte(BYTE_NEWLINE),
    }
}

/// モードに応じてイベントをフレームに変換するエンコーダー
///
/// Line モードの行バッファはここが所有する。
/// Raw モードではバッファは常に空のまま。
#[derive(Debug, Clone)]
pub struct InputEncoder {
    mode: InputMode,
    line: LineBuffer,
}

impl InputEncoder {
    pub fn new(mode: InputMode, max_line_len: usize) -> Self {
        InputEncoder {
            mode,
            line: LineBuffer::new(max_line_len),
        }
    }

    /// イベントを変換する
    ///
    /// # 戻り値
    /// - `Some(frame)`: 今すぐ送るフレーム
    /// - `None`: ローカルバッファだけが変化した（または何も起きなかった）
    pub fn encode(&mut self, event: InputEvent) -> Option<OutboundFrame> {
        match self.mode {
            InputMode::Raw => Some(encode_raw(event)),
            InputMode::Line => self.encode_line(event),
        }
    }

    fn encode_line(&mut self, event: InputEvent) -> Option<OutboundFrame> {
        match event {
            InputEvent::Printable(c) => {
                if !self.line.push(c) {
                    log::debug!("line buffer full ({} bytes), dropping {:?}", self.line.max_len(), c);
                }
                None
            }
            InputEvent::Edit(EditKey::Backspace) => {
                self.line.backspace();
                None
            }
            InputEvent::Control(ControlKey::Interrupt) => {
                // ^C は入力途中の行も破棄する
                self.line.clear();
                Some(OutboundFrame::byte(BYTE_INTERRUPT))
            }
            InputEvent::Control(ControlKey::Eof) => Some(OutboundFrame::byte(BYTE_EOF)),
            InputEvent::Edit(EditKey::Tab) => Some(OutboundFrame::byte(BYTE_TAB)),
            InputEvent::Submit => Some(OutboundFrame::line(self.line.take(), BYTE_NEWLINE)),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// 未送信の入力行（Raw モードでは常に空）
    pub fn pending_line(&self) -> &str {
        self.line.as_str()
    }

    pub fn clear_line(&mut self) {
        self.line.clear();
    }
}
