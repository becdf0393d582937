//! 入力イベントとキー名のデコード
//!
//! ブラウザの `KeyboardEvent.key` 文字列は入力境界で一度だけ
//! [`InputEvent`] に変換する。以降は閉じた enum で網羅的に扱う。

use serde::Deserialize;

/// 入力モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// 1 キーごとに即送信
    #[default]
    Raw,
    /// 行単位で送信
    Line,
}

/// 制御シグナル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    /// Ctrl+C
    Interrupt,
    /// Ctrl+D
    Eof,
}

/// 編集キー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Backspace,
    Tab,
}

/// Input Source から届く論理入力
///
/// 1 イベントは Session Client に一度だけ消費される（再生はしない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Printable(char),
    Control(ControlKey),
    Edit(EditKey),
    Submit,
}

/// キーイベントの修飾キー状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub const NONE: Self = KeyModifiers { ctrl: false, alt: false, meta: false };

    pub const CTRL: Self = KeyModifiers { ctrl: true, alt: false, meta: false };
}

/// キーデコードの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// 入力イベントとして消費する（呼び出し側は preventDefault する）
    Event(InputEvent),
    /// ブラウザ予約キー。手を付けずにブラウザへ渡す
    PassThrough,
    /// 端末としては意味のないキー（矢印キー、修飾キー単体など）
    Ignore,
}

/// `KeyboardEvent.key` と修飾キーから [`KeyAction`] を決める
///
/// - F5 / F12 / Ctrl+R はページ更新・開発者ツール用に素通しする
/// - Ctrl+C → `Control(Interrupt)`, Ctrl+D → `Control(Eof)`
/// - Enter / Backspace / Tab は名前で判定
/// - 1 文字のキー名は `Printable`（ASCII に限らない）
pub fn decode_key(key: &str, mods: KeyModifiers) -> KeyAction {
    if is_browser_reserved(key, mods) {
        return KeyAction::PassThrough;
    }

    match key {
        "Enter" => return KeyAction::Event(InputEvent::Submit),
        "Backspace" => return KeyAction::Event(InputEvent::Edit(EditKey::Backspace)),
        "Tab" => return KeyAction::Event(InputEvent::Edit(EditKey::Tab)),
        _ => {}
    }

    let mut chars = key.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        // "ArrowUp", "Shift" などの名前付きキー
        return KeyAction::Ignore;
    };

    if mods.ctrl {
        return match c.to_ascii_lowercase() {
            'c' => KeyAction::Event(InputEvent::Control(ControlKey::Interrupt)),
            'd' => KeyAction::Event(InputEvent::Control(ControlKey::Eof)),
            _ => KeyAction::Ignore,
        };
    }

    // Meta(Cmd) との組み合わせはブラウザのショートカット（コピー等）
    if mods.meta {
        return KeyAction::PassThrough;
    }

    KeyAction::Event(InputEvent::Printable(c))
}

fn is_browser_reserved(key: &str, mods: KeyModifiers) -> bool {
    match key {
        "F5" | "F12" => true,
        "r" | "R" => mods.ctrl,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_printable_ascii() {
        assert_eq!(
            decode_key("a", KeyModifiers::NONE),
            KeyAction::Event(InputEvent::Printable('a'))
        );
        assert_eq!(
            decode_key(" ", KeyModifiers::NONE),
            KeyAction::Event(InputEvent::Printable(' '))
        );
    }

    #[test]
    fn test_decode_printable_non_ascii() {
        assert_eq!(
            decode_key("é", KeyModifiers::NONE),
            KeyAction::Event(InputEvent::Printable('é'))
        );
        assert_eq!(
            decode_key("😀", KeyModifiers::NONE),
            KeyAction::Event(InputEvent::Printable('😀'))
        );
    }

    #[test]
    fn test_decode_named_keys() {
        assert_eq!(decode_key("Enter", KeyModifiers::NONE), KeyAction::Event(InputEvent::Submit));
        assert_eq!(
            decode_key("Backspace", KeyModifiers::NONE),
            KeyAction::Event(InputEvent::Edit(EditKey::Backspace))
        );
        assert_eq!(
            decode_key("Tab", KeyModifiers::NONE),
            KeyAction::Event(InputEvent::Edit(EditKey::Tab))
        );
    }

    #[test]
    fn test_decode_control_combinations() {
        assert_eq!(
            decode_key("c", KeyModifiers::CTRL),
            KeyAction::Event(InputEvent::Control(ControlKey::Interrupt))
        );
        // CapsLock 中は大文字で届く
        assert_eq!(
            decode_key("D", KeyModifiers::CTRL),
            KeyAction::Event(InputEvent::Control(ControlKey::Eof))
        );
        assert_eq!(decode_key("x", KeyModifiers::CTRL), KeyAction::Ignore);
    }

    #[test]
    fn test_browser_reserved_keys_pass_through() {
        assert_eq!(decode_key("F5", KeyModifiers::NONE), KeyAction::PassThrough);
        assert_eq!(decode_key("F12", KeyModifiers::NONE), KeyAction::PassThrough);
        assert_eq!(decode_key("r", KeyModifiers::CTRL), KeyAction::PassThrough);
        // 修飾なしの r はただの文字
        assert_eq!(
            decode_key("r", KeyModifiers::NONE),
            KeyAction::Event(InputEvent::Printable('r'))
        );
    }

    #[test]
    fn test_unmapped_named_keys_ignored() {
        assert_eq!(decode_key("ArrowUp", KeyModifiers::NONE), KeyAction::Ignore);
        assert_eq!(decode_key("Shift", KeyModifiers::NONE), KeyAction::Ignore);
        assert_eq!(decode_key("", KeyModifiers::NONE), KeyAction::Ignore);
    }

    #[test]
    fn test_meta_combination_passes_through() {
        let mods = KeyModifiers { meta: true, ..KeyModifiers::NONE };
        assert_eq!(decode_key("c", mods), KeyAction::PassThrough);
    }
}
