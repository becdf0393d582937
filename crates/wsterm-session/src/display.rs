//! 表示先とステータス表示のインターフェース

use alloc::format;
use alloc::string::String;

/// 表示行のスタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// シェル出力（スタイルなし）
    Output,
    Info,
    Error,
}

impl Style {
    /// 表示要素に付ける CSS クラス名
    pub fn class_name(&self) -> Option<&'static str> {
        match self {
            Style::Output => None,
            Style::Info => Some("info"),
            Style::Error => Some("error"),
        }
    }
}

/// 端末出力の表示先
pub trait DisplaySink {
    fn append(&mut self, text: &str, style: Style);

    fn clear(&mut self);

    fn scroll_to_end(&mut self);

    /// キー入力を受け付けるようにフォーカスする（接続確立時）
    fn focus(&mut self) {}
}

/// 接続状態の表示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Connected,
    Disconnected,
    Reconnecting { attempt: u32, max_attempts: u32 },
    /// 再接続を諦めた（手動操作が必要）
    Exhausted { max_attempts: u32 },
}

impl Status {
    /// インジケーターの接続/切断
    pub fn is_connected(&self) -> bool {
        matches!(self, Status::Connected)
    }

    /// 人が読むフェーズ文字列
    pub fn phase(&self) -> String {
        match self {
            Status::Connected => String::from("Connected"),
            Status::Disconnected => String::from("Disconnected"),
            Status::Reconnecting { attempt, max_attempts } => {
                format!("Reconnecting ({}/{})", attempt, max_attempts)
            }
            Status::Exhausted { .. } => String::from("Disconnected (reload to retry)"),
        }
    }
}

/// ステータス表示先（接続インジケーター + フェーズ文字列）
pub trait StatusReporter {
    fn report(&mut self, status: &Status);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_phase_strings() {
        assert_eq!(Status::Connected.phase(), "Connected");
        assert_eq!(Status::Disconnected.phase(), "Disconnected");
        assert_eq!(
            Status::Reconnecting { attempt: 2, max_attempts: 5 }.phase(),
            "Reconnecting (2/5)"
        );
        assert!(Status::Connected.is_connected());
        assert!(!Status::Exhausted { max_attempts: 5 }.is_connected());
    }

    #[test]
    fn test_style_class_names() {
        assert_eq!(Style::Output.class_name(), None);
        assert_eq!(Style::Info.class_name(), Some("info"));
        assert_eq!(Style::Error.class_name(), Some("error"));
    }
}
