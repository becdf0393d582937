//! wsterm-conn エラー型

use alloc::string::String;

/// トランスポート操作のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// トランスポートの生成に失敗（URL 不正、ブラウザによる拒否など）
    Construction(String),
    /// 送信に失敗
    Send(String),
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportError::Construction(reason) => write!(f, "Failed to open transport: {}", reason),
            TransportError::Send(reason) => write!(f, "Failed to send frame: {}", reason),
        }
    }
}
