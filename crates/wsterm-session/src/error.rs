//! 設定エラー型

use alloc::string::String;

/// クライアント設定のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON として読めない
    Parse(String),
    /// baseDelayMs が 0、または maxDelayMs が baseDelayMs 未満
    InvalidDelay,
    /// backoffMultiplier が 0
    InvalidMultiplier,
    /// endpointPath が `/` で始まらない
    InvalidEndpointPath(String),
    /// maxLineLen が 0
    InvalidLineLength,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Invalid config JSON: {}", e),
            ConfigError::InvalidDelay => {
                write!(f, "Invalid reconnect delay (baseDelayMs must be > 0 and <= maxDelayMs)")
            }
            ConfigError::InvalidMultiplier => write!(f, "Invalid backoff multiplier (must be >= 1)"),
            ConfigError::InvalidEndpointPath(path) => {
                write!(f, "Invalid endpoint path: {:?} (must start with '/')", path)
            }
            ConfigError::InvalidLineLength => write!(f, "Invalid max line length (must be > 0)"),
        }
    }
}
