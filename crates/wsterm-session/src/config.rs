//! クライアント設定とエンドポイント URL の組み立て

use alloc::format;
use alloc::string::{String, ToString};

use serde::Deserialize;

use wsterm_conn::{
    ReconnectPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY_MS,
};
use wsterm_input::{InputMode, DEFAULT_MAX_LINE_LEN};

use crate::error::ConfigError;
use crate::DEFAULT_ENDPOINT_PATH;

/// クライアント設定
///
/// JS から JSON で渡す。省略したフィールドは既定値になる。
///
/// ```json
/// { "mode": "line", "maxAttempts": 5, "baseDelayMs": 2000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientConfig {
    /// 入力モード（`"raw"` / `"line"`）
    pub mode: InputMode,
    /// 再接続の最大試行回数（0 なら再接続しない）
    pub max_attempts: u32,
    /// 最初の再接続までの待ち時間（ミリ秒）
    pub base_delay_ms: u32,
    /// 待ち時間の上限（ミリ秒）
    pub max_delay_ms: u32,
    pub backoff_multiplier: u32,
    /// ページと同じホスト上のエンドポイントパス
    pub endpoint_path: String,
    /// Line モードの行バッファ上限（バイト）
    pub max_line_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            mode: InputMode::Raw,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl ClientConfig {
    /// JSON 文字列から読み込み、検証する
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_delay_ms == 0 || self.max_delay_ms < self.base_delay_ms {
            return Err(ConfigError::InvalidDelay);
        }
        if self.backoff_multiplier == 0 {
            return Err(ConfigError::InvalidMultiplier);
        }
        if !self.endpoint_path.starts_with('/') {
            return Err(ConfigError::InvalidEndpointPath(self.endpoint_path.clone()));
        }
        if self.max_line_len == 0 {
            return Err(ConfigError::InvalidLineLength);
        }
        Ok(())
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.max_attempts,
            self.base_delay_ms,
            self.max_delay_ms,
            self.backoff_multiplier,
        )
    }

    /// ページの protocol / host からこの設定のエンドポイント URL を作る
    pub fn endpoint_url(&self, page_protocol: &str, host: &str) -> String {
        endpoint_url(page_protocol, host, &self.endpoint_path)
    }
}

/// WebSocket エンドポイント URL
///
/// ページが `https:` で読み込まれていれば `wss:`、それ以外は `ws:`。
pub fn endpoint_url(page_protocol: &str, host: &str, path: &str) -> String {
    let scheme = if page_protocol == "https:" { "wss:" } else { "ws:" };
    format!("{}//{}{}", scheme, host, path)
}
