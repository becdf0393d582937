//! 再接続ポリシー（指数バックオフ + 試行回数上限）

use crate::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS,
};

/// 再接続ポリシー
///
/// - `attempt` は `Open` への遷移で 0 に戻る
/// - 再試行を伴う `Closed` のたびに 1 だけ増える
/// - `attempt == max_attempts` になると枯渇状態。[`reset`](Self::reset) まで再試行しない
///
/// 待ち時間は `base * multiplier^(attempt - 1)` を `max_delay_ms` で頭打ちにする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    attempt: u32,
    max_attempts: u32,
    base_delay_ms: u32,
    max_delay_ms: u32,
    multiplier: u32,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u32, max_delay_ms: u32, multiplier: u32) -> Self {
        ReconnectPolicy {
            attempt: 0,
            max_attempts,
            base_delay_ms,
            max_delay_ms,
            multiplier,
        }
    }

    /// `attempt` 回目（1 始まり）の再試行までの待ち時間（ミリ秒）
    pub fn backoff_ms(&self, attempt: u32) -> u32 {
        let exp = attempt.saturating_sub(1);
        let factor = u64::from(self.multiplier).saturating_pow(exp);
        let delay = u64::from(self.base_delay_ms).saturating_mul(factor);
        // max_delay_ms は u32 なので min 後の値は必ず収まる
        delay.min(u64::from(self.max_delay_ms)) as u32
    }

    /// 次の再試行を予約する
    ///
    /// # 戻り値
    /// - `Some(delay_ms)`: `attempt` を 1 進めた上での待ち時間
    /// - `None`: 上限到達（`attempt` は変化しない）
    pub fn next_retry(&mut self) -> Option<u32> {
        if self.is_exhausted() {
            return None;
        }
        self.attempt += 1;
        Some(self.backoff_ms(self.attempt))
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_BASE_DELAY_MS,
            DEFAULT_MAX_DELAY_MS,
            DEFAULT_BACKOFF_MULTIPLIER,
        )
    }
}
