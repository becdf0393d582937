//! 状態機械が使う I/O の境界

use crate::error::TransportError;

/// 接続の世代番号
///
/// `connect()` のたびに単調増加する。コールバックはこの値で識別し、
/// 古い世代のものは無視される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub const INITIAL: Self = Epoch(0);

    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for Epoch {
    fn from(val: u64) -> Self {
        Epoch(val)
    }
}

/// 開いたトランスポート 1 本
///
/// 所有者は [`ConnectionMachine`](crate::ConnectionMachine) だけ。
pub trait Transport {
    /// 1 フレームを送信する。フレームは分割されない
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// 接続を閉じる。以後このトランスポートのコールバックは届いても無視される
    fn close(&mut self);
}

/// トランスポートの生成
///
/// 実装は生成したトランスポートの open / message / error / close を
/// `epoch` 付きで状態機械の `on_*` に届ける責任を持つ。
pub trait Connector {
    type Transport: Transport;

    /// 接続を開始する
    ///
    /// # エラー
    /// - `TransportError::Construction`: 同期的な生成失敗。
    ///   状態機械はこれを即時の `Closed` として扱う
    fn open(&mut self, url: &str, epoch: Epoch) -> Result<Self::Transport, TransportError>;
}

/// 再接続タイマー
///
/// 期限が来たら実装は `on_retry_timer(epoch)` を呼ぶ。
/// 一度に保留されるタイマーは高々 1 つ（状態機械が保証する）。
pub trait Scheduler {
    /// キャンセル用のハンドル
    type Handle;

    fn schedule(&mut self, delay_ms: u32, epoch: Epoch) -> Self::Handle;

    fn cancel(&mut self, handle: Self::Handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_monotonic() {
        let e0 = Epoch::INITIAL;
        let e1 = e0.next();
        let e2 = e1.next();
        assert!(e0 < e1 && e1 < e2);
        assert_eq!(e2.raw(), 2);
    }
}
