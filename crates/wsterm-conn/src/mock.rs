//! テスト用のモック I/O
//!
//! 実ネットワークもタイマーも使わず、状態機械が何を開き・送り・予約したかを
//! `Rc<RefCell<..>>` の記録から検証できるようにする。
//! コールバック（`on_open` など）はテスト側が明示的に呼ぶ。

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::error::TransportError;
use crate::transport::{Connector, Epoch, Scheduler, Transport};

/// モックネットワークの記録
#[derive(Debug, Default)]
pub struct MockNet {
    /// open されたエポックと URL
    pub opened: Vec<(Epoch, String)>,
    /// 送信されたフレーム
    pub sent: Vec<Vec<u8>>,
    /// close されたトランスポートのエポック
    pub closed: Vec<Epoch>,
    /// この回数だけ open を同期失敗させる
    pub fail_opens: u32,
    /// true の間 send を失敗させる
    pub fail_sends: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    pub net: Rc<RefCell<MockNet>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn open(&mut self, url: &str, epoch: Epoch) -> Result<MockTransport, TransportError> {
        let mut net = self.net.borrow_mut();
        if net.fail_opens > 0 {
            net.fail_opens -= 1;
            return Err(TransportError::Construction("mock: refused".to_string()));
        }
        net.opened.push((epoch, url.to_string()));
        Ok(MockTransport {
            epoch,
            net: self.net.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MockTransport {
    epoch: Epoch,
    net: Rc<RefCell<MockNet>>,
}

impl Transport for MockTransport {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let mut net = self.net.borrow_mut();
        if net.fail_sends {
            return Err(TransportError::Send("mock: broken pipe".to_string()));
        }
        net.sent.push(frame.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        self.net.borrow_mut().closed.push(self.epoch);
    }
}

/// モックタイマーのハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(pub u32);

/// 予約されたタイマー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTimer {
    pub id: TimerId,
    pub delay_ms: u32,
    pub epoch: Epoch,
}

/// モックタイマーの記録
#[derive(Debug, Default)]
pub struct MockTimers {
    /// 予約された全タイマー（履歴）
    pub history: Vec<ScheduledTimer>,
    /// まだ発火もキャンセルもされていないタイマー
    pub live: Vec<ScheduledTimer>,
    pub cancelled: Vec<TimerId>,
    next_id: u32,
}

impl MockTimers {
    /// 保留中のタイマーを 1 つ取り出す（発火させる）
    ///
    /// 取り出したタイマーの `epoch` で `on_retry_timer` を呼ぶのはテスト側。
    pub fn fire(&mut self) -> Option<ScheduledTimer> {
        self.live.pop()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockScheduler {
    pub timers: Rc<RefCell<MockTimers>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for MockScheduler {
    type Handle = TimerId;

    fn schedule(&mut self, delay_ms: u32, epoch: Epoch) -> TimerId {
        let mut timers = self.timers.borrow_mut();
        let id = TimerId(timers.next_id);
        timers.next_id += 1;
        let timer = ScheduledTimer { id, delay_ms, epoch };
        timers.history.push(timer);
        timers.live.push(timer);
        id
    }

    fn cancel(&mut self, handle: TimerId) {
        let mut timers = self.timers.borrow_mut();
        timers.live.retain(|t| t.id != handle);
        timers.cancelled.push(handle);
    }
}
