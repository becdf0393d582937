//! 接続ライフサイクル状態機械
//!
//! トランスポートの所有、エポックによる古いコールバックの排除、
//! 再接続タイマーの管理を担当する。表示やステータス更新は行わず、
//! 起きたことを [`ConnectionEvent`] の列として呼び出し側に返す。

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::Serialize;

use crate::error::TransportError;
use crate::policy::ReconnectPolicy;
use crate::transport::{Connector, Epoch, Scheduler, Transport};

/// `Closed` に至った理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// ネットワーク側の切断・生成失敗。再接続の対象
    Network,
    /// ユーザーによる `close()`。再接続しない
    UserInitiated,
}

/// 接続状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed(CloseReason),
}

/// 状態機械が呼び出し側に通知する出来事
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// 新しい接続を開始した
    Connecting { url: String, epoch: Epoch },
    /// トランスポートの生成に同期失敗した（直後に `Closed` が続く）
    ConstructionFailed(String),
    /// 接続が開いた
    Connected,
    /// 受信データ（解釈せずそのまま）
    Received(Vec<u8>),
    /// 実行時エラー。単独では致命的ではなく、必ず `Closed` が後に続く
    TransportError(String),
    Closed { reason: CloseReason },
    /// 再接続を予約した
    RetryScheduled { attempt: u32, max_attempts: u32, delay_ms: u32 },
    /// 再接続の上限に達した。リセットされるまで一度だけ通知する
    Exhausted { max_attempts: u32 },
}

/// `send()` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// `Open` 以外の状態だったので破棄した（バッファリングはしない）
    Dropped,
    Failed(TransportError),
}

/// 接続統計（JS へは camelCase の JSON で渡す）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStats {
    /// 現在のエポック
    pub epoch: u64,
    /// 現在の再接続試行回数
    pub attempt: u32,
    pub max_attempts: u32,
    /// 接続開始の総回数（生成失敗を含む）
    pub connects_started: u64,
    /// `Open` に到達した回数
    pub connections_opened: u64,
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// 保留中の再接続タイマー
struct PendingRetry<H> {
    /// 予約したときのエポック
    epoch: Epoch,
    handle: H,
}

/// 接続状態機械
///
/// ## 不変条件
/// - トランスポートを保持するのは `Connecting` / `Open` の間だけ
/// - 保留中の再接続タイマーは高々 1 つ
/// - 現在のエポックと異なるコールバックは状態を変えない
///
/// ## スレッド安全性
///
/// シングルスレッドの協調実行を前提とする（ロックは持たない）。
pub struct ConnectionMachine<C: Connector, S: Scheduler> {
    connector: C,
    scheduler: S,
    url: String,
    state: ConnectionState,
    policy: ReconnectPolicy,
    epoch: Epoch,
    transport: Option<C::Transport>,
    pending_retry: Option<PendingRetry<S::Handle>>,
    /// `Exhausted` を通知済みか（重複通知の防止）
    exhausted_reported: bool,
    stats: ConnectionStats,
}

impl<C: Connector, S: Scheduler> ConnectionMachine<C, S> {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy, connector: C, scheduler: S) -> Self {
        ConnectionMachine {
            connector,
            scheduler,
            url: url.into(),
            state: ConnectionState::Idle,
            policy,
            epoch: Epoch::INITIAL,
            transport: None,
            pending_retry: None,
            exhausted_reported: false,
            stats: ConnectionStats::default(),
        }
    }

    /// 接続を開始する
    ///
    /// `Connecting` / `Open` のときは何もしない。
    /// ユーザーによる切断後や枯渇状態からの呼び出しは明示的なリセットとして扱い、ポリシーを戻す。
    /// 生成に失敗しても例外にはせず、即時の `Closed(Network)` として再試行経路に乗せる。
    pub fn connect(&mut self) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {
                log::debug!("connect() ignored: already {:?}", self.state);
            }
            ConnectionState::Idle | ConnectionState::Closed(_) => {
                if self.policy.is_exhausted()
                    || self.state == ConnectionState::Closed(CloseReason::UserInitiated)
                {
                    self.reset_policy();
                }
                self.start_attempt(&mut events);
            }
        }
        events
    }

    /// 手動再接続
    ///
    /// 現在の接続があれば `Closed(UserInitiated)` を通知して再試行なしで捨て、
    /// ポリシーをリセットして接続し直す。
    pub fn reconnect(&mut self) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        if matches!(self.state, ConnectionState::Connecting | ConnectionState::Open) {
            self.cancel_retry();
            self.drop_transport();
            log::info!("replacing connection (epoch {})", self.epoch.raw());
            self.state = ConnectionState::Closed(CloseReason::UserInitiated);
            events.push(ConnectionEvent::Closed {
                reason: CloseReason::UserInitiated,
            });
        }
        self.reset_policy();
        self.start_attempt(&mut events);
        events
    }

    /// フレームを送信する
    ///
    /// `Open` 以外では黙って破棄する。後で送り直すことはしない。
    pub fn send(&mut self, frame: &[u8]) -> Delivery {
        let (ConnectionState::Open, Some(transport)) = (self.state, self.transport.as_mut()) else {
            self.stats.frames_dropped += 1;
            log::debug!("dropping {}-byte frame while {:?}", frame.len(), self.state);
            return Delivery::Dropped;
        };

        match transport.send(frame) {
            Ok(()) => {
                self.stats.frames_sent += 1;
                self.stats.bytes_sent += frame.len() as u64;
                Delivery::Sent
            }
            Err(e) => {
                log::error!("send failed on epoch {}: {}", self.epoch.raw(), e);
                Delivery::Failed(e)
            }
        }
    }

    /// ユーザーによる切断
    ///
    /// 保留中の再接続タイマーをキャンセルし、再試行なしで `Closed(UserInitiated)` にする。
    pub fn close(&mut self) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        self.cancel_retry();
        self.drop_transport();

        match self.state {
            ConnectionState::Idle | ConnectionState::Closed(CloseReason::UserInitiated) => {}
            ConnectionState::Connecting
            | ConnectionState::Open
            | ConnectionState::Closed(CloseReason::Network) => {
                log::info!("connection closed by user (epoch {})", self.epoch.raw());
                self.state = ConnectionState::Closed(CloseReason::UserInitiated);
                events.push(ConnectionEvent::Closed {
                    reason: CloseReason::UserInitiated,
                });
            }
        }
        events
    }

    /// クライアント破棄時の後始末。`Idle` に戻す
    pub fn shutdown(&mut self) {
        self.cancel_retry();
        self.drop_transport();
        self.reset_policy();
        self.state = ConnectionState::Idle;
    }

    // ===== トランスポート / タイマーからのコールバック =====

    /// トランスポートの接続完了
    pub fn on_open(&mut self, epoch: Epoch) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        if self.is_stale(epoch, "open") {
            return events;
        }
        if self.state != ConnectionState::Connecting {
            log::debug!("open ignored in state {:?}", self.state);
            return events;
        }

        log::info!("connection open (epoch {})", epoch.raw());
        self.state = ConnectionState::Open;
        self.reset_policy();
        self.stats.connections_opened += 1;
        events.push(ConnectionEvent::Connected);
        events
    }

    /// 受信データ
    pub fn on_message(&mut self, epoch: Epoch, chunk: Vec<u8>) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        if self.is_stale(epoch, "message") {
            return events;
        }
        if self.state != ConnectionState::Open {
            log::debug!("message ignored in state {:?}", self.state);
            return events;
        }

        self.stats.bytes_received += chunk.len() as u64;
        events.push(ConnectionEvent::Received(chunk));
        events
    }

    /// 実行時エラー（この後に `on_close` が来る前提。ここでは遷移しない）
    pub fn on_error(&mut self, epoch: Epoch, info: &str) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        if self.is_stale(epoch, "error") {
            return events;
        }
        if matches!(self.state, ConnectionState::Connecting | ConnectionState::Open) {
            log::error!("transport error on epoch {}: {}", epoch.raw(), info);
            events.push(ConnectionEvent::TransportError(info.to_string()));
        }
        events
    }

    /// トランスポートの切断（ネットワーク起因）
    pub fn on_close(&mut self, epoch: Epoch) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        if self.is_stale(epoch, "close") {
            return events;
        }
        if matches!(self.state, ConnectionState::Connecting | ConnectionState::Open) {
            self.transport = None;
            self.enter_closed(CloseReason::Network, &mut events);
        }
        events
    }

    /// 再接続タイマーの発火
    pub fn on_retry_timer(&mut self, epoch: Epoch) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        let due = matches!(&self.pending_retry, Some(p) if p.epoch == epoch)
            && self.state == ConnectionState::Closed(CloseReason::Network);
        if !due {
            log::debug!("ignoring stale retry timer for epoch {}", epoch.raw());
            return events;
        }

        // 発火済みなのでキャンセル不要。ハンドルはここで捨てる
        self.pending_retry = None;
        self.start_attempt(&mut events);
        events
    }

    // ===== 参照 =====

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// 再接続タイマーが保留中か
    pub fn has_pending_retry(&self) -> bool {
        self.pending_retry.is_some()
    }

    pub fn stats(&self) -> ConnectionStats {
        ConnectionStats {
            epoch: self.epoch.raw(),
            attempt: self.policy.attempt(),
            max_attempts: self.policy.max_attempts(),
            ..self.stats.clone()
        }
    }

    // ===== Private メソッド =====

    /// 新しいエポックで接続を開始する
    fn start_attempt(&mut self, events: &mut Vec<ConnectionEvent>) {
        self.cancel_retry();
        self.drop_transport();

        self.epoch = self.epoch.next();
        self.state = ConnectionState::Connecting;
        self.stats.connects_started += 1;
        log::info!("connecting to {} (epoch {})", self.url, self.epoch.raw());
        events.push(ConnectionEvent::Connecting {
            url: self.url.clone(),
            epoch: self.epoch,
        });

        match self.connector.open(&self.url, self.epoch) {
            Ok(transport) => self.transport = Some(transport),
            Err(e) => {
                log::warn!("{}", e);
                events.push(ConnectionEvent::ConstructionFailed(e.to_string()));
                self.enter_closed(CloseReason::Network, events);
            }
        }
    }

    /// `Closed` に遷移し、理由がネットワークなら再試行を予約する
    fn enter_closed(&mut self, reason: CloseReason, events: &mut Vec<ConnectionEvent>) {
        log::info!("connection closed ({:?}, epoch {})", reason, self.epoch.raw());
        self.state = ConnectionState::Closed(reason);
        events.push(ConnectionEvent::Closed { reason });

        if reason == CloseReason::UserInitiated {
            return;
        }

        match self.policy.next_retry() {
            Some(delay_ms) => {
                self.cancel_retry();
                let handle = self.scheduler.schedule(delay_ms, self.epoch);
                self.pending_retry = Some(PendingRetry {
                    epoch: self.epoch,
                    handle,
                });
                events.push(ConnectionEvent::RetryScheduled {
                    attempt: self.policy.attempt(),
                    max_attempts: self.policy.max_attempts(),
                    delay_ms,
                });
            }
            None => {
                if !self.exhausted_reported {
                    self.exhausted_reported = true;
                    log::warn!(
                        "giving up after {} reconnect attempts",
                        self.policy.max_attempts()
                    );
                    events.push(ConnectionEvent::Exhausted {
                        max_attempts: self.policy.max_attempts(),
                    });
                }
            }
        }
    }

    fn cancel_retry(&mut self) {
        if let Some(pending) = self.pending_retry.take() {
            self.scheduler.cancel(pending.handle);
        }
    }

    fn drop_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }

    fn reset_policy(&mut self) {
        self.policy.reset();
        self.exhausted_reported = false;
    }

    fn is_stale(&self, epoch: Epoch, what: &str) -> bool {
        if epoch != self.epoch {
            log::debug!(
                "ignoring stale {} callback (epoch {}, current {})",
                what,
                epoch.raw(),
                self.epoch.raw()
            );
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockConnector, MockScheduler};

    const URL: &str = "ws://localhost:8080/ws";

    type Machine = ConnectionMachine<MockConnector, MockScheduler>;

    fn machine(max_attempts: u32) -> (Machine, MockConnector, MockScheduler) {
        let connector = MockConnector::new();
        let scheduler = MockScheduler::new();
        let policy = ReconnectPolicy::new(max_attempts, 1000, 30_000, 2);
        let m = ConnectionMachine::new(URL, policy, connector.clone(), scheduler.clone());
        (m, connector, scheduler)
    }

    /// 接続して Open まで進める
    fn open(m: &mut Machine) {
        m.connect();
        let epoch = m.epoch();
        m.on_open(epoch);
        assert_eq!(m.state(), ConnectionState::Open);
    }

    /// 現在の接続をネットワーク切断させ、予約されたタイマーを発火させる
    fn drop_and_fire(m: &mut Machine, scheduler: &MockScheduler) -> u32 {
        m.on_close(m.epoch());
        let timer = scheduler.timers.borrow_mut().fire().expect("retry should be scheduled");
        m.on_retry_timer(timer.epoch);
        timer.delay_ms
    }

    #[test]
    fn test_new_machine_is_idle() {
        let (m, _, _) = machine(5);
        assert_eq!(m.state(), ConnectionState::Idle);
        assert_eq!(m.epoch(), Epoch::INITIAL);
        assert!(!m.has_pending_retry());
    }

    #[test]
    fn test_connect_then_open() {
        let (mut m, connector, _) = machine(5);
        let events = m.connect();
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert_eq!(
            events,
            alloc::vec![ConnectionEvent::Connecting {
                url: URL.to_string(),
                epoch: Epoch::from(1),
            }]
        );
        assert_eq!(connector.net.borrow().opened.len(), 1);

        let events = m.on_open(m.epoch());
        assert_eq!(events, alloc::vec![ConnectionEvent::Connected]);
        assert!(m.is_open());
    }

    #[test]
    fn test_connect_while_connecting_is_ignored() {
        let (mut m, connector, _) = machine(5);
        m.connect();
        let events = m.connect();
        assert!(events.is_empty());
        assert_eq!(connector.net.borrow().opened.len(), 1);
        assert_eq!(m.epoch(), Epoch::from(1));
    }

    #[test]
    fn test_attempt_increments_by_one_until_exhausted() {
        let (mut m, _, scheduler) = machine(3);
        m.connect();

        for expected in 1..=3u32 {
            let events = m.on_close(m.epoch());
            assert_eq!(m.policy().attempt(), expected);
            assert!(events.iter().any(|e| matches!(
                e,
                ConnectionEvent::RetryScheduled { attempt, .. } if *attempt == expected
            )));
            let timer = scheduler.timers.borrow_mut().fire().unwrap();
            m.on_retry_timer(timer.epoch);
            assert_eq!(m.state(), ConnectionState::Connecting);
        }

        // attempt == max_attempts: もう予約しない
        let events = m.on_close(m.epoch());
        assert_eq!(m.policy().attempt(), 3);
        assert!(!m.has_pending_retry());
        assert!(scheduler.timers.borrow().live.is_empty());
        assert!(events.contains(&ConnectionEvent::Exhausted { max_attempts: 3 }));
        assert_eq!(m.state(), ConnectionState::Closed(CloseReason::Network));
    }

    #[test]
    fn test_exhausted_reported_once() {
        let (mut m, connector, _) = machine(0);
        m.connect();
        let first = m.on_close(m.epoch());
        assert!(first.contains(&ConnectionEvent::Exhausted { max_attempts: 0 }));

        // 遅れて届いた close は状態を変えず、再通知もしない
        let second = m.on_close(m.epoch());
        assert!(second.is_empty());
        assert_eq!(connector.net.borrow().opened.len(), 1);
    }

    #[test]
    fn test_attempt_resets_after_open() {
        let (mut m, _, scheduler) = machine(10);
        m.connect();

        // 3 回切断
        let delays: alloc::vec::Vec<u32> = (0..3).map(|_| drop_and_fire(&mut m, &scheduler)).collect();
        assert_eq!(delays, alloc::vec![1000, 2000, 4000]);
        assert_eq!(m.policy().attempt(), 3);

        // 再接続成功
        m.on_open(m.epoch());
        assert_eq!(m.policy().attempt(), 0);

        // 再び切断: attempt=1 の待ち時間になる（attempt=4 ではない）
        let delay = drop_and_fire(&mut m, &scheduler);
        assert_eq!(delay, 1000);
    }

    #[test]
    fn test_send_dropped_unless_open() {
        let (mut m, connector, _) = machine(5);

        assert_eq!(m.send(b"x"), Delivery::Dropped);
        assert_eq!(m.state(), ConnectionState::Idle);

        m.connect();
        assert_eq!(m.send(b"x"), Delivery::Dropped);
        assert_eq!(m.state(), ConnectionState::Connecting);

        m.on_close(m.epoch());
        assert_eq!(m.send(b"x"), Delivery::Dropped);
        assert_eq!(m.state(), ConnectionState::Closed(CloseReason::Network));

        assert!(connector.net.borrow().sent.is_empty());
        assert_eq!(m.stats().frames_dropped, 3);
    }

    #[test]
    fn test_send_when_open() {
        let (mut m, connector, _) = machine(5);
        open(&mut m);
        assert_eq!(m.send(b"ls\n"), Delivery::Sent);
        assert_eq!(connector.net.borrow().sent, alloc::vec![b"ls\n".to_vec()]);

        let stats = m.stats();
        assert_eq!(stats.frames_sent, 1);
        assert_eq!(stats.bytes_sent, 3);
    }

    #[test]
    fn test_send_failure_reported_without_transition() {
        let (mut m, connector, _) = machine(5);
        open(&mut m);
        connector.net.borrow_mut().fail_sends = true;

        let result = m.send(b"a");
        assert!(matches!(result, Delivery::Failed(TransportError::Send(_))));
        assert!(m.is_open());
    }

    #[test]
    fn test_stale_callbacks_ignored() {
        let (mut m, _, scheduler) = machine(5);
        m.connect();
        let old_epoch = m.epoch();

        // 古い接続が切れて再接続が始まる
        m.on_close(old_epoch);
        let timer = scheduler.timers.borrow_mut().fire().unwrap();
        m.on_retry_timer(timer.epoch);
        assert_ne!(m.epoch(), old_epoch);
        assert_eq!(m.state(), ConnectionState::Connecting);

        // 古いエポックからの遅延コールバック
        assert!(m.on_open(old_epoch).is_empty());
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert!(m.on_message(old_epoch, b"late".to_vec()).is_empty());
        assert!(m.on_error(old_epoch, "late").is_empty());
        assert!(m.on_close(old_epoch).is_empty());
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert_eq!(m.policy().attempt(), 1);
    }

    #[test]
    fn test_construction_failure_takes_retry_path() {
        let (mut m, connector, scheduler) = machine(5);
        connector.net.borrow_mut().fail_opens = 1;

        let events = m.connect();
        assert!(matches!(events[1], ConnectionEvent::ConstructionFailed(_)));
        assert_eq!(
            events[2],
            ConnectionEvent::Closed {
                reason: CloseReason::Network
            }
        );
        assert_eq!(m.state(), ConnectionState::Closed(CloseReason::Network));
        assert_eq!(scheduler.timers.borrow().live.len(), 1);

        // 次の試行は成功する
        let timer = scheduler.timers.borrow_mut().fire().unwrap();
        m.on_retry_timer(timer.epoch);
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert_eq!(connector.net.borrow().opened.len(), 1);
    }

    #[test]
    fn test_user_close_does_not_retry() {
        let (mut m, connector, scheduler) = machine(5);
        open(&mut m);
        let epoch = m.epoch();

        let events = m.close();
        assert_eq!(
            events,
            alloc::vec![ConnectionEvent::Closed {
                reason: CloseReason::UserInitiated
            }]
        );
        assert_eq!(m.state(), ConnectionState::Closed(CloseReason::UserInitiated));
        assert_eq!(connector.net.borrow().closed, alloc::vec![epoch]);
        assert!(scheduler.timers.borrow().history.is_empty());

        // トランスポートからの close が後から届いても再試行しない
        assert!(m.on_close(epoch).is_empty());
        assert!(!m.has_pending_retry());
    }

    #[test]
    fn test_user_close_cancels_pending_retry() {
        let (mut m, _, scheduler) = machine(5);
        m.connect();
        let epoch = m.epoch();
        m.on_close(epoch);
        assert!(m.has_pending_retry());

        m.close();
        assert!(!m.has_pending_retry());
        assert!(scheduler.timers.borrow().live.is_empty());
        assert_eq!(scheduler.timers.borrow().cancelled.len(), 1);

        // キャンセルをすり抜けたタイマーが発火しても接続しない
        assert!(m.on_retry_timer(epoch).is_empty());
        assert_eq!(m.state(), ConnectionState::Closed(CloseReason::UserInitiated));
    }

    #[test]
    fn test_single_outstanding_timer() {
        let (mut m, _, scheduler) = machine(5);
        m.connect();
        m.on_close(m.epoch());
        assert_eq!(scheduler.timers.borrow().live.len(), 1);

        // タイマー待ちの間に手動 connect() すると古いタイマーはキャンセルされる
        m.connect();
        assert!(scheduler.timers.borrow().live.is_empty());
        m.on_close(m.epoch());
        assert_eq!(scheduler.timers.borrow().live.len(), 1);
    }

    #[test]
    fn test_connect_after_exhaustion_resets_policy() {
        let (mut m, _, _) = machine(0);
        m.connect();
        m.on_close(m.epoch());
        assert!(m.policy().is_exhausted());

        let events = m.connect();
        assert!(matches!(events[0], ConnectionEvent::Connecting { .. }));
        // max_attempts = 0 なので再び即枯渇し、もう一度だけ通知される
        let events = m.on_close(m.epoch());
        assert!(events.contains(&ConnectionEvent::Exhausted { max_attempts: 0 }));
    }

    #[test]
    fn test_reconnect_from_closed_emits_no_extra_close() {
        let (mut m, _, _) = machine(5);
        m.connect();
        m.on_close(m.epoch());

        let events = m.reconnect();
        assert!(matches!(events[0], ConnectionEvent::Connecting { .. }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, ConnectionEvent::Closed { .. })));
    }

    #[test]
    fn test_connect_after_user_close_resets_policy() {
        let (mut m, _, scheduler) = machine(5);
        m.connect();
        for _ in 0..3 {
            drop_and_fire(&mut m, &scheduler);
        }
        assert_eq!(m.policy().attempt(), 3);

        m.close();
        m.connect();
        assert_eq!(m.policy().attempt(), 0, "ユーザー切断後の接続は 1 回目から数え直す");

        let events = m.on_close(m.epoch());
        assert!(events.contains(&ConnectionEvent::RetryScheduled {
            attempt: 1,
            max_attempts: 5,
            delay_ms: 1000,
        }));
    }

    #[test]
    fn test_reconnect_replaces_open_connection() {
        let (mut m, connector, _) = machine(5);
        open(&mut m);
        let old_epoch = m.epoch();

        let events = m.reconnect();
        assert_eq!(
            events[0],
            ConnectionEvent::Closed {
                reason: CloseReason::UserInitiated
            },
            "置き換える前の接続が閉じたことを通知する"
        );
        assert!(matches!(events[1], ConnectionEvent::Connecting { .. }));
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert_eq!(connector.net.borrow().closed, alloc::vec![old_epoch]);

        // 古い接続の close は無視される
        assert!(m.on_close(old_epoch).is_empty());
        assert_eq!(m.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_message_forwarded_verbatim() {
        let (mut m, _, _) = machine(5);
        open(&mut m);
        let chunk = alloc::vec![0x1b, b'[', b'0', b'm', 0xff];
        let events = m.on_message(m.epoch(), chunk.clone());
        assert_eq!(events, alloc::vec![ConnectionEvent::Received(chunk)]);
        assert_eq!(m.stats().bytes_received, 5);
    }

    #[test]
    fn test_error_does_not_transition() {
        let (mut m, _, _) = machine(5);
        open(&mut m);
        let events = m.on_error(m.epoch(), "reset by peer");
        assert_eq!(
            events,
            alloc::vec![ConnectionEvent::TransportError("reset by peer".to_string())]
        );
        assert!(m.is_open());
    }

    #[test]
    fn test_shutdown_returns_to_idle() {
        let (mut m, connector, _) = machine(5);
        open(&mut m);
        m.shutdown();
        assert_eq!(m.state(), ConnectionState::Idle);
        assert_eq!(connector.net.borrow().closed.len(), 1);
    }
}
