//! Session Client 本体

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use wsterm_conn::{
    CloseReason, ConnectionEvent, ConnectionMachine, ConnectionState, ConnectionStats, Connector,
    Delivery, Epoch, Scheduler,
};
use wsterm_input::{decode_key, InputEncoder, InputEvent, InputMode, KeyAction, KeyModifiers};

use crate::config::ClientConfig;
use crate::display::{DisplaySink, Status, StatusReporter, Style};
use crate::utf8::Utf8Assembler;

/// 1 つの入力イベントを処理した結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// フレームを送信した
    Sent,
    /// Line モードのローカルバッファだけが変化した
    Buffered,
    /// 接続が `Open` でなかったので破棄した
    Dropped,
    /// 送信に失敗した（表示先にエラー行を出した）
    Failed,
}

/// ターミナルセッションクライアント
///
/// ## 内部アーキテクチャ
///
/// ```text
/// SessionClient
///   ├── InputEncoder      (wsterm-input) - キー → フレーム、Line モードの行バッファ
///   ├── ConnectionMachine (wsterm-conn)  - 接続状態・再接続・エポック
///   ├── Utf8Assembler                    - 受信バイト列 → 表示テキスト
///   ├── DisplaySink                      - 出力表示
///   └── StatusReporter                   - 接続インジケーター
/// ```
///
/// トランスポートとタイマーのコールバックは、そのエポックを付けて
/// `on_*` メソッドに届ける。
pub struct SessionClient<C, S, D, R>
where
    C: Connector,
    S: Scheduler,
    D: DisplaySink,
    R: StatusReporter,
{
    conn: ConnectionMachine<C, S>,
    encoder: InputEncoder,
    inbound: Utf8Assembler,
    display: D,
    status: R,
    last_status: Option<Status>,
}

impl<C, S, D, R> SessionClient<C, S, D, R>
where
    C: Connector,
    S: Scheduler,
    D: DisplaySink,
    R: StatusReporter,
{
    /// クライアントを組み立てる（まだ接続しない）
    ///
    /// # 引数
    /// - `config`: 検証済みの設定
    /// - `url`: 接続先（[`ClientConfig::endpoint_url`] で作ったもの）
    pub fn new(
        config: &ClientConfig,
        url: String,
        connector: C,
        scheduler: S,
        display: D,
        status: R,
    ) -> Self {
        SessionClient {
            conn: ConnectionMachine::new(url, config.reconnect_policy(), connector, scheduler),
            encoder: InputEncoder::new(config.mode, config.max_line_len),
            inbound: Utf8Assembler::new(),
            display,
            status,
            last_status: None,
        }
    }

    /// 初期ステータスを出して接続を開始する
    pub fn start(&mut self) {
        self.report(Status::Disconnected);
        let events = self.conn.connect();
        self.dispatch(events);
    }

    /// ブラウザのキーイベントを処理する
    ///
    /// 入力として扱ったキーの後は末尾までスクロールする。
    ///
    /// # 戻り値
    /// デコード結果。`KeyAction::Event` のときだけ呼び出し側はデフォルト動作を止める。
    pub fn handle_key(&mut self, key: &str, mods: KeyModifiers) -> KeyAction {
        let action = decode_key(key, mods);
        if let KeyAction::Event(event) = action {
            self.handle_input(event);
            self.display.scroll_to_end();
        }
        action
    }

    /// 入力イベントをエンコードし、接続中なら送信する
    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        let Some(frame) = self.encoder.encode(event) else {
            return InputOutcome::Buffered;
        };

        match self.conn.send(frame.as_bytes()) {
            Delivery::Sent => InputOutcome::Sent,
            Delivery::Dropped => InputOutcome::Dropped,
            Delivery::Failed(e) => {
                self.display.append(&format!("[ERROR] {}\n", e), Style::Error);
                InputOutcome::Failed
            }
        }
    }

    /// ユーザーによる切断（再接続しない）
    pub fn close(&mut self) {
        let events = self.conn.close();
        self.dispatch(events);
    }

    /// 手動再接続（再接続ポリシーもリセットする）
    pub fn reconnect(&mut self) {
        let events = self.conn.reconnect();
        self.dispatch(events);
    }

    /// 表示をクリアする
    pub fn clear(&mut self) {
        self.display.clear();
        self.display.append("[INFO] Terminal cleared\n", Style::Info);
    }

    /// クライアント破棄時の後始末
    pub fn shutdown(&mut self) {
        self.conn.shutdown();
        self.encoder.clear_line();
        self.inbound.reset();
    }

    // ===== トランスポート / タイマーからのコールバック =====

    pub fn on_open(&mut self, epoch: Epoch) {
        let events = self.conn.on_open(epoch);
        self.dispatch(events);
    }

    pub fn on_message(&mut self, epoch: Epoch, chunk: Vec<u8>) {
        let events = self.conn.on_message(epoch, chunk);
        self.dispatch(events);
    }

    pub fn on_error(&mut self, epoch: Epoch, info: &str) {
        let events = self.conn.on_error(epoch, info);
        self.dispatch(events);
    }

    pub fn on_close(&mut self, epoch: Epoch) {
        let events = self.conn.on_close(epoch);
        self.dispatch(events);
    }

    pub fn on_retry_timer(&mut self, epoch: Epoch) {
        let events = self.conn.on_retry_timer(epoch);
        self.dispatch(events);
    }

    // ===== 参照 =====

    /// Line モードで未送信の入力行
    pub fn pending_line(&self) -> &str {
        self.encoder.pending_line()
    }

    pub fn mode(&self) -> InputMode {
        self.encoder.mode()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.conn.state()
    }

    pub fn epoch(&self) -> Epoch {
        self.conn.epoch()
    }

    pub fn stats(&self) -> ConnectionStats {
        self.conn.stats()
    }

    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn status_reporter(&self) -> &R {
        &self.status
    }

    // ===== Private メソッド =====

    fn dispatch(&mut self, events: Vec<ConnectionEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connecting { url, .. } => {
                self.inbound.reset();
                self.info(&format!("[INFO] Connecting to {}...\n", url));
            }
            ConnectionEvent::ConstructionFailed(reason) => {
                self.error(&format!("[ERROR] Failed: {}\n", reason));
            }
            ConnectionEvent::Connected => {
                self.info("[INFO] Connected to remote shell\n");
                self.report(Status::Connected);
                self.display.focus();
            }
            ConnectionEvent::Received(chunk) => {
                let text = self.inbound.push(&chunk);
                if !text.is_empty() {
                    self.display.append(&text, Style::Output);
                    self.display.scroll_to_end();
                }
            }
            ConnectionEvent::TransportError(_) => {
                self.error("[ERROR] WebSocket error\n");
            }
            ConnectionEvent::Closed { reason } => {
                match reason {
                    CloseReason::Network => self.info("[INFO] Connection closed\n"),
                    CloseReason::UserInitiated => self.info("[INFO] Connection closed by user\n"),
                }
                self.report(Status::Disconnected);
            }
            ConnectionEvent::RetryScheduled {
                attempt,
                max_attempts,
                delay_ms,
            } => {
                log::debug!("retry {}/{} in {} ms", attempt, max_attempts, delay_ms);
                self.info(&format!(
                    "[INFO] Reconnecting ({}/{})...\n",
                    attempt, max_attempts
                ));
                self.report(Status::Reconnecting {
                    attempt,
                    max_attempts,
                });
            }
            ConnectionEvent::Exhausted { max_attempts } => {
                self.error("[ERROR] Max reconnection attempts reached\n");
                self.report(Status::Exhausted { max_attempts });
            }
        }
    }

    fn info(&mut self, text: &str) {
        self.display.append(text, Style::Info);
    }

    fn error(&mut self, text: &str) {
        self.display.append(text, Style::Error);
    }

    /// 直前と同じステータスは再通知しない
    fn report(&mut self, status: Status) {
        if self.last_status == Some(status) {
            return;
        }
        self.last_status = Some(status);
        self.status.report(&status);
    }
}
