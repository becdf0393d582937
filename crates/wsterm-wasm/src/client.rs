//! TerminalClient wasm-bindgen エクスポート
//!
//! ページから呼び出すターミナルクライアントの主エントリポイント。
//! WebSocket・タイマー・DOM を `SessionClient` に結び付ける。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;

use wsterm_input::{KeyAction, KeyModifiers};
use wsterm_session::{ClientConfig, SessionClient};

use crate::dom::{self, DomDisplay, DomStatus, EventListener};
use crate::keyboard::bind_keyboard;
use crate::timer::TimeoutScheduler;
use crate::transport::WebSocketConnector;
use crate::utils::{self, js_error_message};

/// ブラウザ実装を組み込んだセッション
pub type Session = SessionClient<WebSocketConnector, TimeoutScheduler, DomDisplay, DomStatus>;

/// コールバックが保持するセッションへの弱参照
///
/// `TerminalClient` が解放された後のコールバックは何もしない。
pub type WeakSession = Weak<RefCell<Session>>;

/// コールバックからセッションを操作する
///
/// セッションが解放済み、または処理中（再入）なら `None`。
pub fn with_session<R>(session: &WeakSession, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    let session = session.upgrade()?;
    let Ok(mut session) = session.try_borrow_mut() else {
        log::warn!("session busy, dropping callback");
        return None;
    };
    Some(f(&mut session))
}

/// ブラウザのターミナルクライアント
///
/// ## 内部アーキテクチャ
///
/// ```text
/// TerminalClient
///   ├── Rc<RefCell<Session>>
///   │     ├── WebSocketConnector → WebSocketTransport (web-sys)
///   │     ├── TimeoutScheduler   (gloo-timers)
///   │     ├── DomDisplay         (#output, #terminal, #input-line)
///   │     └── DomStatus          (#status-indicator, #status-text)
///   └── EventListener          (keydown / click)
/// ```
///
/// ## スレッド安全性
///
/// WASM はシングルスレッドのため `Rc<RefCell<..>>` で共有する。
/// WebSocket とタイマーのコールバックは弱参照だけを持つ。
#[wasm_bindgen]
pub struct TerminalClient {
    session: Rc<RefCell<Session>>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl TerminalClient {
    /// クライアントを初期化し、キーボードとボタンを DOM に結び付ける
    ///
    /// 接続は `start()` で開始する。
    ///
    /// # 引数
    /// - `config_json`: 設定の JSON（省略時は既定値）。
    ///   例: `{"mode":"line","maxAttempts":3}`
    ///
    /// # エラー
    /// - 設定 JSON が不正
    /// - 必要な DOM 要素が無い
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<TerminalClient, JsError> {
        crate::init_logging();

        let config = match config_json {
            Some(json) => ClientConfig::from_json(&json),
            None => Ok(ClientConfig::default()),
        }
        .map_err(|e| JsError::new(&e.to_string()))?;

        let document = utils::document().map_err(to_js_error)?;
        let display = DomDisplay::from_document(&document).map_err(to_js_error)?;
        let status = DomStatus::from_document(&document).map_err(to_js_error)?;
        let host = utils::page_host().map_err(to_js_error)?;
        let url = config.endpoint_url(&utils::page_protocol(), &host);
        log::info!("terminal client for {} ({:?} mode)", url, config.mode);

        let session = Rc::new_cyclic(|weak: &WeakSession| {
            RefCell::new(SessionClient::new(
                &config,
                url,
                WebSocketConnector::new(weak.clone()),
                TimeoutScheduler::new(weak.clone()),
                display,
                status,
            ))
        });

        let mut client = TerminalClient {
            session,
            listeners: Vec::new(),
        };
        client.bind(&document).map_err(to_js_error)?;
        Ok(client)
    }

    /// 接続を開始する
    pub fn start(&self) {
        self.session.borrow_mut().start();
        self.focus();
    }

    /// キー入力を処理する（`keydown` を使わずに入力を流すとき用）
    ///
    /// # 戻り値
    /// 入力として消費したら `true`（呼び出し側は `preventDefault` する）
    #[wasm_bindgen(js_name = "handleKey")]
    pub fn handle_key(&self, key: &str, ctrl: bool, alt: bool, meta: bool) -> bool {
        let mods = KeyModifiers { ctrl, alt, meta };
        let mut session = self.session.borrow_mut();
        let action = session.handle_key(key, mods);
        session.display().show_pending_line(session.pending_line());
        matches!(action, KeyAction::Event(_))
    }

    /// 表示をクリアする
    pub fn clear(&self) {
        self.session.borrow_mut().clear();
    }

    /// 切断する（自動再接続しない）
    pub fn close(&self) {
        self.session.borrow_mut().close();
    }

    /// 再接続の試行回数をリセットして接続し直す
    pub fn reconnect(&self) {
        self.session.borrow_mut().reconnect();
    }

    /// Line モードで未送信の行
    #[wasm_bindgen(js_name = "pendingLine")]
    pub fn pending_line(&self) -> String {
        self.session.borrow().pending_line().to_string()
    }

    #[wasm_bindgen(js_name = "isConnected")]
    pub fn is_connected(&self) -> bool {
        self.session.borrow().connection_state() == wsterm_conn::ConnectionState::Open
    }

    /// 接続統計を JSON 文字列で返す
    #[wasm_bindgen(js_name = "getStats")]
    pub fn get_stats(&self) -> Result<String, JsError> {
        let stats = self.session.borrow().stats();
        serde_json::to_string(&stats).map_err(|e| JsError::new(&e.to_string()))
    }

    /// リスナーを外し、接続とタイマーを破棄する
    pub fn dispose(&mut self) {
        self.listeners.clear();
        self.session.borrow_mut().shutdown();
    }
}

impl TerminalClient {
    fn bind(&mut self, document: &web_sys::Document) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.session);
        self.listeners.push(bind_keyboard(document, weak)?);

        let terminal = dom::get_html_element_by_id(document, dom::TERMINAL_ID)?;
        terminal.set_attribute("tabindex", "0")?;
        let focus_target = terminal.clone();
        self.listeners.push(EventListener::new(&terminal, "click", move |_| {
            let _ = focus_target.focus();
        })?);

        // クリアボタンは任意
        if let Some(button) = document.get_element_by_id(dom::CLEAR_BUTTON_ID) {
            let weak = Rc::downgrade(&self.session);
            self.listeners.push(EventListener::new(&button, "click", move |_| {
                with_session(&weak, |s| s.clear());
            })?);
        }
        Ok(())
    }

    fn focus(&self) {
        let terminal = utils::document()
            .and_then(|d| dom::get_html_element_by_id(&d, dom::TERMINAL_ID))
            .and_then(|t| t.focus());
        if let Err(e) = terminal {
            log::debug!("failed to focus terminal: {}", js_error_message(&e));
        }
    }
}

impl Drop for TerminalClient {
    fn drop(&mut self) {
        self.listeners.clear();
        if let Ok(mut session) = self.session.try_borrow_mut() {
            session.shutdown();
        }
    }
}

fn to_js_error(value: JsValue) -> JsError {
    JsError::new(&js_error_message(&value))
}
