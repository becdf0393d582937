//! WebSocket トランスポート（web-sys）
//!
//! 各コールバックは開いたときのエポックを持ち、セッションへ弱参照で届ける。
//! 古い接続のコールバックが遅れて届いても、状態機械がエポックで捨てる。

use js_sys::{ArrayBuffer, Uint8Array};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{BinaryType, CloseEvent, Event, MessageEvent, WebSocket};

use wsterm_conn::{Connector, Epoch, Transport, TransportError};

use crate::client::{with_session, WeakSession};
use crate::utils::js_error_message;

/// `new WebSocket(url)` でトランスポートを開くコネクター
pub struct WebSocketConnector {
    session: WeakSession,
}

impl WebSocketConnector {
    pub fn new(session: WeakSession) -> Self {
        WebSocketConnector { session }
    }
}

impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    fn open(&mut self, url: &str, epoch: Epoch) -> Result<WebSocketTransport, TransportError> {
        let socket = WebSocket::new(url)
            .map_err(|e| TransportError::Construction(js_error_message(&e)))?;
        socket.set_binary_type(BinaryType::Arraybuffer);

        let session = self.session.clone();
        let onopen = Closure::wrap(Box::new(move |_: Event| {
            with_session(&session, |s| s.on_open(epoch));
        }) as Box<dyn FnMut(Event)>);

        let session = self.session.clone();
        let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
            let Some(chunk) = message_bytes(&event) else {
                log::warn!("ignoring message with unsupported payload type");
                return;
            };
            with_session(&session, |s| s.on_message(epoch, chunk));
        }) as Box<dyn FnMut(MessageEvent)>);

        // WebSocket の error イベントには詳細が無い
        let session = self.session.clone();
        let onerror = Closure::wrap(Box::new(move |event: Event| {
            let info = event.type_();
            with_session(&session, |s| s.on_error(epoch, &info));
        }) as Box<dyn FnMut(Event)>);

        let session = self.session.clone();
        let onclose = Closure::wrap(Box::new(move |event: CloseEvent| {
            log::debug!(
                "socket closed (code {}, clean {})",
                event.code(),
                event.was_clean()
            );
            with_session(&session, |s| s.on_close(epoch));
        }) as Box<dyn FnMut(CloseEvent)>);

        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        Ok(WebSocketTransport {
            socket,
            _onopen: onopen,
            _onmessage: onmessage,
            _onerror: onerror,
            _onclose: onclose,
        })
    }
}

/// テキストフレームは UTF-8 バイト列、バイナリフレームはそのまま
fn message_bytes(event: &MessageEvent) -> Option<Vec<u8>> {
    let data = event.data();
    if let Some(text) = data.as_string() {
        return Some(text.into_bytes());
    }
    data.dyn_into::<ArrayBuffer>()
        .ok()
        .map(|buf| Uint8Array::new(&buf).to_vec())
}

/// 開いた WebSocket とそのコールバック
///
/// コールバックの `Closure` はこの構造体が持つ。drop でハンドラーを外してから閉じる。
pub struct WebSocketTransport {
    socket: WebSocket,
    _onopen: Closure<dyn FnMut(Event)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
}

impl WebSocketTransport {
    fn detach(&self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onerror(None);
        self.socket.set_onclose(None);
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        // サーバーはテキストフレームを読む。UTF-8 でないものだけバイナリで送る
        let result = match core::str::from_utf8(frame) {
            Ok(text) => self.socket.send_with_str(text),
            Err(_) => self.socket.send_with_u8_array(frame),
        };
        result.map_err(|e| TransportError::Send(js_error_message(&e)))
    }

    fn close(&mut self) {
        self.detach();
        if let Err(e) = self.socket.close() {
            log::debug!("socket close failed: {}", js_error_message(&e));
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        // 閉じた後の Closure 解放で JS 側から呼ばれないようにする
        self.detach();
    }
}
