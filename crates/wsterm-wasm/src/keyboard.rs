//! キーボード入力の接続

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{EventTarget, KeyboardEvent};

use wsterm_input::{KeyAction, KeyModifiers};

use crate::client::{with_session, WeakSession};
use crate::dom::EventListener;

/// `keydown` をセッションへ流すリスナーを登録する
///
/// 入力イベントに変換されたキーだけ `preventDefault` する。
/// F5 / F12 / Ctrl+R などはブラウザに任せる。
pub fn bind_keyboard(target: &EventTarget, session: WeakSession) -> Result<EventListener, JsValue> {
    EventListener::new(target, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let mods = KeyModifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
        };
        let key = event.key();

        let action = with_session(&session, |s| {
            let action = s.handle_key(&key, mods);
            s.display().show_pending_line(s.pending_line());
            action
        });
        if matches!(action, Some(KeyAction::Event(_))) {
            event.prevent_default();
        }
    })
}
