//! DOM への表示とイベントリスナー

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement};

use wsterm_session::{DisplaySink, Status, StatusReporter, Style};

pub const TERMINAL_ID: &str = "terminal";
pub const OUTPUT_ID: &str = "output";
pub const STATUS_INDICATOR_ID: &str = "status-indicator";
pub const STATUS_TEXT_ID: &str = "status-text";
pub const CLEAR_BUTTON_ID: &str = "clear-btn";
pub const INPUT_LINE_ID: &str = "input-line";

/// 接続中にインジケーターへ付けるクラス
const CONNECTED_CLASS: &str = "connected";

pub fn get_element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element not found: {}", id)))
}

pub fn get_html_element_by_id(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    get_element_by_id(document, id)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlElement: {}", id)))
}

/// 登録済みのイベントリスナー
///
/// drop すると登録を外す。
pub struct EventListener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new<F>(target: &EventTarget, kind: &'static str, callback: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(EventListener {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// `<span>` を追加していく出力表示
pub struct DomDisplay {
    document: Document,
    output: Element,
    /// スクロールする領域
    terminal: HtmlElement,
    /// Line モードの入力中の行（無ければ表示しない）
    input_line: Option<Element>,
}

impl DomDisplay {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        Ok(DomDisplay {
            document: document.clone(),
            output: get_element_by_id(document, OUTPUT_ID)?,
            terminal: get_html_element_by_id(document, TERMINAL_ID)?,
            input_line: document.get_element_by_id(INPUT_LINE_ID),
        })
    }

    /// Line モードの未送信行を表示する
    pub fn show_pending_line(&self, line: &str) {
        if let Some(el) = &self.input_line {
            el.set_text_content(Some(line));
        }
    }

    fn try_append(&self, text: &str, style: Style) -> Result<(), JsValue> {
        let span = self.document.create_element("span")?;
        if let Some(class) = style.class_name() {
            span.set_class_name(class);
        }
        span.set_text_content(Some(text));
        self.output.append_child(&span)?;
        Ok(())
    }
}

impl DisplaySink for DomDisplay {
    fn append(&mut self, text: &str, style: Style) {
        if let Err(e) = self.try_append(text, style) {
            log::warn!("failed to append output: {:?}", e);
        }
    }

    fn clear(&mut self) {
        self.output.set_inner_html("");
    }

    fn scroll_to_end(&mut self) {
        self.terminal.set_scroll_top(self.terminal.scroll_height());
    }

    fn focus(&mut self) {
        if let Err(e) = self.terminal.focus() {
            log::debug!("failed to focus terminal: {:?}", e);
        }
    }
}

/// 接続インジケーターとフェーズ文字列
pub struct DomStatus {
    indicator: Element,
    text: Element,
}

impl DomStatus {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        Ok(DomStatus {
            indicator: get_element_by_id(document, STATUS_INDICATOR_ID)?,
            text: get_element_by_id(document, STATUS_TEXT_ID)?,
        })
    }
}

impl StatusReporter for DomStatus {
    fn report(&mut self, status: &Status) {
        let classes = self.indicator.class_list();
        let result = if status.is_connected() {
            classes.add_1(CONNECTED_CLASS)
        } else {
            classes.remove_1(CONNECTED_CLASS)
        };
        if let Err(e) = result {
            log::warn!("failed to update status indicator: {:?}", e);
        }
        self.text.set_text_content(Some(&status.phase()));
    }
}
