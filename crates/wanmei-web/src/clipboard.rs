//! The browser clipboard.

use async_trait::async_trait;
use wanmei_ui::ClipboardError;
use wanmei_ui::notify::Clipboard;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement, Window};

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

pub(crate) struct BrowserClipboard {
    window: Window,
}

impl BrowserClipboard {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }

    fn legacy(&self, text: &str) -> Result<(), JsValue> {
        let document = self
            .window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

        let area: HtmlTextAreaElement = document.create_element("textarea")?.dyn_into()?;
        area.set_value(text);
        area.set_attribute("style", "position: fixed; left: -999999px;")?;
        body.append_child(&area)?;
        area.select();

        let copied = document
            .dyn_into::<HtmlDocument>()
            .map_err(JsValue::from)
            .and_then(|html| html.exec_command("copy"));
        area.remove();
        match copied {
            Ok(true) => Ok(()),
            Ok(false) => Err(JsValue::from_str("copy command was not enabled")),
            Err(e) => Err(e),
        }
    }
}

#[async_trait(?Send)]
impl Clipboard for BrowserClipboard {
    /// `navigator.clipboard` is missing on insecure origins and old browsers.
    fn is_available(&self) -> bool {
        js_sys::Reflect::get(&self.window.navigator(), &JsValue::from_str("clipboard"))
            .is_ok_and(|clipboard| !clipboard.is_undefined() && !clipboard.is_null())
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let promise = self.window.navigator().clipboard().write_text(text);
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| ClipboardError::WriteRejected { reason: describe(&e) })
    }

    fn legacy_copy(&self, text: &str) -> Result<(), ClipboardError> {
        self.legacy(text)
            .map_err(|e| ClipboardError::LegacyCopyFailed { reason: describe(&e) })
    }
}
