//! Applying [`Command`]s to the live document.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

use tracing::{debug, warn};
use wanmei_ui::dom::{Command, Element as Target, selector};
use wanmei_ui::notify::ToastSlot;
use wanmei_ui::timer::TimerToken;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, IntersectionObserver, ScrollBehavior, ScrollToOptions, Window};

use crate::layout::{REVEAL_INDEX_ATTR, closest, query_all};

/// `id` of the `<style>` holding the toast keyframes.
const KEYFRAMES_ID: &str = "wanmei-toast-keyframes";
const KEYFRAMES_NAME: &str = "wanmeiFadeInOut";

fn keyframes_css() -> String {
    format!(
        "@keyframes {KEYFRAMES_NAME} {{\n\
         0% {{ opacity: 0; transform: translateX(-50%) translateY(-10px); }}\n\
         15% {{ opacity: 1; transform: translateX(-50%) translateY(0); }}\n\
         85% {{ opacity: 1; transform: translateX(-50%) translateY(0); }}\n\
         100% {{ opacity: 0; transform: translateX(-50%) translateY(-10px); }}\n\
         }}"
    )
}

/// Inline style of a toast. The animation spans the slot's lifetime so the
/// fade-out ends as the element is removed.
fn toast_style(slot: ToastSlot) -> String {
    let mut css = String::from("position: fixed; left: 50%; transform: translateX(-50%); ");
    match slot {
        ToastSlot::Notification => css.push_str("top: 90px; background: #333; "),
        ToastSlot::DownloadTip => css.push_str("bottom: 40px; background: #1a56db; "),
    }
    css.push_str("color: white; padding: 12px 24px; border-radius: 8px; font-size: 14px; z-index: 9999; ");
    let _ = write!(
        css,
        "animation: {KEYFRAMES_NAME} {}ms ease-in-out forwards;",
        slot.lifetime_ms()
    );
    css
}

/// Owns the DOM side of the page: resolves logical elements, arms timers,
/// and keeps the reveal observer.
pub(crate) struct Renderer {
    window: Window,
    document: Document,
    /// Called with a token when its timer fires.
    on_timer: Rc<dyn Fn(TimerToken)>,
    timers: HashMap<TimerToken, i32>,
    observer: Option<IntersectionObserver>,
}

impl Renderer {
    pub(crate) fn new(window: Window, document: Document, on_timer: Rc<dyn Fn(TimerToken)>) -> Self {
        Self {
            window,
            document,
            on_timer,
            timers: HashMap::new(),
            observer: None,
        }
    }

    pub(crate) fn set_observer(&mut self, observer: IntersectionObserver) {
        self.observer = Some(observer);
    }

    /// Forget a timer that just fired.
    pub(crate) fn timer_fired(&mut self, token: TimerToken) {
        self.timers.remove(&token);
    }

    /// Apply `commands` in order. `event` is the DOM event being handled, if
    /// any; event commands without one are ignored.
    pub(crate) fn apply(&mut self, commands: Vec<Command>, event: Option<&Event>) {
        for command in commands {
            if let Err(e) = self.apply_one(command, event) {
                warn!(error = ?e, "render command failed");
            }
        }
    }

    fn apply_one(&mut self, command: Command, event: Option<&Event>) -> Result<(), JsValue> {
        match command {
            Command::AddClass { element, class } => {
                for node in self.resolve(&element) {
                    node.class_list().add_1(class)?;
                }
            }
            Command::RemoveClass { element, class } => {
                for node in self.resolve(&element) {
                    node.class_list().remove_1(class)?;
                }
            }
            Command::SetText { element, text } => {
                for node in self.resolve(&element) {
                    node.set_text_content(Some(&text));
                }
            }
            Command::ScrollTo { top } => {
                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(ScrollBehavior::Smooth);
                self.window.scroll_to_with_scroll_to_options(&options);
            }
            Command::Navigate { url } => self.window.location().set_href(&url)?,
            Command::ShowToast { slot, message } => self.show_toast(slot, &message)?,
            Command::HideToast { slot } => {
                if let Some(toast) = self.document.get_element_by_id(slot.element_id()) {
                    toast.remove();
                }
            }
            Command::StartTimer { token, delay_ms } => self.start_timer(token, delay_ms)?,
            Command::CancelTimer { token } => {
                if let Some(handle) = self.timers.remove(&token) {
                    self.window.clear_timeout_with_handle(handle);
                }
            }
            Command::Unobserve { card } => {
                if let (Some(observer), Some(node)) = (&self.observer, self.reveal_card(card)) {
                    observer.unobserve(&node);
                }
            }
            Command::PreventDefault => {
                if let Some(event) = event {
                    event.prevent_default();
                }
            }
            Command::StopPropagation => {
                if let Some(event) = event {
                    event.stop_propagation();
                }
            }
        }
        Ok(())
    }

    /// Every node a logical element stands for.
    pub(crate) fn resolve(&self, element: &Target) -> Vec<Element> {
        let first = |css: &str| -> Vec<Element> {
            self.document.query_selector(css).ok().flatten().into_iter().collect()
        };
        match element {
            Target::Header => first(selector::HEADER),
            Target::NavMenu => first(selector::NAV_MENU),
            Target::NavToggle => first(selector::NAV_TOGGLE),
            Target::NavLink(href) => query_all(&self.document, selector::NAV_LINK)
                .into_iter()
                .filter(|link| link.get_attribute("href").as_deref() == Some(href.as_str()))
                .collect(),
            Target::RevealCard(card) => self.reveal_card(*card).into_iter().collect(),
            Target::DownloadButton(os) => {
                query_all(&self.document, &format!(".btn-download[data-os=\"{os}\"]"))
            }
            Target::DownloadLabel(os) => {
                query_all(&self.document, &format!(".btn-download[data-os=\"{os}\"]"))
                    .iter()
                    .filter_map(|button| button.query_selector("span").ok().flatten())
                    .collect()
            }
            Target::DownloadDropdown => self
                .document
                .query_selector(selector::MAC_TRIGGER)
                .ok()
                .flatten()
                .and_then(|trigger| closest(&trigger, selector::DOWNLOAD_DROPDOWN))
                .into_iter()
                .collect(),
        }
    }

    fn reveal_card(&self, card: usize) -> Option<Element> {
        self.document
            .query_selector(&format!("[{REVEAL_INDEX_ATTR}=\"{card}\"]"))
            .ok()
            .flatten()
    }

    fn show_toast(&self, slot: ToastSlot, message: &str) -> Result<(), JsValue> {
        self.ensure_keyframes()?;
        if let Some(stale) = self.document.get_element_by_id(slot.element_id()) {
            stale.remove();
        }
        let toast = self.document.create_element("div")?;
        toast.set_id(slot.element_id());
        toast.set_attribute("role", "status")?;
        toast.set_attribute("style", &toast_style(slot))?;
        toast.set_text_content(Some(message));
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&toast)?;
        Ok(())
    }

    /// Add the toast keyframes to `<head>` unless an earlier toast already did.
    fn ensure_keyframes(&self) -> Result<(), JsValue> {
        if self.document.get_element_by_id(KEYFRAMES_ID).is_some() {
            return Ok(());
        }
        let style = self.document.create_element("style")?;
        style.set_id(KEYFRAMES_ID);
        style.set_text_content(Some(&keyframes_css()));
        let head = self
            .document
            .head()
            .ok_or_else(|| JsValue::from_str("document has no head"))?;
        head.append_child(&style)?;
        debug!("toast keyframes injected");
        Ok(())
    }

    fn start_timer(&mut self, token: TimerToken, delay_ms: u32) -> Result<(), JsValue> {
        let on_timer = Rc::clone(&self.on_timer);
        let callback = Closure::once_into_js(move || on_timer(token));
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                i32::try_from(delay_ms).unwrap_or(i32::MAX),
            )?;
        self.timers.insert(token, handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_animation_spans_slot_lifetime() {
        let note = toast_style(ToastSlot::Notification);
        assert!(note.contains("top: 90px"));
        assert!(note.contains("wanmeiFadeInOut 2000ms"));

        let tip = toast_style(ToastSlot::DownloadTip);
        assert!(tip.contains("bottom: 40px"));
        assert!(tip.contains("wanmeiFadeInOut 3000ms"));
    }

    #[test]
    fn keyframes_fade_in_and_out() {
        let css = keyframes_css();
        assert!(css.starts_with("@keyframes wanmeiFadeInOut {"));
        assert!(css.contains("0% { opacity: 0;"));
        assert!(css.contains("100% { opacity: 0;"));
        assert!(css.trim_end().ends_with('}'));
    }
}
