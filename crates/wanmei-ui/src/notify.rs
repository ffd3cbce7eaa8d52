//! Toasts, clipboard copy, and back-to-top.
//!
//! A toast lives in a [`ToastSlot`]. Each slot shows at most one toast: a new
//! message hides the current one and re-arms the slot's dismiss timer, so a
//! superseded toast's timer can never remove its successor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use crate::dom::Command;
use crate::error::ClipboardError;
use crate::event::{Dispatch, Handler, Phase, UiEvent};
use crate::timer::TimerKey;

/// Where a toast is shown and how long it stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastSlot {
    /// Top-of-page notification (copy confirmations, page messages).
    Notification,
    /// Bottom tip shown after a download click.
    DownloadTip,
}

impl ToastSlot {
    /// Time from show to automatic removal.
    #[must_use]
    pub const fn lifetime_ms(self) -> u32 {
        match self {
            Self::Notification => 2000,
            Self::DownloadTip => 3000,
        }
    }

    /// `id` of the toast element the host creates for this slot.
    #[must_use]
    pub const fn element_id(self) -> &'static str {
        match self {
            Self::Notification => "wanmei-notification",
            Self::DownloadTip => "wanmei-download-tip",
        }
    }
}

/// Show `message` in `slot`, replacing whatever the slot currently shows.
pub fn show_toast(cx: &mut Dispatch<'_>, slot: ToastSlot, message: impl Into<String>) {
    if cx.cancel(TimerKey::Toast(slot)) {
        cx.emit(Command::HideToast { slot });
    }
    cx.emit(Command::ShowToast {
        slot,
        message: message.into(),
    });
    cx.schedule(TimerKey::Toast(slot), slot.lifetime_ms());
}

/// Smooth scroll to the top of the page.
#[must_use]
pub fn back_to_top() -> Command {
    Command::ScrollTo { top: 0.0 }
}

/// Removes toasts when their dismiss timer fires.
#[derive(Debug, Default)]
pub struct ToastHandler;

impl Handler for ToastHandler {
    fn name(&self) -> &'static str {
        "toast"
    }

    fn on_event(&mut self, _phase: Phase, _event: &UiEvent, _cx: &mut Dispatch<'_>) {}

    fn on_timer(&mut self, key: TimerKey, cx: &mut Dispatch<'_>) {
        if let TimerKey::Toast(slot) = key {
            cx.emit(Command::HideToast { slot });
        }
    }
}

/// Which copy path succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyPath {
    /// The asynchronous clipboard API.
    Api,
    /// Off-screen textarea plus `execCommand("copy")`.
    Legacy,
}

/// Access to the system clipboard.
///
/// Not `Send`: browser clipboard handles are bound to the page thread.
#[async_trait(?Send)]
pub trait Clipboard {
    /// Whether the asynchronous clipboard API can be used.
    fn is_available(&self) -> bool;

    /// Write through the asynchronous clipboard API.
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Write through the legacy selection-based copy command.
    fn legacy_copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Copy `text`, preferring the clipboard API and falling back to the legacy path.
///
/// There is no second attempt: if the chosen path fails the error is logged
/// and returned, and the caller shows no confirmation.
///
/// # Errors
///
/// Returns the failure of whichever path was attempted.
pub async fn copy_to_clipboard<C>(clipboard: &C, text: &str) -> Result<CopyPath, ClipboardError>
where
    C: Clipboard + ?Sized,
{
    let result = if clipboard.is_available() {
        clipboard.write_text(text).await.map(|()| CopyPath::Api)
    } else {
        debug!("clipboard API unavailable, using legacy copy");
        clipboard.legacy_copy(text).map(|()| CopyPath::Legacy)
    };
    if let Err(e) = &result {
        error!(error = %e, "copy to clipboard failed");
    }
    result
}
