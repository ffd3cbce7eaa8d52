//! Render vocabulary shared by the controllers and the host binding.
//!
//! Controllers never touch a DOM directly. They emit [`Command`]s addressed
//! to logical [`Element`]s; the host resolves each element to zero or more
//! real nodes and applies the mutation.

use crate::download::Os;
use crate::notify::ToastSlot;
use crate::timer::TimerToken;

/// Selectors the interaction layer binds to.
pub mod selector {
    pub const HEADER: &str = "#header";
    pub const NAV_TOGGLE: &str = "#navToggle";
    pub const NAV_MENU: &str = "#navMenu";
    pub const NAV_LINK: &str = ".nav-link";
    pub const IN_PAGE_ANCHOR: &str = "a[href^=\"#\"]";
    pub const REVEAL_TARGETS: &str =
        ".feature-card, .download-card, .pricing-card, .stat-card, .value-item";
    pub const DOWNLOAD_BUTTON: &str = ".btn-download[data-os]";
    pub const MAC_TRIGGER: &str = "#macDownloadBtn";
    pub const MAC_MENU: &str = "#macDropdownMenu";
    pub const DOWNLOAD_DROPDOWN: &str = ".download-dropdown";
    pub const DROPDOWN_ITEM: &str = ".dropdown-item[data-chip][href]";
    pub const SECTION: &str = "section[id]";
}

/// CSS classes the interaction layer toggles.
pub mod class {
    pub const ACTIVE: &str = "active";
    pub const SCROLLED: &str = "scrolled";
    pub const FADE_IN: &str = "fade-in";
    pub const VISIBLE: &str = "visible";
    pub const CURRENT_SYSTEM: &str = "current-system";
}

/// A logical page element.
///
/// Some variants can resolve to several nodes (every `.nav-link` with the
/// same `href`, every download button for the same OS); the host applies a
/// command to all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    /// `#header`.
    Header,
    /// `#navMenu`.
    NavMenu,
    /// `#navToggle`.
    NavToggle,
    /// `.nav-link` elements whose `href` equals the payload.
    NavLink(String),
    /// The n-th reveal target in document order.
    RevealCard(usize),
    /// `.btn-download` elements tagged with the given OS.
    DownloadButton(Os),
    /// The first `<span>` inside each download button for the given OS.
    DownloadLabel(Os),
    /// The `.download-dropdown` wrapping `#macDownloadBtn`.
    DownloadDropdown,
}

/// A single mutation requested by a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddClass { element: Element, class: &'static str },
    RemoveClass { element: Element, class: &'static str },
    SetText { element: Element, text: String },
    /// Animated scroll of the window to an absolute vertical offset.
    ScrollTo { top: f64 },
    /// Navigate the window to a URL.
    Navigate { url: String },
    /// Create the toast for a slot. A slot holds at most one toast.
    ShowToast { slot: ToastSlot, message: String },
    /// Remove the toast of a slot, if any.
    HideToast { slot: ToastSlot },
    /// Arm a one-shot timer; the host dispatches `UiEvent::Timer(token)` when it fires.
    StartTimer { token: TimerToken, delay_ms: u32 },
    /// Disarm a timer that has not fired yet.
    CancelTimer { token: TimerToken },
    /// Stop observing a reveal card's viewport intersection.
    Unobserve { card: usize },
    /// Suppress the browser's default action for the current event.
    PreventDefault,
    /// Stop the current event from reaching document-level listeners.
    StopPropagation,
}
