//! Download buttons: OS detection, recommendation, and the two click flows.
//!
//! On mount the button matching the visitor's OS is highlighted and
//! relabeled. Clicks then follow one of two flows:
//!
//! - [`DownloadFlow::Toast`]: any download button shows a short "preparing"
//!   tip and lets the browser follow the link.
//! - [`DownloadFlow::Dropdown`]: `#macDownloadBtn` opens a menu of builds
//!   (one per chip); picking an item navigates to its URL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Command, Element, class};
use crate::error::UiError;
use crate::event::{Dispatch, Handler, Key, Phase, UiEvent};
use crate::locale::Locale;
use crate::notify::{self, ToastSlot};

/// Visitor operating system, as far as the user agent tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Mac,
    Linux,
    Unknown,
}

impl Os {
    /// Detect the OS from `navigator.userAgent` and `navigator.platform`.
    ///
    /// Tokens are checked in order `Win`, `Mac`, `Linux` against both strings;
    /// the first hit wins.
    #[must_use]
    pub fn detect(user_agent: &str, platform: &str) -> Self {
        let has = |token: &str| user_agent.contains(token) || platform.contains(token);
        if has("Win") {
            Self::Windows
        } else if has("Mac") {
            Self::Mac
        } else if has("Linux") {
            Self::Linux
        } else {
            Self::Unknown
        }
    }

    /// Value used in `data-os` attributes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Linux => "linux",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Mac => "macOS",
            Self::Linux => "Linux",
            Self::Unknown => "Unknown",
        }
    }
}

impl FromStr for Os {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "windows" => Ok(Self::Windows),
            "mac" => Ok(Self::Mac),
            "linux" => Ok(Self::Linux),
            other => Err(UiError::UnknownOs {
                tag: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which click flow the download buttons follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFlow {
    /// Show a "preparing download" toast on click.
    Toast,
    /// Open a per-chip menu from `#macDownloadBtn`.
    #[default]
    Dropdown,
}

impl FromStr for DownloadFlow {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toast" => Ok(Self::Toast),
            "dropdown" => Ok(Self::Dropdown),
            _ => Err(UiError::UnknownFlow { name: s.to_owned() }),
        }
    }
}

/// Open/closed state of the download dropdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DropdownState {
    #[default]
    Closed,
    Open,
}

/// Whether a dropdown item `href` is a real destination.
#[must_use]
pub fn is_navigable(href: &str) -> bool {
    !href.is_empty() && href != "#"
}

#[derive(Debug)]
pub struct DownloadController {
    os: Os,
    buttons: Vec<Os>,
    flow: DownloadFlow,
    locale: Locale,
    /// `None` when the dropdown markup is incomplete.
    dropdown: Option<DropdownState>,
}

impl DownloadController {
    /// `buttons` lists the `data-os` of every download button on the page;
    /// `has_dropdown` tells whether trigger, menu and wrapper all exist.
    #[must_use]
    pub fn new(os: Os, buttons: Vec<Os>, flow: DownloadFlow, locale: Locale, has_dropdown: bool) -> Self {
        let dropdown = (flow == DownloadFlow::Dropdown && has_dropdown).then_some(DropdownState::Closed);
        Self {
            os,
            buttons,
            flow,
            locale,
            dropdown,
        }
    }

    #[must_use]
    pub fn detected_os(&self) -> Os {
        self.os
    }

    #[must_use]
    pub fn dropdown(&self) -> Option<DropdownState> {
        self.dropdown
    }

    fn set_dropdown(&mut self, next: DropdownState, cx: &mut Dispatch<'_>) {
        let Some(current) = self.dropdown else {
            return;
        };
        if current == next {
            return;
        }
        self.dropdown = Some(next);
        cx.emit(match next {
            DropdownState::Open => Command::AddClass {
                element: Element::DownloadDropdown,
                class: class::ACTIVE,
            },
            DropdownState::Closed => Command::RemoveClass {
                element: Element::DownloadDropdown,
                class: class::ACTIVE,
            },
        });
    }

    fn on_click_target(&mut self, click: &crate::event::ClickContext, cx: &mut Dispatch<'_>) {
        match self.flow {
            DownloadFlow::Toast => {
                if let Some(os) = click.download_os {
                    notify::show_toast(cx, ToastSlot::DownloadTip, self.locale.preparing_download(os));
                }
            }
            DownloadFlow::Dropdown => {
                if self.dropdown.is_none() {
                    return;
                }
                if click.on_mac_trigger {
                    cx.prevent_default();
                    cx.stop_propagation();
                    let next = match self.dropdown {
                        Some(DropdownState::Open) => DropdownState::Closed,
                        _ => DropdownState::Open,
                    };
                    self.set_dropdown(next, cx);
                } else if let Some(item) = &click.dropdown_item {
                    cx.prevent_default();
                    self.set_dropdown(DropdownState::Closed, cx);
                    if is_navigable(&item.href) {
                        debug!(chip = %item.chip, url = %item.href, "download selected");
                        cx.emit(Command::Navigate {
                            url: item.href.clone(),
                        });
                    }
                }
            }
        }
    }
}

impl Handler for DownloadController {
    fn name(&self) -> &'static str {
        "download"
    }

    fn mount(&mut self, cx: &mut Dispatch<'_>) {
        if self.os == Os::Unknown || !self.buttons.contains(&self.os) {
            return;
        }
        cx.emit(Command::AddClass {
            element: Element::DownloadButton(self.os),
            class: class::CURRENT_SYSTEM,
        });
        cx.emit(Command::SetText {
            element: Element::DownloadLabel(self.os),
            text: self.locale.recommended_download(self.os),
        });
    }

    fn on_event(&mut self, phase: Phase, event: &UiEvent, cx: &mut Dispatch<'_>) {
        match (phase, event) {
            (Phase::Target, UiEvent::Click(click)) => self.on_click_target(click, cx),
            (Phase::Document, UiEvent::Click(click)) if !click.in_download_dropdown => {
                self.set_dropdown(DropdownState::Closed, cx);
            }
            (_, UiEvent::KeyDown(Key::Escape)) => self.set_dropdown(DropdownState::Closed, cx),
            _ => {}
        }
    }
}
