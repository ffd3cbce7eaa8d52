//! The whole page: every controller mounted on one event bus.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dom::Command;
use crate::download::{DownloadController, DownloadFlow, Os};
use crate::error::ClipboardError;
use crate::event::{EventBus, ScrollSnapshot, UiEvent};
use crate::locale::Locale;
use crate::nav::NavController;
use crate::notify::{self, CopyPath, ToastHandler, ToastSlot};
use crate::reveal::RevealController;
use crate::scroll::ScrollController;
use crate::smooth::SmoothScroll;

/// What the host found in the document at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub has_header: bool,
    pub has_nav_toggle: bool,
    pub has_nav_menu: bool,
    /// `href` of every `.nav-link`, in document order.
    pub nav_links: Vec<String>,
    /// Number of reveal targets.
    pub reveal_cards: usize,
    /// `data-os` of every `.btn-download[data-os]`, in document order.
    pub download_buttons: Vec<Os>,
    /// `#macDownloadBtn`, `#macDropdownMenu` and their `.download-dropdown` all exist.
    pub has_mac_dropdown: bool,
    /// Scroll position and section geometry at load time.
    pub initial_scroll: ScrollSnapshot,
}

/// Navigator strings used for OS detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientEnv {
    pub user_agent: String,
    pub platform: String,
}

impl ClientEnv {
    #[must_use]
    pub fn new(user_agent: &str, platform: &str) -> Self {
        Self {
            user_agent: user_agent.to_owned(),
            platform: platform.to_owned(),
        }
    }
}

/// Page-wide behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteOptions {
    #[serde(default)]
    pub flow: DownloadFlow,
    #[serde(default)]
    pub locale: Locale,
}

/// `<body>` attribute choosing the download flow.
pub const DOWNLOAD_FLOW_ATTR: &str = "data-download-flow";

impl SiteOptions {
    /// Options declared by the page: `flow` from [`DOWNLOAD_FLOW_ATTR`] and
    /// `lang` from `<html lang>`. Missing or unknown values keep the default.
    #[must_use]
    pub fn from_page(flow: Option<&str>, lang: Option<&str>) -> Self {
        let mut options = Self::default();
        if let Some(raw) = flow.filter(|v| !v.trim().is_empty()) {
            match raw.trim().parse() {
                Ok(flow) => options.flow = flow,
                Err(e) => warn!(error = %e, "keeping default download flow"),
            }
        }
        if let Some(raw) = lang.filter(|v| !v.trim().is_empty()) {
            match raw.trim().parse() {
                Ok(locale) => options.locale = locale,
                Err(e) => warn!(error = %e, "keeping default locale"),
            }
        }
        options
    }
}

/// A mounted page.
#[derive(Debug)]
pub struct Site {
    bus: EventBus,
    os: Os,
    options: SiteOptions,
}

impl Site {
    /// Bind every controller whose elements exist and render the initial state.
    #[must_use]
    pub fn mount(layout: PageLayout, env: &ClientEnv, options: SiteOptions) -> (Self, Vec<Command>) {
        let os = Os::detect(&env.user_agent, &env.platform);
        let mut bus = EventBus::new();

        if layout.has_nav_toggle && layout.has_nav_menu {
            bus.register(Box::new(NavController::new()));
        } else {
            debug!("navigation toggle or menu missing, mobile menu disabled");
        }
        bus.register(Box::new(ScrollController::new(
            layout.has_header,
            layout.nav_links,
            layout.initial_scroll,
        )));
        bus.register(Box::new(SmoothScroll));
        bus.register(Box::new(RevealController::new(layout.reveal_cards)));
        if options.flow == DownloadFlow::Dropdown && !layout.has_mac_dropdown {
            debug!("download dropdown markup incomplete, dropdown disabled");
        }
        bus.register(Box::new(DownloadController::new(
            os,
            layout.download_buttons,
            options.flow,
            options.locale,
            layout.has_mac_dropdown,
        )));
        bus.register(Box::new(ToastHandler));

        let commands = bus.mount();
        info!(
            os = %os,
            flow = ?options.flow,
            handlers = bus.handler_names().len(),
            "page mounted"
        );
        (Self { bus, os, options }, commands)
    }

    /// Deliver one event.
    pub fn dispatch(&mut self, event: &UiEvent) -> Vec<Command> {
        self.bus.dispatch(event)
    }

    /// Show a top-of-page notification.
    pub fn notify(&mut self, message: &str) -> Vec<Command> {
        self.bus
            .run(|_, cx| notify::show_toast(cx, ToastSlot::Notification, message))
    }

    #[must_use]
    pub fn back_to_top(&self) -> Vec<Command> {
        vec![notify::back_to_top()]
    }

    /// Render the outcome of a clipboard copy: a confirmation on success,
    /// nothing on failure (the failure is already logged).
    pub fn copy_finished(&mut self, result: &Result<CopyPath, ClipboardError>) -> Vec<Command> {
        match result {
            Ok(_) => {
                let message = self.options.locale.copied();
                self.notify(message)
            }
            Err(_) => Vec::new(),
        }
    }

    /// OS detected at mount.
    #[must_use]
    pub fn os(&self) -> Os {
        self.os
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.bus.handler_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_attributes_select_flow_and_locale() {
        let options = SiteOptions::from_page(Some("toast"), Some("en"));
        assert_eq!(options.flow, DownloadFlow::Toast);
        assert_eq!(options.locale, Locale::En);

        let options = SiteOptions::from_page(Some(" Dropdown "), Some("zh-CN"));
        assert_eq!(options.flow, DownloadFlow::Dropdown);
        assert_eq!(options.locale, Locale::ZhCn);
    }

    #[test]
    fn absent_or_unknown_page_attributes_keep_defaults() {
        assert_eq!(SiteOptions::from_page(None, None), SiteOptions::default());
        assert_eq!(SiteOptions::from_page(Some(""), Some("  ")), SiteOptions::default());
        assert_eq!(SiteOptions::from_page(Some("modal"), Some("fr")), SiteOptions::default());
    }

    #[test]
    fn toast_flow_from_page_reaches_download_clicks() {
        let layout = PageLayout {
            download_buttons: vec![Os::Windows, Os::Mac],
            ..PageLayout::default()
        };
        let options = SiteOptions::from_page(Some("toast"), Some("en"));
        let (mut site, _) = Site::mount(layout, &ClientEnv::new("", "Win32"), options);
        let commands = site.dispatch(&UiEvent::Click(crate::event::ClickContext::download(Os::Mac)));
        assert!(commands.contains(&Command::ShowToast {
            slot: ToastSlot::DownloadTip,
            message: "Preparing download for macOS...".to_owned(),
        }));
    }

    #[test]
    fn missing_toggle_skips_nav_controller() {
        let layout = PageLayout {
            has_nav_menu: true,
            ..PageLayout::default()
        };
        let (site, _) = Site::mount(layout, &ClientEnv::default(), SiteOptions::default());
        assert!(!site.handler_names().contains(&"nav"));
        assert_eq!(site.os(), Os::Unknown);
    }

    #[test]
    fn full_layout_registers_every_controller() {
        let layout = PageLayout {
            has_header: true,
            has_nav_toggle: true,
            has_nav_menu: true,
            ..PageLayout::default()
        };
        let (site, _) = Site::mount(layout, &ClientEnv::new("", "Win32"), SiteOptions::default());
        assert_eq!(
            site.handler_names(),
            vec!["nav", "scroll", "smooth-scroll", "reveal", "download", "toast"]
        );
        assert_eq!(site.os(), Os::Windows);
    }

    #[test]
    fn failed_copy_shows_nothing() {
        let (mut site, _) = Site::mount(PageLayout::default(), &ClientEnv::default(), SiteOptions::default());
        let failed = Err(ClipboardError::WriteRejected {
            reason: "denied".to_owned(),
        });
        assert!(site.copy_finished(&failed).is_empty());
    }

    #[test]
    fn back_to_top_scrolls_to_zero() {
        let (site, _) = Site::mount(PageLayout::default(), &ClientEnv::default(), SiteOptions::default());
        assert_eq!(site.back_to_top(), vec![Command::ScrollTo { top: 0.0 }]);
    }
}
