//! Offline driver: parses the page and runs the interaction layer in memory.
//!
//! There is no layout engine, so section geometry is unknown and in-page
//! anchors resolve to offset 0. Clicks are classified from the markup the
//! same way the browser binding classifies them, then dispatched to a
//! [`PageHarness`]; waits advance its virtual clock.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;
use wanmei_ui::document::PageHarness;
use wanmei_ui::dom::selector;
use wanmei_ui::event::{AnchorTarget, ClickContext, DropdownItem, ScrollSnapshot};
use wanmei_ui::{ClientEnv, Os, PageLayout, SiteOptions, UiEvent};

use crate::DriverError;
use crate::driver::{ConsoleLevel, ConsoleMessage, PageDriver};

/// Navigator strings reported by the static driver.
pub const STATIC_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) wanmei-smoke";
pub const STATIC_PLATFORM: &str = "Win32";

struct LoadedPage {
    html: String,
    harness: PageHarness,
}

pub struct StaticDriver {
    env: ClientEnv,
    options: SiteOptions,
    page: Option<LoadedPage>,
    viewport: (u32, u32),
    console: Vec<ConsoleMessage>,
    closed: bool,
}

impl std::fmt::Debug for StaticDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticDriver")
            .field("env", &self.env)
            .field("loaded", &self.page.is_some())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Default for StaticDriver {
    fn default() -> Self {
        Self::new(ClientEnv::new(STATIC_USER_AGENT, STATIC_PLATFORM), SiteOptions::default())
    }
}

impl StaticDriver {
    #[must_use]
    pub fn new(env: ClientEnv, options: SiteOptions) -> Self {
        Self {
            env,
            options,
            page: None,
            viewport: (1920, 1080),
            console: Vec::new(),
            closed: false,
        }
    }

    /// The in-memory page, once loaded.
    #[must_use]
    pub fn harness(&self) -> Option<&PageHarness> {
        self.page.as_ref().map(|p| &p.harness)
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn loaded(&self) -> Result<&LoadedPage, DriverError> {
        self.page.as_ref().ok_or(DriverError::NotLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedPage, DriverError> {
        self.page.as_mut().ok_or(DriverError::NotLoaded)
    }

    /// Mount the interaction layer on freshly loaded markup.
    fn load(&mut self, html: String) {
        let (layout, warnings) = {
            let document = Html::parse_document(&html);
            scan_layout(&document)
        };
        for warning in warnings {
            warn!(%warning, "page layout");
            self.console.push(ConsoleMessage::new(ConsoleLevel::Warning, warning));
        }
        debug!(?layout, "static page scanned");
        let harness = PageHarness::mount(layout, &self.env, self.options);
        self.page = Some(LoadedPage { html, harness });
    }
}

fn parse_selector(css: &str) -> Result<Selector, DriverError> {
    Selector::parse(css).map_err(|e| DriverError::InvalidSelector {
        selector: css.to_owned(),
        reason: e.to_string(),
    })
}

/// Read the layout snapshot the interaction layer needs.
///
/// Returns the layout plus one warning per download button whose `data-os`
/// is not a known operating system.
#[must_use]
pub fn scan_layout(document: &Html) -> (PageLayout, Vec<String>) {
    let mut warnings = Vec::new();
    let all = |css: &str| select_all(document, css);
    let any = |css: &str| !select_all(document, css).is_empty();

    let nav_links = all(selector::NAV_LINK)
        .iter()
        .filter_map(|link| link.value().attr("href"))
        .map(str::to_owned)
        .collect();

    let mut download_buttons = Vec::new();
    for button in all(selector::DOWNLOAD_BUTTON) {
        let tag = button.value().attr("data-os").unwrap_or_default();
        match tag.parse::<Os>() {
            Ok(os) => download_buttons.push(os),
            Err(e) => warnings.push(e.to_string()),
        }
    }

    let has_mac_dropdown = any(selector::MAC_MENU)
        && all(selector::MAC_TRIGGER)
            .first()
            .and_then(|trigger| closest(*trigger, selector::DOWNLOAD_DROPDOWN))
            .is_some();

    let layout = PageLayout {
        has_header: any(selector::HEADER),
        has_nav_toggle: any(selector::NAV_TOGGLE),
        has_nav_menu: any(selector::NAV_MENU),
        nav_links,
        reveal_cards: all(selector::REVEAL_TARGETS).len(),
        download_buttons,
        has_mac_dropdown,
        initial_scroll: ScrollSnapshot::default(),
    };
    (layout, warnings)
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    Selector::parse(css)
        .map(|s| document.select(&s).collect())
        .unwrap_or_default()
}

/// `Element.closest()`: the element itself or its nearest matching ancestor.
fn closest<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|candidate| selector.matches(candidate))
}

/// Describe a click on `target` the way the browser binding does.
fn classify_click(document: &Html, target: ElementRef<'_>, scroll_y: f64) -> ClickContext {
    let in_nav_menu = closest(target, selector::NAV_MENU).is_some();
    let nav_link = closest(target, selector::NAV_LINK)
        .filter(|_| in_nav_menu)
        .and_then(|link| link.value().attr("href"))
        .map(str::to_owned);

    let anchor = closest(target, selector::IN_PAGE_ANCHOR)
        .and_then(|a| a.value().attr("href"))
        .map(|href| AnchorTarget {
            href: href.to_owned(),
            target_top: fragment_exists(document, href).then_some(0.0),
        });

    let dropdown_item = closest(target, selector::DROPDOWN_ITEM)
        .filter(|item| closest(*item, selector::MAC_MENU).is_some())
        .map(|item| DropdownItem {
            chip: item.value().attr("data-chip").unwrap_or_default().to_owned(),
            href: item.value().attr("href").unwrap_or_default().to_owned(),
        });

    ClickContext {
        on_nav_toggle: closest(target, selector::NAV_TOGGLE).is_some(),
        in_nav_menu,
        nav_link,
        anchor,
        download_os: closest(target, selector::DOWNLOAD_BUTTON)
            .and_then(|button| button.value().attr("data-os"))
            .and_then(|tag| tag.parse().ok()),
        on_mac_trigger: closest(target, selector::MAC_TRIGGER).is_some(),
        dropdown_item,
        in_download_dropdown: closest(target, selector::DOWNLOAD_DROPDOWN).is_some(),
        scroll_y,
    }
}

fn fragment_exists(document: &Html, href: &str) -> bool {
    let Some(id) = href.strip_prefix('#').filter(|id| !id.is_empty()) else {
        return false;
    };
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|e| e.value().id() == Some(id))
}

/// Classify a click on the first match of `css`, or `None` if nothing matches.
fn click_context(html: &str, css: &str, scroll_y: f64) -> Result<Option<ClickContext>, DriverError> {
    let selector = parse_selector(css)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .next()
        .map(|target| classify_click(&document, target, scroll_y)))
}

#[async_trait]
impl PageDriver for StaticDriver {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn goto(&mut self, url: &Url) -> Result<(), DriverError> {
        let navigation = |reason: String| DriverError::Navigation {
            url: url.to_string(),
            reason,
        };
        let path = url
            .to_file_path()
            .map_err(|()| navigation("only file:// URLs can be loaded offline".to_owned()))?;
        let html = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| navigation(e.to_string()))?;
        self.load(html);
        Ok(())
    }

    async fn title(&mut self) -> Result<String, DriverError> {
        let page = self.loaded()?;
        let selector = parse_selector("title")?;
        let document = Html::parse_document(&page.html);
        Ok(document
            .select(&selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_owned())
            .unwrap_or_default())
    }

    async fn count(&mut self, selector: &str) -> Result<usize, DriverError> {
        let page = self.loaded()?;
        let parsed = parse_selector(selector)?;
        Ok(Html::parse_document(&page.html).select(&parsed).count())
    }

    async fn click_first(&mut self, selector: &str) -> Result<bool, DriverError> {
        let page = self.loaded_mut()?;
        let scroll_y = page.harness.document.scroll_top();
        let Some(click) = click_context(&page.html, selector, scroll_y)? else {
            return Ok(false);
        };
        debug!(%selector, ?click, "static click");
        page.harness.dispatch(&UiEvent::Click(click));
        Ok(true)
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), DriverError> {
        self.viewport = (width, height);
        Ok(())
    }

    async fn wait(&mut self, ms: u64) {
        if let Some(page) = self.page.as_mut() {
            page.harness.advance(ms);
        }
    }

    async fn console_messages(&mut self) -> Vec<ConsoleMessage> {
        self.console.clone()
    }

    async fn page_errors(&mut self) -> Vec<String> {
        Vec::new()
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if !self.closed {
            self.closed = true;
            self.page = None;
            debug!("static driver closed");
        }
        Ok(())
    }
}
