//! Reading the live document.

use tracing::warn;
use wanmei_ui::dom::selector;
use wanmei_ui::event::{ScrollSnapshot, SectionBounds};
use wanmei_ui::{ClientEnv, DOWNLOAD_FLOW_ATTR, Os, PageLayout, SiteOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

/// Attribute numbering reveal targets in document order.
pub(crate) const REVEAL_INDEX_ATTR: &str = "data-reveal-index";

/// Every element matching `css`, in document order. An invalid selector
/// matches nothing.
pub(crate) fn query_all(document: &Document, css: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(css) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn exists(document: &Document, css: &str) -> bool {
    matches!(document.query_selector(css), Ok(Some(_)))
}

/// `Element.closest()` with selector errors treated as no match.
pub(crate) fn closest(element: &Element, css: &str) -> Option<Element> {
    element.closest(css).ok().flatten()
}

/// The card index stored by [`scan`], if `element` is a reveal target.
pub(crate) fn reveal_index(element: &Element) -> Option<usize> {
    parse_reveal_index(element.get_attribute(REVEAL_INDEX_ATTR).as_deref())
}

fn parse_reveal_index(raw: Option<&str>) -> Option<usize> {
    raw?.trim().parse().ok()
}

/// Behavior switches declared in the markup.
pub(crate) fn site_options(document: &Document) -> SiteOptions {
    let flow = document.body().and_then(|body| body.get_attribute(DOWNLOAD_FLOW_ATTR));
    let lang = document.document_element().and_then(|html| html.get_attribute("lang"));
    SiteOptions::from_page(flow.as_deref(), lang.as_deref())
}

pub(crate) fn client_env(window: &Window) -> ClientEnv {
    let navigator = window.navigator();
    ClientEnv::new(
        &navigator.user_agent().unwrap_or_default(),
        &navigator.platform().unwrap_or_default(),
    )
}

/// Current scroll offset plus the geometry of every `section[id]`.
pub(crate) fn scroll_snapshot(window: &Window, document: &Document) -> ScrollSnapshot {
    let y = window.scroll_y().unwrap_or_default();
    let sections = query_all(document, selector::SECTION)
        .into_iter()
        .filter_map(|section| section.dyn_into::<HtmlElement>().ok())
        .map(|section| {
            SectionBounds::new(
                &section.id(),
                f64::from(section.offset_top()),
                f64::from(section.offset_height()),
            )
        })
        .collect();
    ScrollSnapshot::at(y, sections)
}

/// Snapshot the page and number the reveal targets.
pub(crate) fn scan(window: &Window, document: &Document) -> PageLayout {
    let nav_links = query_all(document, selector::NAV_LINK)
        .iter()
        .filter_map(|link| link.get_attribute("href"))
        .collect();

    let cards = query_all(document, selector::REVEAL_TARGETS);
    for (index, card) in cards.iter().enumerate() {
        if let Err(e) = card.set_attribute(REVEAL_INDEX_ATTR, &index.to_string()) {
            warn!(card = index, error = ?e, "cannot number reveal target");
        }
    }

    let mut download_buttons = Vec::new();
    for button in query_all(document, selector::DOWNLOAD_BUTTON) {
        let tag = button.get_attribute("data-os").unwrap_or_default();
        match tag.parse::<Os>() {
            Ok(os) => download_buttons.push(os),
            Err(e) => warn!(error = %e, "download button ignored"),
        }
    }

    let has_mac_dropdown = exists(document, selector::MAC_MENU)
        && document
            .query_selector(selector::MAC_TRIGGER)
            .ok()
            .flatten()
            .and_then(|trigger| closest(&trigger, selector::DOWNLOAD_DROPDOWN))
            .is_some();

    PageLayout {
        has_header: exists(document, selector::HEADER),
        has_nav_toggle: exists(document, selector::NAV_TOGGLE),
        has_nav_menu: exists(document, selector::NAV_MENU),
        nav_links,
        reveal_cards: cards.len(),
        download_buttons,
        has_mac_dropdown,
        initial_scroll: scroll_snapshot(window, document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_index_parsing() {
        assert_eq!(parse_reveal_index(Some("3")), Some(3));
        assert_eq!(parse_reveal_index(Some(" 12 ")), Some(12));
        assert_eq!(parse_reveal_index(Some("-1")), None);
        assert_eq!(parse_reveal_index(Some("")), None);
        assert_eq!(parse_reveal_index(None), None);
    }
}
