//! Translating raw DOM events into [`UiEvent`]s.

use wanmei_ui::UiEvent;
use wanmei_ui::dom::selector;
use wanmei_ui::event::{AnchorTarget, ClickContext, DropdownItem, IntersectionEntry, Key};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, IntersectionObserverEntry, KeyboardEvent};

use crate::layout::{closest, reveal_index};

/// Classify a click by walking up from its target.
pub(crate) fn click(document: &Document, event: &Event, scroll_y: f64) -> UiEvent {
    let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
    let context = match target {
        Some(target) => classify(document, &target, scroll_y),
        None => ClickContext {
            scroll_y,
            ..ClickContext::outside()
        },
    };
    UiEvent::Click(context)
}

fn classify(document: &Document, target: &Element, scroll_y: f64) -> ClickContext {
    let in_nav_menu = closest(target, selector::NAV_MENU).is_some();
    let nav_link = closest(target, selector::NAV_LINK)
        .filter(|_| in_nav_menu)
        .and_then(|link| link.get_attribute("href"));

    let anchor = closest(target, selector::IN_PAGE_ANCHOR)
        .and_then(|a| a.get_attribute("href"))
        .map(|href| AnchorTarget {
            target_top: fragment_top(document, &href),
            href,
        });

    let dropdown_item = closest(target, selector::DROPDOWN_ITEM)
        .filter(|item| closest(item, selector::MAC_MENU).is_some())
        .map(|item| DropdownItem {
            chip: item.get_attribute("data-chip").unwrap_or_default(),
            href: item.get_attribute("href").unwrap_or_default(),
        });

    ClickContext {
        on_nav_toggle: closest(target, selector::NAV_TOGGLE).is_some(),
        in_nav_menu,
        nav_link,
        anchor,
        download_os: closest(target, selector::DOWNLOAD_BUTTON)
            .and_then(|button| button.get_attribute("data-os"))
            .and_then(|tag| tag.parse().ok()),
        on_mac_trigger: closest(target, selector::MAC_TRIGGER).is_some(),
        dropdown_item,
        in_download_dropdown: closest(target, selector::DOWNLOAD_DROPDOWN).is_some(),
        scroll_y,
    }
}

/// Viewport-relative top of the element `href` points to. `#` alone and
/// hrefs that are not valid selectors resolve to nothing.
fn fragment_top(document: &Document, href: &str) -> Option<f64> {
    if href.len() < 2 {
        return None;
    }
    let target = document.query_selector(href).ok().flatten()?;
    Some(target.get_bounding_client_rect().top())
}

pub(crate) fn key_down(event: &Event) -> Option<UiEvent> {
    let event = event.dyn_ref::<KeyboardEvent>()?;
    Some(UiEvent::KeyDown(Key::from_name(&event.key())))
}

/// One observer callback batch; entries for elements without a reveal
/// index are dropped.
pub(crate) fn intersections(entries: &js_sys::Array) -> UiEvent {
    let batch = entries
        .iter()
        .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
        .filter_map(|entry| {
            reveal_index(&entry.target()).map(|card| IntersectionEntry {
                card,
                is_intersecting: entry.is_intersecting(),
            })
        })
        .collect();
    UiEvent::Intersect(batch)
}
