//! Smooth scrolling for in-page anchors, offset by the fixed header.

use crate::dom::Command;
use crate::event::{AnchorTarget, Dispatch, Handler, Phase, UiEvent};

/// Height of the fixed header the scroll target must clear.
pub const HEADER_HEIGHT: f64 = 72.0;

/// Absolute scroll offset for an anchor click, or `None` when the click
/// should fall through to the browser (bare `#`, not a fragment link, or a
/// fragment without a target).
#[must_use]
pub fn scroll_target(anchor: &AnchorTarget, scroll_y: f64) -> Option<f64> {
    if anchor.href == "#" || !anchor.href.starts_with('#') {
        return None;
    }
    anchor.target_top.map(|top| top + scroll_y - HEADER_HEIGHT)
}

#[derive(Debug, Default)]
pub struct SmoothScroll;

impl Handler for SmoothScroll {
    fn name(&self) -> &'static str {
        "smooth-scroll"
    }

    fn on_event(&mut self, phase: Phase, event: &UiEvent, cx: &mut Dispatch<'_>) {
        let (Phase::Target, UiEvent::Click(click)) = (phase, event) else {
            return;
        };
        let Some(anchor) = &click.anchor else {
            return;
        };
        if let Some(top) = scroll_target(anchor, click.scroll_y) {
            cx.prevent_default();
            cx.emit(Command::ScrollTo { top });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ClickContext;
    use crate::timer::Scheduler;

    fn anchor(href: &str, target_top: Option<f64>) -> AnchorTarget {
        AnchorTarget {
            href: href.to_owned(),
            target_top,
        }
    }

    #[test]
    fn offsets_by_header_height() {
        assert_eq!(scroll_target(&anchor("#pricing", Some(400.0)), 1000.0), Some(1328.0));
    }

    #[test]
    fn bare_hash_and_missing_target_fall_through() {
        assert_eq!(scroll_target(&anchor("#", Some(10.0)), 0.0), None);
        assert_eq!(scroll_target(&anchor("#nowhere", None), 0.0), None);
        assert_eq!(scroll_target(&anchor("/docs#x", Some(10.0)), 0.0), None);
    }

    #[test]
    fn click_prevents_default_and_scrolls() {
        let mut scheduler = Scheduler::new();
        let mut cx = Dispatch::new(&mut scheduler);
        SmoothScroll.on_event(
            Phase::Target,
            &UiEvent::Click(ClickContext::anchor("#about", Some(-200.0), 900.0)),
            &mut cx,
        );
        assert_eq!(
            cx.into_commands(),
            vec![Command::PreventDefault, Command::ScrollTo { top: 628.0 }]
        );
    }

    #[test]
    fn document_phase_is_ignored() {
        let mut scheduler = Scheduler::new();
        let mut cx = Dispatch::new(&mut scheduler);
        SmoothScroll.on_event(
            Phase::Document,
            &UiEvent::Click(ClickContext::anchor("#about", Some(0.0), 0.0)),
            &mut cx,
        );
        assert!(cx.into_commands().is_empty());
    }
}
