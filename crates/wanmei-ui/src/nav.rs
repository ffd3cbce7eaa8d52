//! Mobile navigation menu.
//!
//! The toggle flips the menu open or closed. A click on a link inside the
//! menu closes it; so does any click that lands outside both the menu and
//! the toggle (a document-level rule, skipped when propagation is stopped).

use crate::dom::{Command, Element, class};
use crate::event::{ClickContext, Dispatch, Handler, Phase, UiEvent};

/// Open/closed state of the mobile menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

/// Pure transition for one click phase.
#[must_use]
pub fn next_menu_state(state: MenuState, phase: Phase, click: &ClickContext) -> MenuState {
    match phase {
        Phase::Target if click.on_nav_toggle => state.toggled(),
        Phase::Target if click.nav_link.is_some() => MenuState::Closed,
        Phase::Document if !click.in_nav_menu && !click.on_nav_toggle => MenuState::Closed,
        _ => state,
    }
}

/// Mobile menu controller. Bound only when both `#navToggle` and `#navMenu` exist.
#[derive(Debug, Default)]
pub struct NavController {
    state: MenuState,
}

impl NavController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> MenuState {
        self.state
    }

    fn render(state: MenuState, cx: &mut Dispatch<'_>) {
        for element in [Element::NavMenu, Element::NavToggle] {
            cx.emit(if state.is_open() {
                Command::AddClass {
                    element,
                    class: class::ACTIVE,
                }
            } else {
                Command::RemoveClass {
                    element,
                    class: class::ACTIVE,
                }
            });
        }
    }
}

impl Handler for NavController {
    fn name(&self) -> &'static str {
        "nav"
    }

    fn on_event(&mut self, phase: Phase, event: &UiEvent, cx: &mut Dispatch<'_>) {
        let UiEvent::Click(click) = event else {
            return;
        };
        let next = next_menu_state(self.state, phase, click);
        if next != self.state {
            self.state = next;
            Self::render(next, cx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_returns_to_closed() {
        let click = ClickContext::nav_toggle();
        let once = next_menu_state(MenuState::Closed, Phase::Target, &click);
        let once = next_menu_state(once, Phase::Document, &click);
        assert_eq!(once, MenuState::Open);

        let twice = next_menu_state(once, Phase::Target, &click);
        let twice = next_menu_state(twice, Phase::Document, &click);
        assert_eq!(twice, MenuState::Closed);
    }

    #[test]
    fn link_click_closes_open_menu() {
        let click = ClickContext::nav_link("#features", Some(300.0));
        let next = next_menu_state(MenuState::Open, Phase::Target, &click);
        assert_eq!(next, MenuState::Closed);
    }

    #[test]
    fn outside_click_closes_only_in_document_phase() {
        let click = ClickContext::outside();
        assert_eq!(
            next_menu_state(MenuState::Open, Phase::Target, &click),
            MenuState::Open
        );
        assert_eq!(
            next_menu_state(MenuState::Open, Phase::Document, &click),
            MenuState::Closed
        );
    }

    #[test]
    fn click_inside_menu_keeps_it_open() {
        let click = ClickContext {
            in_nav_menu: true,
            ..ClickContext::default()
        };
        assert_eq!(
            next_menu_state(MenuState::Open, Phase::Document, &click),
            MenuState::Open
        );
    }

    #[test]
    fn unchanged_state_renders_nothing() {
        let mut scheduler = crate::timer::Scheduler::new();
        let mut cx = Dispatch::new(&mut scheduler);
        let mut nav = NavController::new();

        nav.on_event(Phase::Document, &UiEvent::Click(ClickContext::outside()), &mut cx);
        assert!(cx.into_commands().is_empty());
        assert_eq!(nav.state(), MenuState::Closed);
    }
}
