//! Header scroll state and active-section highlighting.

use crate::dom::{Command, Element, class};
use crate::event::{Dispatch, Handler, Phase, ScrollSnapshot, SectionBounds, UiEvent};

/// Scroll offset past which the header switches to its compact style.
pub const SCROLL_THRESHOLD: f64 = 50.0;

/// How far ahead of a section's top the section already counts as current.
pub const SECTION_LOOKAHEAD: f64 = 100.0;

/// Visual state of `#header`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderState {
    #[default]
    Top,
    Scrolled,
}

impl HeaderState {
    /// `Scrolled` iff `y > SCROLL_THRESHOLD`.
    #[must_use]
    pub fn at(y: f64) -> Self {
        if y > SCROLL_THRESHOLD {
            Self::Scrolled
        } else {
            Self::Top
        }
    }
}

/// Whether `y` falls inside a section, lookahead included.
#[must_use]
pub fn section_contains(section: &SectionBounds, y: f64) -> bool {
    let top = section.top - SECTION_LOOKAHEAD;
    y > top && y <= top + section.height
}

/// The last section in document order that contains `y`.
#[must_use]
pub fn active_section(y: f64, sections: &[SectionBounds]) -> Option<&str> {
    sections
        .iter()
        .rev()
        .find(|section| section_contains(section, y))
        .map(|section| section.id.as_str())
}

/// Controller for `#header` and the `.nav-link` highlight.
#[derive(Debug)]
pub struct ScrollController {
    has_header: bool,
    nav_links: Vec<String>,
    initial: ScrollSnapshot,
    header: HeaderState,
    active_link: Option<String>,
}

impl ScrollController {
    /// `nav_links` holds the `href` of every `.nav-link`; `initial` is the
    /// scroll snapshot at load time.
    #[must_use]
    pub fn new(has_header: bool, nav_links: Vec<String>, initial: ScrollSnapshot) -> Self {
        Self {
            has_header,
            nav_links,
            initial,
            header: HeaderState::Top,
            active_link: None,
        }
    }

    #[must_use]
    pub fn header(&self) -> HeaderState {
        self.header
    }

    #[must_use]
    pub fn active_link(&self) -> Option<&str> {
        self.active_link.as_deref()
    }

    /// The `.nav-link` href that should be active for a snapshot.
    fn link_for(&self, snapshot: &ScrollSnapshot) -> Option<String> {
        let id = active_section(snapshot.y, &snapshot.sections)?;
        let href = format!("#{id}");
        self.nav_links.iter().find(|link| **link == href).cloned()
    }

    fn header_command(state: HeaderState) -> Command {
        match state {
            HeaderState::Scrolled => Command::AddClass {
                element: Element::Header,
                class: class::SCROLLED,
            },
            HeaderState::Top => Command::RemoveClass {
                element: Element::Header,
                class: class::SCROLLED,
            },
        }
    }

    fn apply(&mut self, snapshot: &ScrollSnapshot, cx: &mut Dispatch<'_>) {
        let header = HeaderState::at(snapshot.y);
        if self.has_header && header != self.header {
            cx.emit(Self::header_command(header));
        }
        self.header = header;

        let active = self.link_for(snapshot);
        if active != self.active_link {
            if let Some(old) = self.active_link.take() {
                cx.emit(Command::RemoveClass {
                    element: Element::NavLink(old),
                    class: class::ACTIVE,
                });
            }
            if let Some(new) = &active {
                cx.emit(Command::AddClass {
                    element: Element::NavLink(new.clone()),
                    class: class::ACTIVE,
                });
            }
            self.active_link = active;
        }
    }
}

impl Handler for ScrollController {
    fn name(&self) -> &'static str {
        "scroll"
    }

    /// Full render: markup may ship with a pre-set `active` link or header class.
    fn mount(&mut self, cx: &mut Dispatch<'_>) {
        let initial = std::mem::take(&mut self.initial);
        self.header = HeaderState::at(initial.y);
        if self.has_header {
            cx.emit(Self::header_command(self.header));
        }

        self.active_link = self.link_for(&initial);
        for link in &self.nav_links {
            let element = Element::NavLink(link.clone());
            cx.emit(if Some(link) == self.active_link.as_ref() {
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

    fn on_event(&mut self, _phase: Phase, event: &UiEvent, cx: &mut Dispatch<'_>) {
        if let UiEvent::Scroll(snapshot) = event {
            self.apply(snapshot, cx);
        }
    }
}
