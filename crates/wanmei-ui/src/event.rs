//! Typed page events and the bus that delivers them.
//!
//! The host translates each raw browser event into one [`UiEvent`] and hands
//! it to [`EventBus::dispatch`]. Click events run in two phases, mirroring
//! listeners bound on the clicked element versus listeners bound on the
//! document: every handler sees [`Phase::Target`] first, then
//! [`Phase::Document`] unless some handler stopped propagation.

use tracing::debug;

use crate::dom::Command;
use crate::download::Os;
use crate::timer::{Scheduler, TimerKey, TimerToken};

/// An event delivered to the interaction layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A click somewhere in the document.
    Click(ClickContext),
    /// The window scrolled.
    Scroll(ScrollSnapshot),
    /// A key was pressed.
    KeyDown(Key),
    /// One intersection-observer callback batch, in callback order.
    Intersect(Vec<IntersectionEntry>),
    /// A timer armed through `Command::StartTimer` fired.
    Timer(TimerToken),
}

/// What a click hit, pre-classified by the host.
///
/// Each field answers one question a controller asks about the click
/// target (usually via `closest()` / `contains()` in the browser).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickContext {
    /// The target is `#navToggle` or inside it.
    pub on_nav_toggle: bool,
    /// The target is inside `#navMenu`.
    pub in_nav_menu: bool,
    /// `href` of the `.nav-link` inside `#navMenu` that was clicked.
    pub nav_link: Option<String>,
    /// The closest `a[href^="#"]` around the target.
    pub anchor: Option<AnchorTarget>,
    /// OS tag of the closest `.btn-download[data-os]`.
    pub download_os: Option<Os>,
    /// The target is `#macDownloadBtn` or inside it.
    pub on_mac_trigger: bool,
    /// The closest dropdown item inside `#macDropdownMenu`.
    pub dropdown_item: Option<DropdownItem>,
    /// The target is inside the `.download-dropdown`.
    pub in_download_dropdown: bool,
    /// Window vertical scroll offset at click time.
    pub scroll_y: f64,
}

impl ClickContext {
    /// A click on empty page space.
    #[must_use]
    pub fn outside() -> Self {
        Self::default()
    }

    /// A click on the mobile menu toggle.
    #[must_use]
    pub fn nav_toggle() -> Self {
        Self {
            on_nav_toggle: true,
            ..Self::default()
        }
    }

    /// A click on a `.nav-link` inside the menu that is also an in-page anchor.
    #[must_use]
    pub fn nav_link(href: &str, target_top: Option<f64>) -> Self {
        Self {
            in_nav_menu: true,
            nav_link: Some(href.to_owned()),
            anchor: Some(AnchorTarget {
                href: href.to_owned(),
                target_top,
            }),
            ..Self::default()
        }
    }

    /// A click on an in-page anchor outside the menu.
    #[must_use]
    pub fn anchor(href: &str, target_top: Option<f64>, scroll_y: f64) -> Self {
        Self {
            anchor: Some(AnchorTarget {
                href: href.to_owned(),
                target_top,
            }),
            scroll_y,
            ..Self::default()
        }
    }

    /// A click on a download button.
    #[must_use]
    pub fn download(os: Os) -> Self {
        Self {
            download_os: Some(os),
            ..Self::default()
        }
    }

    /// A click on `#macDownloadBtn`.
    #[must_use]
    pub fn mac_trigger() -> Self {
        Self {
            on_mac_trigger: true,
            download_os: Some(Os::Mac),
            in_download_dropdown: true,
            ..Self::default()
        }
    }

    /// A click on a dropdown item.
    #[must_use]
    pub fn dropdown_item(chip: &str, href: &str) -> Self {
        Self {
            dropdown_item: Some(DropdownItem {
                chip: chip.to_owned(),
                href: href.to_owned(),
            }),
            in_download_dropdown: true,
            ..Self::default()
        }
    }
}

/// An in-page anchor and the geometry of the element it points to.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorTarget {
    /// Raw `href` attribute, e.g. `#pricing` or `#`.
    pub href: String,
    /// Viewport-relative top of the fragment target, `None` if it does not exist.
    pub target_top: Option<f64>,
}

/// A `.dropdown-item[data-chip][href]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownItem {
    pub chip: String,
    pub href: String,
}

/// Scroll position plus the geometry of every `section[id]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollSnapshot {
    pub y: f64,
    pub sections: Vec<SectionBounds>,
}

impl ScrollSnapshot {
    #[must_use]
    pub fn at(y: f64, sections: Vec<SectionBounds>) -> Self {
        Self { y, sections }
    }
}

/// Document offset and height of one `section[id]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    #[must_use]
    pub fn new(id: &str, top: f64, height: f64) -> Self {
        Self {
            id: id.to_owned(),
            top,
            height,
        }
    }
}

/// A pressed key, reduced to the keys the page reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One entry of an intersection-observer batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    /// Reveal card index.
    pub card: usize,
    pub is_intersecting: bool,
}

/// Listener phase of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Listeners bound on the clicked element (or its ancestors below the document).
    Target,
    /// Listeners bound on the document.
    Document,
}

/// Per-dispatch context handed to handlers.
pub struct Dispatch<'a> {
    scheduler: &'a mut Scheduler,
    out: Vec<Command>,
    propagation_stopped: bool,
}

impl<'a> Dispatch<'a> {
    pub(crate) fn new(scheduler: &'a mut Scheduler) -> Self {
        Self {
            scheduler,
            out: Vec::new(),
            propagation_stopped: false,
        }
    }

    pub fn emit(&mut self, command: Command) {
        self.out.push(command);
    }

    pub fn prevent_default(&mut self) {
        self.out.push(Command::PreventDefault);
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
        self.out.push(Command::StopPropagation);
    }

    /// Arm a timer for `key`, superseding any pending timer for the same key.
    pub fn schedule(&mut self, key: TimerKey, delay_ms: u32) -> TimerToken {
        self.scheduler.schedule(key, delay_ms, &mut self.out)
    }

    /// Cancel the pending timer for `key`. Returns `true` if one was pending.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.scheduler.cancel(key, &mut self.out)
    }

    #[must_use]
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.scheduler.is_pending(key)
    }

    pub(crate) fn into_commands(self) -> Vec<Command> {
        self.out
    }

    #[cfg(test)]
    pub(crate) fn propagation_stopped_for_tests(&self) -> bool {
        self.propagation_stopped
    }
}

/// A controller registered on the bus.
pub trait Handler: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Render the initial state once the page is mounted.
    fn mount(&mut self, _cx: &mut Dispatch<'_>) {}

    /// React to an event. Non-click events are delivered once, in [`Phase::Target`].
    fn on_event(&mut self, phase: Phase, event: &UiEvent, cx: &mut Dispatch<'_>);

    /// React to a fired timer. Handlers ignore keys they did not schedule.
    fn on_timer(&mut self, _key: TimerKey, _cx: &mut Dispatch<'_>) {}
}

/// Ordered set of handlers plus the scheduler they share.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<Box<dyn Handler>>,
    scheduler: Scheduler,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn Handler>) {
        debug!(handler = handler.name(), "handler registered");
        self.handlers.push(handler);
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Let every handler render its initial state.
    pub fn mount(&mut self) -> Vec<Command> {
        self.run(|handlers, cx| {
            for handler in handlers.iter_mut() {
                handler.mount(cx);
            }
        })
    }

    /// Deliver one event and collect the resulting commands.
    pub fn dispatch(&mut self, event: &UiEvent) -> Vec<Command> {
        if let UiEvent::Timer(token) = event {
            let Some(key) = self.scheduler.fire(*token) else {
                debug!(token = token.get(), "ignoring stale timer");
                return Vec::new();
            };
            return self.run(|handlers, cx| {
                for handler in handlers.iter_mut() {
                    handler.on_timer(key, cx);
                }
            });
        }

        let is_click = matches!(event, UiEvent::Click(_));
        self.run(|handlers, cx| {
            for handler in handlers.iter_mut() {
                handler.on_event(Phase::Target, event, cx);
            }
            if !is_click || cx.propagation_stopped {
                return;
            }
            for handler in handlers.iter_mut() {
                handler.on_event(Phase::Document, event, cx);
            }
        })
    }

    /// Run `f` with a fresh dispatch context, outside of any event.
    pub fn run<F>(&mut self, f: F) -> Vec<Command>
    where
        F: FnOnce(&mut [Box<dyn Handler>], &mut Dispatch<'_>),
    {
        let mut cx = Dispatch::new(&mut self.scheduler);
        f(self.handlers.as_mut_slice(), &mut cx);
        cx.into_commands()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_names())
            .field("pending_timers", &self.scheduler.pending())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::dom::{Element, class};

    /// Records the phases it saw and optionally stops propagation.
    struct Recorder {
        seen: std::sync::Arc<std::sync::Mutex<Vec<Phase>>>,
        stop: bool,
    }

    impl Handler for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn on_event(&mut self, phase: Phase, _event: &UiEvent, cx: &mut Dispatch<'_>) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(phase);
            }
            if self.stop && phase == Phase::Target {
                cx.stop_propagation();
            }
        }

        fn on_timer(&mut self, key: TimerKey, cx: &mut Dispatch<'_>) {
            if let TimerKey::Reveal(card) = key {
                cx.emit(Command::AddClass {
                    element: Element::RevealCard(card),
                    class: class::VISIBLE,
                });
            }
        }
    }

    fn recorder(stop: bool) -> (Box<Recorder>, std::sync::Arc<std::sync::Mutex<Vec<Phase>>>) {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        (
            Box::new(Recorder {
                seen: std::sync::Arc::clone(&seen),
                stop,
            }),
            seen,
        )
    }

    #[test]
    fn clicks_run_target_then_document_phase() {
        let mut bus = EventBus::new();
        let (handler, seen) = recorder(false);
        bus.register(handler);

        bus.dispatch(&UiEvent::Click(ClickContext::outside()));
        assert_eq!(*seen.lock().unwrap(), vec![Phase::Target, Phase::Document]);
    }

    #[test]
    fn stop_propagation_skips_document_phase() {
        let mut bus = EventBus::new();
        let (stopper, _) = recorder(true);
        let (watcher, seen) = recorder(false);
        bus.register(stopper);
        bus.register(watcher);

        let commands = bus.dispatch(&UiEvent::Click(ClickContext::outside()));
        assert_eq!(*seen.lock().unwrap(), vec![Phase::Target]);
        assert_eq!(commands, vec![Command::StopPropagation]);
    }

    #[test]
    fn non_click_events_are_delivered_once() {
        let mut bus = EventBus::new();
        let (handler, seen) = recorder(false);
        bus.register(handler);

        bus.dispatch(&UiEvent::KeyDown(Key::Escape));
        assert_eq!(*seen.lock().unwrap(), vec![Phase::Target]);
    }

    #[test]
    fn timers_resolve_through_the_scheduler() {
        let mut bus = EventBus::new();
        let (handler, _) = recorder(false);
        bus.register(handler);

        let armed = bus.run(|_, cx| {
            cx.schedule(TimerKey::Reveal(2), 100);
        });
        let Some(Command::StartTimer { token, .. }) = armed.first().cloned() else {
            panic!("expected a StartTimer command, got {armed:?}");
        };

        let fired = bus.dispatch(&UiEvent::Timer(token));
        assert_eq!(
            fired,
            vec![Command::AddClass {
                element: Element::RevealCard(2),
                class: class::VISIBLE,
            }]
        );
        assert!(bus.dispatch(&UiEvent::Timer(token)).is_empty());
    }

    #[test]
    fn key_names_map_to_escape() {
        assert_eq!(Key::from_name("Escape"), Key::Escape);
        assert_eq!(Key::from_name("Esc"), Key::Escape);
        assert_eq!(Key::from_name("Enter"), Key::Other("Enter".to_owned()));
    }
}
