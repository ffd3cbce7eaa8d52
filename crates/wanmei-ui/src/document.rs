//! An in-memory document that applies render commands.
//!
//! Used by tests and by the offline smoke driver. Timers run on a virtual
//! clock advanced explicitly with [`PageHarness::advance`]; timers due at the
//! same instant fire in the order they were armed.

use std::collections::{BTreeMap, BTreeSet};

use crate::dom::{Command, Element};
use crate::event::UiEvent;
use crate::notify::ToastSlot;
use crate::site::{ClientEnv, PageLayout, Site, SiteOptions};
use crate::timer::TimerToken;

#[derive(Debug, Default)]
pub struct MemoryDocument {
    classes: BTreeMap<Element, BTreeSet<&'static str>>,
    texts: BTreeMap<Element, String>,
    scroll_top: f64,
    navigations: Vec<String>,
    toasts: BTreeMap<ToastSlot, String>,
    /// Pending timers and their due time on the virtual clock.
    timers: BTreeMap<TimerToken, u64>,
    now: u64,
    unobserved: BTreeSet<usize>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-event flags before a new event is applied.
    pub fn begin_event(&mut self) {
        self.default_prevented = false;
        self.propagation_stopped = false;
    }

    pub fn apply(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.apply_one(command);
        }
    }

    fn apply_one(&mut self, command: Command) {
        match command {
            Command::AddClass { element, class } => {
                self.classes.entry(element).or_default().insert(class);
            }
            Command::RemoveClass { element, class } => {
                if let Some(set) = self.classes.get_mut(&element) {
                    set.remove(class);
                }
            }
            Command::SetText { element, text } => {
                self.texts.insert(element, text);
            }
            Command::ScrollTo { top } => self.scroll_top = top,
            Command::Navigate { url } => self.navigations.push(url),
            Command::ShowToast { slot, message } => {
                self.toasts.insert(slot, message);
            }
            Command::HideToast { slot } => {
                self.toasts.remove(&slot);
            }
            Command::StartTimer { token, delay_ms } => {
                self.timers.insert(token, self.now + u64::from(delay_ms));
            }
            Command::CancelTimer { token } => {
                self.timers.remove(&token);
            }
            Command::Unobserve { card } => {
                self.unobserved.insert(card);
            }
            Command::PreventDefault => self.default_prevented = true,
            Command::StopPropagation => self.propagation_stopped = true,
        }
    }

    #[must_use]
    pub fn has_class(&self, element: &Element, class: &str) -> bool {
        self.classes
            .get(element)
            .is_some_and(|set| set.contains(class))
    }

    #[must_use]
    pub fn text(&self, element: &Element) -> Option<&str> {
        self.texts.get(element).map(String::as_str)
    }

    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    #[must_use]
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    #[must_use]
    pub fn toast(&self, slot: ToastSlot) -> Option<&str> {
        self.toasts.get(&slot).map(String::as_str)
    }

    #[must_use]
    pub fn is_unobserved(&self, card: usize) -> bool {
        self.unobserved.contains(&card)
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Virtual time in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Pop the next timer due at or before `deadline`, moving the clock to it.
    fn next_due(&mut self, deadline: u64) -> Option<TimerToken> {
        let (token, due) = self
            .timers
            .iter()
            .filter(|(_, due)| **due <= deadline)
            .min_by_key(|(token, due)| (**due, **token))
            .map(|(token, due)| (*token, *due))?;
        self.timers.remove(&token);
        self.now = due;
        Some(token)
    }
}

/// A mounted [`Site`] bound to a [`MemoryDocument`].
#[derive(Debug)]
pub struct PageHarness {
    pub site: Site,
    pub document: MemoryDocument,
}

impl PageHarness {
    #[must_use]
    pub fn mount(layout: PageLayout, env: &ClientEnv, options: SiteOptions) -> Self {
        let (site, commands) = Site::mount(layout, env, options);
        let mut document = MemoryDocument::new();
        document.apply(commands);
        Self { site, document }
    }

    /// Deliver an event and apply its commands.
    pub fn dispatch(&mut self, event: &UiEvent) {
        self.document.begin_event();
        let commands = self.site.dispatch(event);
        self.document.apply(commands);
    }

    pub fn notify(&mut self, message: &str) {
        let commands = self.site.notify(message);
        self.document.apply(commands);
    }

    /// Run the virtual clock forward by `ms`, firing every timer that comes due.
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.document.now + ms;
        while let Some(token) = self.document.next_due(deadline) {
            let commands = self.site.dispatch(&UiEvent::Timer(token));
            self.document.apply(commands);
        }
        self.document.now = deadline;
    }
}
