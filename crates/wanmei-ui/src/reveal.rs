//! Staggered fade-in of cards as they enter the viewport.
//!
//! Cards start tagged `fade-in`. Within one intersection batch, the entry at
//! position `i` is revealed after `i * STAGGER_MS`, so cards entering
//! together cascade. Reveal is one-shot: a visible card is unobserved and a
//! pending one is not rescheduled.

use tracing::warn;

use crate::dom::{Command, Element, class};
use crate::event::{Dispatch, Handler, IntersectionEntry, Phase, UiEvent};
use crate::timer::TimerKey;

/// Fraction of a card that must be visible to count as intersecting.
pub const THRESHOLD: f64 = 0.1;

/// Observer root margin: cards must clear the bottom edge by 50px.
pub const ROOT_MARGIN: &str = "0px 0px -50px 0px";

/// Delay between consecutive reveals in one batch.
pub const STAGGER_MS: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Hidden,
    Pending,
    Visible,
}

#[derive(Debug)]
pub struct RevealController {
    cards: Vec<RevealState>,
}

impl RevealController {
    #[must_use]
    pub fn new(card_count: usize) -> Self {
        Self {
            cards: vec![RevealState::Hidden; card_count],
        }
    }

    #[must_use]
    pub fn state(&self, card: usize) -> Option<RevealState> {
        self.cards.get(card).copied()
    }

    fn on_batch(&mut self, entries: &[IntersectionEntry], cx: &mut Dispatch<'_>) {
        for (position, entry) in entries.iter().enumerate() {
            if !entry.is_intersecting {
                continue;
            }
            let Some(state) = self.cards.get_mut(entry.card) else {
                warn!(card = entry.card, "intersection entry for unknown card");
                continue;
            };
            if *state != RevealState::Hidden {
                continue;
            }
            *state = RevealState::Pending;
            let delay = u32::try_from(position)
                .unwrap_or(u32::MAX)
                .saturating_mul(STAGGER_MS);
            cx.schedule(TimerKey::Reveal(entry.card), delay);
        }
    }
}

impl Handler for RevealController {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn mount(&mut self, cx: &mut Dispatch<'_>) {
        for card in 0..self.cards.len() {
            cx.emit(Command::AddClass {
                element: Element::RevealCard(card),
                class: class::FADE_IN,
            });
        }
    }

    fn on_event(&mut self, _phase: Phase, event: &UiEvent, cx: &mut Dispatch<'_>) {
        if let UiEvent::Intersect(entries) = event {
            self.on_batch(entries, cx);
        }
    }

    fn on_timer(&mut self, key: TimerKey, cx: &mut Dispatch<'_>) {
        let TimerKey::Reveal(card) = key else {
            return;
        };
        if let Some(state) = self.cards.get_mut(card) {
            *state = RevealState::Visible;
            cx.emit(Command::AddClass {
                element: Element::RevealCard(card),
                class: class::VISIBLE,
            });
            cx.emit(Command::Unobserve { card });
        }
    }
}
