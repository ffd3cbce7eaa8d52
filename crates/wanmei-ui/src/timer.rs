//! Cancellable scheduled tasks keyed by purpose.
//!
//! A [`TimerKey`] names what a timer is for (a toast slot, a reveal card).
//! At most one token is pending per key: scheduling a key again cancels the
//! previous token, and firing a stale token is a no-op. This is what keeps a
//! superseded toast's removal timer from deleting its successor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dom::Command;
use crate::notify::ToastSlot;

/// Opaque handle for one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(u64);

impl TimerToken {
    /// Raw numeric value, for logs.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What a pending timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Auto-dismiss of the toast in a slot.
    Toast(ToastSlot),
    /// Staggered reveal of a card.
    Reveal(usize),
}

/// Token allocator and pending-task table.
#[derive(Debug, Default)]
pub struct Scheduler {
    next: u64,
    by_key: HashMap<TimerKey, TimerToken>,
    by_token: HashMap<TimerToken, TimerKey>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer for `key`, superseding any pending one.
    ///
    /// Emits `CancelTimer` for the superseded token (if any) followed by
    /// `StartTimer` for the new one.
    pub fn schedule(&mut self, key: TimerKey, delay_ms: u32, out: &mut Vec<Command>) -> TimerToken {
        self.cancel(key, out);
        self.next += 1;
        let token = TimerToken(self.next);
        self.by_key.insert(key, token);
        self.by_token.insert(token, key);
        out.push(Command::StartTimer { token, delay_ms });
        token
    }

    /// Cancel the pending timer for `key`. Returns `true` if one was pending.
    pub fn cancel(&mut self, key: TimerKey, out: &mut Vec<Command>) -> bool {
        match self.by_key.remove(&key) {
            Some(token) => {
                self.by_token.remove(&token);
                out.push(Command::CancelTimer { token });
                true
            }
            None => false,
        }
    }

    /// Resolve a fired token. Returns `None` for stale or unknown tokens.
    pub fn fire(&mut self, token: TimerToken) -> Option<TimerKey> {
        let key = self.by_token.remove(&token)?;
        self.by_key.remove(&key);
        Some(key)
    }

    #[must_use]
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.by_key.contains_key(&key)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.by_key.len()
    }
}
