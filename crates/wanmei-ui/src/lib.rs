//! Interaction layer for the Wanmei landing page.
//!
//! Every page behavior (mobile menu, header scroll state, active section
//! highlighting, smooth anchor scrolling, staggered reveal animations,
//! download button selection, toasts, clipboard) is modeled as a small state
//! machine that consumes typed [`UiEvent`](event::UiEvent)s and emits
//! [`Command`](dom::Command)s. Applying commands to a real DOM is left to a
//! thin host binding; [`MemoryDocument`](document::MemoryDocument) applies
//! them in memory for tests and offline smoke runs.
//!
//! Delayed work never runs on hidden timers: controllers request timers
//! through the [`Scheduler`](timer::Scheduler), which hands out tokens that
//! the host fires back. Re-scheduling a key supersedes the pending token.

pub mod document;
pub mod dom;
pub mod download;
pub mod error;
pub mod event;
pub mod locale;
pub mod nav;
pub mod notify;
pub mod reveal;
pub mod scroll;
pub mod site;
pub mod smooth;
pub mod timer;

pub use dom::{Command, Element};
pub use download::{DownloadFlow, Os};
pub use error::{ClipboardError, UiError};
pub use event::UiEvent;
pub use site::{ClientEnv, DOWNLOAD_FLOW_ATTR, PageLayout, Site, SiteOptions};
