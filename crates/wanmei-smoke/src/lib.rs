//! Smoke test for the Wanmei landing page.
//!
//! [`run_smoke`] loads the page through a [`PageDriver`], checks that the
//! page's landmarks are present, clicks the first download button, toggles
//! the mobile menu at a phone-sized viewport, and collects console and page
//! errors. Every check is best-effort, a page that does not load in time is
//! a recorded flow error, and the driver is always closed.
//!
//! Two drivers are provided:
//!
//! - [`ChromeDriver`]: headless Chromium over the DevTools protocol
//!   (feature `chrome`, on by default)
//! - [`StaticDriver`]: parses the HTML offline and runs the `wanmei-ui`
//!   interaction layer against an in-memory document

pub mod checks;
#[cfg(feature = "chrome")]
mod chrome;
mod driver;
mod error;
mod report;
mod runner;
mod static_page;

#[cfg(feature = "chrome")]
pub use chrome::{ChromeDriver, ChromeOptions, DEFAULT_LOAD_TIMEOUT};
pub use driver::{ConsoleLevel, ConsoleMessage, PageDriver};
pub use error::DriverError;
pub use report::{CheckResult, SmokeReport, StepOutcome, StepResult};
pub use runner::{DEFAULT_SETTLE_MS, SmokeOptions, run_smoke};
pub use static_page::{STATIC_PLATFORM, STATIC_USER_AGENT, StaticDriver, scan_layout};
