//! The page driver seam.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::DriverError;

/// Severity of a console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Debug,
    Log,
    Info,
    Warning,
    Error,
}

/// One message written to the page console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub text: String,
}

impl ConsoleMessage {
    #[must_use]
    pub fn new(level: ConsoleLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// A browser-like page the smoke test can drive.
///
/// Implementations collect console messages and uncaught page errors from
/// the moment they are created until [`close`](PageDriver::close).
#[async_trait]
pub trait PageDriver: Send {
    /// Short name for reports.
    fn name(&self) -> &'static str;

    /// Load `url` and wait until the network is idle.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Navigation`] if the page cannot be loaded.
    async fn goto(&mut self, url: &url::Url) -> Result<(), DriverError>;

    /// The document title.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotLoaded`] before a successful `goto`.
    async fn title(&mut self) -> Result<String, DriverError>;

    /// Number of elements matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidSelector`] or [`DriverError::Query`].
    async fn count(&mut self, selector: &str) -> Result<usize, DriverError>;

    /// Whether any element matches `selector`.
    ///
    /// # Errors
    ///
    /// Same as [`count`](PageDriver::count).
    async fn exists(&mut self, selector: &str) -> Result<bool, DriverError> {
        Ok(self.count(selector).await? > 0)
    }

    /// Click the first element matching `selector`. Returns `false` when
    /// nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Click`] if the element cannot be clicked.
    async fn click_first(&mut self, selector: &str) -> Result<bool, DriverError>;

    /// Resize the viewport.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Viewport`] if the resize is rejected.
    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), DriverError>;

    /// Let the page settle for `ms` milliseconds.
    async fn wait(&mut self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Console messages collected so far.
    async fn console_messages(&mut self) -> Vec<ConsoleMessage>;

    /// Uncaught page errors collected so far.
    async fn page_errors(&mut self) -> Vec<String>;

    /// Shut the page down. Further calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Close`] if the browser did not shut down cleanly.
    async fn close(&mut self) -> Result<(), DriverError>;
}
