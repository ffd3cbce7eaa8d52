//! Error types for `wanmei-smoke`.

/// Errors from driving a page.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The browser could not be configured or started.
    #[error("failed to launch browser: {reason}")]
    Launch { reason: String },

    /// The page could not be loaded.
    #[error("failed to load '{url}': {reason}")]
    Navigation { url: String, reason: String },

    /// Loading did not finish within the budget.
    #[error("loading '{url}' timed out during {phase} after {after_ms} ms")]
    Timeout {
        url: String,
        phase: &'static str,
        after_ms: u64,
    },

    /// An operation needed a loaded page and none was loaded.
    #[error("no page loaded")]
    NotLoaded,

    /// A CSS selector could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Querying the document failed.
    #[error("query '{selector}' failed: {reason}")]
    Query { selector: String, reason: String },

    /// Clicking an element failed.
    #[error("click on '{selector}' failed: {reason}")]
    Click { selector: String, reason: String },

    /// Resizing the viewport failed.
    #[error("failed to resize viewport to {width}x{height}: {reason}")]
    Viewport {
        width: u32,
        height: u32,
        reason: String,
    },

    /// A DevTools protocol command failed.
    #[error("protocol error: {reason}")]
    Protocol { reason: String },

    /// Shutting the browser down failed.
    #[error("failed to close browser: {reason}")]
    Close { reason: String },
}
