//! Error types for `wanmei-ui`.
//!
//! Controllers themselves never fail: a missing element only disables the
//! behavior that needs it. Errors surface when the host hands over layout
//! data that cannot be interpreted, or when a clipboard path fails.

/// Errors from interpreting page layout input.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    /// A download button carries a `data-os` value that names no known OS.
    #[error("unknown operating system tag: '{tag}'")]
    UnknownOs { tag: String },

    /// A download flow name could not be parsed.
    #[error("unknown download flow: '{name}' (expected 'toast' or 'dropdown')")]
    UnknownFlow { name: String },

    /// A locale name could not be parsed.
    #[error("unknown locale: '{name}' (expected 'zh-CN' or 'en')")]
    UnknownLocale { name: String },
}

/// Errors from copying text to the system clipboard.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// The asynchronous clipboard API rejected the write.
    #[error("clipboard write rejected: {reason}")]
    WriteRejected { reason: String },

    /// The legacy selection-based copy command failed or returned false.
    #[error("legacy copy command failed: {reason}")]
    LegacyCopyFailed { reason: String },
}
