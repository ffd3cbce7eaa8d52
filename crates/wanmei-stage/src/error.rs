//! Error types for `wanmei-stage`.
//!
//! Every variant names the path that failed so a build log is actionable
//! without re-running under a debugger.

/// Errors from staging the site into the output directory.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// The previous output directory could not be removed.
    #[error("failed to clean '{path}': {reason}")]
    Clean { path: String, reason: String },

    /// A destination directory could not be created.
    #[error("failed to create directory '{path}': {reason}")]
    CreateDir { path: String, reason: String },

    /// A file could not be copied.
    #[error("failed to copy '{from}' to '{to}': {reason}")]
    Copy {
        from: String,
        to: String,
        reason: String,
    },

    /// A source directory could not be listed.
    #[error("failed to read directory '{path}': {reason}")]
    ReadDir { path: String, reason: String },

    /// Cleaning the output directory would delete sources.
    #[error("refusing to use '{path}' as output directory: {reason}")]
    UnsafeOutDir { path: String, reason: String },
}
