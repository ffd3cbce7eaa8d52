//! Build step for the Wanmei landing page.
//!
//! The site has no compilation step: building means producing a fresh
//! output directory holding exactly the files that get deployed. A build
//! is a fixed [`BuildPlan`] executed by [`SiteBuilder`]:
//!
//! 1. remove the output directory if it exists,
//! 2. recreate it,
//! 3. copy each planned file that exists in the project root,
//! 4. recursively copy each planned directory that exists.
//!
//! Steps run strictly in order and the build stops at the first error.
//! Missing sources are skipped, not errors.

mod builder;
mod error;
mod plan;

pub use builder::{BuildSummary, SiteBuilder};
pub use error::StageError;
pub use plan::{BuildPlan, DEFAULT_OUT_DIR};
