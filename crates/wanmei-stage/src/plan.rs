//! What a build copies, and where it may write.

use std::path::{Component, Path, PathBuf};

use crate::StageError;

/// Output directory name used when none is given.
pub const DEFAULT_OUT_DIR: &str = "dist";

/// Files and directories copied from the project root, in copy order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Top-level files, copied as-is.
    pub files: Vec<PathBuf>,
    /// Directories, copied recursively.
    pub dirs: Vec<PathBuf>,
}

impl Default for BuildPlan {
    fn default() -> Self {
        Self {
            files: vec![PathBuf::from("index.html")],
            dirs: vec![PathBuf::from("assets"), PathBuf::from("png")],
        }
    }
}

impl BuildPlan {
    /// Reject output directories whose cleaning would destroy sources.
    ///
    /// The output may not be the project root, one of its ancestors, a
    /// planned file, or anything inside a planned directory.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::UnsafeOutDir`] naming the conflict.
    pub fn check_out_dir(&self, root: &Path, out: &Path) -> Result<(), StageError> {
        let root = normalize(root);
        let out = normalize(out);
        let unsafe_dir = |reason: String| StageError::UnsafeOutDir {
            path: out.display().to_string(),
            reason,
        };

        if root.starts_with(&out) {
            return Err(unsafe_dir(if root == out {
                "it is the project root".to_owned()
            } else {
                "it contains the project root".to_owned()
            }));
        }
        for file in &self.files {
            if out == root.join(file) {
                return Err(unsafe_dir(format!("it is the source file '{}'", file.display())));
            }
        }
        for dir in &self.dirs {
            if out.starts_with(root.join(dir)) {
                return Err(unsafe_dir(format!(
                    "it lies inside the source directory '{}'",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

/// Absolute, lexically normalized form of `path`. Does not touch the
/// filesystem, so it works for output directories that do not exist yet.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(out: &str) -> Result<(), StageError> {
        BuildPlan::default().check_out_dir(Path::new("/srv/site"), Path::new(out))
    }

    #[test]
    fn default_plan_copies_page_and_asset_dirs() {
        let plan = BuildPlan::default();
        assert_eq!(plan.files, vec![PathBuf::from("index.html")]);
        assert_eq!(plan.dirs, vec![PathBuf::from("assets"), PathBuf::from("png")]);
    }

    #[test]
    fn dist_and_sibling_dirs_are_allowed() {
        assert!(check("/srv/site/dist").is_ok());
        assert!(check("/srv/site/build/out").is_ok());
        assert!(check("/tmp/wanmei-dist").is_ok());
        assert!(check("/srv/site/assets-dist").is_ok());
    }

    #[test]
    fn root_and_ancestors_are_refused() {
        assert!(matches!(check("/srv/site"), Err(StageError::UnsafeOutDir { .. })));
        assert!(matches!(check("/srv/site/dist/.."), Err(StageError::UnsafeOutDir { .. })));
        assert!(matches!(check("/srv"), Err(StageError::UnsafeOutDir { .. })));
        assert!(matches!(check("/"), Err(StageError::UnsafeOutDir { .. })));
    }

    #[test]
    fn source_paths_are_refused() {
        assert!(matches!(check("/srv/site/assets"), Err(StageError::UnsafeOutDir { .. })));
        assert!(matches!(check("/srv/site/png/out"), Err(StageError::UnsafeOutDir { .. })));
        assert!(matches!(check("/srv/site/index.html"), Err(StageError::UnsafeOutDir { .. })));
    }
}
