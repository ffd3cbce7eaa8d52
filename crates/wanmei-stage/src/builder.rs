//! Executes a [`BuildPlan`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::{BuildPlan, StageError};

/// Counters for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub files_copied: u64,
    pub bytes_copied: u64,
    /// Directories created, the output directory included.
    pub dirs_created: u64,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} bytes, {} directories",
            self.files_copied, self.bytes_copied, self.dirs_created
        )
    }
}

/// Builds the site from a project root into an output directory.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    root: PathBuf,
    out: PathBuf,
    plan: BuildPlan,
}

impl SiteBuilder {
    /// Builder with the default plan.
    #[must_use]
    pub fn new(root: impl AsRef<Path>, out: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            out: out.as_ref().to_path_buf(),
            plan: BuildPlan::default(),
        }
    }

    #[must_use]
    pub fn with_plan(mut self, plan: BuildPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::UnsafeOutDir`] before touching the filesystem if
    /// the output directory overlaps the sources, otherwise the first I/O
    /// failure. A failed build may leave a partial output directory.
    pub async fn build(&self) -> Result<BuildSummary, StageError> {
        self.plan.check_out_dir(&self.root, &self.out)?;
        info!(root = %self.root.display(), out = %self.out.display(), "starting build");

        let mut summary = BuildSummary::default();

        info!("cleaning output directory");
        clean(&self.out).await?;
        create_dir(&self.out).await?;
        summary.dirs_created += 1;

        for file in &self.plan.files {
            let src = self.root.join(file);
            if !exists(&src).await {
                debug!(path = %src.display(), "source file missing, skipped");
                continue;
            }
            info!(file = %file.display(), "copying file");
            summary.bytes_copied += copy_file(&src, &self.out.join(file)).await?;
            summary.files_copied += 1;
        }

        for dir in &self.plan.dirs {
            let src = self.root.join(dir);
            if !exists(&src).await {
                debug!(path = %src.display(), "source directory missing, skipped");
                continue;
            }
            info!(dir = %dir.display(), "copying directory");
            copy_dir(&src, &self.out.join(dir), &mut summary).await?;
        }

        info!(
            out = %self.out.display(),
            files = summary.files_copied,
            bytes = summary.bytes_copied,
            "build complete"
        );
        Ok(summary)
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn clean(path: &Path) -> Result<(), StageError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StageError::Clean {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

async fn create_dir(path: &Path) -> Result<(), StageError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| StageError::CreateDir {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

async fn copy_file(from: &Path, to: &Path) -> Result<u64, StageError> {
    tokio::fs::copy(from, to).await.map_err(|e| StageError::Copy {
        from: from.display().to_string(),
        to: to.display().to_string(),
        reason: e.to_string(),
    })
}

/// Recursive copy. Entries that are directories (not following symlinks)
/// are descended into; everything else is copied as a file.
async fn copy_dir(src: &Path, dest: &Path, summary: &mut BuildSummary) -> Result<(), StageError> {
    let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];

    while let Some((src, dest)) = pending.pop() {
        create_dir(&dest).await?;
        summary.dirs_created += 1;

        let read_err = |e: std::io::Error| StageError::ReadDir {
            path: src.display().to_string(),
            reason: e.to_string(),
        };
        let mut entries = tokio::fs::read_dir(&src).await.map_err(read_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let from = entry.path();
            let to = dest.join(entry.file_name());
            let file_type = entry.file_type().await.map_err(read_err)?;
            if file_type.is_dir() {
                pending.push((from, to));
            } else {
                summary.bytes_copied += copy_file(&from, &to).await?;
                summary.files_copied += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("index.html"), "<!doctype html><title>万媒师</title>").unwrap();
        fs::create_dir_all(root.join("assets/css")).unwrap();
        fs::write(root.join("assets/a.css"), "body { margin: 0 }").unwrap();
        fs::write(root.join("assets/css/style.css"), ".hero { color: red }").unwrap();
        fs::create_dir_all(root.join("png")).unwrap();
        fs::write(root.join("png/logo.png"), [0x89, b'P', b'N', b'G', 0, 1, 2, 3]).unwrap();
        fs::write(root.join("README.md"), "not deployed").unwrap();
        dir
    }

    fn assert_same(root: &Path, out: &Path, rel: &str) {
        assert_eq!(fs::read(root.join(rel)).unwrap(), fs::read(out.join(rel)).unwrap(), "{rel}");
    }

    #[tokio::test]
    async fn copies_planned_sources_byte_for_byte() {
        let dir = project();
        let out = dir.path().join("dist");
        let summary = SiteBuilder::new(dir.path(), &out).build().await.unwrap();

        for rel in ["index.html", "assets/a.css", "assets/css/style.css", "png/logo.png"] {
            assert_same(dir.path(), &out, rel);
        }
        assert!(!out.join("README.md").exists());
        assert_eq!(summary.files_copied, 4);
        // dist, assets, assets/css, png
        assert_eq!(summary.dirs_created, 4);
    }

    #[tokio::test]
    async fn rebuild_is_idempotent_and_drops_stale_files() {
        let dir = project();
        let out = dir.path().join("dist");
        let builder = SiteBuilder::new(dir.path(), &out);

        let first = builder.build().await.unwrap();
        fs::write(out.join("stale.txt"), "left over").unwrap();
        let second = builder.build().await.unwrap();

        assert_eq!(first, second);
        assert!(!out.join("stale.txt").exists());
        assert_same(dir.path(), &out, "png/logo.png");
    }

    #[tokio::test]
    async fn missing_sources_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let out = dir.path().join("dist");

        let summary = SiteBuilder::new(dir.path(), &out).build().await.unwrap();
        assert_eq!(summary.files_copied, 1);
        assert!(!out.join("assets").exists());
        assert!(!out.join("png").exists());
    }

    #[tokio::test]
    async fn unsafe_out_dir_leaves_sources_alone() {
        let dir = project();
        let err = SiteBuilder::new(dir.path(), dir.path().join("assets"))
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::UnsafeOutDir { .. }));
        assert!(dir.path().join("assets/a.css").exists());
    }

    #[tokio::test]
    async fn custom_plan_is_honored() {
        let dir = project();
        let out = dir.path().join("public");
        let plan = BuildPlan {
            files: vec![PathBuf::from("README.md")],
            dirs: Vec::new(),
        };
        let summary = SiteBuilder::new(dir.path(), &out)
            .with_plan(plan)
            .build()
            .await
            .unwrap();
        assert_eq!(summary.files_copied, 1);
        assert_same(dir.path(), &out, "README.md");
    }
}
