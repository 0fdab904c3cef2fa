use crate::error::{ReportError, Result};
use crate::reader::ContainerKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::warn;

/// One entry of the input directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Container kind; directories are always `Unsupported`
    pub kind: ContainerKind,
    pub size: u64,
    pub modified: SystemTime,
}

impl SourceFile {
    /// File name for display, falling back to the full path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Lists the input directory without recursing
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery;

impl FileDiscovery {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate every entry of `dir` as a [`SourceFile`].
    ///
    /// A missing, unreadable, or empty directory is a
    /// [`ReportError::Directory`]; unreadable individual entries are
    /// logged and skipped.
    pub async fn discover_files(&self, dir: &Path) -> Result<Vec<SourceFile>> {
        let metadata = fs::metadata(dir)
            .await
            .map_err(|e| directory_error(dir, format!("cannot access directory: {}", e)))?;
        if !metadata.is_dir() {
            return Err(directory_error(dir, "not a directory"));
        }

        let mut read_dir = fs::read_dir(dir)
            .await
            .map_err(|e| directory_error(dir, format!("cannot list directory: {}", e)))?;

        let mut files = Vec::new();
        let mut entries_seen = 0usize;
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| directory_error(dir, format!("cannot list directory: {}", e)))?
        {
            entries_seen += 1;
            let path = entry.path();

            // Follow symlinks so a linked report behaves like a regular file
            let metadata = match fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let kind = if metadata.is_dir() {
                ContainerKind::Unsupported
            } else {
                ContainerKind::from_path(&path)
            };

            files.push(SourceFile {
                path,
                kind,
                size: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        if entries_seen == 0 {
            return Err(directory_error(dir, "directory is empty"));
        }

        Ok(files)
    }
}

/// Descending modification time; ties broken by path for a stable order
pub fn sort_newest_first(files: &mut [SourceFile]) {
    files.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.path.cmp(&b.path))
    });
}

fn directory_error(dir: &Path, reason: impl Into<String>) -> ReportError {
    ReportError::Directory {
        path: dir.to_path_buf(),
        reason: reason.into(),
    }
}
