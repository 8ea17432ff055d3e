//! [`Volume`] backed by a directory of the host file system.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use tokio::fs;

use crate::storage::{DirEntry, EntryKind, Volume};
use crate::time::calendar::DateTime;

#[derive(Debug, Clone)]
pub struct DiskVolume {
    root: PathBuf,
}

impl DiskVolume {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request path below the root. `..` is refused rather than
    /// clamped.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for component in path.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    return Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        "parent directory components are not allowed",
                    ));
                }
                name => resolved.push(name),
            }
        }
        Ok(resolved)
    }

    /// Like `resolve`, but the root itself is off limits.
    fn resolve_below_root(&self, path: &str) -> io::Result<PathBuf> {
        let resolved = self.resolve(path)?;
        if resolved == self.root {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "operation not allowed on the volume root",
            ));
        }
        Ok(resolved)
    }
}

impl Volume for DiskVolume {
    type File = fs::File;

    async fn entry(&self, path: &str) -> io::Result<EntryKind> {
        let meta = fs::metadata(self.resolve(path)?).await?;
        Ok(if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File { size: meta.len() }
        })
    }

    async fn open(&self, path: &str) -> io::Result<fs::File> {
        fs::File::open(self.resolve(path)?).await
    }

    async fn create(&self, path: &str) -> io::Result<fs::File> {
        fs::File::create(self.resolve_below_root(path)?).await
    }

    async fn create_dir(&self, path: &str) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path)?).await
    }

    async fn remove_file(&self, path: &str) -> io::Result<()> {
        fs::remove_file(self.resolve_below_root(path)?).await
    }

    async fn remove_dir(&self, path: &str) -> io::Result<()> {
        fs::remove_dir(self.resolve_below_root(path)?).await
    }

    async fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        fs::rename(self.resolve_below_root(from)?, self.resolve_below_root(to)?).await
    }

    async fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let mut dir = fs::read_dir(self.resolve(path)?).await?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            let kind = if meta.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File { size: meta.len() }
            };
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .and_then(|d| u32::try_from(d.as_secs()).ok())
                .map(|secs| DateTime::from_unix(secs).to_fat());

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                modified,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn set_modified(&self, path: &str, secs: u32) -> io::Result<()> {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(self.resolve_below_root(path)?)
            .await?;
        let file = file.into_std().await;
        file.set_modified(UNIX_EPOCH + Duration::from_secs(secs.into()))
    }
}
