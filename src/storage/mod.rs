//! The file volume the HTTP handlers operate on.
//!
//! Paths are the decoded request paths (`/dir/file.txt`); how they map onto
//! real storage is up to the implementation.

pub mod disk;

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::time::calendar::FatTimestamp;

pub use disk::DiskVolume;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File { size: u64 },
    Dir,
}

/// One line of a directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Last write time, if the volume tracks one
    pub modified: Option<FatTimestamp>,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

#[allow(async_fn_in_trait)]
pub trait Volume {
    type File: AsyncRead + AsyncWrite + Unpin;

    /// Is there something at `path`, and what.
    async fn entry(&self, path: &str) -> io::Result<EntryKind>;

    /// Opens an existing file for reading.
    async fn open(&self, path: &str) -> io::Result<Self::File>;

    /// Creates or truncates a file for writing. Fails if the parent
    /// directory does not exist.
    async fn create(&self, path: &str) -> io::Result<Self::File>;

    /// Creates a directory and any missing parents.
    async fn create_dir(&self, path: &str) -> io::Result<()>;

    async fn remove_file(&self, path: &str) -> io::Result<()>;

    /// Removes an empty directory.
    async fn remove_dir(&self, path: &str) -> io::Result<()>;

    async fn rename(&self, from: &str, to: &str) -> io::Result<()>;

    async fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>>;

    /// Stamps the last write time, in seconds since 1970 on the device
    /// clock.
    async fn set_modified(&self, path: &str, secs: u32) -> io::Result<()>;
}
