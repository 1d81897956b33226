//! Filesystem access for static serving
//!
//! A single `stat` per candidate file and at most one body stream per request.
//! Nothing here is cached between requests.

use crate::error::{Result, StaticError};
use std::io::{ErrorKind, SeekFrom};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};
use tokio_util::io::ReaderStream;

/// What kind of filesystem entry a path names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Directory,
    Other,
}

/// Metadata gathered by `stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub size: u64,
    pub modified: SystemTime,
    pub kind: FileKind,
}

impl FileMeta {
    pub fn is_regular(&self) -> bool {
        self.kind == FileKind::Regular
    }

    /// Modification time as (seconds, nanoseconds) since the Unix epoch
    pub fn modified_since_epoch(&self) -> (u64, u32) {
        self.modified
            .duration_since(UNIX_EPOCH)
            .map_or((0, 0), |d| (d.as_secs(), d.subsec_nanos()))
    }
}

impl From<&std::fs::Metadata> for FileMeta {
    fn from(meta: &std::fs::Metadata) -> Self {
        let kind = if meta.is_file() {
            FileKind::Regular
        } else if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        };
        Self {
            size: meta.len(),
            modified: meta.modified().unwrap_or(UNIX_EPOCH),
            kind,
        }
    }
}

/// Stat a path, following symlinks
///
/// Returns `Ok(None)` when nothing exists at the path (including when a
/// parent component is a regular file). Other failures are reported.
pub async fn stat(path: &Path) -> Result<Option<FileMeta>> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(Some(FileMeta::from(&meta))),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(None),
        Err(e) => Err(StaticError::io(path, e)),
    }
}

/// Chunked reader over a bounded part of a file
pub type FileStream = ReaderStream<Take<fs::File>>;

async fn open(path: &Path) -> Result<fs::File> {
    fs::File::open(path)
        .await
        .map_err(|e| StaticError::io(path, e))
}

/// Stream `len` bytes starting at `offset`
///
/// The stream ends early if the file is shorter than `offset + len`.
pub async fn read_range(path: &Path, offset: u64, len: u64) -> Result<FileStream> {
    let mut file = open(path).await?;
    file.seek(SeekFrom::Start(offset))
        .await
        .map_err(|e| StaticError::io(path, e))?;
    Ok(ReaderStream::new(file.take(len)))
}

/// Stream the whole file
///
/// Also returns the length seen through the opened handle, which is what
/// the stream will yield.
pub async fn read_whole(path: &Path) -> Result<(FileStream, u64)> {
    let file = open(path).await?;
    let len = file
        .metadata()
        .await
        .map_err(|e| StaticError::io(path, e))?
        .len();
    Ok((ReaderStream::new(file.take(len)), len))
}
