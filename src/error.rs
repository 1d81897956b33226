//! Error types
//!
//! Configuration problems are reported once at start-up, rejected paths are a
//! normal request outcome, and filesystem failures bubble up to the router.

use std::path::PathBuf;
use thiserror::Error;

/// Problems detected while building a mount in `StaticFiles::init`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("mount point must be a non-empty path starting with '/', got {0:?}")]
    InvalidMountPoint(String),

    #[error("cannot resolve static root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid header name {0:?}")]
    HeaderName(String),

    #[error("invalid value for header {name:?}: {value:?}")]
    HeaderValue { name: String, value: String },

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Why a request path was refused before touching the filesystem
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidPath {
    #[error("malformed percent-encoding in segment {0:?}")]
    BadEncoding(String),

    #[error("segment {0:?} does not decode to UTF-8")]
    NotUtf8(String),

    #[error("traversal segment {0:?}")]
    Traversal(String),

    #[error("forbidden character in segment {0:?}")]
    ForbiddenChar(String),
}

/// Failures while serving an eligible, valid request
#[derive(Error, Debug)]
pub enum StaticError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("etag {0:?} is not a valid header value")]
    InvalidEtag(String),
}

impl StaticError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for request handling
pub type Result<T> = std::result::Result<T, StaticError>;
