//! Request path resolution
//!
//! Turns the raw segments left after mount matching into a path under the
//! static root. Every segment is decoded and checked before any path is
//! built, so a `ResolvedAsset` cannot point outside the root.

use crate::error::InvalidPath;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

const FORBIDDEN_CHARS: [char; 4] = ['/', '\\', ':', '\0'];

/// A validated file location under a mount's root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    segments: Vec<String>,
    path: PathBuf,
}

impl ResolvedAsset {
    /// Decode and validate `raw_segments`, then join them onto `root`
    pub fn resolve(root: &Path, raw_segments: &[&str]) -> Result<Self, InvalidPath> {
        let segments = raw_segments
            .iter()
            .map(|raw| decode_segment(raw))
            .collect::<Result<Vec<_>, _>>()?;

        for segment in &segments {
            validate_segment(segment)?;
        }

        let path = segments.iter().fold(root.to_path_buf(), |acc, s| acc.join(s));
        Ok(Self { segments, path })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decoded last segment, used for content-type lookup
    pub fn filename(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }
}

/// Strict percent-decoding
///
/// A `%` must be followed by two hex digits and the result must be UTF-8.
fn decode_segment(raw: &str) -> Result<String, InvalidPath> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(InvalidPath::BadEncoding(raw.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| InvalidPath::NotUtf8(raw.to_string()))
}

fn validate_segment(segment: &str) -> Result<(), InvalidPath> {
    if matches!(segment, "" | "." | "..") {
        return Err(InvalidPath::Traversal(segment.to_string()));
    }
    if segment.contains(FORBIDDEN_CHARS) {
        return Err(InvalidPath::ForbiddenChar(segment.to_string()));
    }
    Ok(())
}
