//! Pre-compressed variant selection
//!
//! Picks `FILE.br`, `FILE.gz` or `FILE` itself depending on what the client
//! accepts and which encodings the mount enables. Only regular files count.

use crate::error::Result;
use crate::handler::fs::{self, FileMeta};
use crate::handler::resolve::ResolvedAsset;
use crate::http::headers;
use hyper::header::{HeaderMap, HeaderValue, RANGE};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Content coding of a served variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Brotli,
    Gzip,
    Identity,
}

impl Encoding {
    /// Token as it appears in `accept-encoding` / `content-encoding`
    pub const fn token(self) -> &'static str {
        match self {
            Self::Brotli => "br",
            Self::Gzip => "gzip",
            Self::Identity => "identity",
        }
    }

    const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Brotli => Some(".br"),
            Self::Gzip => Some(".gz"),
            Self::Identity => None,
        }
    }

    /// `content-encoding` value to send, if any
    pub fn content_encoding(self) -> Option<HeaderValue> {
        match self {
            Self::Brotli => Some(HeaderValue::from_static("br")),
            Self::Gzip => Some(HeaderValue::from_static("gzip")),
            Self::Identity => None,
        }
    }
}

/// Which compressed variants a mount may serve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compression {
    pub brotli: bool,
    pub gzip: bool,
}

impl Compression {
    /// Whether responses depend on `accept-encoding` at all
    pub const fn any(self) -> bool {
        self.brotli || self.gzip
    }
}

/// The file actually chosen for a request
#[derive(Debug, Clone)]
pub struct Variant {
    pub encoding: Encoding,
    pub path: PathBuf,
    pub meta: FileMeta,
}

/// Try candidates in priority order and return the first regular file
///
/// A request carrying a `Range` header is always served uncompressed, since
/// offsets into a compressed body would not mean anything to the client.
pub async fn select_variant(
    asset: &ResolvedAsset,
    request_headers: &HeaderMap,
    compression: Compression,
) -> Result<Option<Variant>> {
    let negotiate = !request_headers.contains_key(RANGE);

    let enabled = [
        (Encoding::Brotli, compression.brotli),
        (Encoding::Gzip, compression.gzip),
    ];
    let candidates = enabled
        .into_iter()
        .filter(|&(encoding, on)| {
            negotiate && on && headers::accepts_encoding(request_headers, encoding.token())
        })
        .map(|(encoding, _)| encoding)
        .chain(std::iter::once(Encoding::Identity));

    for encoding in candidates {
        let path = variant_path(asset.path(), encoding);
        if let Some(meta) = fs::stat(&path).await? {
            if meta.is_regular() {
                return Ok(Some(Variant {
                    encoding,
                    path,
                    meta,
                }));
            }
        }
    }
    Ok(None)
}

fn variant_path(path: &Path, encoding: Encoding) -> PathBuf {
    match encoding.suffix() {
        Some(suffix) => {
            let mut name = OsString::from(path.as_os_str());
            name.push(suffix);
            PathBuf::from(name)
        }
        None => path.to_path_buf(),
    }
}
