//! Static file serving module
//!
//! `StaticFiles` is one mount: built once from a `MountConfig` with
//! [`StaticFiles::init`], then asked to handle requests with
//! [`StaticFiles::call`]. Each call runs the same fixed sequence: mount
//! matching, path validation, variant selection, the freshness check and
//! finally range handling. Any step may end the request early.

use crate::config::MountConfig;
use crate::error::{ConfigError, InvalidPath, Result};
use crate::handler::fs;
use crate::handler::resolve::ResolvedAsset;
use crate::handler::variant::{select_variant, Compression, Variant};
use crate::http::cache::{self, CacheDecision, CachePolicy};
use crate::http::range::{self, RangeDecision};
use crate::http::response::{self, ResponseBody};
use crate::http::mime;
use crate::routing::MountFilter;
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_RANGES, CONTENT_ENCODING, CONTENT_RANGE,
    CONTENT_TYPE, VARY,
};
use hyper::{Method, Response, StatusCode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The parts of a request the pipeline looks at
#[derive(Debug, Clone, Copy)]
pub struct StaticRequest<'a> {
    pub method: &'a Method,
    /// Path segments as received (still percent-encoded)
    pub segments: &'a [&'a str],
    /// Raw query string without the leading `?`
    pub query: &'a str,
    pub headers: &'a HeaderMap,
}

impl StaticRequest<'_> {
    fn is_head(&self) -> bool {
        *self.method == Method::HEAD
    }
}

/// Result of offering a request to a mount
#[derive(Debug)]
pub enum Outcome {
    /// Not for this mount; continue with the rest of the pipeline
    Pass,
    /// For this mount, but the path is unsafe; answer with a client error
    Invalid(InvalidPath),
    /// Fully handled; send this response and stop
    Served(Response<ResponseBody>),
}

/// A configured static mount
#[derive(Debug)]
pub struct StaticFiles {
    filter: MountFilter,
    root: PathBuf,
    compression: Compression,
    cache: CachePolicy,
    headers: HeaderMap,
    content_types: HashMap<String, HeaderValue>,
}

impl StaticFiles {
    /// Validate a mount's settings and resolve its root to an absolute path
    pub fn init(config: &MountConfig, apps_root: &Path) -> std::result::Result<Self, ConfigError> {
        let filter = MountFilter::new(
            &config.at,
            config.only.clone(),
            config.only_matching.clone(),
        )?;

        let dir = config.from.directory(apps_root);
        let root = std::path::absolute(&dir).map_err(|source| ConfigError::Root {
            path: dir.clone(),
            source,
        })?;

        let cache = CachePolicy {
            for_etags: optional_header_value("cache-control", &config.cache_control_for_etags)?,
            for_vsn_requests: optional_header_value(
                "cache-control",
                &config.cache_control_for_vsn_requests,
            )?,
            etag_generation: config.etag_generation.clone(),
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::HeaderName(name.clone()))?;
            headers.insert(header_name, header_value(name, value)?);
        }

        let content_types = config
            .content_types
            .iter()
            .map(|(file, ty)| header_value("content-type", ty).map(|value| (file.clone(), value)))
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            filter,
            root,
            compression: Compression {
                brotli: config.brotli,
                gzip: config.gzip,
            },
            cache,
            headers,
            content_types,
        })
    }

    /// Absolute directory files are served from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mount point as a path, e.g. `/public`
    pub fn mount_point(&self) -> String {
        format!("/{}", self.filter.prefix().join("/"))
    }

    /// Handle one request
    ///
    /// Filesystem failures other than a missing file are returned as errors
    /// for the host to turn into a server error.
    pub async fn call(&self, req: &StaticRequest<'_>) -> Result<Outcome> {
        let Some(subset) = self.filter.eligible(req.method, req.segments) else {
            return Ok(Outcome::Pass);
        };

        let asset = match ResolvedAsset::resolve(&self.root, subset) {
            Ok(asset) => asset,
            Err(reason) => return Ok(Outcome::Invalid(reason)),
        };

        let Some(variant) = select_variant(&asset, req.headers, self.compression).await? else {
            return Ok(Outcome::Pass);
        };

        let decision = cache::decide(
            &self.cache,
            req.query,
            req.headers,
            &variant.path,
            &variant.meta,
        )?;

        let response = match decision {
            CacheDecision::Fresh(mut headers) => {
                self.add_vary(&mut headers);
                response::build_304_response(headers)
            }
            CacheDecision::Stale(mut headers) => {
                self.add_entity_headers(&mut headers, &asset, &variant);
                self.send_body(req, &variant, headers).await?
            }
        };
        Ok(Outcome::Served(response))
    }

    fn add_entity_headers(&self, headers: &mut HeaderMap, asset: &ResolvedAsset, variant: &Variant) {
        let filename = asset.filename();
        let content_type = self
            .content_types
            .get(filename)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(mime::from_filename(filename)));

        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        if let Some(encoding) = variant.encoding.content_encoding() {
            headers.insert(CONTENT_ENCODING, encoding);
        }
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }

    fn add_vary(&self, headers: &mut HeaderMap) {
        if self.compression.any() {
            headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));
        }
    }

    async fn send_body(
        &self,
        req: &StaticRequest<'_>,
        variant: &Variant,
        mut headers: HeaderMap,
    ) -> Result<Response<ResponseBody>> {
        let size = variant.meta.size;

        match range::select_range(req.headers, size) {
            RangeDecision::Partial(byte_range) => {
                if let Ok(value) = HeaderValue::from_str(&byte_range.content_range()) {
                    headers.insert(CONTENT_RANGE, value);
                }
                let length = byte_range.content_length();
                let body = if req.is_head() {
                    response::empty_body()
                } else {
                    let stream = fs::read_range(&variant.path, byte_range.start, length).await?;
                    response::stream_body(stream)
                };
                Ok(response::build_file_response(
                    StatusCode::PARTIAL_CONTENT,
                    headers,
                    body,
                    length,
                ))
            }
            RangeDecision::Full => {
                self.add_vary(&mut headers);
                let (body, length) = if req.is_head() {
                    (response::empty_body(), size)
                } else {
                    let (stream, length) = fs::read_whole(&variant.path).await?;
                    (response::stream_body(stream), length)
                };
                Ok(response::build_file_response(
                    StatusCode::OK,
                    headers,
                    body,
                    length,
                ))
            }
        }
    }
}

fn header_value(name: &str, value: &str) -> std::result::Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::HeaderValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn optional_header_value(
    name: &str,
    value: &str,
) -> std::result::Result<Option<HeaderValue>, ConfigError> {
    if value.is_empty() {
        return Ok(None);
    }
    header_value(name, value).map(Some)
}
