//! HTTP cache control module
//!
//! Decides whether a client's cached copy is still valid, and which
//! `cache-control` / `etag` headers go on the response either way.

use crate::error::{Result, StaticError};
use crate::handler::fs::FileMeta;
use crate::http::headers;
use hyper::header::{HeaderMap, HeaderValue, CACHE_CONTROL, ETAG, IF_NONE_MATCH};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

type EtagFn = dyn Fn(&Path, &[String]) -> String + Send + Sync;

/// Caller-supplied etag generation
///
/// Holds a function and the extra arguments bound to it. The function is
/// called with the path of the file being served followed by those
/// arguments, and its result is used verbatim as the `etag` value.
#[derive(Clone)]
pub struct EtagGenerator {
    func: Arc<EtagFn>,
    args: Vec<String>,
}

impl EtagGenerator {
    pub fn new<F>(func: F, args: Vec<String>) -> Self
    where
        F: Fn(&Path, &[String]) -> String + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            args,
        }
    }

    pub fn generate(&self, path: &Path) -> String {
        (self.func)(path, &self.args)
    }
}

impl fmt::Debug for EtagGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtagGenerator")
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Per-mount caching settings, validated once at init
#[derive(Debug, Clone, Default)]
pub struct CachePolicy {
    /// `cache-control` sent alongside an etag
    pub for_etags: Option<HeaderValue>,
    /// `cache-control` sent for `?vsn=` requests
    pub for_vsn_requests: Option<HeaderValue>,
    pub etag_generation: Option<EtagGenerator>,
}

/// Outcome of the freshness check
#[derive(Debug)]
pub enum CacheDecision {
    /// The client's copy is current; answer 304
    Fresh(HeaderMap),
    /// The body must be sent
    Stale(HeaderMap),
}

/// Weak `ETag` derived from size and modification time
///
/// # Returns
/// `ETag` string of the form `W/"1f3a9c..."`
pub fn weak_etag(meta: &FileMeta) -> String {
    let (secs, nanos) = meta.modified_since_epoch();
    let mut hasher = DefaultHasher::new();
    (meta.size, secs, nanos).hash(&mut hasher);
    let v = hasher.finish();
    format!("W/\"{v:x}\"")
}

/// Check if any `If-None-Match` value or member equals the server's `ETag`
///
/// A header line matches when it is the etag as a whole, which keeps opaque
/// tags containing commas working. Otherwise the line is read as a
/// comma-separated list of tags. Comparison is exact, so a weak tag only
/// matches the identical weak tag.
pub fn check_etag_match(request_headers: &HeaderMap, etag: &str) -> bool {
    headers::values(request_headers, IF_NONE_MATCH)
        .any(|value| value.trim() == etag || headers::list(value).any(|tag| tag == etag))
}

/// Decide freshness for one request
///
/// * `query` - raw query string, without the leading `?`
/// * `path` - file that will be served (the selected variant)
pub fn decide(
    policy: &CachePolicy,
    query: &str,
    request_headers: &HeaderMap,
    path: &Path,
    meta: &FileMeta,
) -> Result<CacheDecision> {
    let mut response_headers = HeaderMap::new();

    if let Some(vsn_cache) = &policy.for_vsn_requests {
        if query.starts_with("vsn=") {
            response_headers.insert(CACHE_CONTROL, vsn_cache.clone());
            return Ok(CacheDecision::Stale(response_headers));
        }
    }

    let Some(etag_cache) = &policy.for_etags else {
        return Ok(CacheDecision::Stale(response_headers));
    };

    let etag = match &policy.etag_generation {
        Some(generator) => generator.generate(path),
        None => weak_etag(meta),
    };
    let etag_value =
        HeaderValue::from_str(&etag).map_err(|_| StaticError::InvalidEtag(etag.clone()))?;

    response_headers.insert(CACHE_CONTROL, etag_cache.clone());
    response_headers.insert(ETAG, etag_value);

    if check_etag_match(request_headers, &etag) {
        Ok(CacheDecision::Fresh(response_headers))
    } else {
        Ok(CacheDecision::Stale(response_headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::fs::FileKind;
    use std::time::{Duration, UNIX_EPOCH};

    fn meta(size: u64, secs: u64) -> FileMeta {
        FileMeta {
            size,
            modified: UNIX_EPOCH + Duration::from_secs(secs),
            kind: FileKind::Regular,
        }
    }

    fn policy() -> CachePolicy {
        CachePolicy {
            for_etags: Some(HeaderValue::from_static("public")),
            for_vsn_requests: Some(HeaderValue::from_static("public, max-age=31536000")),
            etag_generation: None,
        }
    }

    fn if_none_match(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append(IF_NONE_MATCH, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_weak_etag_format() {
        let etag = weak_etag(&meta(10, 1_700_000_000));
        assert!(etag.starts_with("W/\""));
        assert!(etag.ends_with('"'));
        assert!(etag.len() > 4);
    }

    #[test]
    fn test_weak_etag_consistency() {
        assert_eq!(weak_etag(&meta(10, 5)), weak_etag(&meta(10, 5)));
        assert_ne!(weak_etag(&meta(10, 5)), weak_etag(&meta(11, 5)));
        assert_ne!(weak_etag(&meta(10, 5)), weak_etag(&meta(10, 6)));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "W/\"abc123\"";
        assert!(check_etag_match(&if_none_match("W/\"abc123\""), etag));
        assert!(check_etag_match(&if_none_match("\"xyz\", W/\"abc123\""), etag));
        assert!(!check_etag_match(&if_none_match("\"abc123\""), etag));
        assert!(!check_etag_match(&if_none_match("*"), etag));
        assert!(!check_etag_match(&HeaderMap::new(), etag));
    }

    #[test]
    fn test_check_etag_match_with_comma_inside_tag() {
        let etag = "\"v1,2\"";
        assert!(check_etag_match(&if_none_match("\"v1,2\""), etag));
        assert!(check_etag_match(&if_none_match("  \"v1,2\" "), etag));
        assert!(!check_etag_match(&if_none_match("\"v1\""), etag));
    }

    #[test]
    fn test_vsn_query_skips_etag() {
        let m = meta(3, 1);
        let headers = if_none_match("*");
        let decision = decide(&policy(), "vsn=abc", &headers, Path::new("/x"), &m).unwrap();
        let CacheDecision::Stale(h) = decision else {
            panic!("vsn requests are never fresh");
        };
        assert_eq!(h.get(CACHE_CONTROL).unwrap(), "public, max-age=31536000");
        assert!(h.get(ETAG).is_none());
    }

    #[test]
    fn test_vsn_not_at_start_uses_etag() {
        let m = meta(3, 1);
        let headers = HeaderMap::new();
        let decision = decide(&policy(), "a=1&vsn=abc", &headers, Path::new("/x"), &m).unwrap();
        let CacheDecision::Stale(h) = decision else {
            panic!("expected stale");
        };
        assert_eq!(h.get(CACHE_CONTROL).unwrap(), "public");
        assert!(h.get(ETAG).is_some());
    }

    #[test]
    fn test_matching_etag_is_fresh() {
        let m = meta(3, 1);
        let etag = weak_etag(&m);
        let mut headers = HeaderMap::new();
        headers.append(IF_NONE_MATCH, HeaderValue::from_str(&etag).unwrap());

        let decision = decide(&policy(), "", &headers, Path::new("/x"), &m).unwrap();
        assert!(matches!(decision, CacheDecision::Fresh(_)));
    }

    #[test]
    fn test_no_etag_cache_control_is_stale_without_headers() {
        let m = meta(3, 1);
        let policy = CachePolicy::default();
        let decision = decide(&policy, "vsn=1", &HeaderMap::new(), Path::new("/x"), &m).unwrap();
        let CacheDecision::Stale(h) = decision else {
            panic!("expected stale");
        };
        assert!(h.is_empty());
    }

    #[test]
    fn test_generator_receives_path_and_args() {
        let m = meta(3, 1);
        let policy = CachePolicy {
            etag_generation: Some(EtagGenerator::new(
                |path, args| format!("\"{}-{}\"", path.display(), args.join("+")),
                vec!["v1".to_string(), "extra".to_string()],
            )),
            ..policy()
        };
        let headers = if_none_match("\"/srv/a.css-v1+extra\"");
        let decision = decide(&policy, "", &headers, Path::new("/srv/a.css"), &m).unwrap();
        let CacheDecision::Fresh(h) = decision else {
            panic!("expected fresh");
        };
        assert_eq!(h.get(ETAG).unwrap(), "\"/srv/a.css-v1+extra\"");
    }

    #[test]
    fn test_generator_with_unusable_value_is_an_error() {
        let m = meta(3, 1);
        let policy = CachePolicy {
            etag_generation: Some(EtagGenerator::new(|_, _| "bad\nvalue".to_string(), Vec::new())),
            ..policy()
        };
        assert!(decide(&policy, "", &HeaderMap::new(), Path::new("/x"), &m).is_err());
    }
}
