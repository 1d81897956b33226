//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: offers the request to each mount
//! in order and turns the pipeline's outcome into a response.

use crate::config::AppState;
use crate::handler::static_files::{Outcome, StaticRequest};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::split_path;
use crate::http::ResponseBody;
use hyper::body::Body;
use hyper::header::CONTENT_LENGTH;
use hyper::http::request::Parts;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// The request body is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let (response, mount) = route_request(&parts, &state).await;

    if state.access_log() {
        let mut entry = AccessLogEntry::from_request(
            peer,
            &parts.method,
            &parts.uri,
            parts.version,
            &parts.headers,
        );
        entry.status = response.status().as_u16();
        entry.body_bytes = body_bytes(&response);
        entry.mount = mount;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Bytes the response body will carry
///
/// Streamed file bodies have no exact size hint; their `content-length` is
/// used instead.
fn body_bytes(response: &Response<ResponseBody>) -> u64 {
    response.body().size_hint().exact().unwrap_or_else(|| {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    })
}

/// Try each mount in configuration order
///
/// Returns the response and the mount point that produced it. Requests no
/// mount claims get 404, unsafe paths 400 and filesystem failures 500.
async fn route_request(
    parts: &Parts,
    state: &AppState,
) -> (Response<ResponseBody>, Option<String>) {
    let path = parts.uri.path();
    let segments = split_path(path);
    let req = StaticRequest {
        method: &parts.method,
        segments: &segments,
        query: parts.uri.query().unwrap_or(""),
        headers: &parts.headers,
    };

    for mount in &state.mounts {
        match mount.call(&req).await {
            Ok(Outcome::Pass) => {}
            Ok(Outcome::Served(resp)) => return (resp, Some(mount.mount_point())),
            Ok(Outcome::Invalid(reason)) => {
                logger::log_invalid_path(path, &reason);
                return (http::build_400_response(), Some(mount.mount_point()));
            }
            Err(e) => {
                logger::log_error(&format!("Failed to serve {path}: {e}"));
                return (http::build_500_response(), Some(mount.mount_point()));
            }
        }
    }

    (http::build_404_response(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MountConfig, RootSource};
    use http_body_util::BodyExt;
    use hyper::{Method, StatusCode};

    fn state_with(mounts: Vec<MountConfig>) -> Arc<AppState> {
        let mut config = Config::load_from("/nonexistent/static-mount-config").unwrap();
        config.logging.access_log = false;
        config.mounts = mounts;
        Arc::new(AppState::new(config).unwrap())
    }

    fn mount(at: &str, dir: &std::path::Path) -> MountConfig {
        MountConfig::new(at, RootSource::Dir(dir.to_str().unwrap().to_string()))
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str) -> Response<ResponseBody> {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        let peer = "127.0.0.1:40000".parse().unwrap();
        handle_request(req, Arc::clone(state), peer).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_mount_that_serves_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("a.txt"), b"first").unwrap();
        std::fs::write(second.path().join("a.txt"), b"second").unwrap();
        std::fs::write(second.path().join("b.txt"), b"only second").unwrap();

        let state = state_with(vec![mount("/", first.path()), mount("/", second.path())]);

        let resp = send(&state, Method::GET, "/a.txt").await;
        assert_eq!(&resp.into_body().collect().await.unwrap().to_bytes()[..], b"first");

        let resp = send(&state, Method::GET, "/b.txt").await;
        assert_eq!(
            &resp.into_body().collect().await.unwrap().to_bytes()[..],
            b"only second"
        );
    }

    #[tokio::test]
    async fn test_unclaimed_requests_get_404() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let state = state_with(vec![mount("/static", dir.path())]);

        assert_eq!(send(&state, Method::GET, "/a.txt").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            send(&state, Method::POST, "/static/a.txt").await.status(),
            StatusCode::NOT_FOUND
        );
        let empty = state_with(Vec::new());
        assert_eq!(send(&empty, Method::GET, "/").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_path_gets_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(vec![mount("/static", dir.path())]);
        let resp = send(&state, Method::GET, "/static/%2e%2e/etc/passwd").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_body_bytes_for_streamed_and_head_responses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"0123456789").unwrap();
        let state = state_with(vec![mount("/static", dir.path())]);

        assert_eq!(body_bytes(&send(&state, Method::GET, "/static/a.txt").await), 10);
        assert_eq!(body_bytes(&send(&state, Method::HEAD, "/static/a.txt").await), 0);
        assert_eq!(body_bytes(&send(&state, Method::GET, "/nope").await), 13);
    }

    #[tokio::test]
    async fn test_query_reaches_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.css"), b"body{}").unwrap();
        let state = state_with(vec![mount("/static", dir.path())]);

        let resp = send(&state, Method::GET, "/static/app.css?vsn=abc").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(hyper::header::ETAG).is_none());
    }
}
