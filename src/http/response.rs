//! HTTP response building module
//!
//! Builders for the responses the static pipeline and its host produce.
//! File bodies are streamed from disk; everything else is a small in-memory
//! body.

use futures_util::stream::{Stream, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use std::io;

/// Body type of every response this crate produces
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// In-memory body
pub fn full_body(bytes: impl Into<Bytes>) -> ResponseBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body read chunk by chunk from `stream`
pub fn stream_body<S>(stream: S) -> ResponseBody
where
    S: Stream<Item = io::Result<Bytes>> + Send + 'static,
{
    StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
}

/// Build 304 Not Modified response
pub fn build_304_response(headers: HeaderMap) -> Response<ResponseBody> {
    with_headers(Response::builder().status(StatusCode::NOT_MODIFIED), headers)
        .body(empty_body())
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            empty_response(StatusCode::NOT_MODIFIED)
        })
}

/// Build a 200 or 206 response carrying file bytes
///
/// `content_length` is sent even when `body` is empty, so HEAD responses
/// advertise the size of the body a GET would return.
pub fn build_file_response(
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    content_length: u64,
) -> Response<ResponseBody> {
    with_headers(Response::builder().status(status), headers)
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            build_500_response()
        })
}

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<ResponseBody> {
    text_response(StatusCode::BAD_REQUEST, "400 Bad Request")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn text_response(status: StatusCode, text: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(full_body(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            empty_response(status)
        })
}

fn with_headers(mut builder: Builder, headers: HeaderMap) -> Builder {
    if let Some(target) = builder.headers_mut() {
        target.extend(headers);
    }
    builder
}

fn empty_response(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
