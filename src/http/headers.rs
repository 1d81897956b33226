//! Request header helpers
//!
//! Multi-value lookup and comma-separated list splitting shared by the
//! encoding negotiation and conditional request checks.

use hyper::header::{AsHeaderName, HeaderMap, ACCEPT_ENCODING};

/// All values of a (possibly repeated) header that are valid visible ASCII
pub fn values<'a, K: AsHeaderName>(
    headers: &'a HeaderMap,
    name: K,
) -> impl Iterator<Item = &'a str> {
    headers
        .get_all(name)
        .into_iter()
        .filter_map(|v| v.to_str().ok())
}

/// Split a header value into its comma-separated elements
///
/// Elements are trimmed and empty elements are dropped. Parameters such as
/// `;q=0.8` stay attached to their element.
pub fn list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|e| !e.is_empty())
}

/// Whether any `accept-encoding` value admits `token`
///
/// An element admits the token when it contains either the token or `*`.
/// Quality values are not interpreted, so `br;q=0` still counts.
pub fn accepts_encoding(headers: &HeaderMap, token: &str) -> bool {
    values(headers, ACCEPT_ENCODING)
        .flat_map(list)
        .any(|element| element.contains(token) || element.contains('*'))
}
