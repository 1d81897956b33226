//! HTTP Range request parsing module
//!
//! Single byte-range support. Anything that cannot be answered with one
//! partial slice of the file degrades to a full response; this module never
//! produces a 416.

use crate::http::headers;
use hyper::header::{HeaderMap, RANGE};

/// Inclusive byte range inside a file of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
    pub size: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` header
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.size)
    }
}

/// How the body should be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDecision {
    /// 206 with this slice
    Partial(ByteRange),
    /// 200 with the whole file
    Full,
}

/// Pick the range handling for a request
///
/// Only a request carrying exactly one `Range` header is considered; zero or
/// several headers both mean a full response.
pub fn select_range(request_headers: &HeaderMap, file_size: u64) -> RangeDecision {
    let mut values = headers::values(request_headers, RANGE);
    match (values.next(), values.next()) {
        (Some(value), None) => parse_range_header(value, file_size),
        _ => RangeDecision::Full,
    }
}

/// Parse a `Range` header value (single range, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// A range covering the entire file is answered in full rather than as a
/// partial response.
///
/// # Examples
/// ```
/// use static_mount::http::range::{parse_range_header, RangeDecision};
///
/// assert!(matches!(parse_range_header("bytes=0-99", 1000), RangeDecision::Partial(_)));
/// assert_eq!(parse_range_header("bytes=0-", 1000), RangeDecision::Full);
/// assert_eq!(parse_range_header("items=0-1", 1000), RangeDecision::Full);
/// ```
pub fn parse_range_header(value: &str, file_size: u64) -> RangeDecision {
    let Some(spec) = value.trim().strip_prefix("bytes=") else {
        return RangeDecision::Full; // Not bytes unit, ignore
    };

    let Some((start, end)) = start_and_end(spec.trim(), file_size) else {
        return RangeDecision::Full;
    };

    check_bounds(start, end, file_size).map_or(RangeDecision::Full, RangeDecision::Partial)
}

/// Bounds as signed values so a suffix longer than the file shows up negative
fn start_and_end(spec: &str, file_size: u64) -> Option<(i128, i128)> {
    let size = i128::from(file_size);

    // Suffix range: "-500" means last 500 bytes
    if let Some(suffix) = spec.strip_prefix('-') {
        let last = parse_position(suffix)?;
        return Some((size - last, size - 1));
    }

    let (start_str, end_str) = spec.split_once('-')?;
    let start = parse_position(start_str)?;
    if end_str.is_empty() {
        return Some((start, size - 1));
    }
    Some((start, parse_position(end_str)?))
}

fn parse_position(s: &str) -> Option<i128> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok().map(i128::from)
}

fn check_bounds(start: i128, end: i128, file_size: u64) -> Option<ByteRange> {
    let size = i128::from(file_size);
    if start < 0 || end >= size || start > end {
        return None;
    }
    if start == 0 && end == size - 1 {
        return None;
    }
    Some(ByteRange {
        start: u64::try_from(start).ok()?,
        end: u64::try_from(end).ok()?,
        size: file_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use proptest::prelude::*;

    fn partial(value: &str, size: u64) -> ByteRange {
        match parse_range_header(value, size) {
            RangeDecision::Partial(r) => r,
            RangeDecision::Full => panic!("Expected Partial for {value:?}"),
        }
    }

    #[test]
    fn test_standard_range() {
        let r = partial("bytes=0-9", 100);
        assert_eq!((r.start, r.end), (0, 9));
        assert_eq!(r.content_length(), 10);
        assert_eq!(r.content_range(), "bytes 0-9/100");
    }

    #[test]
    fn test_open_range() {
        let r = partial("bytes=50-", 100);
        assert_eq!((r.start, r.end), (50, 99));
        assert_eq!(r.content_length(), 50);
    }

    #[test]
    fn test_suffix_range() {
        let r = partial("bytes=-500", 10_000);
        assert_eq!(r.content_range(), "bytes 9500-9999/10000");
        assert_eq!(r.content_length(), 500);
    }

    #[test]
    fn test_whole_file_is_full() {
        assert_eq!(parse_range_header("bytes=0-", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=0-99", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=-100", 100), RangeDecision::Full);
        assert!(matches!(parse_range_header("bytes=0-98", 100), RangeDecision::Partial(_)));
    }

    #[test]
    fn test_out_of_bounds_is_full() {
        assert_eq!(parse_range_header("bytes=200-", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=10-100", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=20-10", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=-101", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=-0", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=0-", 0), RangeDecision::Full);
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(parse_range_header("bytes=a-b", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=0-9,20-29", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=5", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=+5-9", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("bytes=--5", 100), RangeDecision::Full);
        assert_eq!(parse_range_header("0-9", 100), RangeDecision::Full);
    }

    #[test]
    fn test_select_requires_exactly_one_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(select_range(&headers, 100), RangeDecision::Full);

        headers.append(RANGE, HeaderValue::from_static("bytes=0-9"));
        assert!(matches!(select_range(&headers, 100), RangeDecision::Partial(_)));

        headers.append(RANGE, HeaderValue::from_static("bytes=10-19"));
        assert_eq!(select_range(&headers, 100), RangeDecision::Full);
    }

    proptest! {
        #[test]
        fn prop_full_span_is_never_partial(size in 1u64..1_000_000) {
            let whole = format!("bytes=0-{}", size - 1);
            let suffix = format!("bytes=-{size}");
            prop_assert_eq!(parse_range_header("bytes=0-", size), RangeDecision::Full);
            prop_assert_eq!(parse_range_header(&whole, size), RangeDecision::Full);
            prop_assert_eq!(parse_range_header(&suffix, size), RangeDecision::Full);
        }

        #[test]
        fn prop_all_but_last_byte_is_partial(size in 2u64..1_000_000) {
            let r = partial(&format!("bytes=0-{}", size - 2), size);
            prop_assert_eq!(r.content_length(), size - 1);
            prop_assert_eq!(r.content_range(), format!("bytes 0-{}/{}", size - 2, size));
        }

        #[test]
        fn prop_suffix_covers_tail(size in 2u64..1_000_000, n in 1u64..1_000_000) {
            let decision = parse_range_header(&format!("bytes=-{n}"), size);
            if n < size {
                prop_assert_eq!(
                    decision,
                    RangeDecision::Partial(ByteRange { start: size - n, end: size - 1, size })
                );
            } else {
                prop_assert_eq!(decision, RangeDecision::Full);
            }
        }
    }
}
