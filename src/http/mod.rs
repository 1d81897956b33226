//! HTTP protocol layer module
//!
//! Header helpers, cache validation, range handling, MIME lookup and response
//! builders used by the static pipeline.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod range;
pub mod response;

pub use cache::{CacheDecision, CachePolicy, EtagGenerator};
pub use range::{ByteRange, RangeDecision};
pub use response::{build_400_response, build_404_response, build_500_response, ResponseBody};
