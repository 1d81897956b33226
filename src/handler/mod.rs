//! Request handler module
//!
//! The static file pipeline and the router that runs mounts in order.

pub mod fs;
pub mod resolve;
pub mod router;
pub mod static_files;
pub mod variant;

pub use router::handle_request;
pub use static_files::{Outcome, StaticFiles, StaticRequest};
