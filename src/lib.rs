//! Static asset serving for mounted directories
//!
//! A mount maps a request path prefix to a directory. Each mount validates
//! the request path, picks a pre-compressed variant when the client accepts
//! one, answers conditional requests with 304 and single byte ranges with
//! 206. Requests a mount does not claim fall through to the next one.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use config::{AppState, Config, MountConfig, RootSource};
pub use error::{ConfigError, InvalidPath, StaticError};
pub use handler::{Outcome, StaticFiles, StaticRequest};
