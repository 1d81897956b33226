//! Routing module
//!
//! Matches request paths against static mount points.

mod matcher;

pub use matcher::{split_path, MountFilter};
