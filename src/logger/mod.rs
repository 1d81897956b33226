//! Logger module
//!
//! Lifecycle, warning and error messages plus one access line per request.
//! Informational and access lines share the access sink; warnings and
//! errors go to the error sink. Before `init` runs, stdout/stderr are used.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::error::InvalidPath;
use crate::handler::StaticFiles;
use std::fmt::Display;
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy)]
enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    const fn tag(self) -> &'static str {
        match self {
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
        }
    }
}

/// Install the global writer from `[logging]`
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn emit(level: Level, message: impl Display) {
    let line = format!("{} {message}", level.tag());
    match (writer::get(), level) {
        (Some(w), Level::Info) => w.write_access(&line),
        (Some(w), _) => w.write_error(&line),
        (None, Level::Info) => println!("{line}"),
        (None, _) => eprintln!("{line}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    emit(Level::Info, format_args!("Serving static files on http://{addr}"));
    if let Some(workers) = config.server.workers {
        emit(Level::Info, format_args!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        emit(Level::Info, format_args!("Connection limit: {max}"));
    }
    for (kind, file) in [
        ("Access", &config.logging.access_log_file),
        ("Error", &config.logging.error_log_file),
    ] {
        if let Some(path) = file {
            emit(Level::Info, format_args!("{kind} log: {path}"));
        }
    }
}

/// One line per mount, in the order they are tried
pub fn log_mounts(mounts: &[StaticFiles]) {
    if mounts.is_empty() {
        log_warning("No mounts configured; every request will get 404");
    }
    for (i, mount) in mounts.iter().enumerate() {
        emit(
            Level::Info,
            format_args!(
                "Mount #{i}: {} -> {}",
                mount.mount_point(),
                mount.root().display()
            ),
        );
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    emit(Level::Info, format_args!("Connection from {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    emit(Level::Error, format_args!("Connection failed: {err:?}"));
}

pub fn log_connection_limit(max: u64) {
    emit(
        Level::Warn,
        format_args!("{max} connections open, refusing new connection"),
    );
}

pub fn log_error(message: &str) {
    emit(Level::Error, message);
}

pub fn log_warning(message: &str) {
    emit(Level::Warn, message);
}

pub fn log_invalid_path(path: &str, reason: &InvalidPath) {
    emit(Level::Warn, format_args!("400 for {path}: {reason}"));
}

/// Write a formatted access line, without a level tag
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_shutdown() {
    emit(Level::Info, "Shutdown requested, closing listener");
}
