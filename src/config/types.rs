// Configuration types module
// Defines all configuration-related data structures

use crate::http::EtagGenerator;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    /// Static mounts, tried in order
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Base directory for application-relative mount roots
    pub apps_root: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Where a mount's files live
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RootSource {
    /// A directory path, relative to the working directory or absolute
    Dir(String),
    /// An application's directory under `server.apps_root`
    App {
        app: String,
        #[serde(default)]
        dir: Option<String>,
    },
}

impl RootSource {
    /// Directory this source names, before it is made absolute
    ///
    /// `{ app }` maps to `<apps_root>/<app>/priv/static` and
    /// `{ app, dir }` to `<apps_root>/<app>/<dir>`.
    pub fn directory(&self, apps_root: &Path) -> PathBuf {
        match self {
            Self::Dir(dir) => PathBuf::from(dir),
            Self::App { app, dir } => {
                let base = apps_root.join(app);
                match dir {
                    Some(dir) => base.join(dir),
                    None => base.join("priv").join("static"),
                }
            }
        }
    }
}

/// One static mount
#[derive(Debug, Deserialize, Clone)]
pub struct MountConfig {
    /// Request path prefix, e.g. `/public`
    pub at: String,
    pub from: RootSource,
    /// First segments served verbatim (exact match)
    #[serde(default)]
    pub only: Vec<String>,
    /// First-segment prefixes served
    #[serde(default)]
    pub only_matching: Vec<String>,
    #[serde(default)]
    pub gzip: bool,
    #[serde(default)]
    pub brotli: bool,
    /// Empty string disables etag handling
    #[serde(default = "default_cache_control_for_etags")]
    pub cache_control_for_etags: String,
    /// Empty string disables the `?vsn=` shortcut
    #[serde(default = "default_cache_control_for_vsn_requests")]
    pub cache_control_for_vsn_requests: String,
    /// Installed from code; a callable has no file representation
    #[serde(skip)]
    pub etag_generation: Option<EtagGenerator>,
    /// Extra headers added to every 200/206 response
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// File name to content type overrides
    #[serde(default)]
    pub content_types: HashMap<String, String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_control_for_etags() -> String {
    "public".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_control_for_vsn_requests() -> String {
    "public, max-age=31536000".to_string()
}

impl MountConfig {
    /// Mount with default options serving `from` at `at`
    pub fn new(at: impl Into<String>, from: RootSource) -> Self {
        Self {
            at: at.into(),
            from,
            only: Vec::new(),
            only_matching: Vec::new(),
            gzip: false,
            brotli: false,
            cache_control_for_etags: default_cache_control_for_etags(),
            cache_control_for_vsn_requests: default_cache_control_for_vsn_requests(),
            etag_generation: None,
            headers: BTreeMap::new(),
            content_types: HashMap::new(),
        }
    }
}
