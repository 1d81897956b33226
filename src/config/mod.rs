// Configuration module entry point
// Loads settings once at start-up and builds the static mounts from them

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ConfigError;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, LoggingConfig, MountConfig, PerformanceConfig, RootSource, ServerConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// (`config` reads `config.toml`). A missing file leaves the defaults.
    ///
    /// Environment variables prefixed with `STATIC_` override file values,
    /// using `__` between nesting levels (e.g. `STATIC_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("STATIC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.apps_root", "lib")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults_without_file() {
        let cfg = Config::load_from("/nonexistent/static-mount-config").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.mounts.is_empty());
        assert!(cfg.get_socket_addr().is_ok());
    }

    #[test]
    fn test_load_mounts_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[[mounts]]
at = "/public"
from = "priv/static"
only = ["images"]
gzip = true
cache_control_for_vsn_requests = ""

[mounts.content_types]
"README.md" = "text/markdown"

[[mounts]]
at = "/docs"
from = {{ app = "manual", dir = "html" }}
"#
        )
        .unwrap();

        let path = file.path().with_extension("");
        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.mounts.len(), 2);

        let public = &cfg.mounts[0];
        assert_eq!(public.at, "/public");
        assert_eq!(public.from, RootSource::Dir("priv/static".to_string()));
        assert_eq!(public.only, vec!["images".to_string()]);
        assert!(public.gzip);
        assert!(!public.brotli);
        assert_eq!(public.cache_control_for_etags, "public");
        assert!(public.cache_control_for_vsn_requests.is_empty());
        assert_eq!(
            public.content_types.get("README.md").map(String::as_str),
            Some("text/markdown")
        );
        assert!(!public.content_types.contains_key("readme.md"));

        assert_eq!(
            cfg.mounts[1].cache_control_for_vsn_requests,
            "public, max-age=31536000"
        );

        assert_eq!(
            cfg.mounts[1].from,
            RootSource::App {
                app: "manual".to_string(),
                dir: Some("html".to_string())
            }
        );
    }
}
