// Application state module
// Holds the loaded configuration and the initialized mounts, shared read-only

use std::path::Path;

use super::types::Config;
use crate::error::ConfigError;
use crate::handler::StaticFiles;

/// Application state
///
/// Built once before the listener starts; every connection shares it
/// through an `Arc` and nothing in it changes afterwards.
pub struct AppState {
    pub config: Config,
    pub mounts: Vec<StaticFiles>,
}

impl AppState {
    /// Initialize every configured mount, failing on the first bad one
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let apps_root = Path::new(&config.server.apps_root);
        let mounts = config
            .mounts
            .iter()
            .map(|mount| StaticFiles::init(mount, apps_root))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { config, mounts })
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
