//! Server configuration
//!
//! Sources, highest priority first: command-line flags, environment, defaults.
//!
//! | Variable           | Meaning                                       |
//! |--------------------|-----------------------------------------------|
//! | `REFRAIN_DATA_DIR` | Directory holding `refrain.db`                |
//! | `REFRAIN_HOST`     | Bind address (default `127.0.0.1`)            |
//! | `REFRAIN_PORT`     | Bind port (default `3928`)                    |
//! | `REFRAIN_TUNING`   | JSON tuning file for scheduler/status/fade/XP |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use refrain_core::{PracticeConfig, Storage, StorageError};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3928;

/// Database file name inside the data directory
pub const DB_FILE_NAME: &str = "refrain.db";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// `None` means the platform data directory
    pub data_dir: Option<PathBuf>,
    pub host: IpAddr,
    pub port: u16,
    pub tuning_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            tuning_path: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns. Unparseable values
    /// are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = non_empty("REFRAIN_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(host) = non_empty("REFRAIN_HOST") {
            match host.trim().parse::<IpAddr>() {
                Ok(ip) => config.host = ip,
                Err(_) => tracing::warn!(value = %host, "Ignoring invalid REFRAIN_HOST"),
            }
        }
        if let Some(port) = non_empty("REFRAIN_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => config.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid REFRAIN_PORT"),
            }
        }
        if let Some(path) = non_empty("REFRAIN_TUNING") {
            config.tuning_path = Some(PathBuf::from(path));
        }
        config
    }

    /// Apply command-line overrides
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        host: Option<IpAddr>,
        port: Option<u16>,
        tuning_path: Option<PathBuf>,
    ) -> Self {
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if tuning_path.is_some() {
            self.tuning_path = tuning_path;
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Database file path, or `None` for the storage default location
    pub fn db_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(DB_FILE_NAME))
    }

    /// Tuning from the configured file, or the defaults
    pub fn practice_config(&self) -> refrain_core::Result<PracticeConfig> {
        match &self.tuning_path {
            Some(path) => PracticeConfig::load(path),
            None => Ok(PracticeConfig::default()),
        }
    }

    /// Open the database with the status classifier from `practice`
    pub fn open_storage(&self, practice: &PracticeConfig) -> Result<Storage, StorageError> {
        Storage::with_classifier(self.db_path(), practice.status.clone())
    }
}
