use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_TRAFFIC_PATH: &str = "data/traffic_feed.csv";
pub const DEFAULT_PREDICTIONS_PATH: &str = "data/prediction_results.csv";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub data: Option<DataSection>,
    #[serde(default)]
    pub server: Option<ServerSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSection {
    /// Headered live-feed CSV the windows are cut from
    pub traffic_path: Option<PathBuf>,
    /// Headerless prediction log
    pub predictions_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

impl Config {
    /// Returns the live-feed path, falling back to the default when unset or empty.
    pub fn traffic_path(&self) -> &Path {
        self.data
            .as_ref()
            .and_then(|d| non_empty(d.traffic_path.as_deref()))
            .unwrap_or(Path::new(DEFAULT_TRAFFIC_PATH))
    }

    /// Returns the prediction log path, falling back to the default when unset or empty.
    pub fn predictions_path(&self) -> &Path {
        self.data
            .as_ref()
            .and_then(|d| non_empty(d.predictions_path.as_deref()))
            .unwrap_or(Path::new(DEFAULT_PREDICTIONS_PATH))
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Parses `[logging].level`; `None` when the value is not a tracing level.
    pub fn log_level(&self) -> Option<tracing::Level> {
        self.logging.level.trim().parse().ok()
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}
