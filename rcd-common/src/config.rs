//! Configuration loading and store root resolution
//!
//! Every service reads one TOML file. Resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `RCD_CONFIG` environment variable
//! 3. `~/.config/rcd/<service>.toml`
//! 4. Built-in defaults (fallback)
//!
//! A missing file is never fatal; a file that exists but does not parse is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RCD_CONFIG";

/// Environment variable overriding the artifact store root
pub const STORE_ROOT_ENV_VAR: &str = "RCD_STORE_ROOT";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub mdfparser: MdfParserSettings,

    #[serde(default)]
    pub artifact_api: ArtifactApiSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Artifact store location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Settings for the metadata / IMU parser service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdfParserSettings {
    /// Frame rate camera health check results are expected at
    #[serde(default = "default_expected_chc_fps")]
    pub expected_chc_fps: f64,

    /// Allowed absolute deviation before a frame rate warning is logged
    #[serde(default = "default_chc_fps_tolerance")]
    pub chc_fps_tolerance: f64,

    /// Resampling window for raw IMU readings
    #[serde(default = "default_imu_window_ms")]
    pub imu_window_ms: u64,
}

impl Default for MdfParserSettings {
    fn default() -> Self {
        Self {
            expected_chc_fps: default_expected_chc_fps(),
            chc_fps_tolerance: default_chc_fps_tolerance(),
            imu_window_ms: default_imu_window_ms(),
        }
    }
}

/// Settings for the artifact API service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactApiSettings {
    /// Sample spacing above which IMU data is considered interrupted
    #[serde(default = "default_imu_gap_threshold_ms")]
    pub imu_gap_threshold_ms: u64,
}

impl Default for ArtifactApiSettings {
    fn default() -> Self {
        Self {
            imu_gap_threshold_ms: default_imu_gap_threshold_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_expected_chc_fps() -> f64 {
    15.72
}

fn default_chc_fps_tolerance() -> f64 {
    0.1
}

fn default_imu_window_ms() -> u64 {
    10
}

fn default_imu_gap_threshold_ms() -> u64 {
    1000
}

impl TomlConfig {
    /// Parse a config file that is known to exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Resolves which config file a service uses
pub struct ConfigResolver {
    service_name: String,
}

impl ConfigResolver {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Default per-user config file location for this service
    pub fn user_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rcd").join(format!("{}.toml", self.service_name)))
    }

    /// Load configuration following the documented priority order.
    pub fn resolve(&self, cli_path: Option<&Path>) -> Result<TomlConfig> {
        // Priority 1 & 2: explicit file must exist
        let explicit = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return TomlConfig::load_from_path(&path);
        }

        // Priority 3: per-user file, optional
        if let Some(path) = self.user_config_path() {
            if path.exists() {
                info!("Loading configuration from {}", path.display());
                return TomlConfig::load_from_path(&path);
            }
        }

        // Priority 4: defaults
        warn!(
            service = %self.service_name,
            "No configuration file found, using built-in defaults"
        );
        Ok(TomlConfig::default())
    }
}

/// Resolve the artifact store root: CLI, then environment, then TOML, then
/// an OS-dependent default.
pub fn resolve_store_root(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(STORE_ROOT_ENV_VAR) {
        return PathBuf::from(path);
    }
    if let Some(path) = &config.store.root {
        return path.clone();
    }
    dirs::data_local_dir()
        .map(|d| d.join("rcd"))
        .unwrap_or_else(|| PathBuf::from("./rcd_data"))
}
