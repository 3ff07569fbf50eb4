use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{ConfigError, Result};

/// System configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub deploy: DeployConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,
    #[serde(default = "default_artifact_suffix")]
    pub artifact_suffix: String,
    /// Shared secret appended to the request fields when computing the
    /// authentication tag. Never logged.
    pub salt: String,
    #[serde(default)]
    pub mode: DeploymentMode,
    pub scripts: ScriptsConfig,
    /// When true the selected script is copied to an executable temporary
    /// file and the copy is run; the copy is removed on every exit path.
    #[serde(default)]
    pub stage_script: bool,
    #[serde(default = "default_script_timeout")]
    pub script_timeout: u64,
    pub timeout: TimeoutConfig,
}

/// Deployment mode selects which configured script is executed. Cluster
/// orchestration itself lives in the script, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    #[default]
    SingleNode,
    Cluster,
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentMode::SingleNode => f.write_str("single_node"),
            DeploymentMode::Cluster => f.write_str("cluster"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptsConfig {
    pub single_node: String,
    pub cluster: Option<String>,
}

/// Freshness window for incoming requests, as a value plus unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub value: u64,
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Convert a value in this unit to milliseconds, truncating for
    /// sub-millisecond units.
    pub fn to_millis(self, value: u64) -> u64 {
        match self {
            TimeUnit::Nanoseconds => value / 1_000_000,
            TimeUnit::Microseconds => value / 1_000,
            TimeUnit::Milliseconds => value,
            TimeUnit::Seconds => value.saturating_mul(1_000),
            TimeUnit::Minutes => value.saturating_mul(60_000),
            TimeUnit::Hours => value.saturating_mul(3_600_000),
            TimeUnit::Days => value.saturating_mul(86_400_000),
        }
    }
}

impl TimeoutConfig {
    pub fn as_millis(&self) -> u64 {
        self.unit.to_millis(self.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl SystemConfig {
    /// Load system configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::FileNotFound { path: path_str })?;

        let config: SystemConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }
}

impl DeployConfig {
    /// Resolve the script path for the configured deployment mode.
    /// `validate()` guarantees the selected mode has a script; `None` here
    /// means the configuration was never validated.
    pub fn script_path(&self) -> Option<&str> {
        match self.mode {
            DeploymentMode::SingleNode => Some(self.scripts.single_node.as_str()),
            DeploymentMode::Cluster => self.scripts.cluster.as_deref(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_upload_size() -> String {
    "100MB".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_artifact_dir() -> String {
    "/srv/droplift/artifacts".to_string()
}

fn default_artifact_suffix() -> String {
    ".jar".to_string()
}

fn default_script_timeout() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_upload_size: default_max_upload_size(),
            request_timeout: default_request_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: default_metrics_enabled(),
            metrics_path: default_metrics_path(),
            health_path: default_health_path(),
        }
    }
}
