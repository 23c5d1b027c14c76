// Configuration types module
// Defines all configuration-related data structures

use crate::logger::{AccessLogFormat, LogLevel};
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub media: MediaConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads (CPU cores if unset)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub access_log: bool,
    #[serde(default)]
    pub access_log_format: AccessLogFormat,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a client may take to send request headers (0 disables)
    pub connection_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<usize>,
}

/// Media serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory all served files must live under
    pub base_dir: String,
    /// `Cache-Control` max-age / `Expires` offset, in seconds
    pub max_age: u32,
    /// Host substrings identifying a local development environment
    #[serde(default = "default_local_hosts")]
    pub local_hosts: Vec<String>,
    /// Path segment stripped from requests on local hosts
    #[serde(default)]
    pub local_prefix: Option<String>,
}

fn default_local_hosts() -> Vec<String> {
    vec!["localhost".to_string()]
}
