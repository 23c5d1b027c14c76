// Configuration module entry point
// Loads the server configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, MediaConfig, PerformanceConfig, ServerConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. `MEDIA_`-prefixed environment variables override
    /// it, with `__` separating nested keys (e.g. `MEDIA_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("MEDIA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 300)?
            .set_default("media.base_dir", ".")?
            .set_default("media.max_age", i64::from(crate::http::cache::ONE_YEAR))?
            .build()?;

        settings.try_deserialize()
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
    use crate::logger::{AccessLogFormat, LogLevel};

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/mediasrv").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert_eq!(cfg.logging.access_log_format, AccessLogFormat::Combined);
        assert_eq!(cfg.media.max_age, 31_536_000);
        assert_eq!(cfg.media.local_hosts, vec!["localhost".to_string()]);
        assert!(cfg.media.local_prefix.is_none());
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "0.0.0.0"
port = 9000
workers = 2

[logging]
level = "warn"
access_log_format = "json"

[performance]
max_connections = 64

[media]
base_dir = "/srv/media"
max_age = 600
local_hosts = ["localhost", "127.0.0.1"]
local_prefix = "media.example"
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.with_extension("").to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.logging.level, LogLevel::Warn);
        assert_eq!(cfg.logging.access_log_format, AccessLogFormat::Json);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.performance.max_connections, Some(64));
        assert_eq!(cfg.performance.connection_timeout, 300);
        assert_eq!(cfg.media.base_dir, "/srv/media");
        assert_eq!(cfg.media.max_age, 600);
        assert_eq!(cfg.media.local_hosts.len(), 2);
        assert_eq!(cfg.media.local_prefix.as_deref(), Some("media.example"));
    }

    #[test]
    fn test_invalid_address() {
        let mut cfg = Config::load_from("does-not-exist/mediasrv").unwrap();
        cfg.server.host = "not an ip".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
