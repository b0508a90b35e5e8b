use crate::error::ConfigError;
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    ApiConfig, CacheConfig, Config, DashboardConfig, LoggingConfig, RetryConfig, SessionConfig,
};

/// The file looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "postes.toml";

/// Loads the application configuration.
///
/// Sources, later ones winning: built-in defaults, the TOML file (`path`, or an
/// optional `postes.toml`), then `POSTES__*` environment variables
/// (e.g. `POSTES__API__BASE_URL`).
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("POSTES")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.api.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must be an http(s) URL, got '{base_url}'"
        )));
    }
    if config.api.timeout.is_zero() || config.api.cold_start_timeout.is_zero() {
        return Err(ConfigError::ValidationError(
            "api timeouts must be greater than zero".to_string(),
        ));
    }
    if config.dashboard.refresh_interval.is_zero() {
        return Err(ConfigError::ValidationError(
            "dashboard.refresh_interval must be greater than zero".to_string(),
        ));
    }
    if config.api.retry.base_delay > config.api.retry.max_delay {
        return Err(ConfigError::ValidationError(
            "api.retry.base_delay must not exceed api.retry.max_delay".to_string(),
        ));
    }
    Ok(())
}

/// Command-line switches that take precedence over the file and the environment.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct Overrides {
    /// Path to a TOML configuration file (default: ./postes.toml if present).
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. https://api.example.com/api.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub base_url: Option<String>,

    /// Log filter directive, e.g. "debug" or "postes=trace".
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub log_level: Option<String>,
}

impl Overrides {
    /// Loads the configuration and applies these overrides on top of it.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://postes.example.com/api"
timeout = "10s"

[api.retry]
max_retries = 0

[session]
max_age = "2h"
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "https://postes.example.com/api");
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.cold_start_timeout, Duration::from_secs(120));
        assert_eq!(config.api.retry.max_retries, 0);
        assert_eq!(config.api.cache.ttl, Duration::from_secs(300));
        assert_eq!(config.session.max_age, Duration::from_secs(2 * 3600));
        assert_eq!(config.dashboard.low_stock_threshold, 5);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\nbase_url = \"localhost:8080\"").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_zero_refresh_interval() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dashboard]\nrefresh_interval = \"0s\"").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(msg)) if msg.contains("refresh_interval")
        ));
    }

    #[test]
    fn overrides_win_over_the_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"info\"").unwrap();
        let overrides = Overrides {
            config: Some(file.path().to_path_buf()),
            base_url: Some("http://127.0.0.1:9000".into()),
            log_level: Some("debug".into()),
        };
        let config = overrides.load().unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.api.retry.max_retries, 2);
        assert_eq!(config.session.max_age, Duration::from_secs(8 * 3600));
        assert!(validate(&config).is_ok());
    }
}
