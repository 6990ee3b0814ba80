//! Runtime settings for the manager.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ManagerSettings {
    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub query_log: QueryLogSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Base directory under which the managed cache directory is derived.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Overrides the package-derived cache namespace seed.
    #[serde(default)]
    pub namespace_seed: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryLogSettings {
    /// Statements running at least this long are captured.
    #[serde(default = "default_threshold_ms")]
    pub threshold_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            namespace_seed: None,
        }
    }
}

impl Default for QueryLogSettings {
    fn default() -> Self {
        Self {
            threshold_ms: default_threshold_ms(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("var/cache")
}

fn default_threshold_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

impl ManagerSettings {
    /// Loads settings from `config/default`, an optional `config/local`
    /// override file, and `ORM`-prefixed environment variables.
    pub fn load() -> Result<Self, SettingsError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("ORM").separator("__"))
            .build()?;

        let settings: Self = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings entirely from defaults and overrides, without touching
    /// the filesystem.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, SettingsError> {
        let defaults = r#"
            [cache]
            dir = "var/cache"

            [query_log]
            threshold_ms = 500

            [logging]
            level = "info"
            format = "pretty"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let settings: Self = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.query_log.threshold_ms == 0 {
            return Err(SettingsError::Invalid(
                "query_log.threshold_ms must be positive".to_string(),
            ));
        }

        if self.cache.dir.as_os_str().is_empty() {
            return Err(SettingsError::Invalid(
                "cache.dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
