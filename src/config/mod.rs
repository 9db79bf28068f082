//! Service configuration
//!
//! Loaded from a TOML file; a default file is written on first start when
//! none exists. Durations are humantime strings ("6h", "120s") and are
//! validated once at startup. The refresh interval can additionally be
//! overridden with the `EPG_REFRESH_INTERVAL` environment variable.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_database_url() -> String {
    "sqlite://./data/iptv-epg.db".to_string()
}

fn default_refresh_interval() -> String {
    "6h".to_string()
}

fn default_startup_delay() -> String {
    "2s".to_string()
}

fn default_download_timeout() -> String {
    "120s".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    pub max_connections: Option<u32>,
    pub batch_sizes: Option<DatabaseBatchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseBatchConfig {
    /// Programme rows per insert statement during a schedule replace
    pub epg_programmes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Pause between periodic refresh cycles
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
    /// Delay before the scheduler's first cycle
    #[serde(default = "default_startup_delay")]
    pub startup_delay: String,
    /// Total bound on one guide download
    #[serde(default = "default_download_timeout")]
    pub download_timeout: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: None,
            batch_sizes: None,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            startup_delay: default_startup_delay(),
            download_timeout: default_download_timeout(),
        }
    }
}

impl IngestionConfig {
    pub fn refresh_interval(&self) -> Result<Duration> {
        humantime::parse_duration(&self.refresh_interval)
            .with_context(|| format!("invalid refresh_interval '{}'", self.refresh_interval))
    }

    pub fn startup_delay(&self) -> Result<Duration> {
        humantime::parse_duration(&self.startup_delay)
            .with_context(|| format!("invalid startup_delay '{}'", self.startup_delay))
    }

    pub fn download_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.download_timeout)
            .with_context(|| format!("invalid download_timeout '{}'", self.download_timeout))
    }
}

impl Config {
    /// Load from `config_file`, writing a default config when it is missing
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let mut config: Config = if std::path::Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)
                .with_context(|| format!("failed to read {config_file}"))?;
            toml::from_str(&contents).with_context(|| format!("failed to parse {config_file}"))?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)
                .with_context(|| format!("failed to write default {config_file}"))?;
            info!("Created default config file: {config_file}");
            default_config
        };

        if let Ok(interval) = std::env::var("EPG_REFRESH_INTERVAL") {
            config.ingestion.refresh_interval = interval;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_to_expected_durations() {
        let config = Config::default();
        assert_eq!(
            config.ingestion.refresh_interval().unwrap(),
            Duration::from_secs(6 * 60 * 60)
        );
        assert_eq!(
            config.ingestion.startup_delay().unwrap(),
            Duration::from_secs(2)
        );
        assert_eq!(
            config.ingestion.download_timeout().unwrap(),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [ingestion]
            refresh_interval = "1h"
            "#,
        )
        .unwrap();
        assert_eq!(config.ingestion.refresh_interval, "1h");
        assert_eq!(config.ingestion.download_timeout, "120s");
        assert_eq!(config.database.url, default_database_url());
    }

    #[test]
    fn bad_duration_is_rejected_at_validation() {
        let config: Config = toml::from_str(
            r#"
            [ingestion]
            refresh_interval = "sometime"
            "#,
        )
        .unwrap();
        assert!(config.ingestion.refresh_interval().is_err());
    }
}
