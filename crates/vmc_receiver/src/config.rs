use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use vmc_bevy::SyncConfig;
use vmc_protocol::ReceiverConfig;
use vmc_transport::TransportConfig;

/// Contents of the `--config` TOML file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub receiver: ReceiverConfig,
    pub transport: TransportConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or filter directives, e.g. `info` or `info,vmc::transport=trace`.
    pub level: String,
    /// Also write logs to this file (no ANSI colors).
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(AppConfig::parse("").unwrap(), AppConfig::default());
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::parse(
            r#"
            [receiver]
            rate_limit_threshold = 60

            [transport]
            listen_addr = "127.0.0.1:40000"

            [sync]
            hands = false

            [logging]
            level = "debug"
            file = "logs/vmc.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.receiver.rate_limit_threshold, 60);
        assert!(config.receiver.rate_limit_enabled);
        assert_eq!(config.transport.listen_addr.port(), 40000);
        assert!(!config.sync.hands);
        assert!(config.sync.eyes);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("logs/vmc.log")));
    }

    #[test]
    fn unknown_value_type_is_an_error() {
        assert!(AppConfig::parse("[receiver]\nfreeze = \"yes\"").is_err());
    }
}
