use std::env;

use thiserror::Error;

/// Environment-driven CLI configuration. Only logging is configurable; the
/// engine itself takes everything from the request file.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
}

impl Default for CliConfig {
    fn default() -> Self {
        Self { logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact } }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidEnvOverride {
                key: "QUOTECALC_LOG_FORMAT".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(level) = env::var("QUOTECALC_LOG_LEVEL") {
            if !level.trim().is_empty() {
                config.logging.level = level.trim().to_string();
            }
        }
        if let Ok(format) = env::var("QUOTECALC_LOG_FORMAT") {
            config.logging.format = format.parse()?;
        }
        Ok(config)
    }
}
