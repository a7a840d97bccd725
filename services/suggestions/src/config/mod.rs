use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::highlight::{HighlightProcessor, HighlightStyle};
use crate::r#type::Classes;
use crate::session::SessionOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionOptions,
    pub highlight: HighlightStyle,
    pub classes: Classes,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level of the crate's own events, e.g. `"debug"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Ok(kind) = std::env::var("SUGGESTIONS_TYPE") {
            config.session.suggestion_type = kind;
        }

        if let Ok(bounds) = std::env::var("SUGGESTIONS_BOUNDS") {
            config.session.bounds = Some(bounds).filter(|bounds| !bounds.trim().is_empty());
        }

        if let Ok(count) = std::env::var("SUGGESTIONS_COUNT") {
            config.session.count = count.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "count".to_string(),
                value: count.clone(),
            })?;
        }

        if let Ok(level) = std::env::var("SUGGESTIONS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Highlighter built from the `highlight` section.
    pub fn highlighter(&self) -> anyhow::Result<HighlightProcessor> {
        Ok(HighlightProcessor::from_style(&self.highlight)?)
    }
}
