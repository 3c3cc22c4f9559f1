//! Runtime configuration of the parameter engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::{ParameterStore, SchemaResult, SchemaTable};

/// Shift x, y, z, rotation and scale.
pub const SHORT_VECTOR_COMPONENTS: usize = 5;
/// The extended per-channel correction vector.
pub const LONG_VECTOR_COMPONENTS: usize = 14;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("max_channel_count must be at least 1")]
    NoChannels,
    #[error("chromatic_component_count must be 5 or 14, got {0}")]
    ComponentCount(usize),
    #[error("Unknown log level {0:?}")]
    LogLevel(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========================================================================
    // Channels
    // ========================================================================
    /// Overrides the channel count of the schema when set.
    pub max_channel_count: Option<usize>,
    /// Components per channel of the chromatic aberration vector.
    pub chromatic_component_count: usize,

    // ========================================================================
    // Schema and logging
    // ========================================================================
    /// External schema file. The embedded schema is used when unset.
    pub schema_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_channel_count: None,
            chromatic_component_count: SHORT_VECTOR_COMPONENTS,
            schema_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Config = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_channel_count == Some(0) {
            return Err(ConfigError::NoChannels);
        }
        if !matches!(
            self.chromatic_component_count,
            SHORT_VECTOR_COMPONENTS | LONG_VECTOR_COMPONENTS
        ) {
            return Err(ConfigError::ComponentCount(self.chromatic_component_count));
        }
        if !matches!(
            self.log_level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::LogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    /// The configured schema file, or the embedded one.
    pub fn load_schema(&self) -> SchemaResult<SchemaTable> {
        match &self.schema_path {
            Some(path) => SchemaTable::from_yaml_file(path),
            None => SchemaTable::embedded(),
        }
    }

    pub fn channel_limit(&self, store: &dyn ParameterStore) -> usize {
        self.max_channel_count
            .unwrap_or_else(|| store.max_channel_count())
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chromatic_component_count, 5);
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> anyhow::Result<()> {
        let config = Config::from_yaml("chromatic_component_count: 14\nmax_channel_count: 4\n")?;
        assert_eq!(config.chromatic_component_count, 14);
        assert_eq!(config.max_channel_count, Some(4));
        assert_eq!(config.log_level, "info");
        Ok(())
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            Config::from_yaml("chromatic_component_count: 7\n"),
            Err(ConfigError::ComponentCount(7))
        ));
        assert!(matches!(
            Config::from_yaml("max_channel_count: 0\n"),
            Err(ConfigError::NoChannels)
        ));
        assert!(matches!(
            Config::from_yaml("log_level: loud\n"),
            Err(ConfigError::LogLevel(_))
        ));
    }

    #[test]
    fn channel_limit_prefers_config() -> anyhow::Result<()> {
        let schema = SchemaTable::embedded()?;
        let mut config = Config::default();
        assert_eq!(config.channel_limit(&schema), 6);

        config.max_channel_count = Some(3);
        assert_eq!(config.channel_limit(&schema), 3);
        Ok(())
    }
}
