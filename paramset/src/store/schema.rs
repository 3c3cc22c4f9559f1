use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::confidence::{resolve_confidence_level, ConfidenceLevel};
use crate::name::ParamName;
use crate::store::{NumericBounds, ParameterStore, PossibleValue, DEFAULT_MAX_CHANNEL_COUNT};

const EMBEDDED_SCHEMA: &str = include_str!("../../resources/schema.yml");

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to read schema file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed schema: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("Parameter {name} lists value {value:?} more than once")]
    DuplicateValue { name: ParamName, value: String },
    #[error("Parameter {name} has more than one default value")]
    MultipleDefaults { name: ParamName },
    #[error("Parameter {name} has an empty bounds range")]
    EmptyRange { name: ParamName },
    #[error("Maximum channel count must be at least 1")]
    NoChannels,
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Constraint metadata of one parameter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterEntry {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<PossibleValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<NumericBounds>,
}

impl ParameterEntry {
    fn default_value(&self) -> Option<&str> {
        self.default.as_deref().or_else(|| {
            self.values
                .iter()
                .find(|possible| possible.is_default)
                .map(|possible| possible.value.as_str())
        })
    }
}

/// Immutable, in-memory [`ParameterStore`] loaded from YAML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_channel_count: Option<usize>,
    parameters: HashMap<ParamName, ParameterEntry>,
    /// Raw confidence table: file format -> parameter -> level.
    confidence_levels: HashMap<String, HashMap<ParamName, ConfidenceLevel>>,
}

impl SchemaTable {
    /// The schema bundled with the crate.
    pub fn embedded() -> SchemaResult<Self> {
        Self::from_yaml(EMBEDDED_SCHEMA)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_yaml(&yaml)?;
        info!(path = %path.display(), "loaded parameter schema");

        Ok(table)
    }

    pub fn from_yaml(yaml: &str) -> SchemaResult<Self> {
        let table: SchemaTable = serde_yml::from_str(yaml)?;
        table.validate()?;
        debug!(
            parameters = table.parameters.len(),
            formats = table.confidence_levels.len(),
            "parsed parameter schema"
        );

        Ok(table)
    }

    pub fn to_yaml(&self) -> SchemaResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    pub fn entry(&self, name: ParamName) -> Option<&ParameterEntry> {
        self.parameters.get(&name)
    }

    pub fn set_entry(&mut self, name: ParamName, entry: ParameterEntry) {
        self.parameters.insert(name, entry);
    }

    pub fn set_confidence_level(
        &mut self,
        file_format: impl Into<String>,
        name: ParamName,
        level: ConfidenceLevel,
    ) {
        self.confidence_levels
            .entry(file_format.into())
            .or_default()
            .insert(name, level);
    }

    fn validate(&self) -> SchemaResult<()> {
        if self.max_channel_count == Some(0) {
            return Err(SchemaError::NoChannels);
        }

        for (&name, entry) in self.parameters.iter() {
            let mut seen: Vec<&str> = Vec::with_capacity(entry.values.len());
            for possible in entry.values.iter() {
                if seen.contains(&possible.value.as_str()) {
                    return Err(SchemaError::DuplicateValue {
                        name,
                        value: possible.value.clone(),
                    });
                }
                seen.push(&possible.value);
            }
            if entry.values.iter().filter(|p| p.is_default).count() > 1 {
                return Err(SchemaError::MultipleDefaults { name });
            }
            if let Some(NumericBounds {
                min: Some(min),
                max: Some(max),
                ..
            }) = entry.bounds
            {
                if min > max {
                    return Err(SchemaError::EmptyRange { name });
                }
            }
        }

        Ok(())
    }
}

impl ParameterStore for SchemaTable {
    fn possible_values(&self, name: ParamName) -> &[PossibleValue] {
        self.parameters
            .get(&name)
            .map(|entry| entry.values.as_slice())
            .unwrap_or(&[])
    }

    fn numeric_bounds(&self, name: ParamName) -> NumericBounds {
        self.parameters
            .get(&name)
            .and_then(|entry| entry.bounds)
            .unwrap_or_default()
    }

    fn default_value(&self, name: ParamName) -> Option<&str> {
        self.parameters
            .get(&name)
            .and_then(ParameterEntry::default_value)
    }

    fn confidence_level(&self, file_format: &str, name: ParamName) -> ConfidenceLevel {
        resolve_confidence_level(file_format, name, |format, name| {
            self.confidence_levels
                .get(format)
                .and_then(|levels| levels.get(&name))
                .copied()
        })
    }

    /// Explicit value, else the largest `NumberOfChannels` choice.
    fn max_channel_count(&self) -> usize {
        if let Some(count) = self.max_channel_count {
            return count;
        }
        self.possible_values(ParamName::NumberOfChannels)
            .iter()
            .filter_map(|possible| possible.value.parse::<usize>().ok())
            .max()
            .unwrap_or(DEFAULT_MAX_CHANNEL_COUNT)
    }
}
