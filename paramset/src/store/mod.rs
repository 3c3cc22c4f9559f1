//! Read-only access to parameter constraint metadata.

use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceLevel;
use crate::name::ParamName;

mod schema;

pub use schema::{ParameterEntry, SchemaError, SchemaResult, SchemaTable};

pub const DEFAULT_MAX_CHANNEL_COUNT: usize = 6;

/// One allowed value of a choice parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PossibleValue {
    pub value: String,
    /// Name of the value on the engine side, when it differs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

impl PossibleValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            translation: None,
            is_default: false,
        }
    }

    pub fn translated(value: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            translation: Some(translation.into()),
            is_default: false,
        }
    }
}

/// Numeric restrictions. An absent bound is not checked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default = "included")]
    pub min_included: bool,
    #[serde(default = "included")]
    pub max_included: bool,
}

fn included() -> bool {
    true
}

impl Default for NumericBounds {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            min_included: true,
            max_included: true,
        }
    }
}

/// Source of possible values, bounds, defaults, confidence levels and value
/// translations.
pub trait ParameterStore {
    fn possible_values(&self, name: ParamName) -> &[PossibleValue];

    fn numeric_bounds(&self, name: ParamName) -> NumericBounds;

    fn default_value(&self, name: ParamName) -> Option<&str>;

    fn confidence_level(&self, file_format: &str, name: ParamName) -> ConfidenceLevel;

    fn max_channel_count(&self) -> usize;

    /// Engine-side name of an internal value.
    fn translation_for(&self, name: ParamName, value: &str) -> Option<&str> {
        self.possible_values(name)
            .iter()
            .find(|possible| possible.value == value)
            .and_then(|possible| possible.translation.as_deref())
    }

    /// Internal value for an engine-side name; the first match wins.
    /// `two photon` is never picked since it shares its engine name.
    fn value_for_translation(&self, name: ParamName, translated: &str) -> Option<&str> {
        self.possible_values(name)
            .iter()
            .filter(|possible| !(name == ParamName::MicroscopeType && possible.value == "two photon"))
            .find(|possible| possible.translation.as_deref() == Some(translated))
            .map(|possible| possible.value.as_str())
    }
}
