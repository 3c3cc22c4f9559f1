use std::collections::BTreeMap;
use std::path::Path;

use common::{FileFormat, SerdeFormatResult};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

const PAR_STATE_PREFIX: &str = "parState,";

/// Provenance marker the engine keeps next to each acquisition field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumString)]
pub enum ParState {
    /// The engine falls back to its own default.
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "noMetaData")]
    NoMetaData,
    #[strum(serialize = "verified")]
    Verified,
}

/// Flat key-value record exchanged with the deconvolution engine.
///
/// Values are kept trimmed. Per-channel values are space separated, e.g.
/// `ex = "488 561"`. Keys iterate in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct EngineRecord {
    fields: BTreeMap<String, String>,
}

impl EngineRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(yaml: &str) -> SerdeFormatResult<Self> {
        common::deserialize(yaml, FileFormat::Yaml)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SerdeFormatResult<Self> {
        common::deserialize_file(path.as_ref())
    }

    pub fn to_yaml(&self) -> SerdeFormatResult<String> {
        common::serialize(self, FileFormat::Yaml)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        self.fields
            .insert(key.into(), value.as_ref().trim_matches(' ').to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Space separated entries of `key`; empty when absent.
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)?.split_whitespace().next()
    }

    pub fn par_state(&self, key: &str) -> Option<&str> {
        self.get(&format!("{PAR_STATE_PREFIX}{key}"))
    }

    /// The engine marked `key` as falling back to its default.
    pub fn is_default(&self, key: &str) -> bool {
        self.par_state(key)
            .is_some_and(|state| state.contains(ParState::Default.as_ref()))
    }

    /// Present and not marked as default.
    pub fn applies(&self, key: &str) -> bool {
        self.contains(key) && !self.is_default(key)
    }

    /// Entry `idx` of a list valued key falls back to its default. A single
    /// state covers every entry.
    pub fn is_default_at(&self, key: &str, idx: usize) -> bool {
        let Some(states) = self.par_state(key) else {
            return false;
        };
        let states: Vec<&str> = states.split_whitespace().collect();
        let state = if states.len() == 1 {
            states.first()
        } else {
            states.get(idx)
        };
        state.is_some_and(|state| state.contains(ParState::Default.as_ref()))
    }

    pub fn set_par_state(&mut self, key: &str, state: ParState) {
        self.insert(format!("{PAR_STATE_PREFIX}{key}"), state.as_ref());
    }

    /// One state per entry of a list valued key.
    pub fn set_par_states(&mut self, key: &str, states: &[ParState]) {
        let states: Vec<&str> = states.iter().map(|state| state.as_ref()).collect();
        self.insert(format!("{PAR_STATE_PREFIX}{key}"), states.join(" "));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl From<BTreeMap<String, String>> for EngineRecord {
    fn from(fields: BTreeMap<String, String>) -> Self {
        fields.into_iter().collect()
    }
}

impl From<EngineRecord> for BTreeMap<String, String> {
    fn from(record: EngineRecord) -> Self {
        record.fields
    }
}

impl<K, V> FromIterator<(K, V)> for EngineRecord
where
    K: Into<String>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = EngineRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_trimmed_and_split() {
        let record: EngineRecord = [("ex", "  488 561 "), ("na", "1.4")].into_iter().collect();

        assert_eq!(record.get("ex"), Some("488 561"));
        assert_eq!(record.list("ex"), vec!["488", "561"]);
        assert_eq!(record.first("na"), Some("1.4"));
        assert!(record.list("em").is_empty());
    }

    #[test]
    fn default_state_blocks_a_field() {
        let mut record: EngineRecord = [("na", "1.4"), ("ex", "488")].into_iter().collect();
        record.set_par_state("na", ParState::Default);
        record.set_par_state("ex", ParState::NoMetaData);

        assert!(record.is_default("na"));
        assert!(!record.applies("na"));
        assert!(record.applies("ex"));
        assert_eq!(record.get("parState,ex"), Some("noMetaData"));
        assert!(!record.applies("em"));
    }

    #[test]
    fn states_per_entry() {
        let mut record: EngineRecord = [("s", "0.1 0.1 0 1")].into_iter().collect();
        record.set_par_states("s", &[ParState::NoMetaData, ParState::Default]);

        assert_eq!(record.par_state("s"), Some("noMetaData default"));
        assert!(!record.is_default_at("s", 0));
        assert!(record.is_default_at("s", 1));
        assert!(!record.is_default_at("s", 3));

        record.set_par_state("s", ParState::Default);
        assert!((0..4).all(|idx| record.is_default_at("s", idx)));
    }

    #[test]
    fn yaml_form() -> anyhow::Result<()> {
        let record = EngineRecord::from_yaml("micr: ' confocal confocal'\n\"parState,micr\": verified\n")?;
        assert_eq!(record.list("micr").len(), 2);
        assert!(!record.is_default("micr"));

        let text = record.to_yaml()?;
        assert_eq!(EngineRecord::from_yaml(&text)?, record);
        Ok(())
    }
}
