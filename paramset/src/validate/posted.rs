use std::path::Path;

use common::{FileFormat, SerdeFormatResult};
use hashbrown::HashMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yml::{Mapping, Value};

use crate::name::ParamName;
use crate::value::{RawValue, Slot};

/// Raw form input in the order it was posted.
///
/// Per-channel fields are posted as `<Name><channel>`, e.g.
/// `ExcitationWavelength0`. Multi-selections arrive as lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostedParameters {
    entries: Vec<(String, RawValue)>,
    index: HashMap<String, usize>,
}

impl PostedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(yaml: &str) -> SerdeFormatResult<Self> {
        common::deserialize(yaml, FileFormat::Yaml)
    }

    /// YAML or JSON, by extension.
    pub fn from_file(path: impl AsRef<Path>) -> SerdeFormatResult<Self> {
        common::deserialize_file(path.as_ref())
    }

    /// Replaces the value of a known field in place; new fields go last.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        let name = name.into();
        let value = value.into();
        match self.index.get(&name) {
            Some(&idx) => self.entries[idx].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&RawValue> {
        self.index
            .get(name.as_ref())
            .map(|&idx| &self.entries[idx].1)
    }

    /// The posted value, or the unset marker.
    pub fn raw(&self, name: impl AsRef<str>) -> RawValue {
        self.get(name).cloned().unwrap_or_default()
    }

    /// Scalar value, or the first element of a list.
    pub fn scalar(&self, name: impl AsRef<str>) -> Option<&str> {
        match self.get(name)? {
            RawValue::Null => None,
            RawValue::Scalar(value) => Some(value),
            RawValue::List(slots) => slots.first().and_then(|slot| slot.as_deref()),
        }
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.index.contains_key(name.as_ref())
    }

    /// Posted with a non-empty value; `"0"` is a value.
    pub fn is_set(&self, name: impl AsRef<str>) -> bool {
        self.get(name).is_some_and(RawValue::is_set)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn channel_key(name: ParamName, channel: usize) -> String {
        format!("{name}{channel}")
    }

    /// Per-channel fields of `name` gathered into `count` slots. Fields that
    /// were not posted stay `None`; posted empty strings are kept.
    pub fn channel_values(&self, name: ParamName, count: usize) -> Vec<Slot> {
        (0..count)
            .map(|channel| {
                self.get(Self::channel_key(name, channel))
                    .and_then(RawValue::first)
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for PostedParameters
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut posted = PostedParameters::new();
        for (name, value) in iter {
            posted.insert(name, value);
        }
        posted
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        _ => None,
    }
}

fn raw_value(value: &Value) -> Option<RawValue> {
    match value {
        Value::Null => Some(RawValue::Null),
        Value::Sequence(items) => Some(RawValue::List(items.iter().map(text).collect())),
        other => text(other).map(RawValue::Scalar),
    }
}

impl<'de> Deserialize<'de> for PostedParameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mapping = Mapping::deserialize(deserializer)?;
        let mut posted = PostedParameters::new();
        for (key, value) in mapping.iter() {
            let name = text(key)
                .ok_or_else(|| D::Error::custom(format!("field name must be a scalar: {key:?}")))?;
            let value = raw_value(value)
                .ok_or_else(|| D::Error::custom(format!("unsupported value for field {name}")))?;
            posted.insert(name, value);
        }
        Ok(posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_kept() {
        let mut posted: PostedParameters =
            [("b", "1"), ("a", "2"), ("c", "3")].into_iter().collect();
        posted.insert("a", "4");

        let names: Vec<&str> = posted.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(posted.scalar("a"), Some("4"));
        assert_eq!(posted.len(), 3);
    }

    #[test]
    fn set_is_strict_about_empty_strings() {
        let posted: PostedParameters = [("Zero", "0"), ("Empty", "")].into_iter().collect();
        assert!(posted.is_set("Zero"));
        assert!(!posted.is_set("Empty"));
        assert!(posted.contains("Empty"));
        assert!(!posted.is_set("Missing"));
    }

    #[test]
    fn channels_are_reassembled() {
        let posted: PostedParameters = [
            ("EmissionWavelength0", "520"),
            ("EmissionWavelength2", ""),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            posted.channel_values(ParamName::EmissionWavelength, 4),
            vec![Some("520".to_string()), None, Some(String::new()), None]
        );
    }

    #[test]
    fn yaml_scalars_become_strings() -> anyhow::Result<()> {
        let posted = PostedParameters::from_yaml(
            "NumberOfChannels: 2\nColocAnalysis: false\nColocChannel: [0, 2]\nPSF0: ~\n",
        )?;

        assert_eq!(posted.scalar("NumberOfChannels"), Some("2"));
        assert_eq!(posted.scalar("ColocAnalysis"), Some("False"));
        assert_eq!(
            posted.get("ColocChannel"),
            Some(&RawValue::list(["0", "2"]))
        );
        assert!(posted.contains("PSF0"));
        assert!(!posted.is_set("PSF0"));
        assert_eq!(
            posted.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["NumberOfChannels", "ColocAnalysis", "ColocChannel", "PSF0"]
        );
        Ok(())
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(PostedParameters::from_yaml("Acuity: { a: 1 }\n").is_err());
    }
}
