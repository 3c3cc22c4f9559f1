//! Ordered collections of parameters for one configuration domain.

use std::collections::BTreeMap;

use common::key_index_vec::KeyIndexVec;
use strum::IntoEnumIterator;

use crate::config::Config;
use crate::name::{Domain, ParamName};
use crate::parameter::Parameter;
use crate::store::ParameterStore;
use crate::value::{RawValue, Slot};

mod analysis;
mod microscope;
mod task;

pub use analysis::AnalysisSetting;
pub use microscope::{
    MicroscopeSetting, ARRAY_DETECTOR_CONFOCAL, MULTI_POINT_CONFOCAL, RESCAN,
    SINGLE_POINT_CONFOCAL, SPIM, STED, STED_3D, TWO_PHOTON, WIDEFIELD,
};
pub use task::TaskSetting;

/// Persisted form of a setting: parameter name to internal value.
pub type InternalValues = BTreeMap<ParamName, RawValue>;

#[derive(Clone, Debug)]
pub struct Setting {
    domain: Domain,
    parameters: KeyIndexVec<ParamName, Parameter>,
    number_of_channels: usize,
    max_channels: usize,
}

impl Setting {
    /// Every parameter of `domain`, in declaration order, built from `store`.
    pub fn new(domain: Domain, store: &dyn ParameterStore, config: &Config) -> Self {
        let parameters: KeyIndexVec<ParamName, Parameter> = ParamName::iter()
            .filter(|name| name.domain() == domain)
            .map(|name| Parameter::new(name, store, config))
            .collect();

        Self {
            domain,
            parameters,
            number_of_channels: 1,
            max_channels: config.channel_limit(store),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn parameter(&self, name: ParamName) -> Option<&Parameter> {
        self.parameters.by_key(&name)
    }

    pub fn parameter_mut(&mut self, name: ParamName) -> Option<&mut Parameter> {
        self.parameters.by_key_mut(&name)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn parameters_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.parameters.iter_mut()
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = ParamName> + '_ {
        self.parameters.keys()
    }

    /// Replaces the parameter with the same name. Parameters of another
    /// domain are handed back.
    pub fn set(&mut self, parameter: Parameter) -> Result<Parameter, Parameter> {
        self.parameters.replace(parameter)
    }

    /// Scalar value or first slot; empty when unset.
    pub fn value(&self, name: ParamName) -> &str {
        self.parameter(name)
            .map(Parameter::value_or_empty)
            .unwrap_or("")
    }

    pub fn slots(&self, name: ParamName) -> &[Slot] {
        self.parameter(name).map(Parameter::slots).unwrap_or(&[])
    }

    pub fn set_value(&mut self, name: ParamName, raw: impl Into<RawValue>) {
        if let Some(parameter) = self.parameter_mut(name) {
            parameter.set_value(raw);
        }
    }

    pub fn set_slot(&mut self, name: ParamName, index: usize, value: Slot) {
        if let Some(parameter) = self.parameter_mut(name) {
            parameter.set_slot(index, value);
        }
    }

    pub fn reset(&mut self, name: ParamName) {
        if let Some(parameter) = self.parameter_mut(name) {
            parameter.reset();
        }
    }

    pub fn number_of_channels(&self) -> usize {
        self.number_of_channels
    }

    pub fn max_channels(&self) -> usize {
        self.max_channels
    }

    /// Clamps `count` to `1..=max_channels` and passes it to every parameter.
    pub fn set_number_of_channels(&mut self, count: usize) {
        self.number_of_channels = count.clamp(1, self.max_channels);
        let count = self.number_of_channels;
        for parameter in self.parameters.iter_mut() {
            parameter.set_number_of_channels(count);
        }
    }

    pub fn internal_values(&self) -> InternalValues {
        self.parameters
            .iter()
            .map(|parameter| (parameter.name(), parameter.internal_value()))
            .collect()
    }

    /// Loads persisted values; names of other domains are ignored.
    pub fn set_internal_values(&mut self, values: &InternalValues) {
        for (name, value) in values {
            if let Some(parameter) = self.parameter_mut(*name) {
                parameter.set_internal_value(value.clone());
            }
        }
    }

    /// Copies every value of `other` through its internal form.
    pub fn copy_parameters_from(&mut self, other: &Setting) {
        self.set_number_of_channels(other.number_of_channels);
        for source in other.parameters.iter() {
            if let Some(parameter) = self.parameter_mut(source.name()) {
                parameter.set_internal_value(source.internal_value());
            }
        }
    }
}
