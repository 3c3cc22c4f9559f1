use std::ops::{Deref, DerefMut};

use crate::config::Config;
use crate::name::{Domain, ParamName};
use crate::setting::Setting;
use crate::store::ParameterStore;

/// Colocalization analysis parameters.
#[derive(Clone, Debug)]
pub struct AnalysisSetting(Setting);

impl Deref for AnalysisSetting {
    type Target = Setting;

    fn deref(&self) -> &Setting {
        &self.0
    }
}

impl DerefMut for AnalysisSetting {
    fn deref_mut(&mut self) -> &mut Setting {
        &mut self.0
    }
}

impl AnalysisSetting {
    pub fn new(store: &dyn ParameterStore, config: &Config) -> Self {
        Self(Setting::new(Domain::Analysis, store, config))
    }

    pub fn into_inner(self) -> Setting {
        self.0
    }

    pub fn is_coloc_analysis_enabled(&self) -> bool {
        !matches!(self.value(ParamName::ColocAnalysis), "" | "0")
    }

    /// Only the on/off switch is shown while the analysis is disabled.
    pub fn display_string(&self) -> String {
        let enabled = self.is_coloc_analysis_enabled();
        let channels = self.number_of_channels();
        self.parameters()
            .filter(|parameter| enabled || parameter.name() == ParamName::ColocAnalysis)
            .map(|parameter| parameter.display_string(channels))
            .collect()
    }
}
