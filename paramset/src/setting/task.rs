use std::ops::{Deref, DerefMut};

use crate::config::Config;
use crate::name::{Domain, ParamName};
use crate::setting::{MicroscopeSetting, Setting};
use crate::store::ParameterStore;
use crate::value::float_value;

/// Restoration parameters: algorithm, SNR, background, stopping criteria and
/// the optional corrections.
#[derive(Clone, Debug)]
pub struct TaskSetting(Setting);

impl Deref for TaskSetting {
    type Target = Setting;

    fn deref(&self) -> &Setting {
        &self.0
    }
}

impl DerefMut for TaskSetting {
    fn deref_mut(&mut self) -> &mut Setting {
        &mut self.0
    }
}

impl TaskSetting {
    pub fn new(store: &dyn ParameterStore, config: &Config) -> Self {
        Self(Setting::new(Domain::Task, store, config))
    }

    pub fn into_inner(self) -> Setting {
        self.0
    }

    // ========================================================================
    // Eligibility
    // ========================================================================

    pub fn is_eligible_for_z_stabilization(&self, microscope: &MicroscopeSetting) -> bool {
        (microscope.is_sted() || microscope.is_sted_3d())
            && microscope.value(ParamName::ZStepSize) != "0"
    }

    pub fn is_eligible_for_t_stabilization(&self, microscope: &MicroscopeSetting) -> bool {
        microscope.value(ParamName::TimeInterval) != "0"
    }

    pub fn is_eligible_for_cac(&self) -> bool {
        self.number_of_channels() > 1
    }

    pub fn is_eligible_for_array_reduction(&self, microscope: &MicroscopeSetting) -> bool {
        microscope.is_array_detector_confocal()
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// Report of the restoration parameters. `number_of_channels` of 0 means
    /// the channel count of the setting.
    pub fn display_string(
        &self,
        number_of_channels: usize,
        microscope_type: &str,
        time_interval: f64,
    ) -> String {
        use ParamName::*;

        let channels = match number_of_channels {
            0 => self.number_of_channels(),
            n => n,
        };
        let stabilization_off =
            float_value(self.value(TStabilization)) == 0.0 || time_interval == 0.0;

        let mut result = String::new();
        for parameter in self.parameters() {
            let skipped = match parameter.name() {
                OutputFileFormat | MultiChannelOutput => true,
                ZStabilization => !microscope_type.contains("STED"),
                TStabilization => time_interval == 0.0,
                TStabilizationMethod | TStabilizationRotation | TStabilizationCropping => {
                    stabilization_off
                }
                ChromaticAberration => channels == 1,
                ArrayDetectorReductionMode => !microscope_type.contains("array detector confocal"),
                _ => false,
            };
            if skipped {
                continue;
            }

            if parameter.name() == SignalNoiseRatio {
                result.push_str(&parameter.display_snr(self.slots(DeconvolutionAlgorithm), channels));
            } else {
                result.push_str(&parameter.display_string(channels));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::microscope::{ARRAY_DETECTOR_CONFOCAL, STED, WIDEFIELD};
    use crate::store::SchemaTable;

    fn settings() -> (TaskSetting, MicroscopeSetting) {
        let schema = SchemaTable::embedded().unwrap();
        let config = Config::default();
        (
            TaskSetting::new(&schema, &config),
            MicroscopeSetting::new(&schema, &config),
        )
    }

    // === Eligibility ===

    #[test]
    fn z_stabilization_needs_sted_and_z_steps() {
        let (task, mut microscope) = settings();
        microscope.set_value(ParamName::MicroscopeType, WIDEFIELD);
        microscope.set_value(ParamName::ZStepSize, "150");
        assert!(!task.is_eligible_for_z_stabilization(&microscope));

        microscope.set_value(ParamName::MicroscopeType, STED);
        assert!(task.is_eligible_for_z_stabilization(&microscope));

        microscope.set_value(ParamName::ZStepSize, "0");
        assert!(!task.is_eligible_for_z_stabilization(&microscope));
    }

    #[test]
    fn other_corrections() {
        let (mut task, mut microscope) = settings();
        microscope.set_value(ParamName::TimeInterval, "0");
        assert!(!task.is_eligible_for_t_stabilization(&microscope));
        microscope.set_value(ParamName::TimeInterval, "2");
        assert!(task.is_eligible_for_t_stabilization(&microscope));

        assert!(!task.is_eligible_for_cac());
        task.set_number_of_channels(2);
        assert!(task.is_eligible_for_cac());

        assert!(!task.is_eligible_for_array_reduction(&microscope));
        microscope.set_value(ParamName::MicroscopeType, ARRAY_DETECTOR_CONFOCAL);
        assert!(task.is_eligible_for_array_reduction(&microscope));
    }

    // === Display ===

    #[test]
    fn display_skips_corrections_that_do_not_apply() {
        let (mut task, _) = settings();
        task.set_value(ParamName::DeconvolutionAlgorithm, "cmle");
        task.set_value(ParamName::SignalNoiseRatio, vec!["12"]);

        let shown = task.display_string(1, WIDEFIELD, 0.0);
        assert!(shown.contains(" signal noise ratio:"));
        assert!(!shown.contains(" output file format:"));
        assert!(!shown.contains(" z stabilization:"));
        assert!(!shown.contains(" t stabilization:"));
        assert!(!shown.contains(" chromatic aberration"));
        assert!(!shown.contains(" array detector reduction mode:"));

        task.set_value(ParamName::TStabilization, "1");
        let shown = task.display_string(2, "STED 3D", 1.5);
        assert!(shown.contains(" z stabilization:"));
        assert!(shown.contains(" t stabilization:"));
        assert!(shown.contains(" t stabilization method:"));
        assert!(shown.contains(" chromatic aberration ch1:"));
    }

    #[test]
    fn snr_follows_algorithm() {
        let (mut task, _) = settings();
        task.set_number_of_channels(2);
        task.set_value(ParamName::DeconvolutionAlgorithm, vec!["skip", "qmle"]);
        task.set_value(ParamName::SignalNoiseRatio, vec!["", "3"]);

        let shown = task.display_string(0, WIDEFIELD, 0.0);
        let snr = shown
            .lines()
            .find(|line| line.starts_with(" signal noise ratio:"))
            .unwrap_or_default();
        assert!(snr.ends_with("-, 3"));
    }
}
