use crate::error::{ErrorKind, ValidationReport};
use crate::name::ParamName;
use crate::setting::TaskSetting;
use crate::validate::{assign, commit, recheck, PostedParameters};
use crate::value::{is_filled, is_numeric, RawValue, Slot};

const SKIP: &str = "skip";
/// SNR given to channels that are not deconvolved.
const SKIPPED_CHANNEL_SNR: &str = "20";

fn is_skipped(algorithms: &[Slot], channel: usize) -> bool {
    algorithms.get(channel).and_then(|slot| slot.as_deref()) == Some(SKIP)
}

impl TaskSetting {
    /// Algorithm, SNR, acuity, background and the stopping criteria.
    ///
    /// The algorithm decides how the SNR fields are named, so nothing else is
    /// looked at while it is invalid. Algorithm dependent fields are not
    /// checked when every channel is skipped.
    pub fn check_posted_task_parameters(&mut self, posted: &PostedParameters) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();
        let channels = self.max_channels();

        let posted_algorithms = posted.channel_values(DeconvolutionAlgorithm, channels);
        let skip_all = posted_algorithms
            .iter()
            .flatten()
            .all(|algorithm| algorithm == SKIP);
        if !commit(
            self,
            &mut report,
            DeconvolutionAlgorithm,
            RawValue::List(posted_algorithms),
            "Please set the Deconvolution Algorithm!",
        ) {
            return report;
        }
        let algorithms = self.slots(DeconvolutionAlgorithm).to_vec();

        let snr: Vec<Slot> = (0..channels)
            .map(|channel| {
                let algorithm = algorithms
                    .get(channel)
                    .and_then(|slot| slot.as_deref())
                    .unwrap_or("");
                let key = format!("{SignalNoiseRatio}{}{channel}", algorithm.to_uppercase());
                let value = posted.scalar(&key)?;
                if algorithm == SKIP {
                    Some(SKIPPED_CHANNEL_SNR.to_string())
                } else {
                    Some(value.to_string())
                }
            })
            .collect();
        self.set_value(SignalNoiseRatio, snr);
        if !skip_all {
            recheck(self, &mut report, SignalNoiseRatio);
        }

        assign(self, &mut report, AcuityMode, posted.raw(AcuityMode));
        let acuity_off = self.value(AcuityMode) == "off";
        let acuity: Vec<Slot> = (0..channels)
            .map(|channel| {
                let value = posted.scalar(PostedParameters::channel_key(Acuity, channel))?;
                if is_skipped(&algorithms, channel) || acuity_off {
                    Some("0".to_string())
                } else {
                    Some(value.to_string())
                }
            })
            .collect();
        self.set_value(Acuity, acuity);
        if !skip_all {
            recheck(self, &mut report, Acuity);
        }

        self.commit_background(posted, &mut report, skip_all);

        for name in [NumberOfIterations, QualityChangeStoppingCriterion] {
            self.set_value(name, posted.raw(name));
            if !skip_all {
                recheck(self, &mut report, name);
            }
        }
        for name in [ZStabilization, Autocrop, ArrayDetectorReductionMode] {
            assign(self, &mut report, name, posted.raw(name));
        }

        report
    }

    /// Per-channel correction vectors, collected in posted order.
    pub fn check_posted_chromatic_aberration_parameters(
        &mut self,
        posted: &PostedParameters,
    ) -> ValidationReport {
        let name = ParamName::ChromaticAberration;
        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();
        let prefix = name.to_string();

        let mut components: Vec<Slot> = Vec::new();
        for (field, value) in posted.iter() {
            if !field.contains(prefix.as_str()) {
                continue;
            }
            let value = value.first();
            if is_filled(&value) && !value.as_deref().is_some_and(is_numeric) {
                report.fail(name, ErrorKind::NonNumericValue, "Value must be numeric");
                return report;
            }
            components.push(value);
        }

        self.set_value(name, components);
        report
    }

    pub fn check_posted_t_stabilization_parameters(
        &mut self,
        posted: &PostedParameters,
    ) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();
        for name in [
            TStabilization,
            TStabilizationMethod,
            TStabilizationRotation,
            TStabilizationCropping,
        ] {
            assign(self, &mut report, name, posted.raw(name));
        }
        report
    }

    /// Any mask selection is accepted.
    pub fn check_posted_hot_pixel_correction_parameters(
        &mut self,
        posted: &PostedParameters,
    ) -> ValidationReport {
        let name = ParamName::HotPixelCorrection;
        if posted.is_empty() {
            return ValidationReport::rejected();
        }

        let masks = posted.channel_values(name, self.max_channels());
        if masks.iter().any(Option::is_some) {
            self.set_value(name, masks);
        }
        ValidationReport::default()
    }

    fn commit_background(
        &mut self,
        posted: &PostedParameters,
        report: &mut ValidationReport,
        skip_all: bool,
    ) {
        let name = ParamName::BackgroundOffsetPercent;
        let channels = self.max_channels();

        let Some(mode) = posted
            .scalar("BackgroundEstimationMode")
            .filter(|mode| !mode.is_empty())
        else {
            report.fail(
                name,
                ErrorKind::MissingRequiredValue,
                "Please choose a background estimation mode!",
            );
            return;
        };

        let mut values: Vec<Slot> = vec![None; channels];
        match mode {
            "auto" | "object" => values[0] = Some(mode.to_string()),
            "manual" => values = posted.channel_values(name, channels),
            _ => report.fail(
                name,
                ErrorKind::UnknownMode,
                "Unknown background estimation mode!",
            ),
        }

        self.set_value(name, values);
        if !skip_all {
            recheck(self, report, name);
        }
    }
}
