use tracing::debug;

use crate::error::{ErrorKind, ValidationReport};
use crate::name::ParamName;
use crate::setting::{MicroscopeSetting, TWO_PHOTON};
use crate::store::ParameterStore;
use crate::validate::{assign, commit, is_false_flag, PostedParameters};
use crate::value::{int_value, is_filled, parse_number, RawValue, Slot};

const OFF_CONFOCAL: &str = "off-confocal";
const HIGH_NA: &str = "High NA";

type Group = fn(&mut MicroscopeSetting, &PostedParameters) -> ValidationReport;

/// Posted channel values of `name`. Channels posted empty become `0` where
/// `applies` holds; channels that were not posted stay unset.
fn with_zero_fallback(
    posted: &PostedParameters,
    name: ParamName,
    channels: usize,
    applies: impl Fn(usize) -> bool,
) -> Vec<Slot> {
    let mut values = posted.channel_values(name, channels);
    for (channel, value) in values.iter_mut().enumerate() {
        let was_posted = posted.contains(PostedParameters::channel_key(name, channel));
        if was_posted && !is_filled(value) && applies(channel) {
            *value = Some("0".to_string());
        }
    }
    values
}

fn mode_is(modes: &[Slot], channel: usize, expected: &str) -> bool {
    modes.get(channel).and_then(|mode| mode.as_deref()) == Some(expected)
}

/// Cross check of the wavelengths of every channel posted with both.
fn check_wavelengths(posted: &PostedParameters, channels: usize) -> Option<String> {
    let microscope_type = posted.scalar(ParamName::MicroscopeType)?;
    let two_photon = microscope_type == TWO_PHOTON;

    let excitation = posted.channel_values(ParamName::ExcitationWavelength, channels);
    let emission = posted.channel_values(ParamName::EmissionWavelength, channels);
    let number = |slot: &Slot| slot.as_deref().and_then(parse_number);

    for (channel, (excitation, emission)) in excitation.iter().zip(&emission).enumerate() {
        let (Some(excitation), Some(emission)) = (number(excitation), number(emission)) else {
            continue;
        };
        if !two_photon && emission < excitation {
            return Some(format!(
                "Impossible combination of wavelengths: the emission wavelength is shorter \
                 than the excitation wavelength in channel {channel}."
            ));
        }
        if two_photon && emission > excitation {
            return Some(format!(
                "Impossible combination of wavelengths for a two photon microscope: the \
                 emission wavelength is longer than the excitation wavelength in channel \
                 {channel}."
            ));
        }
    }
    None
}

impl MicroscopeSetting {
    // ========================================================================
    // Posted groups
    // ========================================================================

    /// PSF type and channel count. The channel count is committed to the
    /// setting.
    pub fn check_posted_image_parameters(&mut self, posted: &PostedParameters) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();

        if !posted.is_set(PointSpreadFunction) {
            report.fail(
                PointSpreadFunction,
                ErrorKind::MissingRequiredValue,
                "Please indicate whether you would like to calculate a theoretical PSF or use \
                 an existing measured one!",
            );
            return report;
        }
        if !assign(self, &mut report, PointSpreadFunction, posted.raw(PointSpreadFunction)) {
            return report;
        }

        if !posted.is_set(NumberOfChannels) {
            report.fail(
                NumberOfChannels,
                ErrorKind::MissingRequiredValue,
                "Please set the number of channels!",
            );
            return report;
        }
        if !assign(self, &mut report, NumberOfChannels, posted.raw(NumberOfChannels)) {
            return report;
        }

        let count = int_value(self.value(NumberOfChannels)).max(1) as usize;
        self.set_number_of_channels(count);
        report
    }

    /// Microscope type, optics and wavelengths.
    pub fn check_posted_microscopy_parameters(
        &mut self,
        posted: &PostedParameters,
    ) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();
        let channels = self.max_channels();

        if let Some(message) = check_wavelengths(posted, channels) {
            report.fail(EmissionWavelength, ErrorKind::InconsistentCrossField, message);
            return report;
        }

        for (name, missing) in [
            (ExcitationWavelength, "Please set the excitation wavelength!"),
            (EmissionWavelength, "Please set the emission wavelength!"),
        ] {
            let values = RawValue::List(posted.channel_values(name, channels));
            commit(self, &mut report, name, values, missing);
        }

        for (name, missing) in [
            (MicroscopeType, "Please set the microscope type!"),
            (NumericalAperture, "Please set the numerical aperture!"),
            (ObjectiveType, "Please set the objective type!"),
            (SampleMedium, "Please set the refractive index of the sample medium!"),
        ] {
            let custom = format!("{name}CustomValue");
            let raw = match posted.scalar(name) {
                Some("custom") if posted.contains(&custom) => posted.raw(&custom),
                _ => posted.raw(name),
            };
            commit(self, &mut report, name, raw, missing);
        }

        report
    }

    /// Sampling distances and pinhole geometry.
    pub fn check_posted_capturing_parameters(
        &mut self,
        posted: &PostedParameters,
    ) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();

        commit(self, &mut report, CCDCaptorSizeX, posted.raw(CCDCaptorSizeX), "Please set the pixel size!");
        if self.is_array_detector_confocal() {
            commit(self, &mut report, CCDCaptorSizeY, posted.raw(CCDCaptorSizeY), "Please set the pixel size in Y!");
        }
        commit(self, &mut report, ZStepSize, posted.raw(ZStepSize), "Please set the z-step!");
        commit(self, &mut report, TimeInterval, posted.raw(TimeInterval), "Please set the time interval!");

        if self.has_pinhole() {
            let values = RawValue::List(posted.channel_values(PinholeSize, self.max_channels()));
            commit(self, &mut report, PinholeSize, values, "Please set the pinhole size!");
        }
        if self.is_nipkow_disk() {
            commit(self, &mut report, PinholeSpacing, posted.raw(PinholeSpacing), "Please set the pinhole spacing!");
        }

        report
    }

    /// Nothing to check when the correction is posted as not necessary.
    pub fn check_posted_aberration_correction_parameters(
        &mut self,
        posted: &PostedParameters,
    ) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();
        if posted
            .scalar(AberrationCorrectionNecessary)
            .is_some_and(is_false_flag)
        {
            return report;
        }

        commit(
            self,
            &mut report,
            CoverslipRelativePosition,
            posted.raw(CoverslipRelativePosition),
            "Please choose the relative coverslip position!",
        );
        commit(
            self,
            &mut report,
            AberrationCorrectionMode,
            posted.raw(AberrationCorrectionMode),
            "Please set the aberration correction mode!",
        );
        if self.value(AberrationCorrectionMode) == "advanced" {
            commit(
                self,
                &mut report,
                AdvancedCorrectionOptions,
                posted.raw(AdvancedCorrectionOptions),
                "Please indicate the options for the advanced correction!",
            );
        }

        report
    }

    /// Depletion parameters of STED microscopes. Channels imaged without
    /// depletion default to `0`.
    pub fn check_posted_sted_parameters(&mut self, posted: &PostedParameters) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();
        if !self.is_sted() && !self.is_sted_3d() {
            return report;
        }
        let channels = self.max_channels();

        let modes = RawValue::List(posted.channel_values(StedDepletionMode, channels));
        let depletion_modes = if commit(self, &mut report, StedDepletionMode, modes, "Please set the Sted depletion mode!") {
            self.slots(StedDepletionMode).to_vec()
        } else {
            Vec::new()
        };

        let mut groups = vec![
            (StedSaturationFactor, "Please set the Sted saturation factor!"),
            (StedWavelength, "Please set the Sted wavelength!"),
            (StedImmunity, "Please set the Sted immunity fraction!"),
        ];
        if self.is_sted_3d() {
            groups.push((Sted3D, "Please set the Sted 3D percentage!"));
        }

        for (name, missing) in groups {
            let values = with_zero_fallback(posted, name, channels, |channel| {
                mode_is(&depletion_modes, channel, OFF_CONFOCAL)
            });
            commit(self, &mut report, name, RawValue::List(values), missing);
        }

        report
    }

    /// Light sheet parameters of SPIM microscopes. Which of them apply
    /// depends on the excitation mode of the channel; the others default to
    /// `0`.
    pub fn check_posted_spim_parameters(&mut self, posted: &PostedParameters) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();
        if !self.is_spim() {
            return report;
        }
        let channels = self.max_channels();

        let modes = RawValue::List(posted.channel_values(SpimExcMode, channels));
        let excitation_modes = if commit(self, &mut report, SpimExcMode, modes, "Please set the SPIM excitation mode!") {
            self.slots(SpimExcMode).to_vec()
        } else {
            Vec::new()
        };
        let is_high_na = |channel| mode_is(&excitation_modes, channel, HIGH_NA);
        let is_other_mode = |channel: usize| {
            excitation_modes.get(channel).is_some_and(is_filled) && !is_high_na(channel)
        };

        for (name, missing, high_na_only) in [
            (SpimGaussWidth, "Please set the Spim Gaussian Width!", false),
            (SpimFocusOffset, "Please set the Spim Focus Offset!", false),
            (SpimCenterOffset, "Please set the Spim Center Offset!", false),
            (SpimNa, "Please set the Spim NA!", true),
            (SpimFill, "Please set the Spim Fill Factor!", true),
        ] {
            let values = with_zero_fallback(posted, name, channels, |channel| {
                if high_na_only {
                    is_other_mode(channel)
                } else {
                    is_high_na(channel)
                }
            });
            commit(self, &mut report, name, RawValue::List(values), missing);
        }

        let directions = RawValue::List(posted.channel_values(SpimDir, channels));
        commit(self, &mut report, SpimDir, directions, "Please set the Spim Direction!");

        report
    }

    /// Camera geometry used to compute the pixel size. Every field is
    /// required.
    pub fn check_posted_pixel_size_parameters(
        &mut self,
        posted: &PostedParameters,
    ) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();

        for (name, missing) in [
            (ObjectiveMagnification, "Please set the objective magnification!"),
            (Binning, "Please set the binning!"),
            (CMount, "Please set the CMount!"),
            (TubeFactor, "Please set the tube factor!"),
            (CCDCaptorSize, "Please set the CCD pixel size!"),
        ] {
            if posted.is_set(name) {
                assign(self, &mut report, name, posted.raw(name));
            } else {
                report.fail(name, ErrorKind::MissingRequiredValue, missing);
            }
        }

        report
    }

    // ========================================================================
    // Whole setting
    // ========================================================================

    /// The setting as a posted form, per-channel values split into
    /// `<Name><channel>` fields.
    pub fn posted_form(&self) -> PostedParameters {
        let mut posted = PostedParameters::new();
        for parameter in self.parameters() {
            let name = parameter.name();
            let per_channel = name.is_sted()
                || name.is_spim()
                || matches!(
                    name,
                    ParamName::ExcitationWavelength
                        | ParamName::EmissionWavelength
                        | ParamName::PinholeSize
                );

            if per_channel {
                for (channel, slot) in parameter.slots().iter().enumerate() {
                    if let Some(value) = slot {
                        posted.insert(PostedParameters::channel_key(name, channel), value.as_str());
                    }
                }
            } else if let Some(value) = parameter.value() {
                posted.insert(name.to_string(), value);
            }
        }
        posted
    }

    /// Checks a stored setting against what the selected image file format
    /// can supply from its metadata. Parameters the format reports reliably
    /// may stay empty.
    pub fn check_parameter_setting(&mut self, store: &dyn ParameterStore) -> ValidationReport {
        let format = self.value(ParamName::ImageFileFormat).to_string();
        debug!(%format, "checking parameter setting");

        let posted = self.posted_form();
        for parameter in self.parameters_mut() {
            parameter.set_confidence_level(store.confidence_level(&format, parameter.name()));
        }

        let groups: [Group; 6] = [
            Self::check_posted_image_parameters,
            Self::check_posted_microscopy_parameters,
            Self::check_posted_capturing_parameters,
            Self::check_posted_aberration_correction_parameters,
            Self::check_posted_sted_parameters,
            Self::check_posted_spim_parameters,
        ];

        let mut report = ValidationReport::default();
        for group in groups {
            let outcome = group(self, &posted);
            let failed = !outcome.is_valid();
            report.merge(outcome);
            if failed {
                report.push(
                    None,
                    ErrorKind::MissingRequiredValue,
                    format!(
                        "The selected parameter set contains empty values which the {format} \
                         format misses in its metadata. Please proceed to add them or select a \
                         different parameter set."
                    ),
                );
                break;
            }
        }
        report
    }
}
