use crate::error::{CheckFailure, CheckResult, ErrorKind};
use crate::parameter::{choice, numeric, Parameter};
use crate::value::{is_filled, Slot};

/// Pads with unset slots, or truncates, to exactly `count` slots.
pub(super) fn padded(mut slots: Vec<Slot>, count: usize) -> Vec<Slot> {
    slots.resize(count, None);
    slots
}

/// Each active channel needs a selection.
pub(super) fn check_selected(parameter: &Parameter, message: &str) -> CheckResult {
    match parameter.active_slots().iter().position(|slot| !is_filled(slot)) {
        Some(channel) => Err(CheckFailure::new(
            ErrorKind::MissingRequiredValue,
            format!("{message} {channel}!"),
        )),
        None => Ok(()),
    }
}

/// A symbolic value in the first slot stands for every channel.
pub(super) fn check_with_sentinels(parameter: &Parameter, sentinels: &[&str]) -> CheckResult {
    if sentinels.contains(&parameter.value_or_empty()) {
        return Ok(());
    }
    numeric::check_each(parameter, parameter.active_slots())
}

/// Channel indices can be any subset, but at least two of them.
pub(super) fn check_channel_selection(parameter: &Parameter) -> CheckResult {
    if parameter.slots().iter().filter(|slot| is_filled(slot)).count() < 2 {
        return Err(CheckFailure::new(
            ErrorKind::MissingRequiredValue,
            "Please select at least 2 channels.",
        ));
    }
    Ok(())
}

pub(super) fn check_members(parameter: &Parameter) -> CheckResult {
    for value in parameter.slots().iter().flatten().filter(|value| !value.is_empty()) {
        if !parameter.is_possible_value(value) {
            return Err(choice::bad_value(parameter, value));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::ErrorKind;
    use crate::name::ParamName;
    use crate::parameter::Parameter;
    use crate::store::SchemaTable;

    fn parameter(name: ParamName, channels: usize) -> Parameter {
        let schema = SchemaTable::embedded().unwrap();
        let mut parameter = Parameter::new(name, &schema, &Config::default());
        parameter.set_number_of_channels(channels);
        parameter
    }

    // === Numeric arrays ===

    #[test]
    fn missing_channel_message_depends_on_confidence() {
        let mut wavelength = parameter(ParamName::ExcitationWavelength, 2);
        wavelength.set_value(vec!["488"]);
        assert!(!wavelength.check());
        assert_eq!(
            wavelength.message(),
            "Excitation Wavelength: Some of the values are missing!"
        );
        assert_eq!(wavelength.last_error(), Some(ErrorKind::MissingRequiredValue));

        wavelength.set_confidence_level(crate::confidence::ConfidenceLevel::Verified);
        assert!(!wavelength.check());
        assert!(wavelength.message().contains("You can omit typing values"));
    }

    #[test]
    fn every_active_channel_is_bounded() {
        let mut snr = parameter(ParamName::SignalNoiseRatio, 2);
        snr.set_value(vec!["10", "200"]);
        assert!(!snr.check());
        assert_eq!(snr.message(), "SNR: The value must be <= 100.");

        snr.set_value(vec!["10", "20", "500"]);
        assert!(snr.check(), "inactive channels are not checked");
    }

    #[test]
    fn sted_arrays_have_own_missing_message_and_accept_zero() {
        let mut saturation = parameter(ParamName::StedSaturationFactor, 2);
        saturation.set_value(vec![Some("0".to_string()), Some(String::new())]);
        assert!(!saturation.check());
        assert_eq!(saturation.message(), "Saturation factor: some of the values are missing!");

        saturation.set_value(vec!["0", "3"]);
        assert!(saturation.check());
    }

    // === Selections ===

    #[test]
    fn per_channel_selection_names_the_channel() {
        let mut algorithm = parameter(ParamName::DeconvolutionAlgorithm, 3);
        algorithm.set_value(vec!["cmle", "qmle"]);
        assert!(!algorithm.check());
        assert_eq!(
            algorithm.message(),
            "Please select a deconvolution algorithm for channel 2!"
        );

        let mut psf = parameter(ParamName::Psf, 1);
        assert!(!psf.check());
        assert_eq!(psf.message(), "Please select a PSF file for channel 0!");
        psf.set_value(vec!["psf/bead.h5"]);
        assert!(psf.check());
    }

    // === Sentinels ===

    #[test]
    fn background_sentinels_short_circuit() {
        let mut background = parameter(ParamName::BackgroundOffsetPercent, 2);
        background.set_value(vec!["auto"]);
        assert!(background.check());
        background.set_value(vec!["object"]);
        assert!(background.check());

        background.set_value(vec!["12", "x"]);
        assert!(!background.check());
        assert_eq!(background.message(), "Background offset: The value must be numeric.\n");
    }

    #[test]
    fn colocalization_threshold_auto() {
        let mut threshold = parameter(ParamName::ColocThreshold, 2);
        threshold.set_value(vec!["auto"]);
        assert!(threshold.check());
        threshold.set_value(vec!["50", "150"]);
        assert!(!threshold.check());
        assert_eq!(
            threshold.message(),
            "Colocalization threshold: The value must be <= 100."
        );
    }

    // === Colocalization ===

    #[test]
    fn colocalization_needs_two_channels() {
        let mut channels = parameter(ParamName::ColocChannel, 3);
        channels.set_value(vec![Some("0".to_string()), None, None]);
        assert!(!channels.check());
        assert_eq!(channels.message(), "Please select at least 2 channels.");

        channels.set_value(vec![Some("0".to_string()), None, Some("2".to_string())]);
        assert!(channels.check());
    }

    #[test]
    fn coefficients_must_be_known() {
        let mut coefficients = parameter(ParamName::ColocCoefficient, 1);
        coefficients.set_value(vec!["Pearson", "M1"]);
        assert!(coefficients.check());
        coefficients.set_value(vec!["Pearson", "Magic"]);
        assert!(!coefficients.check());
        assert_eq!(coefficients.message(), "Bad value Magic for ColocCoefficient");
    }
}
