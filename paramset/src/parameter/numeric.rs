use crate::error::{CheckFailure, CheckResult, ErrorKind};
use crate::name::ParamName;
use crate::parameter::Parameter;
use crate::store::NumericBounds;
use crate::value::{format_number, is_filled, parse_number, slot_str};

const MISSING_VALUES: &str = "Some of the values are missing!";
const OPTIONAL_VALUES: &str = "You can omit typing values for this parameter. \
If you decide to provide them, though, you must provide them all.";

/// Prefix prepended to the numeric messages of `name`.
pub(crate) fn message_prefix(name: ParamName) -> Option<&'static str> {
    use ParamName::*;
    let prefix = match name {
        Acuity => "Acuity: ",
        BackgroundOffsetPercent => "Background offset: ",
        CCDCaptorSize => "CCD element size: ",
        CMount => "C-mount: ",
        ExcitationWavelength => "Excitation Wavelength: ",
        EmissionWavelength => "Emission Wavelength: ",
        NumberOfIterations => "Number of iterations: ",
        NumericalAperture => "Numerical Aperture: ",
        PsfGenerationDepth => "PSF generation depth: ",
        PinholeSize => "Pinhole size: ",
        PinholeSpacing => "Pinhole Spacing: ",
        QualityChangeStoppingCriterion => "Quality change: ",
        SignalNoiseRatio => "SNR: ",
        TimeInterval => "Time interval: ",
        TubeFactor => "Tube Factor: ",
        ZStepSize => "Z step: ",
        ColocThreshold => "Colocalization threshold: ",
        StedSaturationFactor => "STED Saturation Factor: ",
        StedWavelength => "STED Wavelength: ",
        StedImmunity => "STED Immunity Fraction: ",
        Sted3D => "STED 3D: ",
        SpimGaussWidth => "SPIM Gaussian Width: ",
        SpimFocusOffset => "SPIM Focus Offset: ",
        SpimCenterOffset => "SPIM Center Offset: ",
        SpimNa => "SPIM NA: ",
        SpimFill => "SPIM Fill Factor: ",
        _ => return None,
    };
    Some(prefix)
}

/// Parameters reporting missing channels with a message of their own,
/// without the numeric prefix.
fn missing_label(name: ParamName) -> Option<&'static str> {
    let label = match name {
        ParamName::StedSaturationFactor => "Saturation factor: ",
        ParamName::StedWavelength => "STED wavelength: ",
        ParamName::StedImmunity => "STED immunity fraction: ",
        ParamName::Sted3D => "STED 3D: ",
        ParamName::SpimFill => "SPIM Fill Factor: ",
        _ => return None,
    };
    Some(label)
}

/// Numeric test of one value against `bounds`.
pub(crate) fn check_number(value: &str, bounds: &NumericBounds) -> CheckResult {
    let Some(number) = parse_number(value) else {
        return Err(CheckFailure::new(
            ErrorKind::NonNumericValue,
            "The value must be numeric.\n",
        ));
    };

    if let Some(min) = bounds.min {
        let (ok, op) = if bounds.min_included {
            (number >= min, ">=")
        } else {
            (number > min, ">")
        };
        if !ok {
            return Err(CheckFailure::new(
                ErrorKind::OutOfRange,
                format!("The value must be {op} {}.", format_number(min)),
            ));
        }
    }
    if let Some(max) = bounds.max {
        let (ok, op) = if bounds.max_included {
            (number <= max, "<=")
        } else {
            (number < max, "<")
        };
        if !ok {
            return Err(CheckFailure::new(
                ErrorKind::OutOfRange,
                format!("The value must be {op} {}.", format_number(max)),
            ));
        }
    }

    Ok(())
}

pub(super) fn check_scalar(parameter: &Parameter) -> CheckResult {
    check_number(parameter.value_or_empty(), &parameter.bounds())
        .map_err(|failure| failure.prefixed(message_prefix(parameter.name())))
}

/// `0` marks a 2-D image or a single time point.
pub(super) fn check_zero_or_scalar(parameter: &Parameter) -> CheckResult {
    if parse_number(parameter.value_or_empty()) == Some(0.0) {
        return Ok(());
    }
    check_scalar(parameter)
}

/// Every active channel must be filled, then each is checked against the
/// shared bounds.
pub(super) fn check_array(parameter: &Parameter) -> CheckResult {
    let name = parameter.name();
    let active = parameter.active_slots();

    if !active.iter().all(is_filled) {
        let must_provide = parameter.must_provide();
        if let Some(label) = missing_label(name) {
            let message = if must_provide {
                format!("{label}some of the values are missing!")
            } else {
                OPTIONAL_VALUES.to_string()
            };
            return Err(CheckFailure::new(ErrorKind::MissingRequiredValue, message));
        }
        let message = if must_provide { MISSING_VALUES } else { OPTIONAL_VALUES };
        return Err(
            CheckFailure::new(ErrorKind::MissingRequiredValue, message)
                .prefixed(message_prefix(name)),
        );
    }

    check_each(parameter, active)
}

pub(super) fn check_each(parameter: &Parameter, slots: &[Option<String>]) -> CheckResult {
    let bounds = parameter.bounds();
    slots
        .iter()
        .try_for_each(|slot| check_number(slot_str(slot), &bounds))
        .map_err(|failure| failure.prefixed(message_prefix(parameter.name())))
}
