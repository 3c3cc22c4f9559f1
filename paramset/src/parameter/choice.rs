use crate::error::{CheckFailure, CheckResult, ErrorKind};
use crate::parameter::Parameter;
use crate::value::is_numeric;

const SINGLE: &str = "single";
const MULTI: &str = "multi";

pub const REDUCTION_MODES: &[&str] = &[
    "auto",
    "all",
    "no",
    "core all",
    "core no",
    "safe",
    "aggressive",
    "superXY",
    "superY",
];

/// Reduction modes offered for array detector confocal images.
pub const ARRAY_DETECTOR_REDUCTION_MODES: &[&str] =
    &["auto", "all", "no", "core all", "core no", "superXY", "superY"];

pub(super) fn check_member(parameter: &Parameter) -> CheckResult {
    let value = parameter.value_or_empty();
    if parameter.is_possible_value(value) {
        return Ok(());
    }
    Err(bad_value(parameter, value))
}

pub(super) fn bad_value(parameter: &Parameter, value: &str) -> CheckFailure {
    CheckFailure::new(
        ErrorKind::InvalidEnumerationValue,
        format!("Bad value {} for {}", value, parameter.name()),
    )
}

/// Presets, or any number for a custom refractive index.
pub(super) fn check_refractive_index(parameter: &Parameter, message: &str) -> CheckResult {
    let value = parameter.value_or_empty();
    if parameter.is_possible_value(value) || is_numeric(value) {
        return Ok(());
    }
    Err(CheckFailure::new(ErrorKind::NonNumericValue, message))
}

pub(super) fn prefixed(multi: bool, value: &str) -> String {
    let mode = if multi { MULTI } else { SINGLE };
    format!("{mode}_{value}")
}

/// Splits `single_x` / `multi_x`. Values without a known prefix come back
/// whole with no mode.
pub(super) fn split_prefixed(value: &str) -> (Option<bool>, &str) {
    match value.split_once('_') {
        Some((SINGLE, plain)) => (Some(false), plain),
        Some((MULTI, plain)) => (Some(true), plain),
        _ => (None, value),
    }
}

/// File extension written for an output format translation.
pub fn output_extension(format: &str) -> Option<&'static str> {
    let extension = match format {
        "tiff" | "tiffrgb" | "tiff16" => "tif",
        "imaris" => "ims",
        "ome" => "ome",
        "ics" | "ics2" => "ics",
        "hdf5" => "h5",
        "r3d" => "r3d",
        _ => return None,
    };
    Some(extension)
}

/// Engine licence feature needed for a microscope type.
pub fn licence_name(microscope_type: &str) -> Option<&'static str> {
    let licence = match microscope_type {
        "widefield" => "widefield",
        "multipoint confocal (spinning disk)" => "nipkow-disk",
        "single point confocal" => "confocal",
        "two photon" => "multi-photon",
        "STED" => "sted",
        "STED 3D" => "sted3D",
        "SPIM" => "spim",
        "rescan" => "rescan",
        "array detector confocal" => "detector-array",
        _ => return None,
    };
    Some(licence)
}
