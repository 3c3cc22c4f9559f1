//! Confidence levels and the policy deciding which parameters a user must
//! provide for a given image file format.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::name::ParamName;

/// How much the metadata of an image file format can be trusted for a
/// parameter.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum ConfidenceLevel {
    #[default]
    Default,
    Estimated,
    Reported,
    Verified,
    AsIs,
    /// Forced to be entered by the user regardless of the file format.
    Provided,
}

impl ConfidenceLevel {
    /// Only `reported`, `verified` and `asIs` make a parameter optional.
    pub fn must_provide(self) -> bool {
        !matches!(
            self,
            ConfidenceLevel::Reported | ConfidenceLevel::Verified | ConfidenceLevel::AsIs
        )
    }

    pub fn rank(self) -> u8 {
        match self {
            ConfidenceLevel::Default | ConfidenceLevel::Provided => 0,
            ConfidenceLevel::Estimated => 1,
            ConfidenceLevel::Reported => 2,
            ConfidenceLevel::Verified | ConfidenceLevel::AsIs => 3,
        }
    }

    /// The less trusted of the two. Ties keep `self`.
    pub fn min(self, other: ConfidenceLevel) -> ConfidenceLevel {
        if other.rank() < self.rank() {
            other
        } else {
            self
        }
    }
}

/// File format value meaning "any format"; nothing can be read from metadata.
pub const ANY_FILE_FORMAT: &str = "all";

/// Resolves the confidence level of `name` for `file_format`.
///
/// `lookup` answers the raw per-format table; parameters missing from the
/// table resolve to `default` there. Some parameters never come from metadata
/// and some are always defaulted; wavelengths and voxel sizes are paired and
/// take the weaker level of the pair.
pub fn resolve_confidence_level(
    file_format: &str,
    name: ParamName,
    lookup: impl Fn(&str, ParamName) -> Option<ConfidenceLevel>,
) -> ConfidenceLevel {
    use ParamName::*;

    match name {
        ImageFileFormat
        | NumberOfChannels
        | PointSpreadFunction
        | MicroscopeType
        | CoverslipRelativePosition
        | PerformAberrationCorrection
        | AberrationCorrectionMode
        | AdvancedCorrectionOptions
        | HotPixelCorrection
        | Psf => return ConfidenceLevel::Provided,
        Binning
        | IsMultiChannel
        | ObjectiveMagnification
        | CMount
        | TubeFactor
        | AberrationCorrectionNecessary
        | CCDCaptorSize
        | PsfGenerationDepth => return ConfidenceLevel::Default,
        _ => {}
    }

    if file_format.is_empty() || file_format == ANY_FILE_FORMAT {
        return ConfidenceLevel::Default;
    }

    let raw = |name| lookup(file_format, name).unwrap_or_default();
    match name {
        ExcitationWavelength | EmissionWavelength => {
            raw(ExcitationWavelength).min(raw(EmissionWavelength))
        }
        CCDCaptorSizeX | ZStepSize => raw(CCDCaptorSizeX).min(raw(ZStepSize)),
        _ => raw(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn lsm_table(format: &str, name: ParamName) -> Option<ConfidenceLevel> {
        if format != "lsm" {
            return None;
        }
        match name {
            ParamName::ExcitationWavelength => Some(ConfidenceLevel::Verified),
            ParamName::EmissionWavelength => Some(ConfidenceLevel::Estimated),
            ParamName::CCDCaptorSizeX => Some(ConfidenceLevel::Reported),
            ParamName::ZStepSize => Some(ConfidenceLevel::AsIs),
            ParamName::NumericalAperture => Some(ConfidenceLevel::Reported),
            ParamName::MicroscopeType => Some(ConfidenceLevel::Verified),
            _ => None,
        }
    }

    // === Levels ===

    #[test]
    fn only_trusted_levels_are_optional() {
        assert!(ConfidenceLevel::Default.must_provide());
        assert!(ConfidenceLevel::Estimated.must_provide());
        assert!(ConfidenceLevel::Provided.must_provide());
        assert!(!ConfidenceLevel::Reported.must_provide());
        assert!(!ConfidenceLevel::Verified.must_provide());
        assert!(!ConfidenceLevel::AsIs.must_provide());
    }

    #[test]
    fn parses_camel_case() {
        assert_eq!(ConfidenceLevel::from_str("asIs").unwrap(), ConfidenceLevel::AsIs);
        assert_eq!(ConfidenceLevel::Reported.to_string(), "reported");
    }

    // === Policy ===

    #[test]
    fn forced_levels_ignore_the_table() {
        assert_eq!(
            resolve_confidence_level("lsm", ParamName::MicroscopeType, lsm_table),
            ConfidenceLevel::Provided
        );
        assert_eq!(
            resolve_confidence_level("lsm", ParamName::CMount, lsm_table),
            ConfidenceLevel::Default
        );
    }

    #[test]
    fn paired_parameters_take_the_weaker_level() {
        assert_eq!(
            resolve_confidence_level("lsm", ParamName::EmissionWavelength, lsm_table),
            ConfidenceLevel::Estimated
        );
        assert_eq!(
            resolve_confidence_level("lsm", ParamName::ExcitationWavelength, lsm_table),
            ConfidenceLevel::Estimated
        );
        assert_eq!(
            resolve_confidence_level("lsm", ParamName::ZStepSize, lsm_table),
            ConfidenceLevel::Reported
        );
    }

    #[test]
    fn unknown_format_and_any_format_default() {
        assert_eq!(
            resolve_confidence_level("dv", ParamName::NumericalAperture, lsm_table),
            ConfidenceLevel::Default
        );
        assert_eq!(
            resolve_confidence_level(ANY_FILE_FORMAT, ParamName::NumericalAperture, lsm_table),
            ConfidenceLevel::Default
        );
        assert_eq!(
            resolve_confidence_level("lsm", ParamName::NumericalAperture, lsm_table),
            ConfidenceLevel::Reported
        );
    }
}
