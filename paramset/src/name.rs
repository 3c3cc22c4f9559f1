use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Configuration domain a parameter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Domain {
    Microscope,
    Task,
    Analysis,
}

/// Every parameter name known to the schema.
///
/// The string form is the camel-case name used in posted forms, persisted
/// records and the schema file.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum ParamName {
    // ========================================================================
    // Microscope
    // ========================================================================
    IsMultiChannel,
    ImageFileFormat,
    NumberOfChannels,
    MicroscopeType,
    NumericalAperture,
    ObjectiveMagnification,
    ObjectiveType,
    SampleMedium,
    Binning,
    ExcitationWavelength,
    EmissionWavelength,
    CMount,
    TubeFactor,
    CCDCaptorSize,
    CCDCaptorSizeX,
    CCDCaptorSizeY,
    ZStepSize,
    TimeInterval,
    PinholeSize,
    PinholeSpacing,
    PointSpreadFunction,
    #[serde(rename = "PSF")]
    #[strum(serialize = "PSF")]
    Psf,
    CoverslipRelativePosition,
    AberrationCorrectionNecessary,
    AberrationCorrectionMode,
    AdvancedCorrectionOptions,
    PerformAberrationCorrection,
    StedDepletionMode,
    StedSaturationFactor,
    StedWavelength,
    StedImmunity,
    Sted3D,
    SpimExcMode,
    SpimGaussWidth,
    SpimFocusOffset,
    SpimCenterOffset,
    #[serde(rename = "SpimNA")]
    #[strum(serialize = "SpimNA")]
    SpimNa,
    SpimFill,
    SpimDir,

    // ========================================================================
    // Task
    // ========================================================================
    Acuity,
    AcuityMode,
    Autocrop,
    SignalNoiseRatio,
    BackgroundOffsetPercent,
    NumberOfIterations,
    OutputFileFormat,
    MultiChannelOutput,
    QualityChangeStoppingCriterion,
    DeconvolutionAlgorithm,
    ArrayDetectorReductionMode,
    ZStabilization,
    ChromaticAberration,
    TStabilization,
    TStabilizationMethod,
    TStabilizationRotation,
    TStabilizationCropping,
    HotPixelCorrection,
    BleachingMode,
    #[serde(rename = "PSFGenerationDepth")]
    #[strum(serialize = "PSFGenerationDepth")]
    PsfGenerationDepth,

    // ========================================================================
    // Analysis
    // ========================================================================
    ColocAnalysis,
    ColocChannel,
    ColocCoefficient,
    ColocThreshold,
    ColocMap,
}

impl ParamName {
    pub fn domain(self) -> Domain {
        use ParamName::*;
        match self {
            Acuity
            | AcuityMode
            | Autocrop
            | SignalNoiseRatio
            | BackgroundOffsetPercent
            | NumberOfIterations
            | OutputFileFormat
            | MultiChannelOutput
            | QualityChangeStoppingCriterion
            | DeconvolutionAlgorithm
            | ArrayDetectorReductionMode
            | ZStabilization
            | ChromaticAberration
            | TStabilization
            | TStabilizationMethod
            | TStabilizationRotation
            | TStabilizationCropping
            | HotPixelCorrection
            | BleachingMode
            | PsfGenerationDepth => Domain::Task,
            ColocAnalysis | ColocChannel | ColocCoefficient | ColocThreshold | ColocMap => {
                Domain::Analysis
            }
            _ => Domain::Microscope,
        }
    }

    pub fn is_sted(self) -> bool {
        matches!(
            self,
            ParamName::StedDepletionMode
                | ParamName::StedSaturationFactor
                | ParamName::StedWavelength
                | ParamName::StedImmunity
                | ParamName::Sted3D
        )
    }

    pub fn is_spim(self) -> bool {
        matches!(
            self,
            ParamName::SpimExcMode
                | ParamName::SpimGaussWidth
                | ParamName::SpimFocusOffset
                | ParamName::SpimCenterOffset
                | ParamName::SpimNa
                | ParamName::SpimFill
                | ParamName::SpimDir
        )
    }

    pub fn is_aberration_correction(self) -> bool {
        matches!(
            self,
            ParamName::CoverslipRelativePosition
                | ParamName::AberrationCorrectionNecessary
                | ParamName::AberrationCorrectionMode
                | ParamName::AdvancedCorrectionOptions
                | ParamName::PerformAberrationCorrection
        )
    }

    pub fn is_for_pixel_size_calculation(self) -> bool {
        matches!(
            self,
            ParamName::CCDCaptorSize
                | ParamName::Binning
                | ParamName::CMount
                | ParamName::TubeFactor
                | ParamName::ObjectiveMagnification
        )
    }

    pub fn is_t_stabilization(self) -> bool {
        matches!(
            self,
            ParamName::TStabilization
                | ParamName::TStabilizationMethod
                | ParamName::TStabilizationRotation
                | ParamName::TStabilizationCropping
        )
    }
}
