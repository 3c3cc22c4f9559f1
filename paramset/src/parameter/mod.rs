//! Named, typed, constrained parameter values.
//!
//! A [`Parameter`] owns its raw slots plus a copy of the constraint metadata
//! it was built from, so it can be checked and displayed without access to
//! the store. Behaviour is split per [`ParamKind`]; the handful of names with
//! their own rules are dispatched in [`Parameter::validate`].

use common::key_index_vec::KeyIndexKey;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::confidence::ConfidenceLevel;
use crate::config::Config;
use crate::error::{CheckResult, ErrorKind};
use crate::name::ParamName;
use crate::store::{NumericBounds, ParameterStore, PossibleValue};
use crate::value::{is_filled, RawValue, Slot};

mod array;
mod chromatic;
mod choice;
mod display;
mod numeric;

pub use choice::{
    licence_name, output_extension, ARRAY_DETECTOR_REDUCTION_MODES, REDUCTION_MODES,
};
pub use chromatic::is_reference_vector;
pub use display::formatted_name;

pub const TRUE: &str = "True";
pub const FALSE: &str = "False";

/// Storage layout and generic rules of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, Serialize, Deserialize)]
pub enum ParamKind {
    /// One value out of the possible values.
    Choice,
    /// Choice between `True` and `False`.
    Boolean,
    /// One optionally bounded number.
    Numeric,
    /// One bounded number per channel.
    Array,
    /// One value per channel, numeric or symbolic.
    AnyTypeArray,
    /// A fixed-size correction vector per channel.
    Chromatic { components: usize },
    /// Choice stored with a `single_` or `multi_` prefix.
    Prefixed { multi: bool },
}

impl ParamKind {
    pub fn of(name: ParamName, chromatic_components: usize) -> ParamKind {
        use ParamName::*;
        match name {
            IsMultiChannel | AberrationCorrectionNecessary | MultiChannelOutput => {
                ParamKind::Boolean
            }
            ImageFileFormat => ParamKind::Prefixed { multi: false },
            NumericalAperture | CMount | TubeFactor | CCDCaptorSize | CCDCaptorSizeX
            | CCDCaptorSizeY | ZStepSize | TimeInterval | PinholeSpacing | NumberOfIterations
            | QualityChangeStoppingCriterion | PsfGenerationDepth => ParamKind::Numeric,
            ExcitationWavelength | EmissionWavelength | PinholeSize | StedSaturationFactor
            | StedWavelength | StedImmunity | Sted3D | SpimGaussWidth | SpimFocusOffset
            | SpimCenterOffset | SpimNa | SpimFill | Acuity | SignalNoiseRatio | ColocChannel => {
                ParamKind::Array
            }
            Psf | StedDepletionMode | SpimExcMode | SpimDir | BackgroundOffsetPercent
            | DeconvolutionAlgorithm | HotPixelCorrection | ColocCoefficient | ColocThreshold => {
                ParamKind::AnyTypeArray
            }
            ChromaticAberration => ParamKind::Chromatic {
                components: chromatic_components,
            },
            _ => ParamKind::Choice,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            ParamKind::Array | ParamKind::AnyTypeArray | ParamKind::Chromatic { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    name: ParamName,
    kind: ParamKind,
    slots: Vec<Slot>,
    possible_values: Vec<PossibleValue>,
    bounds: NumericBounds,
    default: Option<String>,
    confidence_level: ConfidenceLevel,
    number_of_channels: usize,
    max_channels: usize,
    message: String,
    last_error: Option<ErrorKind>,
}

impl KeyIndexKey<ParamName> for Parameter {
    fn key(&self) -> &ParamName {
        &self.name
    }
}

impl Parameter {
    /// Builds a parameter with the constraints of `store`, reset to its
    /// default.
    pub fn new(name: ParamName, store: &dyn ParameterStore, config: &Config) -> Self {
        let max_channels = config.channel_limit(store);
        let kind = ParamKind::of(name, config.chromatic_component_count);

        let mut possible_values = store.possible_values(name).to_vec();
        if kind == ParamKind::Boolean && possible_values.is_empty() {
            possible_values = vec![PossibleValue::new(TRUE), PossibleValue::new(FALSE)];
        }
        let default = store
            .default_value(name)
            .map(str::to_string)
            .or_else(|| (kind == ParamKind::Boolean).then(|| FALSE.to_string()));

        let mut parameter = Self {
            name,
            kind,
            slots: Vec::new(),
            possible_values,
            bounds: store.numeric_bounds(name),
            default,
            confidence_level: ConfidenceLevel::Default,
            number_of_channels: 1,
            max_channels,
            message: String::new(),
            last_error: None,
        };
        parameter.reset();
        parameter
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    pub fn name(&self) -> ParamName {
        self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn possible_values(&self) -> &[PossibleValue] {
        &self.possible_values
    }

    pub fn is_possible_value(&self, value: &str) -> bool {
        self.possible_values.iter().any(|possible| possible.value == value)
    }

    pub fn bounds(&self) -> NumericBounds {
        self.bounds
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.confidence_level
    }

    pub fn set_confidence_level(&mut self, level: ConfidenceLevel) {
        self.confidence_level = level;
    }

    pub fn must_provide(&self) -> bool {
        self.confidence_level.must_provide()
    }

    /// Message of the last failed [`check`](Self::check).
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn number_of_channels(&self) -> usize {
        self.number_of_channels
    }

    pub fn max_channels(&self) -> usize {
        self.max_channels
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// The scalar value, or the first slot of an array.
    pub fn value(&self) -> Option<&str> {
        self.slots.first().and_then(|slot| slot.as_deref())
    }

    pub fn value_or_empty(&self) -> &str {
        self.value().unwrap_or("")
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }

    /// Slots of the active channels.
    pub fn active_slots(&self) -> &[Slot] {
        let active = match self.kind {
            ParamKind::Array | ParamKind::AnyTypeArray => self.number_of_channels,
            _ => self.slots.len(),
        };
        &self.slots[..active.min(self.slots.len())]
    }

    /// Overwrites one slot; out of range indices are ignored.
    pub fn set_slot(&mut self, index: usize, value: Slot) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = value;
        }
    }

    pub fn set_value(&mut self, raw: impl Into<RawValue>) {
        let raw = raw.into();
        match self.kind {
            ParamKind::Choice | ParamKind::Boolean | ParamKind::Numeric => {
                self.slots = vec![raw.first()];
            }
            ParamKind::Prefixed { .. } => {
                let value = raw.first();
                self.set_prefixed(value);
            }
            ParamKind::Array | ParamKind::AnyTypeArray => {
                let count = self.slot_count();
                self.slots = match (self.name, raw) {
                    (ParamName::DeconvolutionAlgorithm, RawValue::Scalar(value)) => {
                        vec![Some(value); count]
                    }
                    (_, raw) => array::padded(raw.into_slots(), count),
                };
            }
            ParamKind::Chromatic { .. } => chromatic::distribute(&mut self.slots, raw),
        }
    }

    /// Value in its persisted form.
    pub fn internal_value(&self) -> RawValue {
        match self.kind {
            ParamKind::Choice | ParamKind::Boolean | ParamKind::Numeric => {
                RawValue::from(self.value().map(str::to_string))
            }
            ParamKind::Prefixed { multi } => match self.value() {
                Some(value) => RawValue::Scalar(choice::prefixed(multi, value)),
                None => RawValue::Null,
            },
            ParamKind::Array | ParamKind::AnyTypeArray => RawValue::List(self.slots.clone()),
            ParamKind::Chromatic { components } => RawValue::Scalar(chromatic::serialize(
                &self.slots,
                components,
                self.number_of_channels,
            )),
        }
    }

    pub fn set_internal_value(&mut self, raw: impl Into<RawValue>) {
        self.set_value(raw);
    }

    /// Back to the default value, or all slots unset.
    pub fn reset(&mut self) {
        let count = self.slot_count();
        self.slots = vec![None; count];
        if let ParamKind::Prefixed { .. } = self.kind {
            self.kind = ParamKind::Prefixed { multi: false };
        }
        if !self.kind.is_array() {
            self.slots[0] = self.default.clone();
        }
        self.message.clear();
        self.last_error = None;
    }

    /// At least one slot holds a value. `"0"` counts as a value.
    pub fn is_set(&self) -> bool {
        self.slots.iter().any(is_filled)
    }

    pub fn not_set(&self) -> bool {
        !self.is_set()
    }

    /// Clamps `count` to `1..=max_channels`; per-channel slots past it are
    /// cleared.
    pub fn set_number_of_channels(&mut self, count: usize) {
        self.number_of_channels = count.clamp(1, self.max_channels);
        let clears_tail = matches!(self.kind, ParamKind::Array | ParamKind::AnyTypeArray)
            && self.name != ParamName::ColocCoefficient;
        if clears_tail {
            for slot in self.slots.iter_mut().skip(self.number_of_channels) {
                *slot = None;
            }
        }
    }

    /// Engine-side name of the current value, falling back to the value.
    pub fn translated_value(&self) -> Option<&str> {
        let value = self.value()?;
        Some(self.translation_of(value).unwrap_or(value))
    }

    pub fn translation_of(&self, value: &str) -> Option<&str> {
        self.possible_values
            .iter()
            .find(|possible| possible.value == value)
            .and_then(|possible| possible.translation.as_deref())
    }

    /// First possible value whose translation is `translated`.
    pub fn value_for_translation(&self, translated: &str) -> Option<&str> {
        self.possible_values
            .iter()
            .filter(|possible| !(self.name == ParamName::MicroscopeType && possible.value == "two photon"))
            .find(|possible| possible.translation.as_deref() == Some(translated))
            .map(|possible| possible.value.as_str())
    }

    // ========================================================================
    // Checking
    // ========================================================================

    /// Runs the checks and records the failure message.
    pub fn check(&mut self) -> bool {
        match self.validate() {
            Ok(()) => {
                self.message.clear();
                self.last_error = None;
                true
            }
            Err(failure) => {
                self.message = failure.message;
                self.last_error = Some(failure.kind);
                false
            }
        }
    }

    /// Same as [`check`](Self::check) without touching the parameter.
    pub fn validate(&self) -> CheckResult {
        use ParamName::*;

        match self.name {
            ObjectiveType => choice::check_refractive_index(
                self,
                "The refractive index of the lens embedding medium must be a number!",
            ),
            SampleMedium => choice::check_refractive_index(
                self,
                "The refractive index of the sample medium must be a number!",
            ),
            ZStepSize | TimeInterval => numeric::check_zero_or_scalar(self),
            Psf => array::check_selected(self, "Please select a PSF file for channel"),
            HotPixelCorrection => {
                array::check_selected(self, "Please select a Hot Pixel mask file for channel")
            }
            SpimDir => {
                array::check_selected(self, "Please select an illumination direction for channel")
            }
            StedDepletionMode => {
                array::check_selected(self, "Please select a depletion mode for channel")
            }
            SpimExcMode => {
                array::check_selected(self, "Please select an excitation mode for channel")
            }
            DeconvolutionAlgorithm => {
                array::check_selected(self, "Please select a deconvolution algorithm for channel")
            }
            BackgroundOffsetPercent => array::check_with_sentinels(self, &["auto", "object"]),
            ColocThreshold => array::check_with_sentinels(self, &["auto"]),
            ColocChannel => array::check_channel_selection(self),
            ColocCoefficient => array::check_members(self),
            _ => match self.kind {
                ParamKind::Choice | ParamKind::Boolean | ParamKind::Prefixed { .. } => {
                    choice::check_member(self)
                }
                ParamKind::Numeric => numeric::check_scalar(self),
                ParamKind::Array | ParamKind::AnyTypeArray => numeric::check_array(self),
                ParamKind::Chromatic { .. } => Ok(()),
            },
        }
    }

    // ========================================================================
    // Kind specific
    // ========================================================================

    /// `multi` flag of a prefixed choice.
    pub fn is_multi(&self) -> bool {
        matches!(self.kind, ParamKind::Prefixed { multi: true })
    }

    pub fn set_multi(&mut self, multi: bool) {
        if let ParamKind::Prefixed { .. } = self.kind {
            self.kind = ParamKind::Prefixed { multi };
        }
    }

    /// Components of one channel of a correction vector.
    pub fn channel_value(&self, channel: usize) -> &[Slot] {
        match self.kind {
            ParamKind::Chromatic { components } => {
                chromatic::channel(&self.slots, components, channel)
            }
            _ => &[],
        }
    }

    /// Overwrites the components of one channel of a correction vector.
    pub fn set_channel_value(&mut self, channel: usize, values: Vec<Slot>) {
        if let ParamKind::Chromatic { components } = self.kind {
            chromatic::set_channel(&mut self.slots, components, channel, values);
        }
    }

    /// Channels whose correction vector has a positive component.
    pub fn channels_to_correct(&self, number_of_channels: usize) -> Vec<usize> {
        match self.kind {
            ParamKind::Chromatic { components } => {
                chromatic::channels_to_correct(&self.slots, components, number_of_channels)
            }
            _ => Vec::new(),
        }
    }

    fn slot_count(&self) -> usize {
        match self.kind {
            ParamKind::Choice | ParamKind::Boolean | ParamKind::Numeric | ParamKind::Prefixed { .. } => 1,
            ParamKind::AnyTypeArray if self.name == ParamName::ColocCoefficient => {
                self.possible_values.len().max(1)
            }
            ParamKind::Array | ParamKind::AnyTypeArray => self.max_channels,
            ParamKind::Chromatic { components } => self.max_channels * components,
        }
    }

    fn set_prefixed(&mut self, value: Slot) {
        let Some(value) = value else {
            self.slots = vec![None];
            return;
        };
        let (multi, plain) = choice::split_prefixed(&value);
        if let Some(multi) = multi {
            self.set_multi(multi);
        }
        self.slots = vec![Some(plain.to_string())];
    }
}
