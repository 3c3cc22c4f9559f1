use tracing::{debug, warn};

use crate::name::ParamName;
use crate::parameter::Parameter;
use crate::setting::{MicroscopeSetting, SINGLE_POINT_CONFOCAL, TWO_PHOTON, WIDEFIELD};
use crate::translate::{EngineRecord, ParState};
use crate::value::{float_value, format_number, is_filled, parse_number, Slot};

const OFF_CONFOCAL: &str = "off-confocal";
const ENGINE_CONFOCAL: &str = "confocal";
const ENGINE_STED: &str = "sted";
const ENGINE_STED_3D: &str = "sted3d";
/// Depletion mode written for STED channels that image confocally.
const OFF_CONFOCAL_DEPLETION: &str = "vortexPulsed";
const TWO_PHOTON_COUNT: &str = "2";

#[derive(Clone, Copy, Debug)]
enum Coercion {
    Integer,
    Float,
    /// Engine names of possible values.
    Choice,
}

/// Components of `s`: x, y, z in µm and t in s.
const SAMPLING: [ParamName; 4] = [
    ParamName::CCDCaptorSizeX,
    ParamName::CCDCaptorSizeY,
    ParamName::ZStepSize,
    ParamName::TimeInterval,
];

/// Per-channel engine keys, in the order they are read.
const CHANNEL_FIELDS: &[(&str, ParamName, Coercion)] = &[
    ("ex", ParamName::ExcitationWavelength, Coercion::Integer),
    ("em", ParamName::EmissionWavelength, Coercion::Integer),
    ("pr", ParamName::PinholeSize, Coercion::Integer),
    ("stedSatFact", ParamName::StedSaturationFactor, Coercion::Float),
    ("stedLambda", ParamName::StedWavelength, Coercion::Float),
    ("stedImmunity", ParamName::StedImmunity, Coercion::Float),
    ("sted3D", ParamName::Sted3D, Coercion::Float),
    ("spimExc", ParamName::SpimExcMode, Coercion::Choice),
    ("spimGaussWidth", ParamName::SpimGaussWidth, Coercion::Float),
    ("spimCenterOff", ParamName::SpimCenterOffset, Coercion::Float),
    ("spimFocusOff", ParamName::SpimFocusOffset, Coercion::Float),
    ("spimNA", ParamName::SpimNa, Coercion::Float),
    ("spimFill", ParamName::SpimFill, Coercion::Float),
    ("spimDir", ParamName::SpimDir, Coercion::Choice),
];

fn coerce(parameter: &Parameter, key: &str, token: &str, coercion: Coercion) -> Slot {
    if let Coercion::Choice = coercion {
        let value = parameter.value_for_translation(token).unwrap_or(token);
        return Some(value.to_string());
    }

    let Some(number) = parse_number(token) else {
        warn!(key, token, "engine value is not a number");
        return None;
    };
    match coercion {
        Coercion::Integer => Some((number.trunc() as i64).to_string()),
        _ => Some(format_number(number)),
    }
}

/// A preset whose refractive index matches, or the index itself.
fn refractive_index(parameter: &Parameter, key: &str, token: &str) -> Slot {
    let Some(index) = parse_number(token) else {
        warn!(key, token, "refractive index is not a number");
        return None;
    };
    let preset = parameter.possible_values().iter().find(|possible| {
        possible
            .translation
            .as_deref()
            .and_then(parse_number)
            .is_some_and(|translated| translated == index)
    });
    match preset {
        Some(possible) => Some(possible.value.clone()),
        None => Some(format_number(index)),
    }
}

fn put(record: &mut EngineRecord, key: &str, value: Option<String>) {
    match value {
        Some(value) => {
            record.insert(key, value);
            record.set_par_state(key, ParState::NoMetaData);
        }
        None => record.set_par_state(key, ParState::Default),
    }
}

impl MicroscopeSetting {
    /// Applies an acquisition record read from image metadata or a template.
    ///
    /// Fields whose `parState` holds `default` keep their current value.
    pub fn apply_engine_record(&mut self, record: &EngineRecord) {
        use ParamName::*;

        let types: Vec<String> = record
            .list("micr")
            .into_iter()
            .map(str::to_string)
            .collect();
        let count = match types.first() {
            Some(first) if record.applies("micr") => {
                match self.microscope_type_for(record, first) {
                    Some(value) => self.set_value(MicroscopeType, value),
                    None => warn!(micr = %first, "unknown engine microscope type"),
                }
                types.len()
            }
            _ => 1,
        };
        self.set_channel_count(count);
        let count = self.number_of_channels();

        if record.contains("s") {
            let sizes = record.list("s");
            for (idx, name) in SAMPLING.into_iter().enumerate() {
                if record.is_default_at("s", idx) {
                    continue;
                }
                let Some(token) = sizes.get(idx) else {
                    continue;
                };
                match parse_number(token) {
                    Some(size) if name == TimeInterval => self.set_value(name, format_number(size)),
                    Some(size) => self.set_value(name, format_number((size * 1000.0).round())),
                    None => warn!(key = "s", token = *token, "sample size is not a number"),
                }
            }
        }

        for (key, name, coercion) in [
            ("na", NumericalAperture, Coercion::Float),
            ("ps", PinholeSpacing, Coercion::Float),
        ] {
            if !record.applies(key) {
                continue;
            }
            let value = match (record.first(key), self.parameter(name)) {
                (Some(token), Some(parameter)) => coerce(parameter, key, token, coercion),
                _ => continue,
            };
            self.set_value(name, value);
        }
        for (key, name) in [("ril", ObjectiveType), ("ri", SampleMedium)] {
            if !record.applies(key) {
                continue;
            }
            let value = match (record.first(key), self.parameter(name)) {
                (Some(token), Some(parameter)) => refractive_index(parameter, key, token),
                _ => continue,
            };
            self.set_value(name, value);
        }

        for &(key, name, coercion) in CHANNEL_FIELDS {
            if !record.applies(key) {
                continue;
            }
            let Some(parameter) = self.parameter(name) else {
                continue;
            };
            let values: Vec<Slot> = record
                .list(key)
                .into_iter()
                .take(count)
                .map(|token| coerce(parameter, key, token, coercion))
                .collect();
            self.set_value(name, values);
        }

        if record.applies("stedMode") {
            let modes: Vec<Slot> = record
                .list("stedMode")
                .into_iter()
                .take(count)
                .enumerate()
                .map(|(channel, mode)| match types.get(channel) {
                    Some(micr) if micr == ENGINE_CONFOCAL => Some(OFF_CONFOCAL.to_string()),
                    _ => Some(mode.to_string()),
                })
                .collect();
            self.set_value(StedDepletionMode, modes);
        }

        if record.applies("imagingDir") {
            let position = match record.first("imagingDir") {
                Some("downward") => "farthest",
                _ => "closest",
            };
            self.set_value(CoverslipRelativePosition, position);
        }

        debug!(channels = count, microscope = self.microscope_type(), "applied engine record");
    }

    /// Possible value for the first `micr` entry. A generic STED entry is
    /// refined by `sted3D`; a two photon count turns widefield and confocal
    /// into two photon.
    fn microscope_type_for(&self, record: &EngineRecord, first: &str) -> Option<String> {
        let parameter = self.parameter(ParamName::MicroscopeType)?;

        let engine_type = if first.contains(ENGINE_STED) {
            let depth = record
                .first("sted3D")
                .and_then(parse_number)
                .filter(|_| !record.is_default("sted3D"))
                .unwrap_or(0.0);
            if depth != 0.0 {
                ENGINE_STED_3D
            } else {
                ENGINE_STED
            }
        } else {
            first
        };

        let value = parameter.value_for_translation(engine_type)?;
        let two_photon = record.first("pcnt") == Some(TWO_PHOTON_COUNT);
        if two_photon && (value == WIDEFIELD || value == SINGLE_POINT_CONFOCAL) {
            return Some(TWO_PHOTON.to_string());
        }
        Some(value.to_string())
    }

    /// `s` with one `parState` per component. Unset components are written
    /// as placeholders marked `default`: Y repeats X, the others are `0`.
    fn put_sampling(&self, record: &mut EngineRecord) {
        use ParamName::*;

        let is_set = |name| self.parameter(name).is_some_and(Parameter::is_set);
        let set: Vec<bool> = SAMPLING.into_iter().map(is_set).collect();
        if !set.contains(&true) {
            put(record, "s", None);
            return;
        }

        let y = if set[1] {
            float_value(self.value(CCDCaptorSizeY)) / 1000.0
        } else {
            self.sample_size_x()
        };
        let sizes = [self.sample_size_x(), y, self.sample_size_z(), self.sample_size_t()];
        let sizes: Vec<String> = sizes.into_iter().map(format_number).collect();
        let states: Vec<ParState> = set
            .iter()
            .map(|&set| if set { ParState::NoMetaData } else { ParState::Default })
            .collect();
        record.insert("s", sizes.join(" "));
        record.set_par_states("s", &states);
    }

    /// The acquisition record the engine reads for this setting.
    pub fn to_engine_record(&self) -> EngineRecord {
        use ParamName::*;

        let mut record = EngineRecord::new();
        let channels = self.number_of_channels();
        let sted = self.is_sted() || self.is_sted_3d();
        let depletion = self.slots(StedDepletionMode);
        let off_confocal =
            |channel: usize| sted && depletion.get(channel).and_then(|mode| mode.as_deref()) == Some(OFF_CONFOCAL);

        let micr = self
            .parameter(MicroscopeType)
            .and_then(Parameter::translated_value)
            .map(|engine_type| {
                let engine_type = if sted { ENGINE_STED } else { engine_type };
                (0..channels)
                    .map(|channel| {
                        if off_confocal(channel) {
                            ENGINE_CONFOCAL
                        } else {
                            engine_type
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            });
        put(&mut record, "micr", micr);

        let photons = if self.is_two_photon() { TWO_PHOTON_COUNT } else { "1" };
        put(&mut record, "pcnt", Some(vec![photons; channels].join(" ")));

        self.put_sampling(&mut record);

        for (key, name) in [
            ("na", NumericalAperture),
            ("ps", PinholeSpacing),
            ("ril", ObjectiveType),
            ("ri", SampleMedium),
        ] {
            let value = self
                .parameter(name)
                .and_then(Parameter::translated_value)
                .map(str::to_string);
            put(&mut record, key, value);
        }

        for &(key, name, coercion) in CHANNEL_FIELDS {
            let Some(parameter) = self.parameter(name) else {
                continue;
            };
            let active = &parameter.slots()[..channels.min(parameter.slots().len())];
            let value = active.iter().all(is_filled).then(|| {
                active
                    .iter()
                    .flatten()
                    .map(|value| match coercion {
                        Coercion::Choice => parameter.translation_of(value).unwrap_or(value),
                        _ => value.as_str(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            });
            put(&mut record, key, value.filter(|value| !value.is_empty()));
        }

        let modes = (depletion.len() >= channels && depletion[..channels].iter().all(is_filled))
            .then(|| {
                depletion[..channels]
                    .iter()
                    .flatten()
                    .map(|mode| {
                        if mode == OFF_CONFOCAL {
                            OFF_CONFOCAL_DEPLETION
                        } else {
                            mode.as_str()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            });
        put(&mut record, "stedMode", modes);

        let direction = match self.value(CoverslipRelativePosition) {
            "farthest" => Some("downward".to_string()),
            "closest" => Some("upward".to_string()),
            _ => None,
        };
        put(&mut record, "imagingDir", direction);

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::setting::{ARRAY_DETECTOR_CONFOCAL, SPIM, STED, STED_3D};
    use crate::store::SchemaTable;

    fn microscope() -> MicroscopeSetting {
        let schema = SchemaTable::embedded().unwrap();
        MicroscopeSetting::new(&schema, &Config::default())
    }

    fn record(fields: &[(&str, &str)]) -> EngineRecord {
        fields.iter().copied().collect()
    }

    // === Microscope type ===

    #[test]
    fn channel_count_follows_micr() {
        let mut setting = microscope();
        setting.apply_engine_record(&record(&[("micr", "confocal confocal confocal")]));
        assert_eq!(setting.number_of_channels(), 3);
        assert_eq!(setting.value(ParamName::NumberOfChannels), "3");
        assert_eq!(setting.microscope_type(), SINGLE_POINT_CONFOCAL);

        let mut setting = microscope();
        let many = vec!["widefield"; 9].join(" ");
        setting.apply_engine_record(&record(&[("micr", many.as_str())]));
        assert_eq!(setting.number_of_channels(), setting.max_channels());
    }

    #[test]
    fn default_micr_keeps_the_type() {
        let mut setting = microscope();
        setting.set_value(ParamName::MicroscopeType, SPIM);
        setting.apply_engine_record(&record(&[
            ("micr", "confocal confocal"),
            ("parState,micr", "default"),
        ]));
        assert_eq!(setting.microscope_type(), SPIM);
        assert_eq!(setting.number_of_channels(), 1);
    }

    #[test]
    fn sted_depth_refines_the_type() {
        let mut setting = microscope();
        setting.apply_engine_record(&record(&[("micr", "sted"), ("sted3D", "0")]));
        assert_eq!(setting.microscope_type(), STED);

        setting.apply_engine_record(&record(&[("micr", "sted"), ("sted3D", "40")]));
        assert_eq!(setting.microscope_type(), STED_3D);

        setting.apply_engine_record(&record(&[
            ("micr", "sted"),
            ("sted3D", "40"),
            ("parState,sted3D", "default"),
        ]));
        assert_eq!(setting.microscope_type(), STED);
    }

    #[test]
    fn photon_count_marks_two_photon() {
        let mut setting = microscope();
        setting.apply_engine_record(&record(&[("micr", "widefield")]));
        assert_eq!(setting.microscope_type(), WIDEFIELD);

        setting.apply_engine_record(&record(&[("micr", "confocal"), ("pcnt", "2")]));
        assert_eq!(setting.microscope_type(), TWO_PHOTON);
    }

    // === Fields ===

    #[test]
    fn sample_sizes_are_converted_to_nm() {
        let mut setting = microscope();
        setting.apply_engine_record(&record(&[("s", "0.065 0.065 0.2 1.5")]));
        assert_eq!(setting.value(ParamName::CCDCaptorSizeX), "65");
        assert_eq!(setting.value(ParamName::ZStepSize), "200");
        assert_eq!(setting.value(ParamName::TimeInterval), "1.5");
    }

    #[test]
    fn per_channel_values_are_coerced() {
        let mut setting = microscope();
        setting.apply_engine_record(&record(&[
            ("micr", "confocal confocal"),
            ("ex", "488.7 561"),
            ("em", "520 abc"),
            ("ril", "1.515"),
            ("ri", "1.41"),
            ("imagingDir", "downward"),
        ]));
        assert_eq!(
            setting.slots(ParamName::ExcitationWavelength)[..2],
            [Some("488".to_string()), Some("561".to_string())]
        );
        assert_eq!(setting.slots(ParamName::EmissionWavelength)[1], None);
        assert_eq!(setting.value(ParamName::ObjectiveType), "oil");
        assert_eq!(setting.value(ParamName::SampleMedium), "1.41");
        assert_eq!(setting.value(ParamName::CoverslipRelativePosition), "farthest");
    }

    #[test]
    fn confocal_sted_channels_are_off_confocal() {
        let mut setting = microscope();
        setting.apply_engine_record(&record(&[
            ("micr", "sted confocal"),
            ("stedMode", "vortexPulsed vortexPulsed"),
        ]));
        assert_eq!(
            setting.slots(ParamName::StedDepletionMode)[..2],
            [Some("vortexPulsed".to_string()), Some(OFF_CONFOCAL.to_string())]
        );

        let written = setting.to_engine_record();
        assert_eq!(written.get("micr"), Some("sted confocal"));
        assert_eq!(written.get("stedMode"), Some("vortexPulsed vortexPulsed"));
    }

    #[test]
    fn unset_fields_are_written_as_default() {
        let mut setting = microscope();
        setting.set_value(ParamName::MicroscopeType, ARRAY_DETECTOR_CONFOCAL);
        setting.set_value(ParamName::NumericalAperture, "1.4");

        let written = setting.to_engine_record();
        assert_eq!(written.get("micr"), Some("arrDetConf"));
        assert_eq!(written.get("parState,micr"), Some("noMetaData"));
        assert_eq!(written.get("na"), Some("1.4"));
        assert!(written.is_default("ex"));
        assert!(written.is_default("imagingDir"));
        assert!(!written.contains("s"));
    }
}
