use tracing::{debug, warn};

use crate::name::ParamName;
use crate::parameter::ParamKind;
use crate::setting::TaskSetting;
use crate::translate::EngineRecord;
use crate::value::{is_filled, parse_number, slot_str, Slot};

const ALGORITHMS: [&str; 3] = ["cmle", "qmle", "gmle"];
const DEFAULT_ALGORITHM: &str = "cmle";
const SKIP: &str = "skip";
const SKIP_TASK: &str = "deconSkip";
const BACKGROUND_SENTINELS: [&str; 2] = ["auto", "object"];

/// Engine task name of an algorithm.
fn task_name(algorithm: &str) -> &str {
    if algorithm == SKIP {
        SKIP_TASK
    } else {
        algorithm
    }
}

/// A task is present as a bare `<task>:<ch>` key or through its fields.
fn has_task(record: &EngineRecord, task: &str, channel: usize) -> bool {
    let key = format!("{task}:{channel}");
    let field_prefix = format!("{key} ");
    record.contains(&key) || record.iter().any(|(name, _)| name.starts_with(&field_prefix))
}

fn channel_algorithm(record: &EngineRecord, channel: usize) -> &'static str {
    ALGORITHMS
        .into_iter()
        .find(|algorithm| has_task(record, algorithm, channel))
        .or_else(|| has_task(record, SKIP_TASK, channel).then_some(SKIP))
        .unwrap_or(DEFAULT_ALGORITHM)
}

/// `<algorithm>:<ch> <field>`. Skipped channels carry no fields.
fn task_field<'r>(
    record: &'r EngineRecord,
    algorithm: &str,
    channel: usize,
    field: &str,
) -> Option<&'r str> {
    if algorithm == SKIP {
        return None;
    }
    record.get(&format!("{algorithm}:{channel} {field}"))
}

/// The same field from whichever algorithm family carries it.
fn any_task_field<'r>(record: &'r EngineRecord, channel: usize, field: &str) -> Option<&'r str> {
    ALGORITHMS
        .into_iter()
        .find_map(|algorithm| task_field(record, algorithm, channel, field))
}

fn slot_at(slots: &[Slot], channel: usize) -> &str {
    slots.get(channel).map(slot_str).unwrap_or("")
}

fn number(key: &str, token: &str) -> Option<f64> {
    let value = parse_number(token);
    if value.is_none() {
        warn!(key, token, "engine value is not a number");
    }
    value
}

impl TaskSetting {
    /// Applies a restoration record. Per-channel fields are read from the
    /// family of the algorithm chosen for that channel.
    pub fn apply_engine_record(&mut self, record: &EngineRecord) {
        use ParamName::*;

        let channels = self.max_channels();
        let algorithms: Vec<&str> = (0..channels)
            .map(|channel| channel_algorithm(record, channel))
            .collect();
        let field = |channel: usize, name: &str| task_field(record, algorithms[channel], channel, name);

        let snr: Vec<Slot> = (0..channels)
            .map(|channel| {
                field(channel, "snr")
                    .or_else(|| field(channel, "sn"))
                    .map(str::to_string)
            })
            .collect();
        let acuity: Vec<Slot> = (0..channels)
            .map(|channel| field(channel, "acuity").map(str::to_string))
            .collect();

        let mut acuity_on = false;
        for channel in 0..channels {
            match field(channel, "acuityMode") {
                Some("on") => acuity_on = true,
                None | Some("off") | Some("auto") => {}
                Some(mode) => warn!(channel, mode, "unknown acuity mode"),
            }
        }

        let iterations = (0..channels)
            .filter_map(|channel| field(channel, "it"))
            .filter_map(|token| number("it", token).map(|value| (value, token)))
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, token)| token.to_string());
        let quality = (0..channels)
            .filter_map(|channel| field(channel, "q"))
            .filter_map(|token| number("q", token).map(|value| (value, token)))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, token)| token.to_string());
        let reduction = (0..channels)
            .filter(|&channel| algorithms[channel] == DEFAULT_ALGORITHM)
            .find_map(|channel| field(channel, "reduceMode"))
            .map(str::to_string);

        let algorithm_slots: Vec<Slot> = algorithms
            .iter()
            .map(|algorithm| Some(algorithm.to_string()))
            .collect();
        self.set_value(DeconvolutionAlgorithm, algorithm_slots);
        if snr.iter().any(Option::is_some) {
            self.set_value(SignalNoiseRatio, snr);
        }
        if acuity.iter().any(Option::is_some) {
            self.set_value(Acuity, acuity);
        }
        self.set_value(AcuityMode, if acuity_on { "on" } else { "off" });
        if let Some(iterations) = iterations {
            self.set_value(NumberOfIterations, iterations);
        }
        if let Some(quality) = quality {
            self.set_value(QualityChangeStoppingCriterion, quality);
        }
        if let Some(reduction) = reduction {
            self.set_value(ArrayDetectorReductionMode, reduction);
        }
        if let Some(background) = background_from(record, channels) {
            self.set_value(BackgroundOffsetPercent, background);
        }
        if let Some(vectors) = self.shift_vectors(record) {
            self.set_value(ChromaticAberration, vectors);
        }

        for (key, name) in [
            ("autocrop enabled", Autocrop),
            ("stabilize enabled", ZStabilization),
            ("stabilize:post enabled", TStabilization),
            ("stabilize:post mode", TStabilizationMethod),
            ("stabilize:post rot", TStabilizationRotation),
            ("stabilize:post crop", TStabilizationCropping),
        ] {
            if let Some(value) = record.get(key) {
                self.set_value(name, value);
            }
        }

        debug!(?algorithms, "applied engine record");
    }

    /// `shift:<ch> vector` of every channel, or `None` when the record has
    /// none. Missing components are zero shifts with a unit scale.
    fn shift_vectors(&self, record: &EngineRecord) -> Option<Vec<Slot>> {
        let parameter = self.parameter(ParamName::ChromaticAberration)?;
        let ParamKind::Chromatic { components } = parameter.kind() else {
            return None;
        };
        let channels = self.max_channels();
        let key = |channel: usize| format!("shift:{channel} vector");
        if !(0..channels).any(|channel| record.contains(&key(channel))) {
            return None;
        }

        let mut vectors = Vec::with_capacity(channels * components);
        for channel in 0..channels {
            let key = key(channel);
            let given = record.list(&key);
            for component in 0..components {
                let value = match given.get(component) {
                    Some(value) => *value,
                    None if component + 1 < components => "0",
                    None => "1",
                };
                vectors.push(Some(value.to_string()));
            }
        }
        Some(vectors)
    }

    /// The restoration record for the active channels.
    pub fn to_engine_record(&self) -> EngineRecord {
        use ParamName::*;

        let mut record = EngineRecord::new();
        let put = |record: &mut EngineRecord, key: String, value: &str| {
            if !value.is_empty() {
                record.insert(key, value);
            }
        };

        let algorithms = self.slots(DeconvolutionAlgorithm);
        let snr = self.slots(SignalNoiseRatio);
        let acuity = self.slots(Acuity);
        let background = self.slots(BackgroundOffsetPercent);
        let background_mode = self.value(BackgroundOffsetPercent);
        let chromatic = self
            .parameter(ChromaticAberration)
            .filter(|parameter| parameter.is_set());

        for channel in 0..self.number_of_channels() {
            let algorithm = algorithms
                .get(channel)
                .filter(|slot| is_filled(slot))
                .map(slot_str)
                .unwrap_or(DEFAULT_ALGORITHM);
            let task = format!("{}:{channel}", task_name(algorithm));
            record.insert(task.clone(), "");
            if algorithm == SKIP {
                continue;
            }

            put(&mut record, format!("{task} snr"), slot_at(snr, channel));
            put(&mut record, format!("{task} acuity"), slot_at(acuity, channel));
            put(&mut record, format!("{task} acuityMode"), self.value(AcuityMode));
            put(&mut record, format!("{task} it"), self.value(NumberOfIterations));
            put(&mut record, format!("{task} q"), self.value(QualityChangeStoppingCriterion));
            if BACKGROUND_SENTINELS.contains(&background_mode) {
                put(&mut record, format!("{task} bgMode"), background_mode);
            } else if is_filled(&background.get(channel).cloned().flatten()) {
                put(&mut record, format!("{task} bgMode"), "manual");
                put(&mut record, format!("{task} bg"), slot_at(background, channel));
            }
            if algorithm == DEFAULT_ALGORITHM {
                put(
                    &mut record,
                    format!("{task} reduceMode"),
                    self.value(ArrayDetectorReductionMode),
                );
            }

            if let Some(chromatic) = chromatic {
                let vector: Vec<&str> = chromatic
                    .channel_value(channel)
                    .iter()
                    .flatten()
                    .map(String::as_str)
                    .collect();
                put(&mut record, format!("shift:{channel} vector"), &vector.join(" "));
            }
        }

        for (key, name) in [
            ("autocrop enabled", Autocrop),
            ("stabilize enabled", ZStabilization),
            ("stabilize:post enabled", TStabilization),
            ("stabilize:post mode", TStabilizationMethod),
            ("stabilize:post rot", TStabilizationRotation),
            ("stabilize:post crop", TStabilizationCropping),
        ] {
            put(&mut record, key.to_string(), self.value(name));
        }

        record
    }
}

/// Background of the whole setting. The first channel whose mode is not
/// `manual` decides; manual offsets are kept only when every channel that
/// names a mode is manual.
fn background_from(record: &EngineRecord, channels: usize) -> Option<Vec<Slot>> {
    let mut values: Vec<Slot> = vec![None; channels];
    let mut found = false;

    for channel in 0..channels {
        let Some(mode) = any_task_field(record, channel, "bgMode") else {
            continue;
        };
        found = true;
        match mode {
            "manual" => {
                let offset = any_task_field(record, channel, "bg").unwrap_or("0");
                values[channel] = Some(offset.to_string());
            }
            "auto" | "object" => return Some(sentinel(mode, channels)),
            "lowest" | "widefield" => return Some(sentinel("auto", channels)),
            other => {
                warn!(channel, mode = other, "unknown background mode");
                return Some(sentinel("auto", channels));
            }
        }
    }

    found.then_some(values)
}

fn sentinel(mode: &str, channels: usize) -> Vec<Slot> {
    let mut values = vec![None; channels];
    if let Some(first) = values.first_mut() {
        *first = Some(mode.to_string());
    }
    values
}
