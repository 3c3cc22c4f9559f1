//! Per-channel chromatic aberration vectors.
//!
//! All channels live in one flat slot list, `components` slots per channel.
//! The persisted form is `#`-delimited with a leading `#`, e.g.
//! `#0#0#0#0#1#0.1#0#0#0#1` for two channels of five components.

use crate::config::{LONG_VECTOR_COMPONENTS, SHORT_VECTOR_COMPONENTS};
use crate::value::{float_value, is_filled, parse_number, RawValue, Slot};

pub(super) fn distribute(slots: &mut [Slot], raw: RawValue) {
    let values: Vec<Slot> = match raw {
        RawValue::Null => return,
        RawValue::Scalar(joined) => joined
            .split('#')
            .skip(1)
            .map(|token| (!token.is_empty()).then(|| token.to_string()))
            .collect(),
        RawValue::List(values) => values,
    };
    if values.is_empty() {
        return;
    }

    for (idx, slot) in slots.iter_mut().enumerate() {
        *slot = values.get(idx).cloned().flatten();
    }
}

pub(super) fn serialize(slots: &[Slot], components: usize, channels: usize) -> String {
    let mut result = String::new();
    for slot in slots.iter().take(components * channels) {
        result.push('#');
        if let Some(value) = slot {
            result.push_str(value);
        }
    }
    result
}

pub(super) fn channel(slots: &[Slot], components: usize, channel: usize) -> &[Slot] {
    let start = (channel * components).min(slots.len());
    let end = (start + components).min(slots.len());
    &slots[start..end]
}

pub(super) fn set_channel(slots: &mut [Slot], components: usize, channel: usize, values: Vec<Slot>) {
    let start = channel * components;
    for (offset, value) in values.into_iter().take(components).enumerate() {
        if let Some(slot) = slots.get_mut(start + offset) {
            *slot = value;
        }
    }
}

pub(super) fn channels_to_correct(slots: &[Slot], components: usize, channels: usize) -> Vec<usize> {
    if channels < 2 {
        return Vec::new();
    }
    (0..channels)
        .filter(|&ch| {
            channel(slots, components, ch)
                .iter()
                .flatten()
                .any(|value| float_value(value) > 0.0)
        })
        .collect()
}

/// All zero components except a trailing `1`, over either vector length.
/// Unset trailing components are ignored.
pub fn is_reference_vector(components: &[Slot]) -> bool {
    let filled = components.iter().take_while(|slot| is_filled(slot)).count();
    if filled != SHORT_VECTOR_COMPONENTS && filled != LONG_VECTOR_COMPONENTS {
        return false;
    }
    if components[filled..].iter().any(is_filled) {
        return false;
    }

    let numbers: Option<Vec<f64>> = components[..filled]
        .iter()
        .map(|slot| slot.as_deref().and_then(parse_number))
        .collect();
    match numbers.as_deref() {
        Some([zeros @ .., last]) => *last == 1.0 && zeros.iter().all(|&value| value == 0.0),
        _ => false,
    }
}
