use serde::{Deserialize, Serialize};

/// One value slot. `None` is the explicit "unset" marker.
pub type Slot = Option<String>;

/// A raw value as it arrives from a form, a persisted record or the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Scalar(String),
    List(Vec<Slot>),
}

impl RawValue {
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RawValue::List(values.into_iter().map(|v| Some(v.into())).collect())
    }

    /// The first slot of a list, or the scalar itself.
    pub fn first(&self) -> Slot {
        match self {
            RawValue::Null => None,
            RawValue::Scalar(value) => Some(value.clone()),
            RawValue::List(slots) => slots.first().cloned().flatten(),
        }
    }

    /// Holds at least one non-empty value. A posted `"0"` is set.
    pub fn is_set(&self) -> bool {
        match self {
            RawValue::Null => false,
            RawValue::Scalar(value) => !value.is_empty(),
            RawValue::List(slots) => slots.iter().any(is_filled),
        }
    }

    /// Slots of a list; a scalar becomes a single slot.
    pub fn into_slots(self) -> Vec<Slot> {
        match self {
            RawValue::Null => Vec::new(),
            RawValue::Scalar(value) => vec![Some(value)],
            RawValue::List(slots) => slots,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Scalar(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Scalar(value)
    }
}

impl From<Slot> for RawValue {
    fn from(value: Slot) -> Self {
        match value {
            Some(value) => RawValue::Scalar(value),
            None => RawValue::Null,
        }
    }
}

impl From<Vec<Slot>> for RawValue {
    fn from(slots: Vec<Slot>) -> Self {
        RawValue::List(slots)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(values: Vec<&str>) -> Self {
        RawValue::list(values)
    }
}

/// A slot holds a value when it is present and non-empty. `"0"` is a value.
pub fn is_filled(slot: &Slot) -> bool {
    slot.as_deref().is_some_and(|s| !s.is_empty())
}

pub fn slot_str(slot: &Slot) -> &str {
    slot.as_deref().unwrap_or("")
}

/// Numeric string test: optional surrounding whitespace, sign, digits with an
/// optional fraction and exponent. Words such as `inf` or `NaN` are not
/// numeric.
pub fn is_numeric(value: &str) -> bool {
    parse_number(value).is_some()
}

pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E');
    if !trimmed.chars().all(allowed) || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lenient conversion: the longest numeric prefix, or `0` when there is none.
pub fn float_value(value: &str) -> f64 {
    let trimmed = value.trim_start();
    let bytes = trimmed.as_bytes();
    let digits_from = |mut idx: usize| {
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        idx
    };

    let mut end = 0;
    if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
        end += 1;
    }
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return 0.0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_start = end + 1;
        if exp_start < bytes.len() && matches!(bytes[exp_start], b'+' | b'-') {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    trimmed[..end].parse().unwrap_or(0.0)
}

/// Lenient integer conversion; the fraction is truncated.
pub fn int_value(value: &str) -> i64 {
    float_value(value).trunc() as i64
}

/// Shortest decimal form: `1`, `0.4`, `25000`.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}
