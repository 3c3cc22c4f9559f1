use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use tracing::debug;

use crate::name::ParamName;

/// Classification of a validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, Serialize, Deserialize)]
pub enum ErrorKind {
    MissingRequiredValue,
    OutOfRange,
    NonNumericValue,
    InvalidEnumerationValue,
    InconsistentCrossField,
    UnknownMode,
}

/// Failure produced by a single parameter check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl CheckFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn prefixed(mut self, prefix: Option<&str>) -> Self {
        if let Some(prefix) = prefix {
            self.message.insert_str(0, prefix);
        }
        self
    }
}

pub type CheckResult = Result<(), CheckFailure>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// `None` for failures not tied to one parameter.
    pub name: Option<ParamName>,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one validation pass.
///
/// Every failure is kept in order. `last_message` is the most recent one,
/// which is what a single rolling message field would show.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
    failed: bool,
}

impl ValidationReport {
    /// A failed report without any message.
    pub fn rejected() -> Self {
        Self {
            errors: Vec::new(),
            failed: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.failed
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn last_message(&self) -> &str {
        self.errors
            .last()
            .map(|error| error.message.as_str())
            .unwrap_or("")
    }

    pub fn last_error(&self) -> Option<&ValidationError> {
        self.errors.last()
    }

    pub fn push(&mut self, name: Option<ParamName>, kind: ErrorKind, message: impl Into<String>) {
        let message = message.into();
        debug!(?name, %kind, %message, "validation failure");
        self.failed = true;
        self.errors.push(ValidationError {
            name,
            kind,
            message,
        });
    }

    pub fn fail(&mut self, name: ParamName, kind: ErrorKind, message: impl Into<String>) {
        self.push(Some(name), kind, message);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.failed |= other.failed;
        self.errors.extend(other.errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_message_is_the_most_recent_failure() {
        let mut report = ValidationReport::default();
        assert!(report.is_valid());
        assert_eq!(report.last_message(), "");

        report.fail(ParamName::NumericalAperture, ErrorKind::OutOfRange, "first");
        report.fail(ParamName::ObjectiveType, ErrorKind::NonNumericValue, "second");

        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 2);
        assert_eq!(report.last_message(), "second");
        assert_eq!(
            report.last_error().and_then(|error| error.name),
            Some(ParamName::ObjectiveType)
        );
    }

    #[test]
    fn rejected_report_has_no_message() {
        let report = ValidationReport::rejected();
        assert!(!report.is_valid());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn prefix_is_prepended() {
        let failure = CheckFailure::new(ErrorKind::OutOfRange, "The value must be > 0.")
            .prefixed(Some("Excitation Wavelength: "));
        assert_eq!(failure.message, "Excitation Wavelength: The value must be > 0.");
    }
}
