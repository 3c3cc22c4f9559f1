//! Reconciles posted form input with the parameters of a setting.
//!
//! Each group commits what was posted into the setting and checks it. Groups
//! keep going after a failure so every problem ends up in the report; the
//! report's last message is the one a form would show.

use crate::error::{ErrorKind, ValidationReport};
use crate::name::ParamName;
use crate::parameter::Parameter;
use crate::setting::Setting;
use crate::value::RawValue;

mod analysis;
mod microscope;
mod posted;
mod task;

pub use posted::PostedParameters;

/// Checks a parameter that was just given a value.
fn record(parameter: &mut Parameter, report: &mut ValidationReport) -> bool {
    if parameter.check() {
        return true;
    }
    let kind = parameter
        .last_error()
        .unwrap_or(ErrorKind::InvalidEnumerationValue);
    report.fail(parameter.name(), kind, parameter.message());
    false
}

/// Sets and checks `raw` when it holds a value. Otherwise the parameter is
/// reset and reported with `missing` if it must be provided.
fn commit(
    setting: &mut Setting,
    report: &mut ValidationReport,
    name: ParamName,
    raw: RawValue,
    missing: &str,
) -> bool {
    let Some(parameter) = setting.parameter_mut(name) else {
        return true;
    };
    if raw.is_set() {
        parameter.set_value(raw);
        return record(parameter, report);
    }

    let must_provide = parameter.must_provide();
    parameter.reset();
    if must_provide {
        report.fail(name, ErrorKind::MissingRequiredValue, missing);
        return false;
    }
    true
}

/// Sets `raw` whatever it holds, then checks it.
fn assign(
    setting: &mut Setting,
    report: &mut ValidationReport,
    name: ParamName,
    raw: RawValue,
) -> bool {
    match setting.parameter_mut(name) {
        Some(parameter) => {
            parameter.set_value(raw);
            record(parameter, report)
        }
        None => true,
    }
}

/// Checks the value already held by the setting.
fn recheck(setting: &mut Setting, report: &mut ValidationReport, name: ParamName) -> bool {
    match setting.parameter_mut(name) {
        Some(parameter) => record(parameter, report),
        None => true,
    }
}

/// Posted spelling of a disabled flag.
fn is_false_flag(value: &str) -> bool {
    matches!(value, "0" | "False" | "false")
}
