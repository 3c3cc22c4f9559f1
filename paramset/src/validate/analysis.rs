use crate::error::{ErrorKind, ValidationReport};
use crate::name::ParamName;
use crate::setting::AnalysisSetting;
use crate::validate::{assign, is_false_flag, recheck, PostedParameters};
use crate::value::Slot;

impl AnalysisSetting {
    /// Nothing beyond the switch is looked at when the analysis is off. The
    /// channel and coefficient selections end the pass when they are missing
    /// or rejected.
    pub fn check_posted_analysis_parameters(&mut self, posted: &PostedParameters) -> ValidationReport {
        use ParamName::*;

        if posted.is_empty() {
            return ValidationReport::rejected();
        }
        let mut report = ValidationReport::default();

        let Some(enabled) = posted.scalar(ColocAnalysis).filter(|value| !value.is_empty()) else {
            report.fail(
                ColocAnalysis,
                ErrorKind::MissingRequiredValue,
                "Please indicate whether you would like to perform colocalization analysis!",
            );
            return report;
        };
        if is_false_flag(enabled) {
            self.set_value(ColocAnalysis, "0");
            return report;
        }
        if !assign(self, &mut report, ColocAnalysis, "1".into()) {
            return report;
        }

        if !posted.is_set(ColocChannel) {
            report.fail(
                ColocChannel,
                ErrorKind::MissingRequiredValue,
                "Please indicate the channels (at least two) for colocalization analysis.",
            );
            return report;
        }
        if !assign(self, &mut report, ColocChannel, posted.raw(ColocChannel)) {
            return report;
        }

        if !posted.is_set(ColocCoefficient) {
            report.fail(
                ColocCoefficient,
                ErrorKind::MissingRequiredValue,
                "Please indicate the coefficients for colocalization analysis.",
            );
            return report;
        }
        if !assign(self, &mut report, ColocCoefficient, posted.raw(ColocCoefficient)) {
            return report;
        }

        self.commit_threshold(posted, &mut report);

        self.set_value(ColocMap, posted.raw(ColocMap));
        report
    }

    fn commit_threshold(&mut self, posted: &PostedParameters, report: &mut ValidationReport) {
        let name = ParamName::ColocThreshold;
        let channels = self.max_channels();

        let Some(mode) = posted
            .scalar("ColocThresholdMode")
            .filter(|mode| !mode.is_empty())
        else {
            report.fail(
                name,
                ErrorKind::MissingRequiredValue,
                "Please choose a colocalization threshold mode!",
            );
            return;
        };

        let mut values: Vec<Slot> = vec![None; channels];
        match mode {
            "auto" => values[0] = Some(mode.to_string()),
            "manual" => values = posted.channel_values(name, channels),
            _ => report.fail(
                name,
                ErrorKind::UnknownMode,
                "Unknown colocalization threshold mode!",
            ),
        }

        self.set_value(name, values);
        recheck(self, report, name);
    }
}
