use crate::name::ParamName;
use crate::parameter::{ParamKind, Parameter, TRUE};
use crate::value::{is_filled, slot_str, Slot};

const LABEL_WIDTH: usize = 38;
const NOT_SET: &str = "*not set*";

/// ` label:` padded to a fixed column. Camel case is split into lowercase
/// words: `NumericalAperture` becomes ` numerical aperture:`.
pub fn formatted_name(label: &str) -> String {
    let mut name = String::with_capacity(LABEL_WIDTH);
    for c in label.chars() {
        if c.is_ascii_uppercase() {
            name.push(' ');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    labelled(&name)
}

/// Like [`formatted_name`] but keeps `label` as written.
fn labelled(label: &str) -> String {
    let mut name = String::with_capacity(LABEL_WIDTH);
    if !label.starts_with(' ') {
        name.push(' ');
    }
    name.push_str(label);
    name.push(':');
    format!("{name:<width$}", width = LABEL_WIDTH)
}

fn line(label: String, value: &str) -> String {
    format!("{label}{value}\n")
}

fn joined<'a>(slots: impl IntoIterator<Item = &'a Slot>) -> String {
    slots
        .into_iter()
        .map(slot_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn joined_filled(slots: &[Slot]) -> String {
    joined(slots.iter().filter(|slot| is_filled(slot)))
}

fn yes_no(value: &str) -> &'static str {
    if value == "0" {
        "no"
    } else {
        "yes"
    }
}

impl Parameter {
    fn default_label(&self) -> String {
        formatted_name(self.name().as_ref())
    }

    /// One report line, or several for per-channel vectors.
    pub fn display_string(&self, number_of_channels: usize) -> String {
        use ParamName::*;

        let n = number_of_channels.min(self.slots().len()).max(1);
        let value = self.value_or_empty();

        match self.name() {
            IsMultiChannel => {
                return if value == TRUE {
                    " multichannel image\n".to_string()
                } else {
                    " single channel image\n".to_string()
                };
            }
            CCDCaptorSize | MultiChannelOutput => return String::new(),
            CCDCaptorSizeX => return self.scalar_line(labelled("pixel size")),
            CCDCaptorSizeY => return self.scalar_line(labelled("pixel size Y")),
            ImageFileFormat => {
                let shown = self.translated_value().unwrap_or(NOT_SET);
                return line(self.default_label(), shown);
            }
            Psf | HotPixelCorrection => {
                let label = match (self.name(), n) {
                    (Psf, 1) => "PSF file name",
                    (Psf, _) => "PSF file names",
                    (_, 1) => "Hot Pixel Correction - mask file name",
                    _ => "Hot Pixel Correction - mask file names",
                };
                let shown = if self.not_set() {
                    NOT_SET.to_string()
                } else if n == 1 {
                    value.to_string()
                } else {
                    joined(&self.slots()[..n])
                };
                return line(labelled(label), &shown);
            }
            BackgroundOffsetPercent => {
                return match value {
                    "auto" => line(labelled(" background estimation"), "auto"),
                    "object" => line(labelled(" background estimation"), "in/near object"),
                    _ if n == 1 => line(labelled("background absolute value"), value),
                    _ => line(
                        labelled(" background absolute values"),
                        &joined(&self.slots()[..n]),
                    ),
                };
            }
            ColocThreshold | ColocCoefficient | ColocChannel | SpimDir | SpimFill => {
                return line(self.default_label(), &joined_filled(self.slots()));
            }
            AdvancedCorrectionOptions => {
                let shown = match value {
                    "few-slabs" => "few slabs",
                    "slice" => "slice by slice",
                    "few" => "few bricks",
                    "user" => "user-defined depth",
                    _ => "undefined",
                };
                return line(self.default_label(), shown);
            }
            Autocrop | ColocAnalysis | PerformAberrationCorrection | ZStabilization
            | TStabilizationRotation | TStabilization => {
                return line(self.default_label(), yes_no(value));
            }
            BleachingMode => {
                let shown = if value == "0" { "off" } else { "auto" };
                return line(self.default_label(), shown);
            }
            _ => {}
        }

        match self.kind() {
            ParamKind::Boolean => {
                let shown = if value == TRUE { "yes" } else { "no" };
                line(self.default_label(), shown)
            }
            ParamKind::Array | ParamKind::AnyTypeArray => {
                let shown = if self.not_set() {
                    NOT_SET.to_string()
                } else {
                    joined(&self.slots()[..n])
                };
                line(self.default_label(), &shown)
            }
            ParamKind::Chromatic { .. } => (0..number_of_channels.max(1))
                .map(|channel| {
                    let components = self.channel_value(channel);
                    let label = formatted_name(&format!("{}Ch{}", self.name(), channel));
                    if components.iter().any(is_filled) {
                        line(label, &joined(components))
                    } else {
                        line(label, NOT_SET)
                    }
                })
                .collect(),
            _ => self.scalar_line(self.default_label()),
        }
    }

    /// Signal to noise ratios with `-` for channels that are not
    /// deconvolved.
    pub fn display_snr(&self, algorithms: &[Slot], number_of_channels: usize) -> String {
        let shown = (0..number_of_channels.max(1))
            .map(|channel| {
                let algorithm = algorithms.get(channel).map(slot_str).unwrap_or("");
                match self.slot(channel) {
                    _ if algorithm == "skip" => "-",
                    Some(value) if !value.is_empty() => value,
                    _ => NOT_SET,
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        line(self.default_label(), &shown)
    }

    fn scalar_line(&self, label: String) -> String {
        match self.value() {
            Some(value) if !value.is_empty() => line(label, value),
            _ => line(label, NOT_SET),
        }
    }
}
