use std::ops::{Deref, DerefMut};

use crate::config::Config;
use crate::name::{Domain, ParamName};
use crate::parameter::TRUE;
use crate::setting::Setting;
use crate::store::ParameterStore;
use crate::value::float_value;

pub const WIDEFIELD: &str = "widefield";
pub const MULTI_POINT_CONFOCAL: &str = "multipoint confocal (spinning disk)";
pub const SINGLE_POINT_CONFOCAL: &str = "single point confocal";
pub const TWO_PHOTON: &str = "two photon";
pub const STED: &str = "STED";
pub const STED_3D: &str = "STED 3D";
pub const SPIM: &str = "SPIM";
pub const RESCAN: &str = "rescan";
pub const ARRAY_DETECTOR_CONFOCAL: &str = "array detector confocal";

/// Acquisition parameters: optics, wavelengths, sampling and the STED and
/// SPIM extensions.
#[derive(Clone, Debug)]
pub struct MicroscopeSetting(Setting);

impl Deref for MicroscopeSetting {
    type Target = Setting;

    fn deref(&self) -> &Setting {
        &self.0
    }
}

impl DerefMut for MicroscopeSetting {
    fn deref_mut(&mut self) -> &mut Setting {
        &mut self.0
    }
}

impl MicroscopeSetting {
    pub fn new(store: &dyn ParameterStore, config: &Config) -> Self {
        Self(Setting::new(Domain::Microscope, store, config))
    }

    pub fn into_inner(self) -> Setting {
        self.0
    }

    /// Sets the channel count of the setting and the `NumberOfChannels`
    /// value together.
    pub fn set_channel_count(&mut self, count: usize) {
        self.0.set_number_of_channels(count);
        let count = self.0.number_of_channels();
        self.0
            .set_value(ParamName::NumberOfChannels, count.to_string());
    }

    // ========================================================================
    // Microscope type
    // ========================================================================

    pub fn microscope_type(&self) -> &str {
        self.value(ParamName::MicroscopeType)
    }

    pub fn is_widefield(&self) -> bool {
        self.microscope_type() == WIDEFIELD
    }

    pub fn is_multi_point_confocal(&self) -> bool {
        self.microscope_type() == MULTI_POINT_CONFOCAL
    }

    /// Spinning disk confocal.
    pub fn is_nipkow_disk(&self) -> bool {
        self.is_multi_point_confocal()
    }

    pub fn is_single_point_confocal(&self) -> bool {
        self.microscope_type() == SINGLE_POINT_CONFOCAL
    }

    pub fn is_two_photon(&self) -> bool {
        self.microscope_type() == TWO_PHOTON
    }

    pub fn is_sted(&self) -> bool {
        self.microscope_type() == STED
    }

    pub fn is_sted_3d(&self) -> bool {
        self.microscope_type() == STED_3D
    }

    pub fn is_spim(&self) -> bool {
        self.microscope_type() == SPIM
    }

    pub fn is_rescan(&self) -> bool {
        self.microscope_type() == RESCAN
    }

    pub fn is_array_detector_confocal(&self) -> bool {
        self.microscope_type() == ARRAY_DETECTOR_CONFOCAL
    }

    pub fn has_pinhole(&self) -> bool {
        self.is_single_point_confocal()
            || self.is_multi_point_confocal()
            || self.is_sted()
            || self.is_sted_3d()
    }

    pub fn is_theoretical_psf(&self) -> bool {
        self.value(ParamName::PointSpreadFunction) == "theoretical"
    }

    pub fn is_measured_psf(&self) -> bool {
        self.value(ParamName::PointSpreadFunction) == "measured"
    }

    pub fn is_aberration_correction_necessary(&self) -> bool {
        self.value(ParamName::AberrationCorrectionNecessary) == TRUE
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Lateral pixel size in nm.
    pub fn pixel_size(&self) -> f64 {
        float_value(self.value(ParamName::CCDCaptorSizeX))
    }

    /// Sample sizes in µm; time in s.
    pub fn sample_size_x(&self) -> f64 {
        self.pixel_size() / 1000.0
    }

    /// Array detector confocal images can have non-square pixels.
    pub fn sample_size_y(&self) -> f64 {
        if self.is_array_detector_confocal() {
            float_value(self.value(ParamName::CCDCaptorSizeY)) / 1000.0
        } else {
            self.sample_size_x()
        }
    }

    pub fn sample_size_z(&self) -> f64 {
        float_value(self.value(ParamName::ZStepSize)) / 1000.0
    }

    pub fn sample_size_t(&self) -> f64 {
        float_value(self.value(ParamName::TimeInterval))
    }

    /// Pixel size from the camera geometry. `None` while the optics give a
    /// zero magnification.
    pub fn calculated_pixel_size(&self) -> Option<f64> {
        let value = |name| float_value(self.value(name));
        let magnification = value(ParamName::ObjectiveMagnification)
            * value(ParamName::CMount)
            * value(ParamName::TubeFactor);
        if magnification == 0.0 {
            return None;
        }
        Some(value(ParamName::CCDCaptorSize) * value(ParamName::Binning) / magnification)
    }

    // ========================================================================
    // Display
    // ========================================================================

    fn is_displayed(&self, name: ParamName) -> bool {
        use ParamName::*;

        let measured = self.is_measured_psf();
        let correction_hidden = measured || !self.is_aberration_correction_necessary();
        match name {
            ImageFileFormat | IsMultiChannel | CMount | TubeFactor | ObjectiveMagnification
            | Binning => false,
            CCDCaptorSizeY => self.is_array_detector_confocal(),
            PinholeSize => self.has_pinhole(),
            PinholeSpacing => self.is_nipkow_disk(),
            AberrationCorrectionNecessary => !measured,
            CoverslipRelativePosition | AberrationCorrectionMode => !correction_hidden,
            AdvancedCorrectionOptions => {
                !correction_hidden && self.value(AberrationCorrectionMode) == "advanced"
            }
            Psf => !self.is_theoretical_psf(),
            Sted3D => self.is_sted_3d(),
            name if name.is_sted() => self.is_sted() || self.is_sted_3d(),
            name if name.is_spim() => self.is_spim(),
            _ => true,
        }
    }

    /// Report of the parameters that apply to this microscope.
    pub fn display_string(&self) -> String {
        let channels = self.number_of_channels();
        self.parameters()
            .filter(|parameter| self.is_displayed(parameter.name()))
            .map(|parameter| parameter.display_string(channels))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SchemaTable;

    fn microscope() -> MicroscopeSetting {
        let schema = SchemaTable::embedded().unwrap();
        MicroscopeSetting::new(&schema, &Config::default())
    }

    // === Predicates ===

    #[test]
    fn pinhole_follows_microscope_type() {
        let mut setting = microscope();
        for (kind, pinhole) in [
            (WIDEFIELD, false),
            (TWO_PHOTON, false),
            (SINGLE_POINT_CONFOCAL, true),
            (MULTI_POINT_CONFOCAL, true),
            (STED, true),
            (STED_3D, true),
            (SPIM, false),
        ] {
            setting.set_value(ParamName::MicroscopeType, kind);
            assert_eq!(setting.has_pinhole(), pinhole, "{kind}");
        }
    }

    #[test]
    fn channel_count_updates_parameter() {
        let mut setting = microscope();
        setting.set_channel_count(3);
        assert_eq!(setting.number_of_channels(), 3);
        assert_eq!(setting.value(ParamName::NumberOfChannels), "3");
    }

    // === Sampling ===

    #[test]
    fn sample_sizes_are_in_micrometres() {
        let mut setting = microscope();
        setting.set_value(ParamName::CCDCaptorSizeX, "65");
        setting.set_value(ParamName::CCDCaptorSizeY, "80");
        setting.set_value(ParamName::ZStepSize, "200");
        setting.set_value(ParamName::TimeInterval, "1.5");

        assert_eq!(setting.sample_size_x(), 0.065);
        assert_eq!(setting.sample_size_y(), 0.065);
        assert_eq!(setting.sample_size_z(), 0.2);
        assert_eq!(setting.sample_size_t(), 1.5);

        setting.set_value(ParamName::MicroscopeType, ARRAY_DETECTOR_CONFOCAL);
        assert_eq!(setting.sample_size_y(), 0.08);
    }

    #[test]
    fn calculated_pixel_size_from_camera() {
        let mut setting = microscope();
        assert_eq!(setting.calculated_pixel_size(), None);

        setting.set_value(ParamName::CCDCaptorSize, "6450");
        setting.set_value(ParamName::Binning, "2");
        setting.set_value(ParamName::ObjectiveMagnification, "100");
        assert_eq!(setting.calculated_pixel_size(), Some(129.0));
    }

    // === Display ===

    #[test]
    fn display_skips_parameters_that_do_not_apply() {
        let mut setting = microscope();
        setting.set_value(ParamName::MicroscopeType, WIDEFIELD);
        setting.set_value(ParamName::PointSpreadFunction, "theoretical");
        setting.set_value(ParamName::NumericalAperture, "1.4");

        let shown = setting.display_string();
        assert!(shown.contains(" numerical aperture:"));
        assert!(!shown.contains(" pinhole size:"));
        assert!(!shown.contains("PSF file name"));
        assert!(!shown.contains(" sted"));
        assert!(!shown.contains(" c mount:"));
        assert!(!shown.contains(" coverslip relative position:"));

        setting.set_value(ParamName::MicroscopeType, STED_3D);
        setting.set_value(ParamName::AberrationCorrectionNecessary, TRUE);
        let shown = setting.display_string();
        assert!(shown.contains(" pinhole size:"));
        assert!(shown.contains(" sted3 d:"));
        assert!(shown.contains(" coverslip relative position:"));
        assert!(!shown.contains(" advanced correction options:"));
    }
}
