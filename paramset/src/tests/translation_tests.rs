use crate::config::Config;
use crate::name::ParamName;
use crate::setting::{MicroscopeSetting, TaskSetting, ARRAY_DETECTOR_CONFOCAL, STED};
use crate::store::SchemaTable;
use crate::translate::{EngineRecord, ParState};
use crate::value::Slot;

fn schema() -> SchemaTable {
    SchemaTable::embedded().unwrap()
}

fn sted_setting(schema: &SchemaTable) -> MicroscopeSetting {
    use ParamName::*;

    let mut setting = MicroscopeSetting::new(schema, &Config::default());
    setting.set_channel_count(2);
    setting.set_value(MicroscopeType, STED);
    setting.set_value(NumericalAperture, "1.4");
    setting.set_value(ObjectiveType, "oil");
    setting.set_value(SampleMedium, "1.45");
    setting.set_value(ExcitationWavelength, vec!["488", "561"]);
    setting.set_value(EmissionWavelength, vec!["520", "600"]);
    setting.set_value(PinholeSize, vec!["250", "280"]);
    setting.set_value(CCDCaptorSizeX, "30");
    setting.set_value(ZStepSize, "150");
    setting.set_value(TimeInterval, "2");
    setting.set_value(CoverslipRelativePosition, "farthest");
    setting.set_value(StedDepletionMode, vec!["vortexPulsed", "off-confocal"]);
    setting.set_value(StedSaturationFactor, vec!["20", "0"]);
    setting.set_value(StedWavelength, vec!["775", "0"]);
    setting.set_value(StedImmunity, vec!["10", "0"]);
    setting
}

fn active(slots: &[Slot]) -> &[Slot] {
    &slots[..2]
}

// === Acquisition ===

#[test]
fn acquisition_record_round_trip() -> anyhow::Result<()> {
    use ParamName::*;

    let schema = schema();
    let source = sted_setting(&schema);
    let record = source.to_engine_record();
    let record = EngineRecord::from_yaml(&record.to_yaml()?)?;

    let mut copy = MicroscopeSetting::new(&schema, &Config::default());
    copy.apply_engine_record(&record);

    for name in [
        MicroscopeType,
        NumberOfChannels,
        NumericalAperture,
        ObjectiveType,
        SampleMedium,
        CCDCaptorSizeX,
        CCDCaptorSizeY,
        ZStepSize,
        TimeInterval,
        CoverslipRelativePosition,
    ] {
        assert_eq!(copy.value(name), source.value(name), "{name}");
    }
    for name in [
        ExcitationWavelength,
        EmissionWavelength,
        PinholeSize,
        StedDepletionMode,
        StedSaturationFactor,
        StedWavelength,
        StedImmunity,
    ] {
        assert_eq!(active(copy.slots(name)), active(source.slots(name)), "{name}");
    }
    Ok(())
}

#[test]
fn acquisition_record_uses_engine_names() {
    let schema = schema();
    let record = sted_setting(&schema).to_engine_record();

    assert_eq!(record.get("micr"), Some("sted confocal"));
    assert_eq!(record.get("pcnt"), Some("1 1"));
    assert_eq!(record.par_state("pcnt"), Some("noMetaData"));
    assert_eq!(record.get("ril"), Some("1.515"));
    assert_eq!(record.get("ri"), Some("1.45"));
    assert_eq!(record.get("s"), Some("0.03 0.03 0.15 2"));
    assert_eq!(
        record.par_state("s"),
        Some("noMetaData default noMetaData noMetaData")
    );
    assert_eq!(record.get("imagingDir"), Some("downward"));
    assert!(record.is_default("sted3D"));
    assert!(record.is_default("spimExc"));
    assert!(!record.is_default("ex"));
}

#[test]
fn unset_sampling_components_stay_unset() -> anyhow::Result<()> {
    use ParamName::*;

    let schema = schema();
    let mut source = MicroscopeSetting::new(&schema, &Config::default());
    source.set_value(CCDCaptorSizeX, "65");

    let record = source.to_engine_record();
    assert_eq!(record.get("s"), Some("0.065 0.065 0 0"));
    assert_eq!(record.par_state("s"), Some("noMetaData default default default"));

    let mut copy = MicroscopeSetting::new(&schema, &Config::default());
    copy.apply_engine_record(&EngineRecord::from_yaml(&record.to_yaml()?)?);

    assert_eq!(copy.value(CCDCaptorSizeX), "65");
    for name in [CCDCaptorSizeY, ZStepSize, TimeInterval] {
        assert_eq!(copy.value(name), "", "{name}");
    }
    Ok(())
}

#[test]
fn array_detector_keeps_its_own_y_size() {
    use ParamName::*;

    let schema = schema();
    let mut source = MicroscopeSetting::new(&schema, &Config::default());
    source.set_value(MicroscopeType, ARRAY_DETECTOR_CONFOCAL);
    source.set_value(CCDCaptorSizeX, "40");
    source.set_value(CCDCaptorSizeY, "60");
    source.set_value(ZStepSize, "150");
    source.set_value(TimeInterval, "0");

    let record = source.to_engine_record();
    assert_eq!(record.get("s"), Some("0.04 0.06 0.15 0"));
    assert!((0..4).all(|idx| !record.is_default_at("s", idx)));

    let mut copy = MicroscopeSetting::new(&schema, &Config::default());
    copy.apply_engine_record(&record);
    for name in [CCDCaptorSizeX, CCDCaptorSizeY, ZStepSize, TimeInterval] {
        assert_eq!(copy.value(name), source.value(name), "{name}");
    }
}

#[test]
fn sampling_marked_default_is_ignored() {
    let schema = schema();
    let mut setting = MicroscopeSetting::new(&schema, &Config::default());
    setting.set_value(ParamName::ZStepSize, "200");

    let record: EngineRecord = [("s", "0.1 0.1 0.3 1"), ("parState,s", "default")]
        .into_iter()
        .collect();
    setting.apply_engine_record(&record);

    assert_eq!(setting.value(ParamName::ZStepSize), "200");
    assert_eq!(setting.value(ParamName::CCDCaptorSizeX), "");
    assert_eq!(setting.value(ParamName::TimeInterval), "");
}

#[test]
fn default_state_leaves_the_value() {
    let schema = schema();
    let mut setting = sted_setting(&schema);

    let mut record: EngineRecord = [("na", "1.2"), ("ex", "405 405")].into_iter().collect();
    record.set_par_state("na", ParState::Default);
    record.set_par_state("ex", ParState::Verified);
    setting.apply_engine_record(&record);

    assert_eq!(setting.value(ParamName::NumericalAperture), "1.4");
    assert_eq!(setting.value(ParamName::ExcitationWavelength), "405");
}

// === Restoration ===

fn restoration_setting(schema: &SchemaTable) -> TaskSetting {
    use ParamName::*;

    let mut setting = TaskSetting::new(schema, &Config::default());
    setting.set_number_of_channels(2);
    setting.set_value(DeconvolutionAlgorithm, vec!["cmle", "gmle"]);
    setting.set_value(SignalNoiseRatio, vec!["12", "7"]);
    setting.set_value(Acuity, vec!["5", "-10"]);
    setting.set_value(AcuityMode, "on");
    setting.set_value(NumberOfIterations, "40");
    setting.set_value(QualityChangeStoppingCriterion, "0.1");
    setting.set_value(BackgroundOffsetPercent, vec!["10", "20"]);
    setting.set_value(ArrayDetectorReductionMode, "superXY");
    setting.set_value(Autocrop, "1");
    setting.set_value(ZStabilization, "0");
    setting.set_value(TStabilization, "1");
    setting.set_value(TStabilizationMethod, "cm");
    setting.set_value(TStabilizationRotation, "1");
    setting.set_value(TStabilizationCropping, "inner");
    setting.set_value(ChromaticAberration, "#0#0#0#0#1#0.1#0.2#0#0#1");
    setting
}

#[test]
fn restoration_record_round_trip() -> anyhow::Result<()> {
    use ParamName::*;

    let schema = schema();
    let source = restoration_setting(&schema);
    let record = EngineRecord::from_yaml(&source.to_engine_record().to_yaml()?)?;

    let mut copy = TaskSetting::new(&schema, &Config::default());
    copy.apply_engine_record(&record);

    for name in [DeconvolutionAlgorithm, SignalNoiseRatio, Acuity, BackgroundOffsetPercent] {
        assert_eq!(active(copy.slots(name)), active(source.slots(name)), "{name}");
    }
    for name in [
        AcuityMode,
        NumberOfIterations,
        QualityChangeStoppingCriterion,
        ArrayDetectorReductionMode,
        Autocrop,
        ZStabilization,
        TStabilization,
        TStabilizationMethod,
        TStabilizationRotation,
        TStabilizationCropping,
    ] {
        assert_eq!(copy.value(name), source.value(name), "{name}");
    }

    let vectors = |setting: &TaskSetting, channel: usize| -> Vec<Slot> {
        setting
            .parameter(ChromaticAberration)
            .map(|parameter| parameter.channel_value(channel).to_vec())
            .unwrap_or_default()
    };
    for channel in 0..2 {
        assert_eq!(vectors(&copy, channel), vectors(&source, channel));
    }
    Ok(())
}

#[test]
fn restoration_record_key_families() {
    let schema = schema();
    let record = restoration_setting(&schema).to_engine_record();

    assert_eq!(record.get("cmle:0 snr"), Some("12"));
    assert_eq!(record.get("gmle:1 snr"), Some("7"));
    assert_eq!(record.get("gmle:1 bgMode"), Some("manual"));
    assert_eq!(record.get("gmle:1 bg"), Some("20"));
    assert_eq!(record.get("cmle:0 reduceMode"), Some("superXY"));
    assert!(!record.contains("gmle:1 reduceMode"));
    assert_eq!(record.get("shift:1 vector"), Some("0.1 0.2 0 0 1"));
    assert_eq!(record.get("stabilize:post crop"), Some("inner"));
    assert!(!record.contains("cmle:1 snr"));
}

#[test]
fn sn_key_is_accepted_for_snr() {
    let schema = schema();
    let mut setting = TaskSetting::new(&schema, &Config::default());
    let record: EngineRecord = [("qmle:0 sn", "15"), ("qmle:0 bgMode", "widefield")]
        .into_iter()
        .collect();
    setting.apply_engine_record(&record);

    assert_eq!(setting.value(ParamName::DeconvolutionAlgorithm), "qmle");
    assert_eq!(setting.value(ParamName::SignalNoiseRatio), "15");
    assert_eq!(setting.value(ParamName::BackgroundOffsetPercent), "auto");
}
