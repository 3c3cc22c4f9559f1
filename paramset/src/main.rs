use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use common::log_setup::setup_logging;
use paramset::{
    AnalysisSetting, Config, EngineRecord, MicroscopeSetting, PostedParameters, SchemaTable,
    TaskSetting, ValidationReport,
};
use tracing::info;

const USAGE: &str = "\
usage:
  paramset validate <microscope|task|analysis> <posted.yml> [--config <config.yml>] [--log-dir <dir>]
  paramset import <microscope|task> <record.yml> [--config <config.yml>] [--log-dir <dir>]";

struct Args {
    command: String,
    domain: String,
    input: PathBuf,
    config: Option<PathBuf>,
    log_dir: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut log_dir = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(args.next().context("--config needs a path")?.into()),
            "--log-dir" => log_dir = Some(args.next().context("--log-dir needs a path")?.into()),
            "-h" | "--help" => bail!("{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let [command, domain, input]: [String; 3] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!("{USAGE}"))?;
    Ok(Args {
        command,
        domain,
        input: input.into(),
        config,
        log_dir,
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    setup_logging(&config.log_level, args.log_dir.as_deref())?;
    let schema = config.load_schema()?;
    info!(command = %args.command, domain = %args.domain, input = %args.input.display(), "starting");

    match args.command.as_str() {
        "validate" => validate(&args, &schema, &config),
        "import" => import(&args, &schema, &config),
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }
}

fn validate(args: &Args, schema: &SchemaTable, config: &Config) -> Result<()> {
    let posted = PostedParameters::from_file(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let (report, display) = match args.domain.as_str() {
        "microscope" => {
            let mut setting = MicroscopeSetting::new(schema, config);
            let mut report = ValidationReport::default();
            report.merge(setting.check_posted_image_parameters(&posted));
            report.merge(setting.check_posted_microscopy_parameters(&posted));
            report.merge(setting.check_posted_capturing_parameters(&posted));
            report.merge(setting.check_posted_aberration_correction_parameters(&posted));
            report.merge(setting.check_posted_sted_parameters(&posted));
            report.merge(setting.check_posted_spim_parameters(&posted));
            (report, setting.display_string())
        }
        "task" => {
            let mut setting = TaskSetting::new(schema, config);
            if let Some(count) = posted.scalar("NumberOfChannels") {
                setting.set_number_of_channels(count.parse().unwrap_or(1));
            }
            let mut report = ValidationReport::default();
            report.merge(setting.check_posted_task_parameters(&posted));
            report.merge(setting.check_posted_t_stabilization_parameters(&posted));
            report.merge(setting.check_posted_chromatic_aberration_parameters(&posted));
            report.merge(setting.check_posted_hot_pixel_correction_parameters(&posted));
            (report, setting.display_string(0, "", 0.0))
        }
        "analysis" => {
            let mut setting = AnalysisSetting::new(schema, config);
            let report = setting.check_posted_analysis_parameters(&posted);
            (report, setting.display_string())
        }
        other => bail!("unknown domain {other:?}\n{USAGE}"),
    };

    print!("{display}");
    if report.is_valid() {
        println!("valid");
        return Ok(());
    }
    for error in report.errors() {
        let name = error
            .name
            .map(|name| name.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{name}: {} ({})", error.message, error.kind);
    }
    bail!("{} validation failed: {}", args.domain, report.last_message())
}

fn import(args: &Args, schema: &SchemaTable, config: &Config) -> Result<()> {
    let record = EngineRecord::from_file(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let display = match args.domain.as_str() {
        "microscope" => {
            let mut setting = MicroscopeSetting::new(schema, config);
            setting.apply_engine_record(&record);
            setting.display_string()
        }
        "task" => {
            let mut setting = TaskSetting::new(schema, config);
            setting.apply_engine_record(&record);
            setting.display_string(0, "", 0.0)
        }
        other => bail!("unknown domain {other:?}\n{USAGE}"),
    };

    print!("{display}");
    Ok(())
}
