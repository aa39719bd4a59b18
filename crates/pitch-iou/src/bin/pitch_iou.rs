//! pitch-iou CLI: evaluate synthetic pitch calibrations from flags or JSON.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use pitch_iou::{
    write_mask_png, CameraPose, CorrespondenceNoise, EvaluateConfig, EvaluateOptions, Evaluation,
    ImageSize, OffImagePolicy, PitchDimensions, ScenarioParams, SweepConfig,
};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "pitch-iou")]
#[command(about = "Score re-estimated football pitch homographies with segment and whole-field IoU")]
#[command(version)]
struct Cli {
    /// Log verbosity on stderr; defaults to `PITCH_IOU_LOG`, then `warn`
    /// (`RUST_LOG`, then `info`, in `tracing` builds).
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevelArg>,

    /// Emit `tracing` spans as JSON lines (builds with the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one scenario given on the command line.
    Evaluate(EvaluateArgs),

    /// Evaluate the scenario described by a JSON config.
    Run {
        /// Path to an `EvaluateConfig` JSON file.
        #[arg(long)]
        config: PathBuf,
    },

    /// Evaluate every scenario of a JSON sweep config in parallel.
    Sweep {
        /// Path to a `SweepConfig` JSON file.
        #[arg(long)]
        config: PathBuf,

        /// Output path; overrides the config's `output_path`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct EvaluateArgs {
    /// Pitch length in metres.
    #[arg(long, default_value_t = 105.0)]
    length: f64,

    /// Pitch width in metres.
    #[arg(long, default_value_t = 68.0)]
    width: f64,

    /// Pan angle in degrees.
    #[arg(long, default_value_t = -30.0, allow_hyphen_values = true)]
    pan: f64,

    /// Tilt angle in degrees (negative looks down).
    #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
    tilt: f64,

    /// Focal length in pixels.
    #[arg(long, default_value_t = 3018.0)]
    focal_length: f64,

    /// Camera centre x (metres, corner origin).
    #[arg(long, default_value_t = 52.0, allow_hyphen_values = true)]
    cx: f64,

    /// Camera centre y (metres, corner origin).
    #[arg(long, default_value_t = -45.0, allow_hyphen_values = true)]
    cy: f64,

    /// Camera height (metres).
    #[arg(long, default_value_t = 16.0, allow_hyphen_values = true)]
    cz: f64,

    /// Image width in pixels.
    #[arg(long, default_value_t = 1280)]
    image_width: usize,

    /// Image height in pixels.
    #[arg(long, default_value_t = 720)]
    image_height: usize,

    /// Which correspondences feed the homography estimate.
    #[arg(long, value_enum, default_value_t = PolicyArg::Keep)]
    policy: PolicyArg,

    /// Uniform noise half-width in pixels added to the observed points.
    #[arg(long)]
    noise: Option<f64>,

    /// Seed for the noise generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Skip Hartley normalization in the DLT.
    #[arg(long)]
    no_normalize: bool,

    /// Path to write the JSON report; printed to stdout when omitted.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Path to write the predicted region overview as PNG.
    #[arg(long)]
    mask: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Keep,
    DropOffImage,
}

impl From<PolicyArg> for OffImagePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Keep => OffImagePolicy::Keep,
            PolicyArg::DropOffImage => OffImagePolicy::DropOffImage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Off => LevelFilter::Off,
            LogLevelArg::Error => LevelFilter::Error,
            LogLevelArg::Warn => LevelFilter::Warn,
            LogLevelArg::Info => LevelFilter::Info,
            LogLevelArg::Debug => LevelFilter::Debug,
            LogLevelArg::Trace => LevelFilter::Trace,
        }
    }
}

impl EvaluateArgs {
    fn to_config(&self) -> CliResult<EvaluateConfig> {
        let pitch = PitchDimensions::new(self.length, self.width)?;
        let scenario = ScenarioParams {
            pitch,
            camera: CameraPose {
                pan_deg: self.pan,
                tilt_deg: self.tilt,
                focal_length: self.focal_length,
                center: [self.cx, self.cy, self.cz],
            },
            image: ImageSize::new(self.image_width, self.image_height),
            principal_point: None,
        };
        let mut options = EvaluateOptions {
            policy: self.policy.into(),
            noise: self.noise.map(|amplitude_px| CorrespondenceNoise {
                amplitude_px,
                seed: self.seed,
            }),
            ..Default::default()
        };
        options.dlt.normalize = !self.no_normalize;

        Ok(EvaluateConfig {
            scenario,
            options,
            report_path: self.report.as_ref().map(|p| p.display().to_string()),
            mask_path: self.mask.as_ref().map(|p| p.display().to_string()),
        })
    }
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Commands::Evaluate(args) => run_evaluate(&args.to_config()?),
        Commands::Run { config } => run_evaluate(&EvaluateConfig::load_json(&config)?),
        Commands::Sweep { config, out } => run_sweep(&config, out.as_deref()),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) -> CliResult<()> {
    let directive = cli
        .log_level
        .map(|level| LevelFilter::from(level).as_str().to_ascii_lowercase());
    pitch_iou::core::init_tracing(cli.log_json, directive.as_deref());
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) -> CliResult<()> {
    match cli.log_level {
        Some(level) => pitch_iou::core::init_with_level(level.into())?,
        None => pitch_iou::core::init_from_env(LevelFilter::Warn)?,
    }
    if cli.log_json {
        log::warn!("--log-json needs the `tracing` feature; using plain log lines");
    }
    Ok(())
}

fn run_evaluate(cfg: &EvaluateConfig) -> CliResult<()> {
    let evaluation = cfg.run()?;
    write_outputs(cfg, &evaluation)
}

fn write_outputs(cfg: &EvaluateConfig, evaluation: &Evaluation) -> CliResult<()> {
    match cfg.report_path.as_ref() {
        Some(_) => {
            let path = cfg.report_path();
            evaluation.report.write_json(&path)?;
            log::info!("report written to {}", path.display());
        }
        None => println!("{}", evaluation.report.to_json_string()?),
    }
    if let Some(mask_path) = cfg.mask_path.as_ref() {
        write_mask_png(&evaluation.region_overview()?, mask_path)?;
        log::info!("region overview written to {mask_path}");
    }
    Ok(())
}

fn run_sweep(config_path: &Path, out: Option<&Path>) -> CliResult<()> {
    let cfg = SweepConfig::load_json(config_path)?;
    let report = cfg.run();
    let path = out.map(Path::to_path_buf).unwrap_or_else(|| cfg.output_path());
    report.write_json(&path)?;
    let s = report.summary;
    println!(
        "evaluated {} scenarios ({} failed): mean aggregate iou {:.4}, mean whole-field iou {:.4}",
        s.evaluated, s.failed, s.mean_aggregate_iou, s.mean_whole_field_iou
    );
    log::info!("sweep written to {}", path.display());
    Ok(())
}
