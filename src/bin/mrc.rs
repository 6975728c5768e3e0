//! `mrc`: compute a miss-ratio curve for one policy over one trace file.
//!
//! ```text
//! mrc <policy> <trace> <sampling-rate> <probes> [options]
//! ```
//!
//! One line per probe goes to stdout; logs go to stderr. Exit status is 2
//! for usage or configuration errors and 1 for any other failure.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use mrckit::config::{MissRatioBasis, RunConfig};
use mrckit::error::{ConfigError, ReplayError};
use mrckit::replay::CurveDriver;
use mrckit::report::{OutputFormat, ProbeLine, RunLabel};
use mrckit::trace::Trace;
use mrckit::traits::PolicyOptions;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Replacement policy: lru or arc
    policy: String,

    /// Trace file: little-endian u32 keys, last entry = key-space size
    trace: String,

    /// Fraction of keys to replay, in (0, 1]
    sampling_rate: String,

    /// Number of capacity probes
    probes: String,

    /// Do not insert a key when a get misses
    #[arg(long)]
    no_insert_on_miss: bool,

    /// Unmeasured full passes before the measured one
    #[arg(long, default_value = "0")]
    warmup_passes: u32,

    /// Miss-ratio denominator
    #[arg(long, value_enum, default_value = "scaled")]
    basis: BasisArg,

    /// Worker threads for probes
    #[arg(long, default_value = "1")]
    jobs: usize,

    /// Output format for probe lines
    #[arg(long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Log level (trace, debug, info, warn, error); RUST_LOG also applies
    #[arg(long, env = "MRC_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BasisArg {
    Scaled,
    Observed,
}

impl From<BasisArg> for MissRatioBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Scaled => MissRatioBasis::Scaled,
            BasisArg::Observed => MissRatioBasis::Observed,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .init();
}

fn build_config(args: &Args) -> Result<RunConfig, ConfigError> {
    let rate: f64 = args.sampling_rate.trim().parse().map_err(|_| {
        ConfigError::new(format!(
            "sampling rate must be a number, got {:?}",
            args.sampling_rate
        ))
    })?;
    let probes: u64 = args.probes.trim().parse().map_err(|_| {
        ConfigError::new(format!(
            "probes must be a positive integer, got {:?}",
            args.probes
        ))
    })?;

    RunConfig::new(&args.policy, &args.trace, rate, probes)?
        .with_options(PolicyOptions {
            insert_on_miss: !args.no_insert_on_miss,
        })
        .with_warmup_passes(args.warmup_passes)
        .with_basis(args.basis.into())
        .with_jobs(args.jobs)
}

/// Failure modes of a run, each mapped to an exit status.
enum RunError {
    Replay(ReplayError),
    Output(io::Error),
}

fn run(config: &RunConfig, label: &RunLabel, format: OutputFormat) -> Result<(), RunError> {
    let trace = Trace::open(&config.trace).map_err(RunError::Replay)?;
    let driver = CurveDriver::new(&trace, config.curve.clone()).map_err(RunError::Replay)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_result = Ok(());
    driver.run_with(|result| {
        if write_result.is_err() {
            return;
        }
        let line = ProbeLine { label, result };
        write_result = line.write_to(&mut out, format).and_then(|()| out.flush());
    });
    write_result.map_err(RunError::Output)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid arguments");
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_USAGE);
        },
    };

    let label = RunLabel {
        policy: args.policy.clone(),
        trace: args.trace.clone(),
        rate: args.sampling_rate.clone(),
        probes: args.probes.clone(),
    };

    match run(&config, &label, args.format.into()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Replay(ReplayError::Config(err))) => {
            eprintln!("error: {err}");
            ExitCode::from(EXIT_USAGE)
        },
        Err(RunError::Replay(err)) => {
            error!(%err, "run failed");
            eprintln!("error: {err}");
            ExitCode::from(EXIT_FAILURE)
        },
        Err(RunError::Output(err)) => {
            eprintln!("error: writing output: {err}");
            ExitCode::from(EXIT_FAILURE)
        },
    }
}
