use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use specfp::fingerprint::BaselineMethod;

mod config;
mod convert;
mod demo;
mod fingerprint;
mod info;

/// specfp - Raman spectrum decoder and band fingerprinting
#[derive(Parser)]
#[command(name = "specfp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Baseline estimator selection.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BaselineArg {
    /// Rolling minimum envelope, then smoothed
    RollingMin,
    /// Iterative asymmetric smoothing
    AsymmetricSmoothing,
}

impl From<BaselineArg> for BaselineMethod {
    fn from(arg: BaselineArg) -> Self {
        match arg {
            BaselineArg::RollingMin => BaselineMethod::RollingMin,
            BaselineArg::AsymmetricSmoothing => BaselineMethod::AsymmetricSmoothing,
        }
    }
}

/// Fingerprint output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One row per band
    #[default]
    Csv,
    /// Array of fingerprints with their configuration
    Json,
}

/// Fingerprint parameters given on the command line; unset values fall back
/// to the config file, then to the defaults.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct FingerprintArgs {
    /// Baseline smoothing window in axis units
    #[arg(long)]
    smoothing_window: Option<f64>,

    /// Minimum prominence as a multiple of the noise estimate
    #[arg(long)]
    prominence_factor: Option<f64>,

    /// Minimum distance between band centers in axis units
    #[arg(long)]
    min_separation: Option<f64>,

    /// Baseline estimator
    #[arg(long, value_enum)]
    baseline: Option<BaselineArg>,

    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a container and write its spectrum as x,y CSV
    Convert {
        /// Input container
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV file (stdout when omitted)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Extract band fingerprints from one or more containers
    Fingerprint {
        /// Input containers
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Band output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Band output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Write the per-file summary as CSV
        #[arg(long, value_name = "FILE")]
        summary: Option<PathBuf>,

        /// Load settings from a TOML config file (default: ./specfp.toml if present)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        params: FingerprintArgs,
    },

    /// Display header, block listing and spectrum summary of a container
    Info {
        /// Input container
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Write a synthetic container with known bands
    Demo {
        /// Output container path
        #[arg(value_name = "OUTPUT", default_value = "demo.wdf")]
        output: PathBuf,

        /// Write without a block count, letting readers scan to the end
        #[arg(long)]
        streamed: bool,
    },
}

impl Cli {
    /// Count of `-v` flags
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Whether `-q` was given
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Initialise env_logger; `RUST_LOG` takes precedence over the flags.
pub fn init_logging(verbosity: u8, quiet: bool) {
    let log_level = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Run the selected subcommand.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert { input, output } => convert::run(input, output),
        Commands::Fingerprint {
            inputs,
            output,
            format,
            summary,
            config,
            params,
        } => fingerprint::run(inputs, output, format, summary, config, params),
        Commands::Info { file } => info::run(file),
        Commands::Demo { output, streamed } => demo::run(output, streamed),
    }
}
