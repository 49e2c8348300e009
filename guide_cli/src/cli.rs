//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "guide", version, about = "Predictive guiding engine CLI")]
pub struct Cli {
    /// Path to config TOML (typed). Built-in defaults when omitted.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines (results, logs and errors) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded guide trace through the predictor
    Replay {
        /// Trace CSV with headers `measurement,exposure_ms`
        #[arg(long, value_name = "FILE")]
        trace: PathBuf,
    },
    /// Evaluate the configured covariance kernel
    Kernel {
        /// Row inputs, comma separated
        #[arg(
            long,
            value_name = "X",
            value_delimiter = ',',
            num_args = 1..,
            allow_negative_numbers = true,
            required = true
        )]
        x: Vec<f64>,
        /// Column inputs, comma separated (defaults to --x)
        #[arg(
            long,
            value_name = "Y",
            value_delimiter = ',',
            num_args = 1..,
            allow_negative_numbers = true
        )]
        y: Option<Vec<f64>>,
        /// Also print the gradient for every hyperparameter
        #[arg(long, action = ArgAction::SetTrue)]
        gradient: bool,
        /// Also print the Hessian blocks
        #[arg(long, action = ArgAction::SetTrue)]
        hessian: bool,
    },
    /// Print the effective predictor and kernel settings
    Summary,
}
