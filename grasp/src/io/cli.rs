use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Nests the tools of a solve request into its autoclaves and writes the loading plan.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Solve request (JSON): tools, autoclaves and options
    #[arg(short, long = "request", value_name = "FILE")]
    pub request_file: PathBuf,
    /// Folder receiving the loading plan (JSON) and one SVG per loaded autoclave
    #[arg(short, long = "output", value_name = "FOLDER")]
    pub output_folder: PathBuf,
    /// Optimizer configuration (JSON), missing fields take their default
    #[arg(short, long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    /// Overrides the PRNG seed of the configuration
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
    /// Overrides the computed time budget of the solve
    #[arg(long, value_name = "MS")]
    pub time_limit_ms: Option<f64>,
    /// Skips rendering the autoclave layouts
    #[arg(long)]
    pub no_svg: bool,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
}
