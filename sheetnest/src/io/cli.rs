use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(short, long, value_enum)]
    pub mode: Mode,
    /// PNG or SVG artwork in `cutline` mode, SVG parts in `nest` mode
    #[arg(short, long, value_name = "FILE", num_args = 1.., required = true)]
    pub input_files: Vec<PathBuf>,
    #[arg(short, long, value_name = "FOLDER")]
    pub solution_folder: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
    #[arg(long, default_value_t = 1000.0)]
    pub bin_width: f64,
    #[arg(long, default_value_t = 1000.0)]
    pub bin_height: f64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Traces or parses each input and writes its cut file
    Cutline,
    /// Packs the shapes of all inputs onto a single sheet
    Nest,
}
