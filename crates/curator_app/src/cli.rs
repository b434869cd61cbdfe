//! Command-line arguments for the curator binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use curator_logging::{LevelFilter, LogDestination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

/// Crawl websites and collect clean, token-counted content for LLM use.
#[derive(Debug, Parser)]
#[command(name = "curator", version, about)]
pub struct Cli {
    /// JSON input file with start URLs and extraction settings.
    #[arg(default_value = "input.json")]
    pub input: PathBuf,

    /// Root directory for the dataset and the run summary.
    #[arg(long, default_value = "storage")]
    pub output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Log file used by `--log file` and `--log both`.
    #[arg(long, default_value = "curator.log")]
    pub log_file: PathBuf,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match self.log {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File(self.log_file.clone()),
            LogTarget::Both => LogDestination::Both(self.log_file.clone()),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
