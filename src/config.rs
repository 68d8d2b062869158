//! Configuration module for the huffproc cli tool
use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// How much diagnostic output the codec produces. Never affects the compressed bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum DebugLevel {
    /// No diagnostics
    #[default]
    Off,
    /// A summary line per run
    Low,
    /// The summary plus the code table and every decoded symbol
    High,
}

impl DebugLevel {
    /// The most verbose `log` level this debug level produces.
    pub fn log_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Off => log::LevelFilter::Warn,
            DebugLevel::Low => log::LevelFilter::Info,
            DebugLevel::High => log::LevelFilter::Trace,
        }
    }
}

/// Compress and decompress files with Huffman coding
#[derive(Parser, Debug)]
#[command(name = "huffproc")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Diagnostic output level
    #[arg(short, long, global = true, value_enum, default_value_t = DebugLevel::Off)]
    pub debug: DebugLevel,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress FILE into FILE.huff
    Huff {
        file_path: PathBuf,

        /// Write the compressed stream here instead
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decompress FILE.huff into out_FILE
    Puff {
        file_path: PathBuf,

        /// Write the restored bytes here instead
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Config {
    /// Builds a new Config struct from the provided arguments
    ///
    /// # Arguments
    ///
    /// * `args` - An iterator of arguments passed into the cli tool, program name first
    ///
    /// # Errors
    ///
    /// * Returns a `clap::Error` if a command is missing or unknown, or an option is invalid
    pub fn build<I, T>(args: I) -> Result<Config, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Config::try_parse_from(args)
    }
}
