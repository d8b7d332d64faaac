use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use mzxic::{ScanRange, TraceSettings, TraceType};

use crate::driver::MZXicerError;

pub const CONFIG_FILE_NAME: &str = "mzxicer.toml";
pub const ENV_PREFIX: &str = "MZXICER_";

fn non_negative_float_f64(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|e| e.to_string())?;
    if value < 0.0 || !value.is_finite() {
        Err(format!("`{s}` is not a non-negative number"))
    } else {
        Ok(value)
    }
}

/// Extract ion chromatograms from mass spectrometry runs.
///
/// Report a run's metadata, or sum the signal inside a ppm window around each
/// mass of a list over every scan and write the traces out as JSON.
#[derive(Parser, Debug)]
#[command(author, version)]
pub struct MZXicer {
    /// The path to write a log file to, in addition to STDERR
    #[arg(short = 'l', long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// A TOML configuration file to read additional `xic` parameters from.
    ///
    /// Configurations are also read from `mzxicer.toml` in the working directory.
    /// Environment variables prefixed with `MZXICER_` will be read too.
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the file level metadata of a run and a summary of its spectra
    Info(InfoArgs),
    /// Extract the ion chromatogram of each mass in a mass list
    Xic(XicArgs),
    /// Print the program version
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// The path to read the input spectra from, or if '-' is passed, read from STDIN
    #[arg()]
    pub input_file: String,

    /// Write the summary as JSON instead of text
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct XicArgs {
    /// The path to read the input spectra from, or if '-' is passed, read from STDIN
    #[arg()]
    pub input_file: String,

    /// A text file with one target mass per line
    #[arg()]
    pub mass_list: PathBuf,

    /// The mass window width around each target, in parts-per-million of the target
    #[arg(value_parser = non_negative_float_f64)]
    pub ppm: f64,

    /// The path to write the JSON traces to, or if '-' is passed, write to STDOUT.
    ///
    /// A path ending in `.gz` is gzip compressed.
    #[arg()]
    pub output_file: PathBuf,

    /// The scan range to extract from, denoted (start?)-(end?)
    #[arg(
        short = 'r',
        long = "scan-range",
        value_parser = ScanRange::from_str,
        value_name = "BEGIN-END",
        long_help = r#"The scan range to extract from, denoted (start?)-(end?)

Scans are numbered by their 0-based index in the run, both ends inclusive.
If a start is not specified, extraction begins from the start of the run.
If an end is not specified, extraction stops at the end of the run.
"#
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_range: Option<ScanRange>,

    /// The MS level of the scans to extract from [default: 1]
    #[arg(
        short = 'm',
        long = "ms-level",
        value_parser = clap::value_parser!(u8).range(1..),
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ms_level: Option<u8>,
}

impl XicArgs {
    /// Layer the configuration files and environment under the values given
    /// on the command line.
    pub fn configure(&self, config_file: Option<&Path>) -> Result<Self, figment::Error> {
        let mut config = Figment::new().merge(Toml::file(CONFIG_FILE_NAME));
        if let Some(path) = config_file {
            config = config.merge(Toml::file_exact(path));
        }
        config
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(self))
            .extract()
    }

    /// Check the options that configuration layers can set without going
    /// through the command line parsers.
    pub fn validate(&self) -> Result<(), MZXicerError> {
        if self.ms_level == Some(0) {
            return Err(MZXicerError::InvalidMSLevel(0));
        }
        if !(self.ppm >= 0.0 && self.ppm.is_finite()) {
            return Err(MZXicerError::InvalidPPM(self.ppm));
        }
        let scan_range = self.scan_range();
        if let (Some(start), Some(end)) = (scan_range.start, scan_range.end) {
            if start > end {
                return Err(MZXicerError::InvertedScanRange(scan_range));
            }
        }
        Ok(())
    }

    pub fn ms_level(&self) -> u8 {
        self.ms_level.unwrap_or(1)
    }

    pub fn scan_range(&self) -> ScanRange {
        self.scan_range.unwrap_or_default()
    }

    pub fn trace_settings(&self) -> TraceSettings {
        TraceSettings::new(self.ms_level(), TraceType::MassRange)
    }
}
