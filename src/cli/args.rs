//! Command line argument parsing for the hanseg CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// hanseg - Chinese segmentation with pluggable strategies
#[derive(Parser, Debug, Clone)]
#[command(name = "hanseg")]
#[command(about = "Segment Chinese text with pluggable segmentation strategies")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct HansegArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HansegArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Segment text into tokens
    Segment(SegmentArgs),

    /// Show the effective configuration and the models a tokenizer loads
    Inspect(TokenizerArgs),

    /// List the tokenizer types
    Kinds,
}

/// Which tokenizer to build and where its models live.
#[derive(Parser, Debug, Clone)]
pub struct TokenizerArgs {
    /// Tokenizer type (see `hanseg kinds`)
    #[arg(short, long, default_value = "hanlp")]
    pub kind: String,

    /// Settings file (a flat JSON object)
    #[arg(short, long, value_name = "SETTINGS_FILE")]
    pub settings: Option<PathBuf>,

    /// Additional settings, overriding the settings file
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Directory holding the models
    #[arg(long, env = "HANSEG_MODEL_ROOT", value_name = "DIR")]
    pub model_root: Option<PathBuf>,

    /// Host configuration directory (defaults to the settings file's directory)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

/// Arguments for segmenting text
#[derive(Parser, Debug, Clone)]
pub struct SegmentArgs {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Text to segment; lines are read from stdin when omitted
    #[arg(value_name = "TEXT")]
    pub text: Vec<String>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_args() {
        let args = HansegArgs::try_parse_from([
            "hanseg",
            "-f",
            "json",
            "segment",
            "--kind",
            "hanlp_crf",
            "--set",
            "enable_index_mode=true",
            "北京欢迎你",
        ])
        .unwrap();

        assert_eq!(args.output_format, OutputFormat::Json);
        if let Command::Segment(segment) = args.command {
            assert_eq!(segment.tokenizer.kind, "hanlp_crf");
            assert_eq!(segment.tokenizer.overrides, vec!["enable_index_mode=true"]);
            assert_eq!(segment.text, vec!["北京欢迎你"]);
        } else {
            panic!("Expected segment command");
        }
    }

    #[test]
    fn test_default_kind() {
        let args = HansegArgs::try_parse_from(["hanseg", "inspect"]).unwrap();
        if let Command::Inspect(inspect) = args.command {
            assert_eq!(inspect.kind, "hanlp");
            assert!(inspect.settings.is_none());
        } else {
            panic!("Expected inspect command");
        }
    }

    #[test]
    fn test_verbosity() {
        let args = HansegArgs::try_parse_from(["hanseg", "-vv", "kinds"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = HansegArgs::try_parse_from(["hanseg", "-q", "-vv", "kinds"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
