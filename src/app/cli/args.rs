//! Command-line arguments
//!
//! Global flags cover logging and configuration discovery; everything else
//! hangs off a subcommand.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "tagvcr")]
#[command(about = "RFID tag triggered video playback")]
#[command(version)]
pub struct Args {
    /// Configuration file path (default: tagvcr.toml if present)
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Force color output on
    #[arg(long = "color")]
    pub color: bool,

    /// Force color output off
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the scan loop, resolving detected tags to playback targets
    Run,
    /// Add or overwrite a tag-to-video mapping
    Add {
        /// Tag identifier as printed by the scanner
        tag: String,
        /// Playback target, e.g. a video file path
        target: String,
    },
    /// Remove a tag mapping
    Remove {
        /// Tag identifier to remove
        tag: String,
    },
    /// List configured mappings
    List,
    /// Probe the scanner hardware and report connection status
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_subcommand() {
        let args = Args::parse_from(["tagvcr", "run"]);
        assert!(matches!(args.command, Command::Run));
    }

    #[test]
    fn test_parse_add_subcommand() {
        let args = Args::parse_from(["tagvcr", "add", "04A1B2C3", "/videos/a.mp4"]);
        match args.command {
            Command::Add { tag, target } => {
                assert_eq!(tag, "04A1B2C3");
                assert_eq!(target, "/videos/a.mp4");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::parse_from([
            "tagvcr",
            "--config-file",
            "custom.toml",
            "--log-level",
            "debug",
            "list",
        ]);
        assert_eq!(args.config_file, Some(PathBuf::from("custom.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(matches!(args.command, Command::List));
    }

    #[test]
    fn test_color_flags_conflict() {
        let result = Args::try_parse_from(["tagvcr", "--color", "--no-color", "list"]);
        assert!(result.is_err());
    }
}
