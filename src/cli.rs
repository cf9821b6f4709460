//! CLI arguments and subcommands for proc-cache-inspector.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "proc-cache-inspector",
    about = "Ranked live view of per-process CPU, resident memory and executable page-cache impact",
    long_about = "Ranked live view of per-process CPU, resident memory and executable \
                  page-cache impact.\n\n\
                  Once per sampling interval every live process is probed for its CPU \
                  delta, resident set size and the page-cache residency of its executable \
                  image (one bulk mincore query per process). The three metrics are \
                  combined into a weighted impact score and rendered as a ranked table.",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Sampling interval in seconds
    #[arg(short = 'i', long)]
    pub interval_secs: Option<u64>,

    /// Number of ranked processes to display
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Maximum number of processes to scan per round
    #[arg(long)]
    pub max_processes: Option<usize>,

    /// Proc filesystem root
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Parallel probing threads (0 = auto)
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Do not clear the screen between rounds
    #[arg(long)]
    pub no_clear: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate system requirements
    Check {
        /// Check /proc filesystem readability
        #[arg(long)]
        proc: bool,

        /// Probe this binary's own executable for page-cache residency
        #[arg(long)]
        residency: bool,

        /// Check all system requirements
        #[arg(long)]
        all: bool,
    },

    /// Generate a configuration file
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },

    /// Run one-shot sampling rounds and print the results
    Test {
        /// Number of sampling rounds
        #[arg(short = 'n', long, default_value_t = 2)]
        rounds: usize,

        /// Show per-process probe details
        #[arg(long)]
        verbose: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_invocation() {
        let args = Args::parse_from(["proc-cache-inspector"]);
        assert!(args.command.is_none());
        assert!(args.interval_secs.is_none());
        assert!(!args.no_clear);
    }

    #[test]
    fn parses_sampling_overrides() {
        let args = Args::parse_from([
            "proc-cache-inspector",
            "-i",
            "5",
            "--top-n",
            "10",
            "--max-processes",
            "128",
            "--no-clear",
        ]);
        assert_eq!(args.interval_secs, Some(5));
        assert_eq!(args.top_n, Some(10));
        assert_eq!(args.max_processes, Some(128));
        assert!(args.no_clear);
    }

    #[test]
    fn parses_test_subcommand() {
        let args = Args::parse_from(["proc-cache-inspector", "test", "-n", "3", "--verbose"]);
        match args.command {
            Some(Commands::Test { rounds, verbose }) => {
                assert_eq!(rounds, 3);
                assert!(verbose);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
