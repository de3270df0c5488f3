// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `modwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "modwatch",
    version,
    about = "Run prep commands and restart daemons when watched files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(short = 'f', long, value_name = "PATH", default_value = "./modwatch.toml")]
    pub file: String,

    /// Don't watch our own config file.
    #[arg(short = 'c', long)]
    pub noconf: bool,

    /// Ring the terminal bell if any prep command fails.
    #[arg(short = 'b', long)]
    pub bell: bool,

    /// Send prep command output to a desktop notification on failure.
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Run prep commands once and exit.
    #[arg(short = 'p', long)]
    pub prep: bool,

    /// List the default ignore patterns and exit.
    #[arg(short = 'i', long)]
    pub ignores: bool,

    /// Quiet period after the last change before a batch is processed.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub lull_ms: u64,

    /// How long a daemon gets to exit after SIGTERM before it is killed.
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub grace_ms: u64,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MODWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Debug logging, including every change batch.
    #[arg(long)]
    pub debug: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
