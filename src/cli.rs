// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `corec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "corec",
    version,
    about = "Run a pipeline of shell steps, resolving their inputs on demand.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Corec.toml` in the current working directory. A missing
    /// file means "use the defaults". Scripts started by corec inherit this
    /// through `COREC_CONFIG`.
    #[arg(long, value_name = "PATH", env = "COREC_CONFIG", default_value = "Corec.toml", global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `COREC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start a full run: reset locks and progress, ask for missing inputs
    /// and produce every requested output.
    Init {
        /// Walk the pipeline without running any script.
        #[arg(long)]
        mock: bool,

        /// Keep going when a script exits with a non-zero code.
        #[arg(long)]
        ignore_return_code: bool,
    },

    /// Run one step, asking for any of its inputs that are not set.
    Step {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Run a tool's installation script.
    Requires {
        #[arg(value_name = "TOOL")]
        tool: String,
    },

    /// Store a parameter value.
    Set {
        #[arg(value_name = "PARAMETER")]
        parameter: String,

        #[arg(value_name = "VALUE")]
        value: String,

        /// Copy the value of PARAMETER into a parameter named VALUE instead.
        #[arg(long)]
        merge: bool,
    },

    /// Print a parameter value, or `COREC_UNSET`.
    Get {
        #[arg(value_name = "PARAMETER")]
        parameter: String,
    },

    /// Set an advisory lock.
    Lock {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Release an advisory lock.
    Unlock {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Print the active locks.
    Locks,

    /// Print the live progress trail.
    Progress,

    /// Add a file (if CONTENT names one) or a line of text to the run report.
    Report {
        #[arg(value_name = "CONTENT")]
        content: String,
    },

    /// Parse + validate the pipeline and print it, without running anything.
    Check,
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
