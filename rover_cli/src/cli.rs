//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "rover", version, about = "Reactive rover controller")]
pub struct Cli {
    /// Path to config TOML; a missing file means stock settings
    #[arg(long, value_name = "FILE", default_value = "etc/rover.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides RUST_LOG
    /// and the config file
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute; runs the behavior loop when omitted
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the behavior loop
    Run {
        /// Stop after this many Advance cycles (each followed by Scan or
        /// Retreat) instead of running forever
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Enable real-time mode (SCHED_FIFO, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux.\n\nAttempts SCHED_FIFO priority and calls mlockall(MCL_CURRENT|MCL_FUTURE) so echo timing and motor pulses are not disturbed by page faults. Usually needs CAP_SYS_NICE and CAP_IPC_LOCK (or root). Failures are logged and the run continues."
        )]
        rt: bool,
        /// SCHED_FIFO priority when --rt is set (clamped to the system range)
        #[arg(long, value_name = "PRIO", requires = "rt")]
        rt_prio: Option<i32>,
    },
    /// Load the config, build the backend, take one reading and print it
    SelfCheck,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Run {
            cycles: None,
            rt: false,
            rt_prio: None,
        }
    }
}
