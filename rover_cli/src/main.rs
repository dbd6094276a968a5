mod cli;
mod error_fmt;
mod logging;
mod rt;
mod run;

use std::path::Path;

use clap::Parser;
use rover_config::Config;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: color-eyre not installed: {e}");
    }
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

/// Config from `path`, or stock settings when the file does not exist.
/// The flag reports the fallback so it can be logged once logging is up.
fn load_config(path: &Path) -> eyre::Result<(Config, bool)> {
    if path.exists() {
        Ok((rover_config::load_file(path)?, false))
    } else {
        Ok((Config::default(), true))
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let (cfg, fell_back) = load_config(&cli.config)?;
    logging::init(cli.log_level.as_deref(), cli.json, &cfg.logging)?;
    if fell_back {
        tracing::info!(path = %cli.config.display(), "config file not found; using defaults");
    }

    match cli.cmd.unwrap_or_default() {
        Commands::Run {
            cycles,
            rt,
            rt_prio,
        } => run::run(&cfg, cycles, rt, rt_prio),
        Commands::SelfCheck => run::self_check(&cfg),
    }
}
