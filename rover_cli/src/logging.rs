//! Tracing subscriber setup: console (pretty or JSON) plus an optional
//! JSON-lines file sink.

use std::path::Path;

use eyre::WrapErr;
use rover_config::Logging;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::FILE_GUARD;

/// Pick the console filter: `--log-level`, then `RUST_LOG`, then the config
/// file, then `info`.
fn console_filter(cli_level: Option<&str>, cfg: &Logging) -> eyre::Result<EnvFilter> {
    if let Some(level) = cli_level {
        return EnvFilter::try_new(level).wrap_err_with(|| format!("invalid --log-level {level}"));
    }
    if let Ok(f) = EnvFilter::try_from_default_env() {
        return Ok(f);
    }
    let level = cfg.level.as_deref().unwrap_or("info");
    EnvFilter::try_new(level).wrap_err_with(|| format!("invalid logging.level {level}"))
}

pub fn init(cli_level: Option<&str>, json: bool, cfg: &Logging) -> eyre::Result<()> {
    let filter = console_filter(cli_level, cfg)?;

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
            .boxed()
    };

    let file = match cfg.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let dir = dir.unwrap_or_else(|| Path::new("."));
            let name = path.file_name().unwrap_or_else(|| "rover.log".as_ref());
            let appender = match cfg.rotation.as_deref() {
                Some("daily") => rolling::daily(dir, name),
                Some("hourly") => rolling::hourly(dir, name),
                _ => rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(EnvFilter::new("debug"))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
