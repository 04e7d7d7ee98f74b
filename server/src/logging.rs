//! Tracing subscriber setup: console output plus daily-rotated log files.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_FILTER: &str = "docintel=info,docintel_server=info,tower_http=info";

/// Guards that flush the file writers when dropped. Keep them alive for the
/// lifetime of the process.
pub struct LogGuards {
    _app: WorkerGuard,
    _errors: WorkerGuard,
}

/// Installs the global subscriber. `log` records from the library are
/// bridged into tracing. `RUST_LOG` overrides the default filter.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<LogGuards> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (app_writer, app_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "app.log"));
    let (error_writer, error_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "error.log"));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(app_writer),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(error_writer)
                .with_filter(LevelFilter::ERROR),
        );

    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(LogGuards {
        _app: app_guard,
        _errors: error_guard,
    })
}
