use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config_loader::LoggingConfig;

/// Initialise tracing with a non-blocking hourly file appender, optionally
/// mirrored to stdout.
///
/// `RUST_LOG` takes precedence over the configured level. Keep the returned
/// guard alive for the whole program or buffered lines are lost on exit.
pub fn init(config: &LoggingConfig) -> WorkerGuard {
    let _ = std::fs::create_dir_all(&config.log_dir);

    let file_appender = tracing_appender::rolling::hourly(&config.log_dir, format!("{}.log", config.app_name));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder().with_default_directive(config.level().into()).from_env_lossy();

    let file_layer =
        fmt::layer().with_writer(non_blocking).with_target(true).with_thread_ids(true).with_line_number(true).with_ansi(false).compact();

    let stdout_layer = config
        .stdout
        .then(|| fmt::layer().with_writer(io::stdout).with_target(true).with_thread_ids(true).with_line_number(true).with_ansi(true).compact());

    tracing_subscriber::registry().with(env_filter).with(file_layer).with(stdout_layer).init();

    guard
}
