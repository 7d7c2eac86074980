use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE: &str = "geo-dashboard.log";
pub const LOG_ENV: &str = "GEO_LOG";

/// Log to `<data_dir>/geo-dashboard.log`, and also to stderr when not
/// running the full-screen UI. Level comes from `GEO_LOG` (default `info`).
///
/// Keep the returned guard alive for the life of the process or buffered
/// lines are lost.
pub fn init(data_dir: &Path, to_stderr: bool) -> WorkerGuard {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_appender = tracing_appender::rolling::never(data_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .compact()
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(stderr_layer)
        .try_init();

    if installed.is_ok() {
        info!(dir = %data_dir.display(), "logging to {}", LOG_FILE);
    }
    guard
}
