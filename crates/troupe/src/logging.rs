use anyhow::Result;
use std::fs::{self, File};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Builds the filter directive used by both layers, e.g. `warn,troupe=warn`.
pub fn filter_directive(log_level: &tracing::Level) -> String {
    format!("{},troupe={}", log_level.as_str(), log_level.as_str())
}

/// Installs the process-wide `tracing` subscriber.
///
/// Everything at `log_level` and above is written to `log_path` (truncated on
/// each call) and, when `with_stdout` is set, pretty-printed to stdout as well.
/// Fails if a global subscriber has already been installed.
pub fn setup_global_logging(
    log_path: impl AsRef<Path>,
    log_level: &tracing::Level,
    with_stdout: bool,
) -> Result<()> {
    let log_path = log_path.as_ref();

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let directive = filter_directive(log_level);

    let file = File::create(log_path)?;
    let file_writer = std::sync::Mutex::new(file).with_max_level(tracing::Level::TRACE);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(false)
        .with_filter(EnvFilter::builder().parse(&directive)?);

    if with_stdout {
        let stdout_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_thread_ids(true)
            .with_target(true)
            .with_ansi(true)
            .pretty()
            .with_filter(EnvFilter::builder().parse(&directive)?);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stdout_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    } else {
        tracing_subscriber::registry()
            .with(file_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    }

    Ok(())
}
