use std::fs::{self, File, OpenOptions};

use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Config;
use crate::error::AppError;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Create the log directory if needed and open the log file for appending
pub fn open_log_file(config: &Config) -> Result<File, AppError> {
    fs::create_dir_all(&config.log_dir).map_err(|e| {
        AppError::Config(format!(
            "cannot create log dir '{}': {}",
            config.log_dir.display(),
            e
        ))
    })?;

    let path = config.log_path();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| AppError::Config(format!("cannot open log file '{}': {}", path.display(), e)))
}

/// Plain-text lines for the log file
pub fn file_layer<S>(writer: NonBlocking) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_writer(writer)
}

/// Install the global subscriber: stdout plus the append-only log file.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the server.
pub fn init(config: &Config) -> Result<WorkerGuard, AppError> {
    let file = open_log_file(config)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brundle=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer(writer))
        .init();

    Ok(guard)
}
