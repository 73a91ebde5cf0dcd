use crate::error::ConfigError;
use crate::settings::{LogFormat, LoggingSettings};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber.
///
/// Console output goes to stderr so that report output on stdout stays clean.
/// `RUST_LOG` takes precedence over the configured level. When a log
/// directory is configured, a daily rolling file is written as well and the
/// returned guard must be held until shutdown to flush it.
pub fn init_logging(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    let (file_layer, guard) = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tickerlens.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let console = fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    match settings.format {
        LogFormat::Full => registry.with(console).try_init(),
        LogFormat::Compact => registry.with(console.compact()).try_init(),
    }
    .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    Ok(guard)
}
