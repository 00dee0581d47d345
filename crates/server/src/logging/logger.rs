use config::LogConfig;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt};

/// File written inside `write_path`; rotated copies get a numeric suffix.
pub const LOG_FILE_NAME: &str = "logs.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level '{level}': {source}")]
    InvalidLogLevel {
        level: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to create log directory or file appender: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A global logger is already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Keeps the background file writer alive. Buffered lines are flushed when
/// this is dropped, so hold it until shutdown.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// `http` is not a tracing level: it enables request logs on top of `info`.
pub fn filter_directive(level: &str) -> &str {
    if level == "http" { "info,http=debug" } else { level }
}

/// Install the global subscriber described by `config`.
///
/// Console output is always on. With `write` set, the same events also go to
/// `<write_path>/logs.log`, rotated once it reaches `write_max_file_size`
/// and keeping at most `write_max_files` files including the current one.
pub fn init_with_config(config: &LogConfig) -> Result<LogGuard, LoggingError> {
    let filter = EnvFilter::try_new(filter_directive(&config.level)).map_err(|source| {
        LoggingError::InvalidLogLevel {
            level: config.level.clone(),
            source,
        }
    })?;

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config)];
    let mut guard = None;
    if config.write {
        let (writer, file_guard) = file_writer(
            Path::new(&config.write_path),
            config.write_max_file_size,
            config.write_max_files,
        )?;
        layers.push(file_layer(config.json, writer));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(LogGuard { _file: guard })
}

fn console_layer(config: &LogConfig) -> BoxedLayer {
    if config.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(!config.strip_ansi)
            .boxed()
    }
}

fn file_layer(json: bool, writer: NonBlocking) -> BoxedLayer {
    if json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    }
}

fn file_writer(
    dir: &Path,
    max_file_size: u64,
    max_files: usize,
) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    std::fs::create_dir_all(dir)?;
    let path: PathBuf = dir.join(LOG_FILE_NAME);
    // The current file counts towards max_files.
    let appender = BasicRollingFileAppender::new(
        path,
        RollingConditionBasic::new().max_size(max_file_size),
        max_files.saturating_sub(1),
    )?;
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_http_level_maps_to_target_filter() {
        assert_eq!(filter_directive("http"), "info,http=debug");
        assert_eq!(filter_directive("warn"), "warn");
        assert!(EnvFilter::try_new(filter_directive("http")).is_ok());
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LogConfig {
            level: "info,dashboard=loud".to_string(),
            ..LogConfig::default()
        };
        assert!(matches!(
            init_with_config(&config),
            Err(LoggingError::InvalidLogLevel { .. })
        ));
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("logs");

        let (mut writer, guard) = file_writer(&nested, 1024, 3).unwrap();
        writer.write_all(b"hello\n").unwrap();
        drop(guard);

        let written = std::fs::read_to_string(nested.join(LOG_FILE_NAME)).unwrap();
        assert_eq!(written, "hello\n");
    }
}
