//! Logging setup built on the `tracing` ecosystem.
//!
//! Library crates only emit `tracing` events. Binaries and tests choose a
//! subscriber here: [`init_minimal_logging`] for early startup or tests, and
//! [`init_logging`] for the configured console plus optional file output.

use std::fs;
use std::io::stdout;
use std::path::Path;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::{CoreError, LoggingError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the non-blocking file writer alive so buffered lines get flushed.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Installs a `stderr` subscriber filtered by `RUST_LOG` (default "info").
///
/// An already-installed global subscriber is left in place.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

fn level_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(LoggingError::FilterError(format!("Invalid log level in config: {}", other))),
    };
    EnvFilter::try_new(level.to_string()).map_err(|e| LoggingError::FilterError(e.to_string()))
}

fn is_json(format: &str) -> Result<bool, LoggingError> {
    match format.to_lowercase().as_str() {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(LoggingError::InitializationFailure(format!(
            "Invalid log format in config: {}",
            other
        ))),
    }
}

/// Daily-rolling file layer writing through a non-blocking worker.
fn create_file_layer(log_path: &Path, json: bool) -> Result<(BoxedLayer, WorkerGuard), CoreError> {
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(|source| CoreError::Filesystem {
        message: "Failed to create log directory".to_string(),
        path: directory.to_path_buf(),
        source,
    })?;

    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("renderbuffer.log"));
    let appender = tracing_appender::rolling::daily(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = if json {
        fmt::layer().json().with_writer(writer).with_ansi(false).boxed()
    } else {
        fmt::layer().with_writer(writer).with_ansi(false).boxed()
    };
    Ok((layer, guard))
}

/// Installs the global subscriber described by `config`.
///
/// With `is_reload` set, a subscriber that is already installed is not an
/// error; the file writer guard is still swapped for the new one.
///
/// # Errors
///
/// [`CoreError::Logging`] for an invalid level or format, or when a
/// subscriber is already installed and `is_reload` is false.
/// [`CoreError::Filesystem`] when the log directory cannot be created.
pub fn init_logging(config: &LoggingConfig, is_reload: bool) -> Result<(), CoreError> {
    let json = is_json(&config.format)?;

    let console_layer = if json {
        fmt::layer()
            .json()
            .with_writer(stdout)
            .with_ansi(false)
            .with_filter(level_filter(&config.level)?)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(stdout)
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_filter(level_filter(&config.level)?)
            .boxed()
    };

    let mut layers: Vec<BoxedLayer> = vec![console_layer];
    let mut file_guard = None;
    if let Some(log_path) = &config.file_path {
        let (file_layer, guard) = create_file_layer(log_path, json)?;
        layers.push(file_layer.with_filter(level_filter(&config.level)?).boxed());
        file_guard = Some(guard);
    }

    let result = Registry::default().with(layers).try_init();

    match LOG_WORKER_GUARD.lock() {
        Ok(mut slot) => *slot = file_guard,
        Err(e) => eprintln!("[ERROR] Failed to update log worker guard: {}", e),
    }

    match result {
        Ok(()) => Ok(()),
        Err(_) if is_reload => {
            eprintln!("[INFO] Logging reload requested; the installed subscriber stays active.");
            Ok(())
        }
        Err(e) => Err(LoggingError::InitializationFailure(format!(
            "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
            e
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(level: &str, format: &str, file_path: Option<std::path::PathBuf>) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            file_path,
            format: format.to_string(),
        }
    }

    #[test]
    fn test_init_minimal_logging_is_idempotent() {
        init_minimal_logging();
        init_minimal_logging();
        tracing::info!("minimal logging initialized twice");
    }

    #[test]
    fn test_level_filter_rejects_unknown_level() {
        let err = level_filter("supertrace").unwrap_err();
        assert!(matches!(err, LoggingError::FilterError(msg) if msg.contains("supertrace")));
        assert!(level_filter("WARN").is_ok());
    }

    #[test]
    fn test_init_logging_invalid_format() {
        let err = init_logging(&config("info", "yaml", None), true).unwrap_err();
        match err {
            CoreError::Logging(LoggingError::InitializationFailure(msg)) => {
                assert!(msg.contains("Invalid log format in config: yaml"));
            }
            other => panic!("Unexpected error type: {:?}", other),
        }
    }

    #[test]
    fn test_init_logging_invalid_level() {
        let err = init_logging(&config("loud", "text", None), true).unwrap_err();
        assert!(matches!(err, CoreError::Logging(LoggingError::FilterError(_))));
    }

    #[test]
    fn test_create_file_layer_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("nested/dir/rb.log");
        let (_layer, _guard) = create_file_layer(&log_path, true).unwrap();
        assert!(log_path.parent().unwrap().exists());
    }

    #[test]
    fn test_reload_tolerates_existing_subscriber_and_swaps_guard() {
        init_minimal_logging();
        let temp_dir = TempDir::new().unwrap();

        init_logging(&config("debug", "text", Some(temp_dir.path().join("a.log"))), true).unwrap();
        assert!(LOG_WORKER_GUARD.lock().unwrap().is_some());

        init_logging(&config("info", "json", None), true).unwrap();
        assert!(LOG_WORKER_GUARD.lock().unwrap().is_none());
    }
}
