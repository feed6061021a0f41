//! Error handling for the NovaDE core layer.
//!
//! The main error type for this crate is [`CoreError`], which wraps the more
//! specific [`ConfigError`] and [`LoggingError`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type shared by the configuration and logging entry points.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while installing the global tracing subscriber.
    #[error("Logging Error: {0}")]
    Logging(#[from] LoggingError),

    /// Filesystem failures outside configuration reads, e.g. creating the
    /// directory of a log file.
    #[error("Filesystem Error: {message} (Path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),
}

/// Error type for configuration-related operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid TOML for [`crate::config::CoreConfig`].
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration parsed but holds values the renderbuffer layer
    /// cannot use.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Error type for logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),

    /// The configured level could not be turned into a filter.
    #[error("Failed to set log filter: {0}")]
    FilterError(String),

    #[error("Logging I/O error: {0}")]
    IoError(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::ErrorKind;

    #[test]
    fn test_core_error_config_variant() {
        let core_err = CoreError::from(ConfigError::ValidationError("red bits differ".to_string()));
        assert_eq!(
            core_err.to_string(),
            "Configuration Error: Configuration validation failed: red bits differ"
        );
        assert!(core_err.source().is_some());
    }

    #[test]
    fn test_core_error_logging_variant() {
        let core_err = CoreError::from(LoggingError::FilterError("bogus".to_string()));
        assert_eq!(core_err.to_string(), "Logging Error: Failed to set log filter: bogus");
    }

    #[test]
    fn test_filesystem_error_keeps_source() {
        let err = CoreError::Filesystem {
            message: "Failed to create log directory".to_string(),
            path: PathBuf::from("/nonexistent/logs"),
            source: io::Error::new(ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Filesystem Error: Failed to create log directory (Path: \"/nonexistent/logs\")"
        );
        assert_eq!(err.source().unwrap().to_string(), "denied");
    }

    #[test]
    fn test_config_read_error_display() {
        let err = ConfigError::ReadError {
            path: PathBuf::from("/etc/novade/renderbuffer.toml"),
            source: io::Error::new(ErrorKind::Other, "boom"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read configuration file from \"/etc/novade/renderbuffer.toml\""
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_parse_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err = ConfigError::from(toml_err);
        assert!(err.to_string().starts_with("Failed to parse configuration file:"));
    }
}
