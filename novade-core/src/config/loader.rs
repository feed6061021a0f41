//! Configuration loading.
//!
//! [`ConfigLoader`] parses TOML into a [`CoreConfig`], falls back to the
//! defaults when the file is missing or empty, and validates the result.
//!
//! ```rust,ignore
//! use novade_core::config::ConfigLoader;
//!
//! match ConfigLoader::load_from_path(Path::new("/etc/novade/renderbuffer.toml")) {
//!     Ok(config) => println!("Logging level: {}", config.logging.level),
//!     Err(e) => {
//!         novade_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration loading failed: {}", e);
//!     }
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 2] = ["text", "json"];
/// Synthesized alpha wraps 3x8 colour buffers only.
const SOFTWARE_ALPHA_MAX_COLOR_BITS: u32 = 8;

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses and validates configuration text. Blank text yields the
    /// defaults.
    pub fn load_from_str(content: &str) -> Result<CoreConfig, CoreError> {
        let mut config = if content.trim().is_empty() {
            CoreConfig::default()
        } else {
            toml::from_str(content).map_err(ConfigError::ParseError)?
        };
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Reads, parses and validates the file at `path`. A missing file yields
    /// the validated defaults.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::ReadError`] for read failures other than "not found".
    /// * [`ConfigError::ParseError`] for invalid TOML or unknown fields.
    /// * [`ConfigError::ValidationError`] for unusable values.
    pub fn load_from_path(path: &Path) -> Result<CoreConfig, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "Loading configuration");
                Self::load_from_str(&content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Configuration file not found, using defaults");
                Self::load_from_str("")
            }
            Err(source) => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            }
            .into()),
        }
    }

    /// Normalizes the logging strings to lowercase and checks the visual
    /// description for combinations the software buffers cannot provide.
    pub fn validate_config(config: &mut CoreConfig) -> Result<(), ConfigError> {
        let logging = &mut config.logging;
        logging.level = logging.level.to_lowercase();
        if !VALID_LEVELS.contains(&logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: '{}'. Must be one of: {}",
                logging.level,
                VALID_LEVELS.join(", ")
            )));
        }
        logging.format = logging.format.to_lowercase();
        if !VALID_FORMATS.contains(&logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log format: '{}'. Must be one of: {}",
                logging.format,
                VALID_FORMATS.join(", ")
            )));
        }

        let visual = &config.visual;
        if visual.red_bits != visual.green_bits || visual.red_bits != visual.blue_bits {
            return Err(ConfigError::ValidationError(format!(
                "Colour channels must share one bit depth (red {}, green {}, blue {})",
                visual.red_bits, visual.green_bits, visual.blue_bits
            )));
        }
        if visual.software_alpha && visual.alpha_bits == 0 {
            return Err(ConfigError::ValidationError(
                "software_alpha requires alpha_bits > 0".to_string(),
            ));
        }
        if visual.software_alpha && visual.red_bits > SOFTWARE_ALPHA_MAX_COLOR_BITS {
            return Err(ConfigError::ValidationError(format!(
                "software_alpha requires colour channels of at most {} bits (got {})",
                SOFTWARE_ALPHA_MAX_COLOR_BITS, visual.red_bits
            )));
        }
        Ok(())
    }
}
