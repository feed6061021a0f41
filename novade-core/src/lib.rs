//! # NovaDE Core Library (`novade-core`)
//!
//! Shared infrastructure for the NovaDE software renderbuffer crates:
//!
//! - **Error Handling**: [`CoreError`] and the specific [`ConfigError`] and
//!   [`LoggingError`] types.
//! - **Configuration Management**: TOML configuration with defaults and
//!   validation through [`ConfigLoader`], including the [`VisualConfig`]
//!   describing which software buffers a window-system framebuffer needs.
//! - **Logging**: subscriber setup on top of `tracing`, with console and
//!   optional non-blocking file output in text or JSON.
//!
//! ```rust,ignore
//! use novade_core::config::ConfigLoader;
//! use novade_core::logging::init_logging;
//! use novade_core::error::CoreError;
//!
//! fn main() -> Result<(), CoreError> {
//!     let config = ConfigLoader::load_from_path(Path::new("renderbuffer.toml"))?;
//!     init_logging(&config.logging, false)?;
//!     tracing::info!("NovaDE renderbuffer layer configured");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigLoader, CoreConfig, LoggingConfig, VisualConfig};
pub use error::{ConfigError, CoreError, LoggingError};
pub use logging::{init_logging, init_minimal_logging};
