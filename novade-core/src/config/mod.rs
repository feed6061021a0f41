//! Configuration management.
//!
//! - [`types`]: the schema ([`CoreConfig`], [`LoggingConfig`], [`VisualConfig`]).
//! - [`defaults`]: values used for fields missing from the TOML source.
//! - [`loader`]: [`ConfigLoader`], which reads, parses and validates.

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{CoreConfig, LoggingConfig, VisualConfig};
