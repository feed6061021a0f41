//! Configuration data structures.
//!
//! These structs are populated by deserializing TOML. Missing fields take
//! their values from [`super::defaults`]; unknown fields are rejected via
//! `#[serde(deny_unknown_fields)]`.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults;

/// Configuration settings for the logging subsystem.
///
/// # Examples
///
/// ```
/// use novade_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let toml_str = r#"
/// level = "debug"
/// file_path = "/var/log/novade_renderbuffer.log"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/novade_renderbuffer.log")));
/// assert_eq!(log_config.format, "json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// File logging is disabled when `None`.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json" (case-insensitive).
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Describes the window-system framebuffer a driver wants software buffers
/// for: per-channel bit depths, buffer counts and layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisualConfig {
    #[serde(default = "defaults::default_color_bits")]
    pub red_bits: u32,
    #[serde(default = "defaults::default_color_bits")]
    pub green_bits: u32,
    #[serde(default = "defaults::default_color_bits")]
    pub blue_bits: u32,
    #[serde(default = "defaults::default_zero_bits")]
    pub alpha_bits: u32,
    #[serde(default = "defaults::default_depth_bits")]
    pub depth_bits: u32,
    #[serde(default = "defaults::default_stencil_bits")]
    pub stencil_bits: u32,
    #[serde(default = "defaults::default_zero_bits")]
    pub accum_red_bits: u32,
    #[serde(default = "defaults::default_zero_bits")]
    pub accum_green_bits: u32,
    #[serde(default = "defaults::default_zero_bits")]
    pub accum_blue_bits: u32,
    #[serde(default = "defaults::default_zero_bits")]
    pub accum_alpha_bits: u32,
    /// Number of auxiliary colour buffers.
    #[serde(default = "defaults::default_aux_buffers")]
    pub aux_buffers: u32,
    #[serde(default = "defaults::default_double_buffer")]
    pub double_buffer: bool,
    #[serde(default = "defaults::default_bool_false")]
    pub stereo: bool,
    /// Keep alpha in a separate software buffer wrapped around each RGB
    /// colour buffer. Requires `alpha_bits > 0`.
    #[serde(default = "defaults::default_bool_false")]
    pub software_alpha: bool,
}

impl Default for VisualConfig {
    fn default() -> Self {
        defaults::default_visual_config()
    }
}

/// Root configuration structure.
///
/// ```
/// use novade_core::config::CoreConfig;
///
/// let toml_str = r#"
/// [logging]
/// level = "warn"
///
/// [visual]
/// alpha_bits = 8
/// software_alpha = true
/// "#;
/// let config: CoreConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(config.logging.level, "warn");
/// assert!(config.visual.software_alpha);
/// assert_eq!(config.visual.depth_bits, 24);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_visual_config")]
    pub visual: VisualConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            logging: defaults::default_logging_config(),
            visual: defaults::default_visual_config(),
        }
    }
}
