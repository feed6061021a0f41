//! Default configuration values.
//!
//! These functions back the `#[serde(default = "...")]` attributes of the
//! configuration structs and their `Default` impls.

use std::path::PathBuf;

use super::types::{LoggingConfig, VisualConfig};

pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_visual_config() -> VisualConfig {
    VisualConfig {
        red_bits: default_color_bits(),
        green_bits: default_color_bits(),
        blue_bits: default_color_bits(),
        alpha_bits: default_zero_bits(),
        depth_bits: default_depth_bits(),
        stencil_bits: default_stencil_bits(),
        accum_red_bits: default_zero_bits(),
        accum_green_bits: default_zero_bits(),
        accum_blue_bits: default_zero_bits(),
        accum_alpha_bits: default_zero_bits(),
        aux_buffers: default_aux_buffers(),
        double_buffer: default_double_buffer(),
        stereo: default_bool_false(),
        software_alpha: default_bool_false(),
    }
}

/// 8 bits per colour channel.
pub(super) fn default_color_bits() -> u32 {
    8
}

pub(super) fn default_zero_bits() -> u32 {
    0
}

pub(super) fn default_depth_bits() -> u32 {
    24
}

pub(super) fn default_stencil_bits() -> u32 {
    8
}

pub(super) fn default_aux_buffers() -> u32 {
    0
}

pub(super) fn default_double_buffer() -> bool {
    true
}

pub(super) fn default_bool_false() -> bool {
    false
}
