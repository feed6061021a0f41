//! The pixel layout a window-system framebuffer was created with.

use novade_core::config::VisualConfig;

/// Channel depths and buffer layout of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visual {
    pub red_bits: u32,
    pub green_bits: u32,
    pub blue_bits: u32,
    pub alpha_bits: u32,
    pub depth_bits: u32,
    pub stencil_bits: u32,
    pub accum_red_bits: u32,
    pub accum_green_bits: u32,
    pub accum_blue_bits: u32,
    pub accum_alpha_bits: u32,
    pub aux_buffers: u32,
    pub double_buffer: bool,
    pub stereo: bool,
}

impl Default for Visual {
    fn default() -> Self {
        Self::from(&VisualConfig::default())
    }
}

impl From<&VisualConfig> for Visual {
    fn from(config: &VisualConfig) -> Self {
        Self {
            red_bits: config.red_bits,
            green_bits: config.green_bits,
            blue_bits: config.blue_bits,
            alpha_bits: config.alpha_bits,
            depth_bits: config.depth_bits,
            stencil_bits: config.stencil_bits,
            accum_red_bits: config.accum_red_bits,
            accum_green_bits: config.accum_green_bits,
            accum_blue_bits: config.accum_blue_bits,
            accum_alpha_bits: config.accum_alpha_bits,
            aux_buffers: config.aux_buffers,
            double_buffer: config.double_buffer,
            stereo: config.stereo,
        }
    }
}
