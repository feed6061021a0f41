//! Helpers that populate a window-system framebuffer with software buffers.
//!
//! Drivers without hardware storage for some (or all) channels call these
//! once after creating the framebuffer; from then on the buffers are managed
//! through the attachment table like any other.
//!
//! Each helper validates its bit depths before touching the table and
//! creates every buffer before attaching any, so a failure leaves the
//! attachments as they were. `add_soft_renderbuffers` checks every depth up
//! front and clears the slots it filled if a later helper fails.

use novade_core::config::VisualConfig;
use novade_renderbuffer::{copy_soft_alpha, new_alpha_renderbuffer, InternalFormat, Renderbuffer, RenderbufferRef};
use tracing::{debug, warn};

use crate::attachment::{BufferIndex, BufferMask, MAX_AUX_BUFFERS};
use crate::error::{FramebufferError, Result};
use crate::framebuffer::Framebuffer;
use crate::visual::Visual;

const MAX_COLOR_BITS: u32 = 16;
const MAX_ALPHA_BITS: u32 = 8;
const MAX_DEPTH_BITS: u32 = 32;
const MAX_STENCIL_BITS: u32 = 16;
const MAX_ACCUM_BITS: u32 = 16;
/// Bits per channel actually kept by 8-bit stores.
const STORED_BITS: u32 = 8;

/// Which kinds of software buffer [`Framebuffer::add_soft_renderbuffers`]
/// should create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoftBuffers {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
    pub accum: bool,
    /// Wrap each colour buffer with a synthesized alpha channel.
    pub alpha: bool,
    pub aux: bool,
}

impl SoftBuffers {
    /// Everything the configured visual asks for.
    pub fn from_config(config: &VisualConfig) -> Self {
        Self {
            color: true,
            depth: config.depth_bits > 0,
            stencil: config.stencil_bits > 0,
            accum: config.accum_red_bits > 0 && config.accum_green_bits > 0 && config.accum_blue_bits > 0,
            alpha: config.software_alpha,
            aux: config.aux_buffers > 0,
        }
    }
}

fn check_bits(buffer: &'static str, bits: u32, max: u32) -> Result<()> {
    if bits > max {
        return Err(FramebufferError::UnsupportedBitDepth { buffer, bits, max });
    }
    Ok(())
}

fn warn_if_truncated(buffer: &'static str, bits: u32) {
    if bits > STORED_BITS {
        warn!(buffer, bits, stored = STORED_BITS, "Software buffer keeps fewer bits than requested");
    }
}

/// Runs every check `add_soft_renderbuffers` needs before it touches the
/// attachment table.
fn check_soft_buffers(visual: &Visual, buffers: SoftBuffers) -> Result<()> {
    if buffers.color {
        assert!(
            visual.red_bits == visual.green_bits && visual.red_bits == visual.blue_bits,
            "colour channels of the visual differ in depth"
        );
        check_bits("color", visual.red_bits, MAX_COLOR_BITS)?;
        if !buffers.alpha {
            check_bits("color alpha", visual.alpha_bits, MAX_COLOR_BITS)?;
        }
    }
    if buffers.depth {
        assert!(visual.depth_bits > 0, "visual has no depth bits");
        check_bits("depth", visual.depth_bits, MAX_DEPTH_BITS)?;
    }
    if buffers.stencil {
        assert!(visual.stencil_bits > 0, "visual has no stencil bits");
        check_bits("stencil", visual.stencil_bits, MAX_STENCIL_BITS)?;
    }
    if buffers.accum {
        assert!(
            visual.accum_red_bits > 0 && visual.accum_green_bits > 0 && visual.accum_blue_bits > 0,
            "visual has no accumulation bits"
        );
        for bits in [
            visual.accum_red_bits,
            visual.accum_green_bits,
            visual.accum_blue_bits,
            visual.accum_alpha_bits,
        ] {
            check_bits("accum", bits, MAX_ACCUM_BITS)?;
        }
    }
    if buffers.aux {
        assert!(visual.aux_buffers > 0, "visual has no aux buffers");
        assert!(
            visual.aux_buffers as usize <= MAX_AUX_BUFFERS,
            "{} aux buffers requested, at most {} supported",
            visual.aux_buffers,
            MAX_AUX_BUFFERS
        );
        check_bits("aux", visual.red_bits, MAX_COLOR_BITS)?;
    }
    if buffers.alpha {
        assert!(visual.alpha_bits > 0, "visual has no alpha bits");
        check_bits("alpha", visual.alpha_bits, MAX_ALPHA_BITS)?;
        if buffers.color {
            // Synthesized alpha only wraps 8-bit colour buffers.
            check_bits("alpha color", visual.red_bits, STORED_BITS)?;
        }
    }
    Ok(())
}

impl Framebuffer {
    /// Colour buffers the visual implies: front-left always, back-left when
    /// double-buffered, the right pair when stereo.
    pub fn window_color_buffers(&self) -> BufferMask {
        let visual = self.visual();
        let mut mask = BufferMask::FRONT_LEFT;
        mask.set(BufferMask::BACK_LEFT, visual.double_buffer);
        mask.set(BufferMask::FRONT_RIGHT, visual.stereo);
        mask.set(BufferMask::BACK_RIGHT, visual.stereo && visual.double_buffer);
        mask
    }

    /// Creates an anonymous software buffer sized to the framebuffer.
    fn new_soft_buffer(&self, internal_format: InternalFormat) -> Result<RenderbufferRef> {
        let rb = Renderbuffer::new_soft(0, internal_format)?;
        rb.alloc_storage(self.width(), self.height())?;
        Ok(rb)
    }

    fn assert_empty(&self, index: BufferIndex) {
        assert!(
            self.renderbuffer(index).is_none(),
            "{} slot of framebuffer {} is already occupied",
            index,
            self.name()
        );
    }

    /// Adds one colour buffer per selected slot.
    ///
    /// Up to 8 bits per channel uses 4x8 storage when `alpha_bits > 0` and
    /// 3x8 otherwise; 9 to 16 bits uses 4x16 storage.
    pub fn add_color_renderbuffers(&mut self, rgb_bits: u32, alpha_bits: u32, buffers: BufferMask) -> Result<()> {
        check_bits("color", rgb_bits, MAX_COLOR_BITS)?;
        check_bits("color alpha", alpha_bits, MAX_COLOR_BITS)?;

        let internal_format = if rgb_bits <= STORED_BITS {
            if alpha_bits > 0 {
                InternalFormat::Rgba8
            } else {
                InternalFormat::Rgb8
            }
        } else {
            InternalFormat::Rgba16
        };
        if rgb_bits <= STORED_BITS {
            warn_if_truncated("color alpha", alpha_bits);
        }

        let mut created = Vec::new();
        for index in buffers.slots() {
            self.assert_empty(index);
            created.push((index, self.new_soft_buffer(internal_format)?));
        }
        for (index, rb) in created {
            self.add_renderbuffer(index, &rb);
        }
        debug!(rgb_bits, alpha_bits, ?buffers, %internal_format, "Added software colour buffers");
        Ok(())
    }

    /// Replaces each selected colour buffer with a wrapper that keeps alpha
    /// in software.
    ///
    /// # Panics
    ///
    /// On user-created framebuffers, when a selected slot has no colour
    /// buffer, or when that buffer already synthesizes alpha.
    pub fn add_alpha_renderbuffers(&mut self, alpha_bits: u32, buffers: BufferMask) -> Result<()> {
        assert_eq!(self.name(), 0, "software alpha is only for window-system framebuffers");
        check_bits("alpha", alpha_bits, MAX_ALPHA_BITS)?;

        let mut wrappers = Vec::new();
        for index in buffers.slots() {
            let inner = match self.renderbuffer(index) {
                Some(rb) => rb,
                None => panic!("software alpha needs an existing {} colour buffer", index),
            };
            wrappers.push((index, new_alpha_renderbuffer(inner)?));
        }
        for (index, wrapper) in wrappers {
            self.add_renderbuffer(index, &wrapper);
        }
        debug!(alpha_bits, ?buffers, "Added software alpha buffers");
        Ok(())
    }

    /// Adds a depth buffer: 16-bit cells up to 16 bits, 24 significant bits
    /// in 32-bit cells up to 24, full 32-bit cells beyond.
    pub fn add_depth_renderbuffer(&mut self, depth_bits: u32) -> Result<()> {
        check_bits("depth", depth_bits, MAX_DEPTH_BITS)?;
        self.assert_empty(BufferIndex::Depth);

        let internal_format = match depth_bits {
            0..=16 => InternalFormat::DepthComponent16,
            17..=24 => InternalFormat::DepthComponent24,
            _ => InternalFormat::DepthComponent32,
        };
        let rb = self.new_soft_buffer(internal_format)?;
        self.add_renderbuffer(BufferIndex::Depth, &rb);
        debug!(depth_bits, %internal_format, "Added software depth buffer");
        Ok(())
    }

    /// Adds an 8-bit stencil buffer.
    pub fn add_stencil_renderbuffer(&mut self, stencil_bits: u32) -> Result<()> {
        check_bits("stencil", stencil_bits, MAX_STENCIL_BITS)?;
        self.assert_empty(BufferIndex::Stencil);
        warn_if_truncated("stencil", stencil_bits);

        let rb = self.new_soft_buffer(InternalFormat::StencilIndex8)?;
        self.add_renderbuffer(BufferIndex::Stencil, &rb);
        debug!(stencil_bits, "Added software stencil buffer");
        Ok(())
    }

    /// Adds a signed 4x16 accumulation buffer.
    pub fn add_accum_renderbuffer(
        &mut self,
        red_bits: u32,
        green_bits: u32,
        blue_bits: u32,
        alpha_bits: u32,
    ) -> Result<()> {
        for bits in [red_bits, green_bits, blue_bits, alpha_bits] {
            check_bits("accum", bits, MAX_ACCUM_BITS)?;
        }
        self.assert_empty(BufferIndex::Accum);

        let rb = self.new_soft_buffer(InternalFormat::Rgba16Snorm)?;
        self.add_renderbuffer(BufferIndex::Accum, &rb);
        debug!(red_bits, green_bits, blue_bits, alpha_bits, "Added software accumulation buffer");
        Ok(())
    }

    /// Adds `count` 4x8 auxiliary colour buffers starting at aux0.
    ///
    /// `color_bits` up to 16 is accepted so aux buffers can follow a deep
    /// primary colour buffer; anything above 8 is stored in 8 bits with a
    /// warning instead of being rejected outright.
    ///
    /// # Panics
    ///
    /// If `count` exceeds [`MAX_AUX_BUFFERS`].
    pub fn add_aux_renderbuffers(&mut self, color_bits: u32, count: usize) -> Result<()> {
        check_bits("aux", color_bits, MAX_COLOR_BITS)?;
        assert!(
            count <= MAX_AUX_BUFFERS,
            "{} aux buffers requested, at most {} supported",
            count,
            MAX_AUX_BUFFERS
        );
        warn_if_truncated("aux", color_bits);

        let mut created = Vec::new();
        for i in 0..count {
            let Some(index) = BufferIndex::aux(i) else {
                unreachable!("aux index bounded by MAX_AUX_BUFFERS");
            };
            self.assert_empty(index);
            created.push((index, self.new_soft_buffer(InternalFormat::Rgba8)?));
        }
        for (index, rb) in created {
            self.add_renderbuffer(index, &rb);
        }
        debug!(color_bits, count, "Added software aux buffers");
        Ok(())
    }

    /// Creates every requested kind of software buffer from the visual.
    ///
    /// Alpha wrapping happens last, over 3x8 colour buffers. Every bit depth
    /// is checked before anything is created, and when a later allocation
    /// fails the slots filled by this call are cleared again, so an error
    /// leaves the attachments as they were.
    ///
    /// # Errors
    ///
    /// [`FramebufferError::UnsupportedBitDepth`] for any depth above its
    /// ceiling, including synthesized alpha over colour deeper than 8 bits.
    /// [`FramebufferError::Renderbuffer`] when an allocation fails.
    ///
    /// # Panics
    ///
    /// When the visual cannot describe a requested buffer: unequal colour
    /// depths, a zero depth for a requested depth, stencil, accumulation,
    /// aux or alpha buffer, or more aux buffers than [`MAX_AUX_BUFFERS`].
    pub fn add_soft_renderbuffers(&mut self, buffers: SoftBuffers) -> Result<()> {
        let visual = *self.visual();
        check_soft_buffers(&visual, buffers)?;

        let empty_before: Vec<BufferIndex> = BufferIndex::ALL
            .into_iter()
            .filter(|&index| self.renderbuffer(index).is_none())
            .collect();
        let result = self.attach_soft_renderbuffers(&visual, buffers);
        if let Err(err) = &result {
            warn!(framebuffer = self.name(), error = %err, "Software buffer setup failed, clearing new attachments");
            for index in empty_before {
                self.remove_renderbuffer(index);
            }
        }
        result
    }

    fn attach_soft_renderbuffers(&mut self, visual: &Visual, buffers: SoftBuffers) -> Result<()> {
        let color_buffers = self.window_color_buffers();
        if buffers.color {
            let alpha_bits = if buffers.alpha { 0 } else { visual.alpha_bits };
            self.add_color_renderbuffers(visual.red_bits, alpha_bits, color_buffers)?;
        }
        if buffers.depth {
            self.add_depth_renderbuffer(visual.depth_bits)?;
        }
        if buffers.stencil {
            self.add_stencil_renderbuffer(visual.stencil_bits)?;
        }
        if buffers.accum {
            self.add_accum_renderbuffer(
                visual.accum_red_bits,
                visual.accum_green_bits,
                visual.accum_blue_bits,
                visual.accum_alpha_bits,
            )?;
        }
        if buffers.aux {
            self.add_aux_renderbuffers(visual.red_bits, visual.aux_buffers as usize)?;
        }
        if buffers.alpha {
            // Wrappers are all built before any is attached, and attaching
            // cannot fail, so pre-existing colour buffers are never left
            // half-wrapped.
            self.add_alpha_renderbuffers(visual.alpha_bits, color_buffers)?;
        }
        Ok(())
    }

    /// Copies synthesized alpha from back to front buffers, left and right,
    /// wherever both are attached.
    pub fn copy_soft_alpha_renderbuffers(&self) {
        for (front, back) in [
            (BufferIndex::FrontLeft, BufferIndex::BackLeft),
            (BufferIndex::FrontRight, BufferIndex::BackRight),
        ] {
            if let (Some(front), Some(back)) = (self.renderbuffer(front), self.renderbuffer(back)) {
                copy_soft_alpha(front, back);
            }
        }
    }
}
