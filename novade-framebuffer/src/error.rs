//! Errors surfaced while populating a framebuffer with software buffers.
//!
//! Attachment invariant violations (aliased colour slots, winsys/user name
//! mismatch, double alpha wrapping) panic instead: they are caller bugs.

use novade_renderbuffer::RenderbufferError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FramebufferError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramebufferError {
    /// Allocation or format failure from the renderbuffer layer.
    #[error("Renderbuffer Error: {0}")]
    Renderbuffer(#[from] RenderbufferError),

    /// A helper was asked for more bits per channel than software buffers
    /// can hold. Nothing was attached.
    #[error("Unsupported {buffer} bit depth {bits} (maximum {max})")]
    UnsupportedBitDepth {
        buffer: &'static str,
        bits: u32,
        max: u32,
    },
}
