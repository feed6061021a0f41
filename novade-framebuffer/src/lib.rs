//! # NovaDE Framebuffer
//!
//! Render targets built from renderbuffers. A [`Framebuffer`] owns a fixed
//! table of attachment slots (four window colour buffers, depth, stencil,
//! accumulation and up to four aux buffers), each holding one counted
//! reference on its [`RenderbufferRef`].
//!
//! The [`soft`] module adds helpers that fill a window-system framebuffer
//! with software buffers for every channel the driver cannot store itself,
//! including alpha synthesized next to a 3-channel colour buffer.

pub mod attachment;
pub mod error;
pub mod framebuffer;
pub mod soft;
pub mod visual;

pub use attachment::{Attachment, AttachmentType, BufferIndex, BufferMask, BUFFER_COUNT, MAX_AUX_BUFFERS};
pub use error::{FramebufferError, Result};
pub use framebuffer::Framebuffer;
pub use soft::SoftBuffers;
pub use visual::Visual;
