//! # Novade Renderbuffer
//!
//! Software-backed pixel buffers for rendering surfaces (colour, depth,
//! stencil, accumulation and auxiliary channels) that no hardware path owns.
//!
//! * [`format`] names the logical formats callers request and the concrete
//!   pixel layouts they resolve to.
//! * [`codec`] holds the static per-format accessor table.
//! * [`Storage`] owns pixel memory; [`SoftRenderbuffer`] exposes it through
//!   the [`RenderbufferStorage`] contract.
//! * [`Renderbuffer`] adds identity and reference counting on top of any
//!   contract implementation, software or hardware.
//! * [`AlphaRenderbuffer`] synthesizes an alpha channel over an RGB buffer.

pub mod alpha;
pub mod buffer;
pub mod codec;
pub mod error;
pub mod format;
pub mod soft;
pub mod storage;

pub use alpha::{copy_soft_alpha, new_alpha_renderbuffer, AlphaRenderbuffer};
pub use buffer::{reference_renderbuffer, Renderbuffer, RenderbufferRef, RenderbufferStorage};
pub use error::{RenderbufferError, Result};
pub use format::{BaseFormat, ChannelType, InternalFormat, PixelFormat};
pub use soft::SoftRenderbuffer;
pub use storage::Storage;
