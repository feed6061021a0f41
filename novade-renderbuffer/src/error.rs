//! Error types for renderbuffer storage.
//!
//! Only recoverable conditions are represented here. Broken invariants
//! (aliased attachments, double alpha wrapping, mismatched copies, use of a
//! destroyed buffer) are collaborator bugs and panic instead.

use thiserror::Error;

/// A specialized `Result` type for renderbuffer operations.
pub type Result<T> = std::result::Result<T, RenderbufferError>;

/// Recoverable failures surfaced by storage allocation and format lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderbufferError {
    /// The pixel store could not be allocated. The storage is left empty
    /// (zero width and height).
    #[error("software renderbuffer allocation failed ({width} x {height} x {pixel_size})")]
    OutOfMemory {
        width: u32,
        height: u32,
        pixel_size: usize,
    },

    /// The requested logical format has no software codec. No state was changed.
    #[error("unsupported renderbuffer format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_memory_display() {
        let err = RenderbufferError::OutOfMemory {
            width: 640,
            height: 480,
            pixel_size: 4,
        };
        assert_eq!(
            err.to_string(),
            "software renderbuffer allocation failed (640 x 480 x 4)"
        );
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = RenderbufferError::UnsupportedFormat("RGBA32F".to_string());
        assert_eq!(err.to_string(), "unsupported renderbuffer format: RGBA32F");
    }
}
