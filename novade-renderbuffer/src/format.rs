//! Pixel formats and the logical format vocabulary.
//!
//! A [`PixelFormat`] is the concrete cell layout a software store keeps in
//! memory. An [`InternalFormat`] is what a caller asks for when allocating
//! ("RGB8", "DEPTH_COMPONENT24", ...); resolving it yields the pixel format
//! plus the [`BaseFormat`] classification used by render target validation.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::error::{RenderbufferError, Result};

/// Storage type of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 16-bit signed integer (accumulation buffers).
    I16,
    /// 32-bit unsigned integer (depth, packed depth/stencil).
    U32,
}

impl ChannelType {
    /// Byte size of a single channel value.
    #[inline]
    pub const fn byte_size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 => 4,
        }
    }

    /// Native-endian bytes of the largest value this channel can hold.
    ///
    /// Only the first [`byte_size`](Self::byte_size) bytes are meaningful.
    pub const fn max_bytes(self) -> [u8; 4] {
        match self {
            Self::U8 => [u8::MAX, 0, 0, 0],
            Self::U16 => {
                let b = u16::MAX.to_ne_bytes();
                [b[0], b[1], 0, 0]
            }
            Self::I16 => {
                let b = i16::MAX.to_ne_bytes();
                [b[0], b[1], 0, 0]
            }
            Self::U32 => u32::MAX.to_ne_bytes(),
        }
    }
}

/// Concrete in-memory layout of one pixel cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 3 x u8 colour, no alpha.
    Rgb888,
    /// 4 x u8 colour.
    Rgba8888,
    /// 4 x i16 colour, used for accumulation buffers.
    SignedRgba16,
    /// 1 x u8 alpha, only used by the synthesized alpha channel.
    A8,
    /// 1 x u8 stencil.
    S8,
    /// 1 x u16 depth.
    Z16,
    /// 24 significant depth bits in a 32-bit cell.
    X8Z24,
    /// 1 x u32 depth.
    Z32,
    /// 24-bit depth and 8-bit stencil packed into a 32-bit cell.
    Z24S8,
}

impl PixelFormat {
    /// Number of pixel formats.
    pub const COUNT: usize = 9;

    /// Every pixel format, in declaration order.
    pub const ALL: [PixelFormat; Self::COUNT] = [
        Self::Rgb888,
        Self::Rgba8888,
        Self::SignedRgba16,
        Self::A8,
        Self::S8,
        Self::Z16,
        Self::X8Z24,
        Self::Z32,
        Self::Z24S8,
    ];

    /// Position of this format in [`PixelFormat::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn channel_type(self) -> ChannelType {
        match self {
            Self::Rgb888 | Self::Rgba8888 | Self::A8 | Self::S8 => ChannelType::U8,
            Self::SignedRgba16 => ChannelType::I16,
            Self::Z16 => ChannelType::U16,
            Self::X8Z24 | Self::Z32 | Self::Z24S8 => ChannelType::U32,
        }
    }

    /// Channels physically stored per pixel.
    pub const fn stored_channels(self) -> usize {
        match self {
            Self::Rgb888 => 3,
            Self::Rgba8888 | Self::SignedRgba16 => 4,
            Self::A8 | Self::S8 | Self::Z16 | Self::X8Z24 | Self::Z32 | Self::Z24S8 => 1,
        }
    }

    /// Channels per pixel as seen by callers of the row/scatter accessors.
    ///
    /// Colour formats are always exchanged as 4 channels.
    pub const fn external_channels(self) -> usize {
        if self.is_color() {
            4
        } else {
            self.stored_channels()
        }
    }

    /// Bytes per stored pixel cell.
    #[inline]
    pub const fn pixel_size(self) -> usize {
        self.stored_channels() * self.channel_type().byte_size()
    }

    /// Bytes per pixel in the external (caller-facing) representation.
    #[inline]
    pub const fn external_pixel_size(self) -> usize {
        self.external_channels() * self.channel_type().byte_size()
    }

    pub const fn is_color(self) -> bool {
        matches!(self, Self::Rgb888 | Self::Rgba8888 | Self::SignedRgba16)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rgb888 => "RGB888",
            Self::Rgba8888 => "RGBA8888",
            Self::SignedRgba16 => "SIGNED_RGBA_16",
            Self::A8 => "A8",
            Self::S8 => "S8",
            Self::Z16 => "Z16",
            Self::X8Z24 => "X8_Z24",
            Self::Z32 => "Z32",
            Self::Z24S8 => "Z24_S8",
        };
        f.write_str(name)
    }
}

/// What kind of data a buffer holds, as far as render target completeness
/// checks are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseFormat {
    Rgb,
    Rgba,
    Alpha,
    DepthComponent,
    StencilIndex,
    DepthStencil,
}

/// Logical format requested when allocating storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalFormat {
    Rgb,
    R3G3B2,
    Rgb4,
    Rgb5,
    Rgb8,
    Rgb10,
    Rgb12,
    Rgb16,
    Rgba,
    Rgba2,
    Rgba4,
    Rgb5A1,
    Rgba8,
    Rgb10A2,
    Rgba12,
    Rgba16,
    Rgba16Snorm,
    StencilIndex,
    StencilIndex1,
    StencilIndex4,
    StencilIndex8,
    StencilIndex16,
    DepthComponent,
    DepthComponent16,
    DepthComponent24,
    DepthComponent32,
    DepthStencil,
    Depth24Stencil8,
    // Known to the vocabulary but without a software codec.
    Alpha8,
    Luminance8,
    Intensity8,
    Rgba16F,
    Rgba32F,
    DepthComponent32F,
}

impl InternalFormat {
    /// Every logical format, supported or not.
    pub const ALL: [InternalFormat; 34] = [
        Self::Rgb,
        Self::R3G3B2,
        Self::Rgb4,
        Self::Rgb5,
        Self::Rgb8,
        Self::Rgb10,
        Self::Rgb12,
        Self::Rgb16,
        Self::Rgba,
        Self::Rgba2,
        Self::Rgba4,
        Self::Rgb5A1,
        Self::Rgba8,
        Self::Rgb10A2,
        Self::Rgba12,
        Self::Rgba16,
        Self::Rgba16Snorm,
        Self::StencilIndex,
        Self::StencilIndex1,
        Self::StencilIndex4,
        Self::StencilIndex8,
        Self::StencilIndex16,
        Self::DepthComponent,
        Self::DepthComponent16,
        Self::DepthComponent24,
        Self::DepthComponent32,
        Self::DepthStencil,
        Self::Depth24Stencil8,
        Self::Alpha8,
        Self::Luminance8,
        Self::Intensity8,
        Self::Rgba16F,
        Self::Rgba32F,
        Self::DepthComponent32F,
    ];

    /// Canonical upper-case name, without any API prefix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::R3G3B2 => "R3_G3_B2",
            Self::Rgb4 => "RGB4",
            Self::Rgb5 => "RGB5",
            Self::Rgb8 => "RGB8",
            Self::Rgb10 => "RGB10",
            Self::Rgb12 => "RGB12",
            Self::Rgb16 => "RGB16",
            Self::Rgba => "RGBA",
            Self::Rgba2 => "RGBA2",
            Self::Rgba4 => "RGBA4",
            Self::Rgb5A1 => "RGB5_A1",
            Self::Rgba8 => "RGBA8",
            Self::Rgb10A2 => "RGB10_A2",
            Self::Rgba12 => "RGBA12",
            Self::Rgba16 => "RGBA16",
            Self::Rgba16Snorm => "RGBA16_SNORM",
            Self::StencilIndex => "STENCIL_INDEX",
            Self::StencilIndex1 => "STENCIL_INDEX1",
            Self::StencilIndex4 => "STENCIL_INDEX4",
            Self::StencilIndex8 => "STENCIL_INDEX8",
            Self::StencilIndex16 => "STENCIL_INDEX16",
            Self::DepthComponent => "DEPTH_COMPONENT",
            Self::DepthComponent16 => "DEPTH_COMPONENT16",
            Self::DepthComponent24 => "DEPTH_COMPONENT24",
            Self::DepthComponent32 => "DEPTH_COMPONENT32",
            Self::DepthStencil => "DEPTH_STENCIL",
            Self::Depth24Stencil8 => "DEPTH24_STENCIL8",
            Self::Alpha8 => "ALPHA8",
            Self::Luminance8 => "LUMINANCE8",
            Self::Intensity8 => "INTENSITY8",
            Self::Rgba16F => "RGBA16F",
            Self::Rgba32F => "RGBA32F",
            Self::DepthComponent32F => "DEPTH_COMPONENT32F",
        }
    }

    /// Selects the software pixel format and base classification for this
    /// request.
    ///
    /// # Errors
    ///
    /// [`RenderbufferError::UnsupportedFormat`] when no software codec
    /// exists for the request.
    pub fn resolve(self) -> Result<(PixelFormat, BaseFormat)> {
        use InternalFormat::*;
        let resolved = match self {
            Rgb | R3G3B2 | Rgb4 | Rgb5 | Rgb8 | Rgb10 | Rgb12 | Rgb16 => {
                (PixelFormat::Rgb888, BaseFormat::Rgb)
            }
            Rgba | Rgba2 | Rgba4 | Rgb5A1 | Rgba8 | Rgb10A2 | Rgba12 => {
                (PixelFormat::Rgba8888, BaseFormat::Rgba)
            }
            Rgba16 | Rgba16Snorm => (PixelFormat::SignedRgba16, BaseFormat::Rgba),
            StencilIndex | StencilIndex1 | StencilIndex4 | StencilIndex8 | StencilIndex16 => {
                (PixelFormat::S8, BaseFormat::StencilIndex)
            }
            DepthComponent | DepthComponent16 => (PixelFormat::Z16, BaseFormat::DepthComponent),
            DepthComponent24 => (PixelFormat::X8Z24, BaseFormat::DepthComponent),
            DepthComponent32 => (PixelFormat::Z32, BaseFormat::DepthComponent),
            DepthStencil | Depth24Stencil8 => (PixelFormat::Z24S8, BaseFormat::DepthStencil),
            Alpha8 | Luminance8 | Intensity8 | Rgba16F | Rgba32F | DepthComponent32F => {
                return Err(RenderbufferError::UnsupportedFormat(self.name().to_string()));
            }
        };
        Ok(resolved)
    }

    /// Whether [`resolve`](Self::resolve) succeeds for this format.
    pub fn is_supported(self) -> bool {
        self.resolve().is_ok()
    }
}

impl fmt::Display for InternalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static FORMAT_NAMES: Lazy<HashMap<&'static str, InternalFormat>> = Lazy::new(|| {
    InternalFormat::ALL
        .iter()
        .map(|format| (format.name(), *format))
        .collect()
});

impl FromStr for InternalFormat {
    type Err = RenderbufferError;

    /// Parses a logical format name. Matching is case-insensitive and an
    /// optional `GL_` prefix is accepted.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let key = upper.strip_prefix("GL_").unwrap_or(&upper);
        FORMAT_NAMES
            .get(key)
            .copied()
            .ok_or_else(|| RenderbufferError::UnsupportedFormat(s.to_string()))
    }
}
