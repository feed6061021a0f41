//! Owned pixel memory plus the format metadata describing it.

use tracing::{debug, error};

use crate::codec::Codec;
use crate::error::{RenderbufferError, Result};
use crate::format::{BaseFormat, InternalFormat, PixelFormat};

/// A linear row-major pixel store.
///
/// `data.len() == width * height * pixel_size` whenever both dimensions are
/// non-zero; otherwise `data` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    width: u32,
    height: u32,
    format: PixelFormat,
    base_format: Option<BaseFormat>,
    data: Vec<u8>,
}

impl Storage {
    /// An empty store of the given format. Nothing is allocated until
    /// [`allocate`](Self::allocate) is called.
    pub fn new(format: PixelFormat) -> Self {
        Self {
            width: 0,
            height: 0,
            format,
            base_format: None,
            data: Vec::new(),
        }
    }

    /// Re-allocates the store for `internal_format` at `width` x `height`.
    ///
    /// The prior pixel memory is released before the new block is reserved.
    /// New memory is zero-filled.
    ///
    /// # Errors
    ///
    /// * [`RenderbufferError::UnsupportedFormat`] leaves the store untouched.
    /// * [`RenderbufferError::OutOfMemory`] leaves the store empty (zero
    ///   width and height) with its previous format metadata.
    pub fn allocate(&mut self, internal_format: InternalFormat, width: u32, height: u32) -> Result<()> {
        let (format, base_format) = internal_format.resolve()?;
        self.reallocate(format, width, height)?;
        self.base_format = Some(base_format);
        debug!(%internal_format, %format, width, height, "Allocated software renderbuffer storage");
        Ok(())
    }

    /// Resizes the store to `format` without touching the base-format
    /// classification.
    pub(crate) fn reallocate(&mut self, format: PixelFormat, width: u32, height: u32) -> Result<()> {
        self.release();

        let pixel_size = format.pixel_size();
        let out_of_memory = RenderbufferError::OutOfMemory {
            width,
            height,
            pixel_size,
        };
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(pixel_size));
        let mut data = Vec::new();
        let reserved = match len {
            Some(len) => data.try_reserve_exact(len).map(|_| len).ok(),
            None => None,
        };
        let Some(len) = reserved else {
            error!(width, height, pixel_size, "Software renderbuffer allocation failed");
            return Err(out_of_memory);
        };
        data.resize(len, 0);

        self.format = format;
        self.width = width;
        self.height = height;
        self.data = data;
        Ok(())
    }

    /// Frees the pixel memory and resets the dimensions to zero.
    pub fn release(&mut self) {
        self.width = 0;
        self.height = 0;
        self.data = Vec::new();
    }

    /// Copies every byte of `src` into this store.
    ///
    /// # Panics
    ///
    /// If the two stores differ in format or dimensions.
    pub fn copy_from(&mut self, src: &Storage) {
        assert_eq!(self.format, src.format, "storage copy between different formats");
        assert!(
            self.width == src.width && self.height == src.height,
            "storage copy between {}x{} and {}x{}",
            self.width,
            self.height,
            src.width,
            src.height
        );
        self.data.copy_from_slice(&src.data);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Set by the last successful [`allocate`](Self::allocate).
    #[inline]
    pub fn base_format(&self) -> Option<BaseFormat> {
        self.base_format
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn codec(&self) -> &'static Codec {
        self.format.codec()
    }

    pub fn get_pointer(&self, x: u32, y: u32) -> Option<&[u8]> {
        self.codec().get_pointer(&self.data, self.width, x, y)
    }

    pub fn get_pointer_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let codec = self.codec();
        codec.get_pointer_mut(&mut self.data, self.width, x, y)
    }

    pub fn get_row(&self, x: u32, y: u32, count: usize, out: &mut [u8]) {
        self.codec().get_row(&self.data, self.width, x, y, count, out);
    }

    pub fn get_values(&self, xs: &[u32], ys: &[u32], out: &mut [u8]) {
        self.codec().get_values(&self.data, self.width, xs, ys, out);
    }

    pub fn put_row(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>) {
        let codec = self.codec();
        codec.put_row(&mut self.data, self.width, x, y, count, values, mask);
    }

    pub fn put_row_rgb(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>) {
        let codec = self.codec();
        codec.put_row_rgb(&mut self.data, self.width, x, y, count, values, mask);
    }

    pub fn put_mono_row(&mut self, x: u32, y: u32, count: usize, value: &[u8], mask: Option<&[bool]>) {
        let codec = self.codec();
        codec.put_mono_row(&mut self.data, self.width, x, y, count, value, mask);
    }

    pub fn put_values(&mut self, xs: &[u32], ys: &[u32], values: &[u8], mask: Option<&[bool]>) {
        let codec = self.codec();
        codec.put_values(&mut self.data, self.width, xs, ys, values, mask);
    }

    pub fn put_mono_values(&mut self, xs: &[u32], ys: &[u32], value: &[u8], mask: Option<&[bool]>) {
        let codec = self.codec();
        codec.put_mono_values(&mut self.data, self.width, xs, ys, value, mask);
    }
}
