//! Direct software renderbuffers backed by a single [`Storage`].

use crate::buffer::RenderbufferStorage;
use crate::error::Result;
use crate::format::{BaseFormat, InternalFormat, PixelFormat};
use crate::storage::Storage;

/// A renderbuffer whose pixels all live in its own memory.
#[derive(Debug)]
pub struct SoftRenderbuffer {
    storage: Storage,
}

impl SoftRenderbuffer {
    pub fn new(format: PixelFormat) -> Self {
        Self {
            storage: Storage::new(format),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl RenderbufferStorage for SoftRenderbuffer {
    fn alloc_storage(&mut self, internal_format: InternalFormat, width: u32, height: u32) -> Result<()> {
        self.storage.allocate(internal_format, width, height)
    }

    fn width(&self) -> u32 {
        self.storage.width()
    }

    fn height(&self) -> u32 {
        self.storage.height()
    }

    fn format(&self) -> PixelFormat {
        self.storage.format()
    }

    fn base_format(&self) -> Option<BaseFormat> {
        self.storage.base_format()
    }

    fn get_pointer(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        self.storage.get_pointer_mut(x, y)
    }

    fn get_row(&self, x: u32, y: u32, count: usize, out: &mut [u8]) {
        self.storage.get_row(x, y, count, out);
    }

    fn get_values(&self, xs: &[u32], ys: &[u32], out: &mut [u8]) {
        self.storage.get_values(xs, ys, out);
    }

    fn put_row(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>) {
        self.storage.put_row(x, y, count, values, mask);
    }

    fn put_row_rgb(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>) {
        self.storage.put_row_rgb(x, y, count, values, mask);
    }

    fn put_mono_row(&mut self, x: u32, y: u32, count: usize, value: &[u8], mask: Option<&[bool]>) {
        self.storage.put_mono_row(x, y, count, value, mask);
    }

    fn put_values(&mut self, xs: &[u32], ys: &[u32], values: &[u8], mask: Option<&[bool]>) {
        self.storage.put_values(xs, ys, values, mask);
    }

    fn put_mono_values(&mut self, xs: &[u32], ys: &[u32], value: &[u8], mask: Option<&[bool]>) {
        self.storage.put_mono_values(xs, ys, value, mask);
    }

    fn destroy(&mut self) {
        self.storage.release();
    }
}
