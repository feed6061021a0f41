//! Synthesized alpha channel layered over an RGB renderbuffer.
//!
//! The wrapper presents four 8-bit channels. Colour goes to the wrapped
//! buffer through its own accessors; alpha lives in a private one-byte-per-
//! pixel store. Direct pointer access is never offered because no
//! contiguous RGBA memory exists.

use std::sync::Arc;

use tracing::debug;

use crate::buffer::{reference_renderbuffer, Renderbuffer, RenderbufferRef, RenderbufferStorage};
use crate::error::{RenderbufferError, Result};
use crate::format::{BaseFormat, ChannelType, InternalFormat, PixelFormat};
use crate::storage::Storage;

const ALPHA_CHANNEL: usize = 3;
const RGBA_SIZE: usize = 4;

#[derive(Debug)]
pub struct AlphaRenderbuffer {
    alpha: Storage,
    /// `None` only after `destroy`.
    wrapped: Option<RenderbufferRef>,
}

impl AlphaRenderbuffer {
    /// Wraps `inner`, taking one reference on it. The alpha store is sized to
    /// the inner buffer's current dimensions and zero-filled.
    ///
    /// # Errors
    ///
    /// [`RenderbufferError::OutOfMemory`](crate::RenderbufferError::OutOfMemory)
    /// if the alpha store cannot be allocated; `inner` is left unreferenced.
    ///
    /// # Panics
    ///
    /// If `inner` already synthesizes alpha or does not use 8-bit channels.
    pub fn wrap(inner: &RenderbufferRef) -> Result<Self> {
        let (width, height) = {
            let storage = inner.storage();
            assert!(
                storage.synthesized_alpha().is_none(),
                "renderbuffer {} already has a synthesized alpha channel",
                inner.name()
            );
            assert_eq!(
                storage.channel_type(),
                ChannelType::U8,
                "synthesized alpha needs an 8-bit colour buffer"
            );
            (storage.width(), storage.height())
        };

        let mut alpha = Storage::new(PixelFormat::A8);
        alpha.reallocate(PixelFormat::A8, width, height)?;

        let mut wrapped = None;
        reference_renderbuffer(&mut wrapped, Some(inner));
        debug!(name = inner.name(), width, height, "Wrapped renderbuffer with synthesized alpha");
        Ok(Self { alpha, wrapped })
    }

    pub fn alpha(&self) -> &Storage {
        &self.alpha
    }

    fn inner(&self) -> &RenderbufferRef {
        match &self.wrapped {
            Some(inner) => inner,
            None => panic!("alpha renderbuffer used after destroy"),
        }
    }

    fn alpha_offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.alpha.width() as usize + x as usize
    }

    fn store_alpha_row(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>) {
        let start = self.alpha_offset(x, y);
        let dst = &mut self.alpha.bytes_mut()[start..start + count];
        for (i, (a, px)) in dst.iter_mut().zip(values.chunks_exact(RGBA_SIZE)).enumerate() {
            if mask.map_or(true, |m| m[i]) {
                *a = px[ALPHA_CHANNEL];
            }
        }
    }
}

/// Creates a renderbuffer that synthesizes alpha over `inner`. The wrapper
/// takes the inner buffer's name and remembered internal format.
pub fn new_alpha_renderbuffer(inner: &RenderbufferRef) -> Result<RenderbufferRef> {
    let wrapper = AlphaRenderbuffer::wrap(inner)?;
    Ok(Renderbuffer::new(
        inner.name(),
        inner.internal_format(),
        Box::new(wrapper),
    ))
}

/// Copies the synthesized alpha of `src` into `dst`, e.g. back into front
/// after a swap.
///
/// # Panics
///
/// If either buffer is not an alpha wrapper or their sizes differ.
pub fn copy_soft_alpha(dst: &RenderbufferRef, src: &RenderbufferRef) {
    if Arc::ptr_eq(dst, src) {
        return;
    }
    let src_alpha = match src.storage().synthesized_alpha() {
        Some(alpha) => alpha.clone(),
        None => panic!("renderbuffer {} has no synthesized alpha to copy", src.name()),
    };
    let mut dst_storage = dst.storage();
    match dst_storage.synthesized_alpha_mut() {
        Some(alpha) => alpha.copy_from(&src_alpha),
        None => panic!("renderbuffer {} has no synthesized alpha to copy into", dst.name()),
    }
}

impl RenderbufferStorage for AlphaRenderbuffer {
    fn alloc_storage(&mut self, internal_format: InternalFormat, width: u32, height: u32) -> Result<()> {
        if let Err(err) = self.inner().alloc_storage_with(internal_format, width, height) {
            // The inner buffer is left empty on allocation failure; follow it.
            if matches!(err, RenderbufferError::OutOfMemory { .. }) {
                self.alpha.release();
            }
            return Err(err);
        }
        self.alpha.reallocate(PixelFormat::A8, width, height)
    }

    fn width(&self) -> u32 {
        self.alpha.width()
    }

    fn height(&self) -> u32 {
        self.alpha.height()
    }

    fn format(&self) -> PixelFormat {
        PixelFormat::Rgba8888
    }

    fn base_format(&self) -> Option<BaseFormat> {
        self.inner().base_format().map(|_| BaseFormat::Rgba)
    }

    fn get_pointer(&mut self, _x: u32, _y: u32) -> Option<&mut [u8]> {
        None
    }

    fn get_row(&self, x: u32, y: u32, count: usize, out: &mut [u8]) {
        self.inner().storage().get_row(x, y, count, out);
        let start = self.alpha_offset(x, y);
        let src = &self.alpha.bytes()[start..start + count];
        for (px, &a) in out.chunks_exact_mut(RGBA_SIZE).zip(src) {
            px[ALPHA_CHANNEL] = a;
        }
    }

    fn get_values(&self, xs: &[u32], ys: &[u32], out: &mut [u8]) {
        self.inner().storage().get_values(xs, ys, out);
        let alpha = self.alpha.bytes();
        for ((&x, &y), px) in xs.iter().zip(ys).zip(out.chunks_exact_mut(RGBA_SIZE)) {
            px[ALPHA_CHANNEL] = alpha[self.alpha_offset(x, y)];
        }
    }

    fn put_row(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>) {
        self.inner().storage().put_row(x, y, count, values, mask);
        self.store_alpha_row(x, y, count, values, mask);
    }

    fn put_row_rgb(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>) {
        self.inner().storage().put_row_rgb(x, y, count, values, mask);
        self.alpha.put_mono_row(x, y, count, &[u8::MAX], mask);
    }

    fn put_mono_row(&mut self, x: u32, y: u32, count: usize, value: &[u8], mask: Option<&[bool]>) {
        self.inner().storage().put_mono_row(x, y, count, value, mask);
        self.alpha.put_mono_row(x, y, count, &[value[ALPHA_CHANNEL]], mask);
    }

    fn put_values(&mut self, xs: &[u32], ys: &[u32], values: &[u8], mask: Option<&[bool]>) {
        self.inner().storage().put_values(xs, ys, values, mask);
        for (i, ((&x, &y), px)) in xs.iter().zip(ys).zip(values.chunks_exact(RGBA_SIZE)).enumerate() {
            if mask.map_or(true, |m| m[i]) {
                let offset = self.alpha_offset(x, y);
                self.alpha.bytes_mut()[offset] = px[ALPHA_CHANNEL];
            }
        }
    }

    fn put_mono_values(&mut self, xs: &[u32], ys: &[u32], value: &[u8], mask: Option<&[bool]>) {
        self.inner().storage().put_mono_values(xs, ys, value, mask);
        self.alpha.put_mono_values(xs, ys, &[value[ALPHA_CHANNEL]], mask);
    }

    fn destroy(&mut self) {
        self.alpha.release();
        reference_renderbuffer(&mut self.wrapped, None);
    }

    fn wrapped(&self) -> Option<&RenderbufferRef> {
        self.wrapped.as_ref()
    }

    fn synthesized_alpha(&self) -> Option<&Storage> {
        Some(&self.alpha)
    }

    fn synthesized_alpha_mut(&mut self) -> Option<&mut Storage> {
        Some(&mut self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::tests::counting_buffer;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    fn rgb_buffer(width: u32, height: u32) -> RenderbufferRef {
        let rb = Renderbuffer::new_soft(0, InternalFormat::Rgb8).unwrap();
        rb.alloc_storage(width, height).unwrap();
        rb
    }

    #[test]
    fn test_wrapper_is_transparent_for_row_io() {
        let inner = rgb_buffer(2, 2);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        assert_eq!(inner.ref_count(), 1);

        wrapper.storage().put_row(0, 0, 1, &[10, 20, 30, 200], None);

        let mut out = [0u8; 4];
        wrapper.storage().get_row(0, 0, 1, &mut out);
        assert_eq!(out, [10, 20, 30, 200]);

        inner.storage().get_row(0, 0, 1, &mut out);
        assert_eq!(out, [10, 20, 30, 255]);
    }

    #[test]
    fn test_wrapper_never_exposes_pointer() {
        let inner = Renderbuffer::new_soft(0, InternalFormat::Rgba8).unwrap();
        inner.alloc_storage(2, 2).unwrap();
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        assert!(inner.storage().get_pointer(0, 0).is_some());
        assert!(wrapper.storage().get_pointer(0, 0).is_none());
    }

    #[test]
    fn test_wrapper_reports_rgba() {
        let inner = rgb_buffer(3, 2);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        assert_eq!(wrapper.format(), PixelFormat::Rgba8888);
        assert_eq!(wrapper.base_format(), Some(BaseFormat::Rgba));
        assert_eq!((wrapper.width(), wrapper.height()), (3, 2));
        assert_eq!(wrapper.storage().synthesized_alpha().unwrap().bytes().len(), 6);
    }

    #[test]
    fn test_masked_scatter_and_uniform_writes() {
        let inner = rgb_buffer(2, 2);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        {
            let mut storage = wrapper.storage();
            storage.put_mono_row(0, 1, 2, &[1, 2, 3, 4], Some(&[false, true]));
            storage.put_values(&[0, 1], &[0, 0], &[5, 6, 7, 8, 9, 9, 9, 9], Some(&[true, false]));
            storage.put_mono_values(&[0], &[1], &[0, 0, 0, 77], None);
        }

        let mut out = [0u8; 16];
        wrapper.storage().get_values(&[0, 1, 0, 1], &[0, 0, 1, 1], &mut out);
        assert_eq!(
            out,
            [5, 6, 7, 8, 0, 0, 0, 0, 0, 0, 0, 77, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_put_row_rgb_sets_alpha_to_max() {
        let inner = rgb_buffer(2, 1);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        wrapper.storage().put_row_rgb(0, 0, 2, &[1, 2, 3, 4, 5, 6], Some(&[true, false]));

        let mut out = [0u8; 8];
        wrapper.storage().get_row(0, 0, 2, &mut out);
        assert_eq!(out, [1, 2, 3, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn test_alloc_storage_forwards_to_inner() {
        let inner = rgb_buffer(1, 1);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        wrapper.alloc_storage(5, 4).unwrap();
        assert_eq!((inner.width(), inner.height()), (5, 4));
        assert_eq!(wrapper.storage().synthesized_alpha().unwrap().bytes().len(), 20);
    }

    #[test]
    fn test_failed_inner_alloc_keeps_alpha_store() {
        let inner = rgb_buffer(2, 2);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        let err = wrapper.alloc_storage_with(InternalFormat::Rgba32F, 4, 4);
        assert!(err.is_err());
        assert_eq!((wrapper.width(), wrapper.height()), (2, 2));
    }

    #[test]
    fn test_inner_out_of_memory_empties_alpha_store() {
        let inner = rgb_buffer(2, 2);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        let err = wrapper
            .alloc_storage_with(InternalFormat::Rgb8, u32::MAX, u32::MAX)
            .unwrap_err();
        assert!(matches!(err, RenderbufferError::OutOfMemory { .. }));
        assert_eq!((inner.width(), inner.height()), (0, 0));
        assert_eq!((wrapper.width(), wrapper.height()), (0, 0));
        assert!(wrapper.storage().synthesized_alpha().unwrap().is_empty());

        wrapper.alloc_storage(1, 1).unwrap();
        let mut out = [0u8; 4];
        wrapper.storage().get_row(0, 0, 1, &mut out);
        assert_eq!(out, [0, 0, 0, 0]);
    }

    #[test]
    fn test_destroy_releases_wrapped_buffer() {
        let (inner, destroyed) = counting_buffer(0);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        let mut slot = None;
        reference_renderbuffer(&mut slot, Some(&wrapper));
        assert_eq!(inner.ref_count(), 1);

        reference_renderbuffer(&mut slot, None);
        assert!(wrapper.is_destroyed());
        assert!(inner.is_destroyed());
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic(expected = "already has a synthesized alpha channel")]
    fn test_double_wrap_panics() {
        let inner = rgb_buffer(1, 1);
        let wrapper = new_alpha_renderbuffer(&inner).unwrap();
        let _ = new_alpha_renderbuffer(&wrapper);
    }

    #[test]
    #[should_panic(expected = "8-bit colour buffer")]
    fn test_wrap_sixteen_bit_panics() {
        let inner = Renderbuffer::new_soft(0, InternalFormat::Rgba16).unwrap();
        let _ = new_alpha_renderbuffer(&inner);
    }

    #[test]
    fn test_copy_soft_alpha() {
        let front = new_alpha_renderbuffer(&rgb_buffer(2, 1)).unwrap();
        let back = new_alpha_renderbuffer(&rgb_buffer(2, 1)).unwrap();
        back.storage().put_mono_row(0, 0, 2, &[0, 0, 0, 42], None);

        copy_soft_alpha(&front, &back);
        assert_eq!(front.storage().synthesized_alpha().unwrap().bytes(), &[42, 42]);
    }

    #[test]
    #[should_panic(expected = "storage copy between")]
    fn test_copy_soft_alpha_size_mismatch_panics() {
        let front = new_alpha_renderbuffer(&rgb_buffer(2, 1)).unwrap();
        let back = new_alpha_renderbuffer(&rgb_buffer(1, 1)).unwrap();
        copy_soft_alpha(&front, &back);
    }

    #[test]
    #[should_panic(expected = "no synthesized alpha")]
    fn test_copy_soft_alpha_requires_wrappers() {
        let front = rgb_buffer(1, 1);
        let back = rgb_buffer(1, 1);
        copy_soft_alpha(&front, &back);
    }
}
