//! Reference-counted renderbuffer objects and the accessor contract they
//! dispatch to.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::error::Result;
use crate::format::{BaseFormat, ChannelType, InternalFormat, PixelFormat};
use crate::soft::SoftRenderbuffer;
use crate::storage::Storage;

/// Shared handle to a [`Renderbuffer`].
pub type RenderbufferRef = Arc<Renderbuffer>;

/// The accessor capability set every renderbuffer implementation provides.
///
/// Software stores ([`SoftRenderbuffer`]), the synthesized alpha wrapper and
/// any hardware-backed provider implement this so attachment and wrapping
/// logic never needs to know which kind it holds.
///
/// Pixel values are native-endian bytes in the buffer's channel width.
/// Colour formats exchange four channels per pixel, except
/// [`put_row_rgb`](Self::put_row_rgb) which takes three. A `mask`, when
/// present, selects which positions are written; unselected positions keep
/// their contents.
pub trait RenderbufferStorage: Send + fmt::Debug {
    /// (Re)allocates storage for `internal_format` at `width` x `height`.
    fn alloc_storage(&mut self, internal_format: InternalFormat, width: u32, height: u32) -> Result<()>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Layout visible to callers of the accessors.
    fn format(&self) -> PixelFormat;

    fn channel_type(&self) -> ChannelType {
        self.format().channel_type()
    }

    /// Classification recorded by the last successful allocation.
    fn base_format(&self) -> Option<BaseFormat>;

    /// Direct cell memory starting at `(x, y)`, or `None` when direct access
    /// is not supported.
    fn get_pointer(&mut self, x: u32, y: u32) -> Option<&mut [u8]>;

    fn get_row(&self, x: u32, y: u32, count: usize, out: &mut [u8]);

    fn get_values(&self, xs: &[u32], ys: &[u32], out: &mut [u8]);

    fn put_row(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>);

    /// Writes three-channel colour values; alpha is not taken from the
    /// caller.
    fn put_row_rgb(&mut self, x: u32, y: u32, count: usize, values: &[u8], mask: Option<&[bool]>);

    fn put_mono_row(&mut self, x: u32, y: u32, count: usize, value: &[u8], mask: Option<&[bool]>);

    fn put_values(&mut self, xs: &[u32], ys: &[u32], values: &[u8], mask: Option<&[bool]>);

    fn put_mono_values(&mut self, xs: &[u32], ys: &[u32], value: &[u8], mask: Option<&[bool]>);

    /// Releases everything this implementation owns. Called exactly once,
    /// when the owning [`Renderbuffer`] is destroyed.
    fn destroy(&mut self);

    /// The buffer this one delegates colour channels to, if it is a wrapper.
    fn wrapped(&self) -> Option<&RenderbufferRef> {
        None
    }

    /// The locally stored alpha channel of a synthesized-alpha wrapper.
    fn synthesized_alpha(&self) -> Option<&Storage> {
        None
    }

    fn synthesized_alpha_mut(&mut self) -> Option<&mut Storage> {
        None
    }
}

/// One addressable 2D pixel surface.
///
/// A renderbuffer starts with a reference count of zero. Attachment slots
/// and alpha wrappers take references through [`reference_renderbuffer`];
/// the buffer's [`RenderbufferStorage::destroy`] runs exactly once, when the
/// count drops back to zero (or when an unreferenced buffer is dropped).
pub struct Renderbuffer {
    /// 0 for window-system buffers, non-zero for user-created ones.
    name: u32,
    ref_count: AtomicUsize,
    destroyed: AtomicBool,
    /// Remembered so the buffer can be re-allocated on resize.
    internal_format: Mutex<InternalFormat>,
    storage: Mutex<Box<dyn RenderbufferStorage>>,
}

impl Renderbuffer {
    /// Wraps any accessor implementation, e.g. a hardware-backed one.
    pub fn new(
        name: u32,
        internal_format: InternalFormat,
        storage: Box<dyn RenderbufferStorage>,
    ) -> RenderbufferRef {
        Arc::new(Self {
            name,
            ref_count: AtomicUsize::new(0),
            destroyed: AtomicBool::new(false),
            internal_format: Mutex::new(internal_format),
            storage: Mutex::new(storage),
        })
    }

    /// Creates an unallocated software renderbuffer.
    ///
    /// # Errors
    ///
    /// [`RenderbufferError::UnsupportedFormat`](crate::RenderbufferError::UnsupportedFormat)
    /// if `internal_format` has no software codec.
    pub fn new_soft(name: u32, internal_format: InternalFormat) -> Result<RenderbufferRef> {
        let (format, _) = internal_format.resolve()?;
        Ok(Self::new(
            name,
            internal_format,
            Box::new(SoftRenderbuffer::new(format)),
        ))
    }

    /// Creates an unallocated packed depth/stencil software renderbuffer.
    pub fn new_depth_stencil(name: u32) -> RenderbufferRef {
        Self::new(
            name,
            InternalFormat::Depth24Stencil8,
            Box::new(SoftRenderbuffer::new(PixelFormat::Z24S8)),
        )
    }

    #[inline]
    pub fn name(&self) -> u32 {
        self.name
    }

    pub fn internal_format(&self) -> InternalFormat {
        *self.internal_format.lock()
    }

    /// Locks the accessor implementation. Pixel I/O on one buffer must be
    /// serialized by the caller; the lock only guards against misuse.
    pub fn storage(&self) -> MutexGuard<'_, Box<dyn RenderbufferStorage>> {
        self.storage.lock()
    }

    pub fn width(&self) -> u32 {
        self.storage().width()
    }

    pub fn height(&self) -> u32 {
        self.storage().height()
    }

    pub fn format(&self) -> PixelFormat {
        self.storage().format()
    }

    pub fn base_format(&self) -> Option<BaseFormat> {
        self.storage().base_format()
    }

    /// Re-allocates with the remembered internal format.
    pub fn alloc_storage(&self, width: u32, height: u32) -> Result<()> {
        let internal_format = self.internal_format();
        self.alloc_storage_with(internal_format, width, height)
    }

    /// Allocates for a new internal format, remembering it on success.
    pub fn alloc_storage_with(&self, internal_format: InternalFormat, width: u32, height: u32) -> Result<()> {
        self.storage().alloc_storage(internal_format, width, height)?;
        *self.internal_format.lock() = internal_format;
        Ok(())
    }

    pub fn ref_count(&self) -> usize {
        self.ref_count.load(Ordering::Acquire)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Takes one counted reference.
    ///
    /// # Panics
    ///
    /// If the buffer has already been destroyed.
    pub fn reference(&self) {
        assert!(!self.is_destroyed(), "referencing destroyed renderbuffer {}", self.name);
        let count = self.ref_count.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(name = self.name, ref_count = count, "Renderbuffer referenced");
    }

    /// Drops one counted reference, destroying the buffer when it was the
    /// last. Returns `true` if this call destroyed it.
    ///
    /// # Panics
    ///
    /// If the count is already zero.
    pub fn unreference(&self) -> bool {
        let previous = self.ref_count.fetch_sub(1, Ordering::AcqRel);
        assert!(previous > 0, "renderbuffer {} reference count underflow", self.name);
        trace!(name = self.name, ref_count = previous - 1, "Renderbuffer unreferenced");
        if previous == 1 {
            self.destroy();
            true
        } else {
            false
        }
    }

    fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            panic!("renderbuffer {} destroyed twice", self.name);
        }
        debug!(name = self.name, "Destroying renderbuffer");
        self.storage().destroy();
    }
}

impl Drop for Renderbuffer {
    fn drop(&mut self) {
        // Buffers that were never referenced still get their teardown.
        if !*self.destroyed.get_mut() {
            *self.destroyed.get_mut() = true;
            self.storage.get_mut().destroy();
        }
    }
}

impl fmt::Debug for Renderbuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderbuffer")
            .field("name", &self.name)
            .field("ref_count", &self.ref_count())
            .field("destroyed", &self.is_destroyed())
            .field("internal_format", &self.internal_format())
            .finish_non_exhaustive()
    }
}

/// Points `slot` at `rb`, releasing whatever it held before.
///
/// Exactly one decrement of the old buffer and one increment of the new one
/// happen; nothing happens if the slot already holds `rb`. Concurrent calls
/// on different slots are safe; the same slot must be serialized by the
/// caller.
pub fn reference_renderbuffer(slot: &mut Option<RenderbufferRef>, rb: Option<&RenderbufferRef>) {
    match (slot.as_ref(), rb) {
        (Some(old), Some(new)) if Arc::ptr_eq(old, new) => return,
        (None, None) => return,
        _ => {}
    }
    if let Some(old) = slot.take() {
        old.unreference();
    }
    if let Some(new) = rb {
        new.reference();
        *slot = Some(Arc::clone(new));
    }
}
