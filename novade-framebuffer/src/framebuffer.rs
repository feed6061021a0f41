//! A render target: a fixed table of attachment slots plus its visual.

use std::sync::Arc;

use novade_renderbuffer::{reference_renderbuffer, RenderbufferRef};
use tracing::debug;

use crate::attachment::{Attachment, AttachmentType, BufferIndex, BUFFER_COUNT};
use crate::error::Result;
use crate::visual::Visual;

/// A collection of renderbuffers bound to named slots.
///
/// `name == 0` marks a window-system framebuffer, which only ever holds
/// anonymous buffers; a user-created framebuffer only holds named ones.
/// Every held buffer carries one counted reference per slot it occupies.
#[derive(Debug)]
pub struct Framebuffer {
    name: u32,
    visual: Visual,
    width: u32,
    height: u32,
    attachments: [Attachment; BUFFER_COUNT],
}

impl Framebuffer {
    pub fn new(name: u32, visual: Visual) -> Self {
        Self {
            name,
            visual,
            width: 0,
            height: 0,
            attachments: Default::default(),
        }
    }

    /// A window-system framebuffer (`name == 0`).
    pub fn new_window_system(visual: Visual) -> Self {
        Self::new(0, visual)
    }

    #[inline]
    pub fn name(&self) -> u32 {
        self.name
    }

    pub fn visual(&self) -> &Visual {
        &self.visual
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn attachment(&self, index: BufferIndex) -> &Attachment {
        &self.attachments[index.index()]
    }

    /// The buffer bound to `index`, if any.
    pub fn renderbuffer(&self, index: BufferIndex) -> Option<&RenderbufferRef> {
        self.attachments[index.index()].renderbuffer.as_ref()
    }

    /// Binds `rb` to `index`, releasing whatever the slot held.
    ///
    /// # Panics
    ///
    /// * If `rb` is already bound to another slot, unless the two slots are
    ///   depth and stencil.
    /// * If `rb` wraps, or is wrapped by, a buffer bound to another slot.
    /// * If `rb`'s name disagrees with the framebuffer kind (anonymous
    ///   buffers for window-system framebuffers, named ones otherwise).
    pub fn add_renderbuffer(&mut self, index: BufferIndex, rb: &RenderbufferRef) {
        for other in BufferIndex::ALL {
            if other == index || other.may_alias(index) {
                continue;
            }
            if let Some(held) = self.renderbuffer(other) {
                assert!(
                    !Arc::ptr_eq(held, rb),
                    "renderbuffer {} already attached to {} cannot also be attached to {}",
                    rb.name(),
                    other,
                    index
                );
                assert!(
                    !wraps(held, rb) && !wraps(rb, held),
                    "renderbuffer {} shares a synthesized alpha wrapping with the buffer attached to {}",
                    rb.name(),
                    other
                );
            }
        }
        if self.name == 0 {
            assert!(rb.name() == 0, "window-system framebuffer given named renderbuffer {}", rb.name());
        } else {
            assert!(rb.name() != 0, "framebuffer {} given an anonymous renderbuffer", self.name);
        }

        let attachment = &mut self.attachments[index.index()];
        attachment.kind = AttachmentType::Renderbuffer;
        attachment.complete = true;
        reference_renderbuffer(&mut attachment.renderbuffer, Some(rb));
        debug!(framebuffer = self.name, slot = %index, renderbuffer = rb.name(), "Attached renderbuffer");
    }

    /// Clears `index`, releasing the buffer it held. Empty slots are left
    /// alone.
    pub fn remove_renderbuffer(&mut self, index: BufferIndex) {
        let attachment = &mut self.attachments[index.index()];
        if attachment.renderbuffer.is_none() {
            return;
        }
        reference_renderbuffer(&mut attachment.renderbuffer, None);
        attachment.kind = AttachmentType::None;
        attachment.complete = false;
        debug!(framebuffer = self.name, slot = %index, "Detached renderbuffer");
    }

    /// Every distinct attached buffer, in slot order. A packed buffer bound
    /// to both depth and stencil appears once.
    pub fn distinct_renderbuffers(&self) -> Vec<RenderbufferRef> {
        let mut seen: Vec<RenderbufferRef> = Vec::new();
        for rb in self.attachments.iter().filter_map(|a| a.renderbuffer.as_ref()) {
            if !seen.iter().any(|s| Arc::ptr_eq(s, rb)) {
                seen.push(Arc::clone(rb));
            }
        }
        seen
    }

    /// Re-allocates every attached buffer at `width` x `height` using its
    /// remembered internal format.
    ///
    /// # Errors
    ///
    /// The first allocation failure. Buffers already resized keep their new
    /// size; the failing buffer is left empty.
    pub fn resize_buffers(&mut self, width: u32, height: u32) -> Result<()> {
        for rb in self.distinct_renderbuffers() {
            rb.alloc_storage(width, height)?;
        }
        self.width = width;
        self.height = height;
        debug!(framebuffer = self.name, width, height, "Resized framebuffer");
        Ok(())
    }
}

/// Whether `outer` synthesizes alpha over `inner`.
fn wraps(outer: &RenderbufferRef, inner: &RenderbufferRef) -> bool {
    outer
        .storage()
        .wrapped()
        .map_or(false, |wrapped| Arc::ptr_eq(wrapped, inner))
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        for index in BufferIndex::ALL {
            self.remove_renderbuffer(index);
        }
    }
}
