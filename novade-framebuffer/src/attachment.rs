//! Named attachment slots of a framebuffer.

use std::fmt;

use bitflags::bitflags;
use novade_renderbuffer::RenderbufferRef;

/// Maximum number of auxiliary colour buffers.
pub const MAX_AUX_BUFFERS: usize = 4;

/// Number of attachment slots.
pub const BUFFER_COUNT: usize = 7 + MAX_AUX_BUFFERS;

/// A fixed attachment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferIndex {
    FrontLeft,
    BackLeft,
    FrontRight,
    BackRight,
    Depth,
    Stencil,
    Accum,
    Aux0,
    Aux1,
    Aux2,
    Aux3,
}

impl BufferIndex {
    pub const ALL: [BufferIndex; BUFFER_COUNT] = [
        Self::FrontLeft,
        Self::BackLeft,
        Self::FrontRight,
        Self::BackRight,
        Self::Depth,
        Self::Stencil,
        Self::Accum,
        Self::Aux0,
        Self::Aux1,
        Self::Aux2,
        Self::Aux3,
    ];

    /// The four window colour buffers, in slot order.
    pub const COLOR: [BufferIndex; 4] = [Self::FrontLeft, Self::BackLeft, Self::FrontRight, Self::BackRight];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The `i`-th auxiliary slot, if it exists.
    pub fn aux(i: usize) -> Option<Self> {
        if i < MAX_AUX_BUFFERS {
            Some(Self::ALL[Self::Aux0.index() + i])
        } else {
            None
        }
    }

    /// The depth and stencil slots may share one packed buffer; no other
    /// pair may.
    pub fn may_alias(self, other: BufferIndex) -> bool {
        matches!(
            (self, other),
            (Self::Depth, Self::Stencil) | (Self::Stencil, Self::Depth)
        )
    }
}

impl fmt::Display for BufferIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FrontLeft => "front-left",
            Self::BackLeft => "back-left",
            Self::FrontRight => "front-right",
            Self::BackRight => "back-right",
            Self::Depth => "depth",
            Self::Stencil => "stencil",
            Self::Accum => "accum",
            Self::Aux0 => "aux0",
            Self::Aux1 => "aux1",
            Self::Aux2 => "aux2",
            Self::Aux3 => "aux3",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Selects window colour buffers for the bulk helpers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferMask: u32 {
        const FRONT_LEFT = 1 << 0;
        const BACK_LEFT = 1 << 1;
        const FRONT_RIGHT = 1 << 2;
        const BACK_RIGHT = 1 << 3;
    }
}

impl BufferMask {
    /// Selected colour slots in slot order.
    pub fn slots(self) -> impl Iterator<Item = BufferIndex> {
        [
            (Self::FRONT_LEFT, BufferIndex::FrontLeft),
            (Self::BACK_LEFT, BufferIndex::BackLeft),
            (Self::FRONT_RIGHT, BufferIndex::FrontRight),
            (Self::BACK_RIGHT, BufferIndex::BackRight),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, index)| index)
    }
}

/// What, if anything, a slot is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentType {
    #[default]
    None,
    Renderbuffer,
}

/// One slot of the attachment table.
#[derive(Debug, Default)]
pub struct Attachment {
    pub kind: AttachmentType,
    /// Set on attach; completeness validation by the render target owner
    /// may clear it.
    pub complete: bool,
    pub renderbuffer: Option<RenderbufferRef>,
}
