// novade-framebuffer/tests/soft_framebuffer_test.rs

use std::sync::Arc;
use std::thread;

use novade_core::config::ConfigLoader;
use novade_framebuffer::{BufferIndex, BufferMask, Framebuffer, FramebufferError, SoftBuffers, Visual};
use novade_renderbuffer::{InternalFormat, PixelFormat, Renderbuffer, RenderbufferError};
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("novade_framebuffer=debug,novade_renderbuffer=debug")
        .with_test_writer()
        .try_init();
}

const VISUAL_TOML: &str = r#"
[logging]
level = "debug"

[visual]
alpha_bits = 8
software_alpha = true
stencil_bits = 8
accum_red_bits = 16
accum_green_bits = 16
accum_blue_bits = 16
accum_alpha_bits = 16
aux_buffers = 1
"#;

#[test]
fn test_uniform_row_on_rgba8_buffer() {
    init_tracing();
    let rb = Renderbuffer::new_soft(1, InternalFormat::Rgba8).unwrap();
    rb.alloc_storage(4, 4).unwrap();

    rb.storage().put_mono_row(0, 0, 4, &[255, 0, 0, 255], None);

    let mut row = [0u8; 16];
    rb.storage().get_row(0, 0, 4, &mut row);
    assert_eq!(row, [255, 0, 0, 255].repeat(4).as_slice());
    for y in 1..4 {
        rb.storage().get_row(0, y, 4, &mut row);
        assert_eq!(row, [0u8; 16], "row {}", y);
    }
}

#[test]
fn test_wrapped_rgb_buffer_keeps_alpha() {
    init_tracing();
    let mut fb = Framebuffer::new_window_system(Visual {
        alpha_bits: 8,
        double_buffer: false,
        ..Visual::default()
    });
    fb.add_color_renderbuffers(8, 0, BufferMask::FRONT_LEFT).unwrap();
    fb.resize_buffers(2, 2).unwrap();
    fb.add_alpha_renderbuffers(8, BufferMask::FRONT_LEFT).unwrap();

    let front = Arc::clone(fb.renderbuffer(BufferIndex::FrontLeft).unwrap());
    assert_eq!(front.format(), PixelFormat::Rgba8888);
    assert_eq!((front.width(), front.height()), (2, 2));

    front.storage().put_row(0, 0, 1, &[10, 20, 30, 200], None);
    let mut pixel = [0u8; 4];
    front.storage().get_row(0, 0, 1, &mut pixel);
    assert_eq!(pixel, [10, 20, 30, 200]);

    let storage = front.storage();
    let inner = storage.wrapped().unwrap();
    assert_eq!(inner.format(), PixelFormat::Rgb888);
    let mut inner_pixel = [0u8; 4];
    inner.storage().get_row(0, 0, 1, &mut inner_pixel);
    assert_eq!(inner_pixel, [10, 20, 30, 255]);
}

#[test]
fn test_configured_visual_builds_every_buffer() {
    init_tracing();
    let config = ConfigLoader::load_from_str(VISUAL_TOML).unwrap();
    let mut fb = Framebuffer::new_window_system(Visual::from(&config.visual));
    fb.add_soft_renderbuffers(SoftBuffers::from_config(&config.visual)).unwrap();
    fb.resize_buffers(3, 2).unwrap();

    let expected = [
        (BufferIndex::FrontLeft, Some(PixelFormat::Rgba8888)),
        (BufferIndex::BackLeft, Some(PixelFormat::Rgba8888)),
        (BufferIndex::FrontRight, None),
        (BufferIndex::BackRight, None),
        (BufferIndex::Depth, Some(PixelFormat::X8Z24)),
        (BufferIndex::Stencil, Some(PixelFormat::S8)),
        (BufferIndex::Accum, Some(PixelFormat::SignedRgba16)),
        (BufferIndex::Aux0, Some(PixelFormat::Rgba8888)),
        (BufferIndex::Aux1, None),
    ];
    for (index, format) in expected {
        assert_eq!(fb.renderbuffer(index).map(|rb| rb.format()), format, "slot {}", index);
    }
    for rb in fb.distinct_renderbuffers() {
        assert_eq!((rb.width(), rb.height()), (3, 2));
        assert_eq!(rb.ref_count(), 1);
    }

    // Alpha written to the back buffer reaches the front after a copy; the
    // front colour stays untouched.
    let back = Arc::clone(fb.renderbuffer(BufferIndex::BackLeft).unwrap());
    back.storage().put_mono_row(0, 1, 3, &[1, 2, 3, 77], None);
    fb.copy_soft_alpha_renderbuffers();

    let front = Arc::clone(fb.renderbuffer(BufferIndex::FrontLeft).unwrap());
    let mut row = [0u8; 12];
    front.storage().get_row(0, 1, 3, &mut row);
    assert_eq!(row, [0, 0, 0, 77].repeat(3).as_slice());
}

#[test]
fn test_depth_buffer_scatter_writes() {
    init_tracing();
    let mut fb = Framebuffer::new_window_system(Visual::default());
    fb.add_depth_renderbuffer(16).unwrap();
    fb.resize_buffers(4, 4).unwrap();

    let depth = Arc::clone(fb.renderbuffer(BufferIndex::Depth).unwrap());
    let xs = [0, 3, 1];
    let ys = [0, 3, 2];
    let value = 0xBEEFu16.to_ne_bytes();
    depth.storage().put_mono_values(&xs, &ys, &value, Some(&[true, false, true]));

    let mut out = [0u8; 6];
    depth.storage().get_values(&xs, &ys, &mut out);
    assert_eq!(&out[0..2], &value);
    assert_eq!(&out[2..4], &[0, 0]);
    assert_eq!(&out[4..6], &value);
}

#[test]
fn test_failed_resize_leaves_buffer_empty_and_reusable() {
    init_tracing();
    let mut fb = Framebuffer::new_window_system(Visual::default());
    fb.add_color_renderbuffers(8, 8, BufferMask::FRONT_LEFT).unwrap();
    let front = Arc::clone(fb.renderbuffer(BufferIndex::FrontLeft).unwrap());

    match fb.resize_buffers(u32::MAX, u32::MAX) {
        Err(FramebufferError::Renderbuffer(RenderbufferError::OutOfMemory { .. })) => {}
        other => panic!("Expected OutOfMemory, got {:?}", other),
    }
    assert_eq!((front.width(), front.height()), (0, 0));
    assert_eq!(front.format(), PixelFormat::Rgba8888);

    fb.resize_buffers(2, 2).unwrap();
    assert_eq!((front.width(), front.height()), (2, 2));
}

#[test]
fn test_shared_buffer_across_framebuffers_on_threads() {
    init_tracing();
    let shared = Renderbuffer::new_soft(7, InternalFormat::Rgba8).unwrap();
    let mut owner = Framebuffer::new(1, Visual::default());
    owner.add_renderbuffer(BufferIndex::Aux0, &shared);

    thread::scope(|scope| {
        for name in 2..6 {
            let shared = Arc::clone(&shared);
            scope.spawn(move || {
                let mut fb = Framebuffer::new(name, Visual::default());
                for i in 0..200 {
                    fb.add_renderbuffer(BufferIndex::Aux1, &shared);
                    fb.remove_renderbuffer(BufferIndex::Aux1);

                    let own = Renderbuffer::new_soft(name * 1000 + i, InternalFormat::Rgba8).unwrap();
                    fb.add_renderbuffer(BufferIndex::Aux2, &shared);
                    fb.add_renderbuffer(BufferIndex::Aux2, &own);
                    fb.remove_renderbuffer(BufferIndex::Aux2);
                    assert!(own.is_destroyed());
                }
            });
        }
    });

    assert_eq!(shared.ref_count(), 1);
    assert!(!shared.is_destroyed());
    drop(owner);
    assert!(shared.is_destroyed());
}
