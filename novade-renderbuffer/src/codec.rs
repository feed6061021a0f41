//! Per-format pixel encode/decode routines over linear row-major bytes.
//!
//! Every [`PixelFormat`] has exactly one [`Codec`] in a static table, looked
//! up once when storage is allocated. Codecs hold no state: each routine
//! borrows the raw byte buffer and the row width of the storage it works on.
//!
//! Values cross this layer as native-endian bytes in the storage's channel
//! width. Colour formats are always exchanged as four channels; a
//! three-channel store drops alpha on write and reports the channel maximum
//! on read. No conversion between channel widths happens here.
//!
//! Coordinates outside the storage are a caller bug and panic on the slice
//! bounds check.

use crate::format::{ChannelType, PixelFormat};

/// How a stored cell relates to the caller-facing pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Stored cell and external pixel are byte-identical.
    Verbatim,
    /// Three stored colour channels; alpha is synthesized as the channel
    /// maximum on read and dropped on write.
    ExpandAlpha,
}

/// Static description of one pixel format's accessors.
#[derive(Debug)]
pub struct Codec {
    pub format: PixelFormat,
    pub layout: Layout,
    /// Whether `get_pointer` may hand out the raw cell memory.
    pub direct_access: bool,
    /// Whether the colour-only write (`put_row_rgb`) is defined.
    pub color_only: bool,
    pixel_size: usize,
    external_pixel_size: usize,
    channel_size: usize,
}

const fn codec(format: PixelFormat, layout: Layout, direct_access: bool) -> Codec {
    Codec {
        format,
        layout,
        direct_access,
        color_only: format.is_color(),
        pixel_size: format.pixel_size(),
        external_pixel_size: format.external_pixel_size(),
        channel_size: format.channel_type().byte_size(),
    }
}

/// Indexed by [`PixelFormat::index`].
static CODECS: [Codec; PixelFormat::COUNT] = [
    codec(PixelFormat::Rgb888, Layout::ExpandAlpha, false),
    codec(PixelFormat::Rgba8888, Layout::Verbatim, true),
    codec(PixelFormat::SignedRgba16, Layout::Verbatim, true),
    codec(PixelFormat::A8, Layout::Verbatim, false),
    codec(PixelFormat::S8, Layout::Verbatim, true),
    codec(PixelFormat::Z16, Layout::Verbatim, true),
    codec(PixelFormat::X8Z24, Layout::Verbatim, true),
    codec(PixelFormat::Z32, Layout::Verbatim, true),
    codec(PixelFormat::Z24S8, Layout::Verbatim, true),
];

impl PixelFormat {
    /// The accessor table entry for this format.
    #[inline]
    pub fn codec(self) -> &'static Codec {
        &CODECS[self.index()]
    }
}

#[inline]
fn is_written(mask: Option<&[bool]>, i: usize) -> bool {
    mask.map_or(true, |m| m[i])
}

/// A cell whose bytes are all equal can be stored with a plain byte fill.
#[inline]
fn fill_byte(cell: &[u8]) -> Option<u8> {
    let (&first, rest) = cell.split_first()?;
    rest.iter().all(|&b| b == first).then_some(first)
}

impl Codec {
    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.pixel_size
    }

    #[inline]
    pub fn external_pixel_size(&self) -> usize {
        self.external_pixel_size
    }

    #[inline]
    fn channel_type(&self) -> ChannelType {
        self.format.channel_type()
    }

    #[inline]
    fn offset(&self, width: u32, x: u32, y: u32) -> usize {
        (y as usize * width as usize + x as usize) * self.pixel_size
    }

    /// Bytes of a colour-only source pixel (three channels).
    #[inline]
    fn rgb_size(&self) -> usize {
        3 * self.channel_size
    }

    fn alpha_max(&self) -> [u8; 4] {
        self.channel_type().max_bytes()
    }

    /// Stored bytes for one external pixel. The stored cell is always a
    /// prefix of the external representation.
    #[inline]
    fn encode<'a>(&self, external: &'a [u8]) -> &'a [u8] {
        &external[..self.pixel_size]
    }

    fn decode(&self, cell: &[u8], out: &mut [u8]) {
        match self.layout {
            Layout::Verbatim => out.copy_from_slice(cell),
            Layout::ExpandAlpha => {
                let (rgb, alpha) = out.split_at_mut(self.pixel_size);
                rgb.copy_from_slice(cell);
                alpha.copy_from_slice(&self.alpha_max()[..self.channel_size]);
            }
        }
    }

    /// Raw cell memory from `(x, y)` to the end of the store, or `None` when
    /// the format has no directly addressable external layout or the store
    /// is empty.
    pub fn get_pointer<'a>(&self, data: &'a [u8], width: u32, x: u32, y: u32) -> Option<&'a [u8]> {
        if !self.direct_access || data.is_empty() {
            return None;
        }
        data.get(self.offset(width, x, y)..)
    }

    /// Mutable counterpart of [`get_pointer`](Self::get_pointer).
    pub fn get_pointer_mut<'a>(
        &self,
        data: &'a mut [u8],
        width: u32,
        x: u32,
        y: u32,
    ) -> Option<&'a mut [u8]> {
        if !self.direct_access || data.is_empty() {
            return None;
        }
        let start = self.offset(width, x, y);
        data.get_mut(start..)
    }

    /// Copies `count` pixels starting at `(x, y)` into `out`, one external
    /// pixel per `external_pixel_size` bytes.
    pub fn get_row(&self, data: &[u8], width: u32, x: u32, y: u32, count: usize, out: &mut [u8]) {
        let start = self.offset(width, x, y);
        let src = &data[start..start + count * self.pixel_size];
        let out = &mut out[..count * self.external_pixel_size];
        match self.layout {
            Layout::Verbatim => out.copy_from_slice(src),
            Layout::ExpandAlpha => {
                for (cell, px) in src
                    .chunks_exact(self.pixel_size)
                    .zip(out.chunks_exact_mut(self.external_pixel_size))
                {
                    self.decode(cell, px);
                }
            }
        }
    }

    /// Reads the pixels at `(xs[i], ys[i])` into consecutive slots of `out`.
    pub fn get_values(&self, data: &[u8], width: u32, xs: &[u32], ys: &[u32], out: &mut [u8]) {
        assert_eq!(xs.len(), ys.len(), "scatter coordinate lists differ in length");
        for ((&x, &y), px) in xs
            .iter()
            .zip(ys)
            .zip(out.chunks_exact_mut(self.external_pixel_size))
        {
            let start = self.offset(width, x, y);
            self.decode(&data[start..start + self.pixel_size], px);
        }
    }

    /// Writes `count` external pixels starting at `(x, y)`. Positions whose
    /// mask entry is false keep their previous contents.
    pub fn put_row(
        &self,
        data: &mut [u8],
        width: u32,
        x: u32,
        y: u32,
        count: usize,
        values: &[u8],
        mask: Option<&[bool]>,
    ) {
        let start = self.offset(width, x, y);
        let dst = &mut data[start..start + count * self.pixel_size];
        let src = &values[..count * self.external_pixel_size];
        if mask.is_none() && self.layout == Layout::Verbatim {
            dst.copy_from_slice(src);
            return;
        }
        for (i, (cell, px)) in dst
            .chunks_exact_mut(self.pixel_size)
            .zip(src.chunks_exact(self.external_pixel_size))
            .enumerate()
        {
            if is_written(mask, i) {
                cell.copy_from_slice(self.encode(px));
            }
        }
    }

    /// Writes `count` three-channel colour pixels starting at `(x, y)`. A
    /// four-channel store gets alpha set to the channel maximum.
    ///
    /// # Panics
    ///
    /// If the format is not a colour format.
    pub fn put_row_rgb(
        &self,
        data: &mut [u8],
        width: u32,
        x: u32,
        y: u32,
        count: usize,
        values: &[u8],
        mask: Option<&[bool]>,
    ) {
        assert!(self.color_only, "{} has no colour-only write", self.format);
        let rgb = self.rgb_size();
        let start = self.offset(width, x, y);
        let dst = &mut data[start..start + count * self.pixel_size];
        let src = &values[..count * rgb];
        if mask.is_none() && self.pixel_size == rgb {
            dst.copy_from_slice(src);
            return;
        }
        let alpha = self.alpha_max();
        for (i, (cell, px)) in dst
            .chunks_exact_mut(self.pixel_size)
            .zip(src.chunks_exact(rgb))
            .enumerate()
        {
            if is_written(mask, i) {
                let (color, rest) = cell.split_at_mut(rgb);
                color.copy_from_slice(px);
                rest.copy_from_slice(&alpha[..rest.len()]);
            }
        }
    }

    /// Writes one external pixel value to `count` positions starting at
    /// `(x, y)`.
    pub fn put_mono_row(
        &self,
        data: &mut [u8],
        width: u32,
        x: u32,
        y: u32,
        count: usize,
        value: &[u8],
        mask: Option<&[bool]>,
    ) {
        let start = self.offset(width, x, y);
        let dst = &mut data[start..start + count * self.pixel_size];
        let cell = self.encode(value);
        if mask.is_none() {
            if let Some(byte) = fill_byte(cell) {
                dst.fill(byte);
                return;
            }
        }
        for (i, px) in dst.chunks_exact_mut(self.pixel_size).enumerate() {
            if is_written(mask, i) {
                px.copy_from_slice(cell);
            }
        }
    }

    /// Writes `values[i]` to `(xs[i], ys[i])` for every unmasked `i`.
    pub fn put_values(
        &self,
        data: &mut [u8],
        width: u32,
        xs: &[u32],
        ys: &[u32],
        values: &[u8],
        mask: Option<&[bool]>,
    ) {
        assert_eq!(xs.len(), ys.len(), "scatter coordinate lists differ in length");
        for (i, ((&x, &y), px)) in xs
            .iter()
            .zip(ys)
            .zip(values.chunks_exact(self.external_pixel_size))
            .enumerate()
        {
            if is_written(mask, i) {
                let start = self.offset(width, x, y);
                data[start..start + self.pixel_size].copy_from_slice(self.encode(px));
            }
        }
    }

    /// Writes one external pixel value to every unmasked `(xs[i], ys[i])`.
    pub fn put_mono_values(
        &self,
        data: &mut [u8],
        width: u32,
        xs: &[u32],
        ys: &[u32],
        value: &[u8],
        mask: Option<&[bool]>,
    ) {
        assert_eq!(xs.len(), ys.len(), "scatter coordinate lists differ in length");
        let cell = self.encode(value);
        for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            if is_written(mask, i) {
                let start = self.offset(width, x, y);
                data[start..start + self.pixel_size].copy_from_slice(cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn store(format: PixelFormat, width: u32, height: u32) -> Vec<u8> {
        vec![0; width as usize * height as usize * format.pixel_size()]
    }

    #[test]
    fn test_table_is_indexed_by_format() {
        for format in PixelFormat::ALL {
            assert_eq!(format.codec().format, format);
        }
    }

    #[rstest]
    #[case(PixelFormat::Rgba8888)]
    #[case(PixelFormat::SignedRgba16)]
    #[case(PixelFormat::S8)]
    #[case(PixelFormat::Z16)]
    #[case(PixelFormat::X8Z24)]
    #[case(PixelFormat::Z32)]
    #[case(PixelFormat::Z24S8)]
    fn test_row_is_preserved_for_verbatim_formats(#[case] format: PixelFormat) {
        let codec = format.codec();
        let mut data = store(format, 3, 2);
        let payload: Vec<u8> = (1..=(3 * codec.external_pixel_size()) as u8).collect();
        codec.put_row(&mut data, 3, 0, 1, 3, &payload, None);

        let mut out = vec![0; payload.len()];
        codec.get_row(&data, 3, 0, 1, 3, &mut out);
        assert_eq!(out, payload);

        let mut first_row = vec![0xaa; payload.len()];
        codec.get_row(&data, 3, 0, 0, 3, &mut first_row);
        assert!(first_row.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rgb888_drops_and_synthesizes_alpha() {
        let codec = PixelFormat::Rgb888.codec();
        let mut data = store(PixelFormat::Rgb888, 2, 1);
        codec.put_row(&mut data, 2, 0, 0, 2, &[1, 2, 3, 4, 5, 6, 7, 8], None);
        assert_eq!(data, vec![1, 2, 3, 5, 6, 7]);

        let mut out = [0u8; 8];
        codec.get_row(&data, 2, 0, 0, 2, &mut out);
        assert_eq!(out, [1, 2, 3, 255, 5, 6, 7, 255]);
    }

    #[test]
    fn test_masked_row_leaves_unselected_pixels() {
        let codec = PixelFormat::Rgba8888.codec();
        let mut data = store(PixelFormat::Rgba8888, 3, 1);
        codec.put_mono_row(&mut data, 3, 0, 0, 3, &[9, 9, 9, 9], None);
        codec.put_row(
            &mut data,
            3,
            0,
            0,
            3,
            &[1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3],
            Some(&[true, false, true]),
        );
        assert_eq!(data, vec![1, 1, 1, 1, 9, 9, 9, 9, 3, 3, 3, 3]);
    }

    #[test]
    fn test_mono_row_fill_and_loop_paths_agree() {
        let codec = PixelFormat::Rgba8888.codec();
        let mut filled = store(PixelFormat::Rgba8888, 4, 1);
        codec.put_mono_row(&mut filled, 4, 0, 0, 4, &[0x7f; 4], None);
        assert!(filled.iter().all(|&b| b == 0x7f));

        let mut looped = store(PixelFormat::Rgba8888, 4, 1);
        codec.put_mono_row(&mut looped, 4, 0, 0, 4, &[255, 0, 0, 255], None);
        assert_eq!(looped, [255, 0, 0, 255].repeat(4));

        let mut masked = store(PixelFormat::Rgba8888, 4, 1);
        codec.put_mono_row(&mut masked, 4, 0, 0, 4, &[5; 4], Some(&[false, true, false, true]));
        assert_eq!(masked, vec![0, 0, 0, 0, 5, 5, 5, 5, 0, 0, 0, 0, 5, 5, 5, 5]);
    }

    #[test]
    fn test_rgb888_mono_row_ignores_alpha() {
        let codec = PixelFormat::Rgb888.codec();
        let mut data = store(PixelFormat::Rgb888, 2, 1);
        codec.put_mono_row(&mut data, 2, 0, 0, 2, &[40, 40, 40, 0], None);
        assert_eq!(data, vec![40; 6]);
    }

    #[test]
    fn test_scatter_roundtrip_and_mask() {
        let codec = PixelFormat::Z16.codec();
        let mut data = store(PixelFormat::Z16, 2, 2);
        let xs = [1, 0, 1];
        let ys = [1, 0, 0];
        let values: Vec<u8> = [100u16, 200, 300].iter().flat_map(|v| v.to_ne_bytes()).collect();
        codec.put_values(&mut data, 2, &xs, &ys, &values, Some(&[true, true, false]));

        let mut out = [0u8; 6];
        codec.get_values(&data, 2, &xs, &ys, &mut out);
        let read: Vec<u16> = out
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(read, vec![100, 200, 0]);
    }

    #[test]
    fn test_mono_values_writes_each_position() {
        let codec = PixelFormat::S8.codec();
        let mut data = store(PixelFormat::S8, 3, 3);
        codec.put_mono_values(&mut data, 3, &[0, 2, 1], &[0, 2, 1], &[0x80], None);
        assert_eq!(data, vec![0x80, 0, 0, 0, 0x80, 0, 0, 0, 0x80]);
    }

    #[test]
    fn test_put_row_rgb_sets_alpha_on_four_channel_store() {
        let codec = PixelFormat::Rgba8888.codec();
        let mut data = store(PixelFormat::Rgba8888, 2, 1);
        codec.put_row_rgb(&mut data, 2, 0, 0, 2, &[1, 2, 3, 4, 5, 6], Some(&[false, true]));
        assert_eq!(data, vec![0, 0, 0, 0, 4, 5, 6, 255]);

        let codec = PixelFormat::SignedRgba16.codec();
        let mut data = store(PixelFormat::SignedRgba16, 1, 1);
        let rgb: Vec<u8> = [-1i16, 0, 1].iter().flat_map(|v| v.to_ne_bytes()).collect();
        codec.put_row_rgb(&mut data, 1, 0, 0, 1, &rgb, None);
        let mut out = [0u8; 8];
        codec.get_row(&data, 1, 0, 0, 1, &mut out);
        let channels: Vec<i16> = out
            .chunks_exact(2)
            .map(|b| i16::from_ne_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(channels, vec![-1, 0, 1, i16::MAX]);
    }

    #[test]
    fn test_put_row_rgb_copies_three_channel_store() {
        let codec = PixelFormat::Rgb888.codec();
        let mut data = store(PixelFormat::Rgb888, 2, 1);
        codec.put_row_rgb(&mut data, 2, 0, 0, 2, &[1, 2, 3, 4, 5, 6], None);
        assert_eq!(data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    #[should_panic(expected = "no colour-only write")]
    fn test_put_row_rgb_on_depth_panics() {
        let codec = PixelFormat::Z32.codec();
        let mut data = store(PixelFormat::Z32, 1, 1);
        codec.put_row_rgb(&mut data, 1, 0, 0, 1, &[0; 12], None);
    }

    #[test]
    fn test_get_pointer_support() {
        let data = store(PixelFormat::Rgba8888, 2, 2);
        let ptr = PixelFormat::Rgba8888.codec().get_pointer(&data, 2, 1, 1).unwrap();
        assert_eq!(ptr.len(), 4);

        let rgb = store(PixelFormat::Rgb888, 2, 2);
        assert!(PixelFormat::Rgb888.codec().get_pointer(&rgb, 2, 0, 0).is_none());
        assert!(PixelFormat::Z16.codec().get_pointer(&[], 0, 0, 0).is_none());
    }

    #[test]
    fn test_depth24_is_not_masked_on_write() {
        let codec = PixelFormat::X8Z24.codec();
        let mut data = store(PixelFormat::X8Z24, 1, 1);
        codec.put_row(&mut data, 1, 0, 0, 1, &u32::MAX.to_ne_bytes(), None);
        assert_eq!(data, u32::MAX.to_ne_bytes().to_vec());
    }
}
