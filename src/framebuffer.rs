// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The shared raster the workers paint into and the presentation loop
//! copies out of.
//!
//! Every pixel is one `AtomicU32` holding its four RGBA bytes, so the
//! reader and the writers never race in the memory-model sense; the
//! reader may still observe a frame that is only partly repainted,
//! which is fine since the image is regenerated without end.
//!
//! Writers never touch the raster directly.  [`Framebuffer::new`]
//! hands back, alongside the read side, one [`Band`] per worker.
//! Bands are the only way to write, they are created once, cannot be
//! cloned, and refuse writes outside their own columns, so no two
//! threads can ever write the same pixel.

use itertools::Itertools;
use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::planes::{IntegralPlane, Pixel};

/// One pixel's color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Constructor.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Packs the color so that its little-endian bytes read R, G, B, A.
    #[inline]
    pub fn pack(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Inverse of [`Rgba::pack`].
    #[inline]
    pub fn unpack(word: u32) -> Self {
        let [r, g, b, a] = word.to_le_bytes();
        Rgba { r, g, b, a }
    }
}

/// Splits `0..width` into `count` contiguous, non-overlapping column
/// ranges.  Every range is `width / count` wide except the last, which
/// also takes the remainder.  A `count` of zero is treated as one.
pub fn partition_columns(width: usize, count: usize) -> Vec<Range<usize>> {
    let count = count.max(1);
    let span = width / count;
    (0..count)
        .map(|i| {
            let start = span * i;
            let end = if i + 1 == count { width } else { start + span };
            start..end
        })
        .collect_vec()
}

/// The read side of the raster.
#[derive(Debug)]
pub struct Framebuffer {
    pixels: Arc<[AtomicU32]>,
    plane: IntegralPlane,
}

impl Framebuffer {
    /// Allocates a `width` x `height` raster, zero-filled, and splits its
    /// columns into `bands` writer views.  The band count is clamped to
    /// `1..=width` so that every band owns at least one column.
    pub fn new(width: usize, height: usize, bands: usize) -> (Framebuffer, Vec<Band>) {
        let plane = IntegralPlane(width, height);
        let pixels: Arc<[AtomicU32]> = (0..plane.len()).map(|_| AtomicU32::new(0)).collect();
        let count = bands.clamp(1, width.max(1));
        let writers = partition_columns(width, count)
            .into_iter()
            .enumerate()
            .map(|(index, columns)| Band {
                index,
                columns,
                plane,
                pixels: Arc::clone(&pixels),
            })
            .collect();
        (Framebuffer { pixels, plane }, writers)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.plane.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.plane.height()
    }

    /// The integral plane the raster covers.
    pub fn plane(&self) -> IntegralPlane {
        self.plane
    }

    /// Number of bytes a full RGBA copy of the raster takes.
    pub fn byte_len(&self) -> usize {
        self.plane.len() * 4
    }

    /// Reads a single pixel.
    pub fn get(&self, pixel: Pixel) -> Rgba {
        Rgba::unpack(self.pixels[pixel.1 * self.plane.width() + pixel.0].load(Ordering::Relaxed))
    }

    /// Copies the whole raster, row-major RGBA, into `out`, resizing it
    /// to [`Framebuffer::byte_len`] first.  Workers keep painting while
    /// this runs.
    pub fn copy_into(&self, out: &mut Vec<u8>) {
        out.resize(self.byte_len(), 0);
        for (bytes, word) in out.chunks_exact_mut(4).zip(self.pixels.iter()) {
            bytes.copy_from_slice(&word.load(Ordering::Relaxed).to_le_bytes());
        }
    }

    /// Returns a fresh RGBA copy of the raster.
    pub fn snapshot(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        self.copy_into(&mut out);
        out
    }
}

/// Exclusive write access to a contiguous range of columns.
#[derive(Debug)]
pub struct Band {
    index: usize,
    columns: Range<usize>,
    plane: IntegralPlane,
    pixels: Arc<[AtomicU32]>,
}

impl Band {
    /// Position of this band, counted from the left edge.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The columns this band owns.
    pub fn columns(&self) -> Range<usize> {
        self.columns.clone()
    }

    /// The whole screen the band is a part of.
    pub fn plane(&self) -> IntegralPlane {
        self.plane
    }

    /// Overwrites a pixel.  Panics if the pixel lies outside this band;
    /// that would be a bug in the caller, not a runtime condition.
    #[inline]
    pub fn put(&mut self, pixel: Pixel, color: Rgba) {
        assert!(
            self.columns.contains(&pixel.0) && pixel.1 < self.plane.height(),
            "pixel {:?} is outside band {} ({:?})",
            pixel,
            self.index,
            self.columns
        );
        self.pixels[pixel.1 * self.plane.width() + pixel.0].store(color.pack(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(width: usize, count: usize) {
        let ranges = partition_columns(width, count);
        assert_eq!(ranges.len(), count.max(1));
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(width));
        for (a, b) in ranges.iter().tuple_windows() {
            assert_eq!(a.end, b.start, "gap or overlap in {:?}", ranges);
        }
    }

    #[test]
    fn partitions_cover_the_width_exactly() {
        for width in [1, 7, 64, 480, 640, 641] {
            for count in 1..=16 {
                assert_exact_cover(width, count);
            }
        }
    }

    #[test]
    fn last_partition_absorbs_the_remainder() {
        let ranges = partition_columns(10, 3);
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
        let ranges = partition_columns(640, 6);
        assert_eq!(ranges[0], 0..106);
        assert_eq!(ranges[5], 530..640);
    }

    #[test]
    fn zero_partitions_means_one() {
        assert_eq!(partition_columns(5, 0), vec![0..5]);
    }

    #[test]
    fn band_count_is_clamped_to_the_width() {
        let (_, bands) = Framebuffer::new(3, 2, 8);
        assert_eq!(bands.len(), 3);
        assert!(bands.iter().all(|b| !b.columns().is_empty()));
        let (_, bands) = Framebuffer::new(3, 2, 0);
        assert_eq!(bands.len(), 1);
    }

    #[test]
    fn band_writes_show_up_in_the_snapshot() {
        let (fb, mut bands) = Framebuffer::new(4, 2, 2);
        let red = Rgba::new(255, 0, 0, 255);
        let blue = Rgba::new(0, 0, 255, 128);
        bands[0].put(Pixel(1, 0), red);
        bands[1].put(Pixel(3, 1), blue);
        assert_eq!(fb.get(Pixel(1, 0)), red);
        assert_eq!(fb.get(Pixel(3, 1)), blue);

        let bytes = fb.snapshot();
        assert_eq!(bytes.len(), 4 * 2 * 4);
        assert_eq!(&bytes[4..8], &[255, 0, 0, 255]);
        assert_eq!(&bytes[(4 + 3) * 4..(4 + 3) * 4 + 4], &[0, 0, 255, 128]);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "outside band")]
    fn band_refuses_foreign_columns() {
        let (_, mut bands) = Framebuffer::new(4, 2, 2);
        bands[0].put(Pixel(2, 0), Rgba::default());
    }

    #[test]
    fn pack_orders_bytes_as_rgba() {
        let c = Rgba::new(1, 2, 3, 4);
        assert_eq!(c.pack().to_le_bytes(), [1, 2, 3, 4]);
        assert_eq!(Rgba::unpack(c.pack()), c);
    }
}
