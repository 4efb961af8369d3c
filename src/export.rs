// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Still-image export of the framebuffer.

use image::{ColorType, ImageFormat};
use std::path::{Path, PathBuf};

use crate::error::{BrotError, BrotResult};

/// Something that can write an RGBA buffer out as a PNG file.
pub trait ImageEncoder {
    /// Encodes `height` rows of `width` RGBA pixels, each row starting
    /// `stride` bytes after the previous one, and writes them to `path`.
    fn encode_png(
        &mut self,
        path: &Path,
        width: u32,
        height: u32,
        rgba: &[u8],
        stride: usize,
    ) -> BrotResult<()>;
}

/// The file name for a screenshot taken on frame `frame`.
pub fn screenshot_name(frame: u64) -> String {
    format!("frame_{}_screenshot.png", frame)
}

/// Where the screenshot for `frame` goes inside `dir`.
pub fn screenshot_path(dir: &Path, frame: u64) -> PathBuf {
    dir.join(screenshot_name(frame))
}

/// Writes PNG files with the `image` crate.
#[derive(Copy, Clone, Debug, Default)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn encode_png(
        &mut self,
        path: &Path,
        width: u32,
        height: u32,
        rgba: &[u8],
        stride: usize,
    ) -> BrotResult<()> {
        let too_small = || BrotError::BufferSize {
            len: rgba.len(),
            width,
            height,
            stride,
        };
        let row = (width as usize).checked_mul(4).ok_or_else(too_small)?;
        let needed = match height as usize {
            0 => Some(0),
            h => stride.checked_mul(h - 1).and_then(|n| n.checked_add(row)),
        }
        .ok_or_else(too_small)?;
        if stride < row || rgba.len() < needed {
            return Err(too_small());
        }

        let packed;
        let pixels = if stride == row {
            &rgba[..needed]
        } else {
            packed = rgba
                .chunks(stride)
                .take(height as usize)
                .flat_map(|line| &line[..row])
                .copied()
                .collect::<Vec<u8>>();
            &packed[..]
        };

        image::save_buffer_with_format(path, pixels, width, height, ColorType::Rgba8, ImageFormat::Png)?;
        Ok(())
    }
}
