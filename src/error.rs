// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type for everything that can go wrong at the edges of
//! the plotter.  The fractal arithmetic itself is total; only the
//! window, the PNG writer and the configuration can fail.

/// Shorthand for results carrying a [`BrotError`].
pub type BrotResult<T> = Result<T, BrotError>;

/// Failures at the boundary of the renderer.
#[derive(thiserror::Error, Debug)]
pub enum BrotError {
    /// The window could not be created, or refused a frame.
    #[error("window error: {0}")]
    Window(String),

    /// The PNG encoder could not encode or write a screenshot.
    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),

    /// The pixel buffer handed to an encoder does not cover the image.
    #[error("buffer of {len} bytes is too small for {width}x{height} with stride {stride}")]
    BufferSize {
        /// Bytes actually supplied.
        len: usize,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Bytes per row.
        stride: usize,
    },

    /// A configuration value is out of range or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A render worker panicked before it could be joined.
    #[error("render worker panicked")]
    WorkerPanic,
}

impl BrotError {
    /// Wraps any displayable window-system failure.
    pub fn window(msg: impl ToString) -> Self {
        Self::Window(msg.to_string())
    }

    /// Wraps a configuration complaint.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
