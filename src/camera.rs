// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The live camera: a zoom factor and the point of the complex plane
//! the screen is centered on.
//!
//! There is exactly one writer (the presentation loop) and any number
//! of readers (the render workers).  Each of the three fields is its
//! own atomic cell holding the bits of an `f64`, and every access is
//! `Relaxed`.  A reader may therefore see a new zoom with an old
//! center, or the other way around.  That mix only lasts until the
//! worker's next pass over its band, so no lock is taken.

use std::sync::atomic::{AtomicU64, Ordering};

/// Factor applied to the zoom by the zoom-in key.
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Factor applied to the zoom by the zoom-out key.  Note that
/// `ZOOM_IN_FACTOR * ZOOM_OUT_FACTOR` is 0.99, not 1.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Fraction of the current zoom that one pan keystroke moves the
/// center by.
pub const PAN_STEP: f64 = 0.1;

/// A plain copy of the camera fields, as seen by one reader at one
/// moment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct View {
    /// Magnification; always strictly positive.
    pub zoom: f64,
    /// Real part of the point at the center of the screen.
    pub center_x: f64,
    /// Imaginary part of the point at the center of the screen.
    pub center_y: f64,
}

impl Default for View {
    fn default() -> Self {
        View {
            zoom: 1.0,
            center_x: 0.0,
            center_y: 0.0,
        }
    }
}

#[derive(Debug)]
struct Cell(AtomicU64);

impl Cell {
    fn new(v: f64) -> Self {
        Cell(AtomicU64::new(v.to_bits()))
    }

    #[inline]
    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed)
    }
}

/// The shared camera.  Readers call [`Camera::view`]; the mutating
/// methods must only be called from the presentation loop.
#[derive(Debug)]
pub struct Camera {
    zoom: Cell,
    center_x: Cell,
    center_y: Cell,
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new(View::default())
    }
}

impl Camera {
    /// A camera starting at the given view.  A non-positive or
    /// non-finite zoom is replaced by 1.0.
    pub fn new(view: View) -> Self {
        let zoom = if view.zoom.is_finite() && view.zoom > 0.0 {
            view.zoom
        } else {
            1.0
        };
        Camera {
            zoom: Cell::new(zoom),
            center_x: Cell::new(view.center_x),
            center_y: Cell::new(view.center_y),
        }
    }

    /// Reads the three fields.  The result may be torn if the writer
    /// is active at the same moment.
    #[inline]
    pub fn view(&self) -> View {
        View {
            zoom: self.zoom.get(),
            center_x: self.center_x.get(),
            center_y: self.center_y.get(),
        }
    }

    /// Current magnification.
    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom.get()
    }

    /// Multiplies the zoom by `factor`.  A product that is positive and
    /// finite is stored exactly as computed; only one that would
    /// underflow to zero or overflow to infinity is pinned to the
    /// nearest end of the positive finite `f64` range.
    pub fn zoom_by(&self, factor: f64) {
        let zoom = (self.zoom.get() * factor).clamp(f64::MIN_POSITIVE, f64::MAX);
        self.zoom.set(zoom);
    }

    /// Zooms in by [`ZOOM_IN_FACTOR`].
    pub fn zoom_in(&self) {
        self.zoom_by(ZOOM_IN_FACTOR)
    }

    /// Zooms out by [`ZOOM_OUT_FACTOR`].
    pub fn zoom_out(&self) {
        self.zoom_by(ZOOM_OUT_FACTOR)
    }

    /// Moves the center by `dx` and `dy` pan steps, where one step is
    /// `zoom * PAN_STEP` at the current zoom.
    pub fn pan(&self, dx: f64, dy: f64) {
        let step = self.zoom.get() * PAN_STEP;
        if dx != 0.0 {
            self.center_x.set(self.center_x.get() + dx * step);
        }
        if dy != 0.0 {
            self.center_y.set(self.center_y.get() + dy * step);
        }
    }
}
