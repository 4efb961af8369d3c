// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes the relationship
//! between the integral plane of the screen, with an origin at 0,0 in
//! the upper left, and the complex plane as seen through the camera.
//! Unlike a fixed pair of corners, the complex window moves every
//! time the camera does, so the mapping takes a [`View`] per call.
use num::Complex;

use crate::camera::View;

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0; all values are non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntegralPlane(pub usize, pub usize);

impl IntegralPlane {
    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.0
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.1
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.0 * self.1
    }

    /// True if the plane has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.0 == 0 || self.1 == 0
    }
}

/// Describes the x, y of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of the integral plane onto the complex plane through a
/// camera view.  The screen spans one unit of the complex plane in
/// each direction at zoom 1, centered on the camera's center.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The screen.
    pub integral_plane: IntegralPlane,
}

impl PlaneMapper {
    /// Constructor.
    pub fn new(width: usize, height: usize) -> PlaneMapper {
        PlaneMapper {
            integral_plane: IntegralPlane(width, height),
        }
    }

    /// Given a pixel on the integral plane, return the complex number
    /// under it for the given view.
    ///
    /// `re = (x / width - 0.5) / zoom + center_x`, and likewise for
    /// the imaginary part with y and height.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel, view: &View) -> Complex<f64> {
        let fx = (pixel.0 as f64) / (self.integral_plane.0 as f64);
        let fy = (pixel.1 as f64) / (self.integral_plane.1 as f64);
        Complex::new(
            (fx - 0.5) / view.zoom + view.center_x,
            (fy - 0.5) / view.zoom + view.center_y,
        )
    }
}
