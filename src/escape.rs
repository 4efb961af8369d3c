// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.
//!
//! Each pixel is mapped through the camera onto the complex plane and
//! iterated as `z = z * z + c` from zero.  The number of iterations it
//! takes `z` to leave the circle of radius 2 picks the color.  The
//! iteration budget grows with the zoom, so the deeper the camera
//! goes the longer each point is given before it is declared part of
//! the set.

use num::Complex;

use crate::camera::View;
use crate::framebuffer::Rgba;
use crate::planes::{Pixel, PlaneMapper};

/// Iterations allowed at zoom 1.
pub const BASE_ITERATIONS: u32 = 100;

/// Escape counts at or above this saturate the red channel.
pub const COLOR_SPAN: u64 = 33;

/// Upper bound on the per-pixel iteration budget, whatever the zoom.
pub const MAX_BUDGET: f64 = u32::MAX as f64;

/// Iterates `z = z * z + point` while `|z| < 2` and the count has not
/// gone past `budget`.  Returns the iteration count if the point
/// escaped with budget to spare, or `None` if it ran out, in which
/// case the point is taken to be inside the set.
///
/// An escape on the very last permitted iteration counts as inside.
#[inline]
pub fn iterate_sample(point: &Complex<f64>, budget: f64) -> Option<u64> {
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    let mut n: u64 = 0;
    while z.norm_sqr() < 4.0 && (n as f64) <= budget {
        z = z * z + point;
        n += 1;
    }
    if (n as f64) < budget {
        Some(n)
    } else {
        None
    }
}

/// The reference palette: black inside the set, a linear red ramp
/// outside it that tops out at [`COLOR_SPAN`] iterations.
#[inline]
pub fn colorize(escape: Option<u64>) -> Rgba {
    let red = match escape {
        Some(n) => (255 * n / COLOR_SPAN).min(255) as u8,
        None => 0,
    };
    Rgba::new(red, 0, 0, 255)
}

/// An evaluator for one screen size and base budget.
#[derive(Copy, Clone, Debug)]
pub struct EscapeTime {
    mapper: PlaneMapper,
    base_iterations: u32,
}

impl EscapeTime {
    /// An evaluator for a `width` x `height` screen.
    pub fn new(width: usize, height: usize, base_iterations: u32) -> Self {
        EscapeTime {
            mapper: PlaneMapper::new(width, height),
            base_iterations,
        }
    }

    /// The pixel-to-plane mapping in use.
    pub fn mapper(&self) -> &PlaneMapper {
        &self.mapper
    }

    /// The iteration budget at the given view: `base * zoom`, capped at
    /// [`MAX_BUDGET`].
    #[inline]
    pub fn budget(&self, view: &View) -> f64 {
        (f64::from(self.base_iterations) * view.zoom).min(MAX_BUDGET)
    }

    /// Color of one pixel under one view.
    #[inline]
    pub fn evaluate(&self, pixel: Pixel, view: &View) -> Rgba {
        let point = self.mapper.pixel_to_point(&pixel, view);
        colorize(iterate_sample(&point, self.budget(view)))
    }
}

/// Color of pixel `(x, y)` on a `screen_width` x `screen_height` screen
/// under `view`, with the default budget of [`BASE_ITERATIONS`].
pub fn evaluate(x: usize, y: usize, view: &View, screen_width: usize, screen_height: usize) -> Rgba {
    EscapeTime::new(screen_width, screen_height, BASE_ITERATIONS).evaluate(Pixel(x, y), view)
}
