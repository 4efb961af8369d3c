#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interactive Mandelbrot plotter
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which `z = z * z + c`, started at zero, never runs off to
//! infinity.  Points outside the set are colored by how quickly they
//! escape the circle of radius 2; points inside stay black.
//!
//! This crate paints that picture continuously.  The screen is cut
//! into vertical bands, one per CPU, and each band is repainted over
//! and over by its own worker thread, reading the live camera for
//! every pixel.  Meanwhile the presentation loop shows whatever is in
//! the framebuffer, steers the camera from the keyboard, and saves
//! screenshots on request.  Nobody waits for anybody: a camera move
//! simply ripples through the bands as the workers get to it.

pub mod camera;
pub mod config;
pub mod error;
pub mod escape;
pub mod export;
pub mod framebuffer;
pub mod planes;
pub mod pool;
pub mod present;
pub mod window;

pub use camera::{Camera, View};
pub use config::Config;
pub use error::{BrotError, BrotResult};
pub use escape::{evaluate, EscapeTime};
pub use export::{ImageEncoder, PngEncoder};
pub use framebuffer::{partition_columns, Band, Framebuffer, Rgba};
pub use pool::{RenderPool, StopSignal};
pub use present::{Event, Key, Presenter, Surface};
pub use window::MiniFbSurface;

/// Runs the plotter against any surface and encoder: starts the
/// workers, drives the presentation loop until the stop signal is
/// raised, then joins the workers.  Returns the number of frames shown.
/// A window with no pixels is refused before anything starts.
pub fn run<S, E>(config: &Config, surface: &mut S, encoder: &mut E) -> BrotResult<u64>
where
    S: Surface + ?Sized,
    E: ImageEncoder + ?Sized,
{
    if config.width == 0 || config.height == 0 {
        return Err(BrotError::config(format!(
            "window must have at least one pixel, got {}x{}",
            config.width, config.height
        )));
    }
    let camera = Camera::default();
    let stop = StopSignal::new();
    let (framebuffer, bands) = Framebuffer::new(config.width, config.height, config.threads);
    let evaluator = EscapeTime::new(config.width, config.height, config.iterations);
    tracing::info!(
        width = config.width,
        height = config.height,
        workers = bands.len(),
        iterations = config.iterations,
        "starting render workers"
    );

    let outcome = crossbeam::scope(|scope| {
        let _guard = stop.raise_on_drop();
        let pool = RenderPool::spawn(scope, bands, evaluator, &camera, &stop);
        let mut presenter = Presenter::new(&camera, &framebuffer, stop.clone(), &config.screenshot_dir);
        let frames = presenter.run(surface, encoder);
        stop.raise();
        let passes = pool.join()?;
        tracing::info!(?passes, "render workers joined");
        frames
    });

    outcome.map_err(|_| BrotError::WorkerPanic)?
}
