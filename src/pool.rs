// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render worker pool.
//!
//! One worker per framebuffer band, each running on a crossbeam scoped
//! thread for as long as the plotter is open.  A worker scans its band
//! top to bottom, evaluating every pixel against whatever the camera
//! says *at that moment*, then starts over.  There is no frame
//! boundary and no coordination between workers: after the camera
//! moves, each band catches up at its own pace, and the picture
//! "boils" its way to the new view.
//!
//! The only thing a worker listens for is the stop signal, checked
//! before every pass and once per row.

use crossbeam::thread::{Scope, ScopedJoinHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::camera::Camera;
use crate::error::{BrotError, BrotResult};
use crate::escape::EscapeTime;
use crate::framebuffer::Band;
use crate::planes::Pixel;

/// The number of workers to use when none is asked for: one per
/// logical CPU, and never fewer than one.
pub fn default_worker_count() -> usize {
    num_cpus::get().max(1)
}

/// A shared flag that tells every loop in the program to wind down.
/// Once raised it stays raised.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// A signal that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks everyone holding this signal to stop.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True once [`StopSignal::raise`] has been called by anyone.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns a guard that raises this signal when it is dropped,
    /// including during unwinding.
    pub fn raise_on_drop(&self) -> StopGuard {
        StopGuard(self.clone())
    }
}

/// See [`StopSignal::raise_on_drop`].
#[derive(Debug)]
pub struct StopGuard(StopSignal);

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.0.raise();
    }
}

/// Paints every pixel of `band` once, reading the camera afresh for
/// every pixel.  Returns `false` if the stop signal cut the pass short,
/// `true` if the whole band was painted.
pub fn render_pass(band: &mut Band, evaluator: &EscapeTime, camera: &Camera, stop: &StopSignal) -> bool {
    let columns = band.columns();
    for row in 0..band.plane().height() {
        if stop.is_raised() {
            return false;
        }
        for column in columns.clone() {
            let pixel = Pixel(column, row);
            let view = camera.view();
            band.put(pixel, evaluator.evaluate(pixel, &view));
        }
    }
    true
}

/// The body of one worker: repaint the band until told to stop.
/// Returns the number of complete passes made.
fn run_worker(mut band: Band, evaluator: &EscapeTime, camera: &Camera, stop: &StopSignal) -> u64 {
    let span = tracing::debug_span!("worker", index = band.index(), columns = ?band.columns());
    let _enter = span.enter();
    debug!("render worker started");
    let mut passes: u64 = 0;
    while !stop.is_raised() && render_pass(&mut band, evaluator, camera, stop) {
        passes += 1;
        trace!(passes, "pass complete");
    }
    debug!(passes, "render worker stopped");
    passes
}

/// Handles to the running workers.  Dropping the pool without joining
/// it leaves the workers to the enclosing crossbeam scope, which will
/// wait for them; raise the stop signal first.
pub struct RenderPool<'scope> {
    handles: Vec<ScopedJoinHandle<'scope, u64>>,
}

impl<'scope> RenderPool<'scope> {
    /// Starts one worker per band inside `scope`.  The workers borrow
    /// the camera for the life of the scope and poll `stop` once per
    /// row.
    pub fn spawn<'env: 'scope>(
        scope: &'scope Scope<'env>,
        bands: Vec<Band>,
        evaluator: EscapeTime,
        camera: &'env Camera,
        stop: &StopSignal,
    ) -> Self {
        let handles = bands
            .into_iter()
            .map(|band| {
                let stop = stop.clone();
                scope.spawn(move |_| run_worker(band, &evaluator, camera, &stop))
            })
            .collect();
        RenderPool { handles }
    }

    /// Number of workers started.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no workers were started.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every worker to exit and returns the number of passes
    /// each one completed, in band order.  Only returns once all
    /// workers are gone, even if some of them panicked.
    pub fn join(self) -> BrotResult<Vec<u64>> {
        let results: Vec<_> = self.handles.into_iter().map(|h| h.join()).collect();
        let mut passes = Vec::with_capacity(results.len());
        for result in results {
            passes.push(result.map_err(|_| BrotError::WorkerPanic)?);
        }
        Ok(passes)
    }
}
