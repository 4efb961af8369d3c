// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The presentation and input loop.
//!
//! This is the only code that writes to the camera and the only code
//! that reads the whole framebuffer.  Every tick it drains the input
//! queue, steers the camera, copies whatever the workers have painted
//! so far onto the display, and, if asked, saves that same copy as a
//! PNG.  It never waits for the workers.

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::camera::Camera;
use crate::error::BrotResult;
use crate::export::{screenshot_path, ImageEncoder};
use crate::framebuffer::Framebuffer;
use crate::pool::StopSignal;

/// The keys the plotter reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Zoom in.
    Z,
    /// Zoom out.
    X,
    /// Pan towards negative imaginary.
    Up,
    /// Pan towards positive imaginary.
    Down,
    /// Pan towards negative real.
    Left,
    /// Pan towards positive real.
    Right,
    /// Save a screenshot.
    F2,
}

/// An input event, in the order the window delivered it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The viewer asked to close the plotter.
    Quit,
    /// A key went down (or auto-repeated).
    KeyDown(Key),
}

/// The display and input side of a window.
pub trait Surface {
    /// Drains the events that arrived since the last call, oldest
    /// first.
    fn poll_events(&mut self) -> Vec<Event>;

    /// Shows a `width` x `height` RGBA image, row-major and tightly
    /// packed.
    fn present(&mut self, rgba: &[u8], width: usize, height: usize) -> BrotResult<()>;
}

/// What one tick did with its input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    /// An F2 press arrived this tick.
    pub screenshot: bool,
    /// A quit request arrived this tick.
    pub quit: bool,
}

/// The loop's state: the camera it steers, the buffer it shows, and
/// its frame counter.
pub struct Presenter<'a> {
    camera: &'a Camera,
    framebuffer: &'a Framebuffer,
    stop: StopSignal,
    screenshot_dir: PathBuf,
    frame: u64,
    display: Vec<u8>,
}

impl<'a> Presenter<'a> {
    /// A presenter starting at frame 0 that writes screenshots into
    /// `screenshot_dir`.
    pub fn new(
        camera: &'a Camera,
        framebuffer: &'a Framebuffer,
        stop: StopSignal,
        screenshot_dir: impl Into<PathBuf>,
    ) -> Self {
        Presenter {
            camera,
            framebuffer,
            stop,
            screenshot_dir: screenshot_dir.into(),
            frame: 0,
            display: Vec::with_capacity(framebuffer.byte_len()),
        }
    }

    /// The number of ticks completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Applies one event to the camera or the stop signal.
    pub fn apply(&self, event: Event, input: &mut TickInput) {
        match event {
            Event::Quit => {
                input.quit = true;
                self.stop.raise();
            }
            Event::KeyDown(Key::Z) => self.camera.zoom_in(),
            Event::KeyDown(Key::X) => self.camera.zoom_out(),
            Event::KeyDown(Key::Up) => self.camera.pan(0.0, -1.0),
            Event::KeyDown(Key::Down) => self.camera.pan(0.0, 1.0),
            Event::KeyDown(Key::Left) => self.camera.pan(-1.0, 0.0),
            Event::KeyDown(Key::Right) => self.camera.pan(1.0, 0.0),
            Event::KeyDown(Key::F2) => input.screenshot = true,
        }
    }

    /// One turn of the loop: input, display, then the screenshot if one
    /// was asked for.  A failing encoder is logged and otherwise
    /// ignored; a failing display is returned.
    pub fn tick<S, E>(&mut self, surface: &mut S, encoder: &mut E) -> BrotResult<TickInput>
    where
        S: Surface + ?Sized,
        E: ImageEncoder + ?Sized,
    {
        let mut input = TickInput::default();
        let events = surface.poll_events();
        if !events.is_empty() {
            for event in &events {
                self.apply(*event, &mut input);
            }
            debug!(frame = self.frame, events = events.len(), view = ?self.camera.view(), "input applied");
        }

        self.framebuffer.copy_into(&mut self.display);
        surface.present(&self.display, self.framebuffer.width(), self.framebuffer.height())?;

        if input.screenshot {
            self.export(encoder);
        }

        self.frame += 1;
        Ok(input)
    }

    fn export<E: ImageEncoder + ?Sized>(&self, encoder: &mut E) {
        let path = screenshot_path(&self.screenshot_dir, self.frame);
        let width = self.framebuffer.width();
        let result = encoder.encode_png(
            &path,
            width as u32,
            self.framebuffer.height() as u32,
            &self.display,
            width * 4,
        );
        match result {
            Ok(()) => info!(path = %path.display(), "screenshot saved"),
            Err(e) => warn!(path = %path.display(), error = %e, "screenshot failed"),
        }
    }

    /// Ticks until the stop signal is raised, by a quit event or by
    /// anyone else.  Returns the number of frames shown.  If the
    /// display fails the stop signal is raised before the error is
    /// returned, so the workers wind down either way.
    pub fn run<S, E>(&mut self, surface: &mut S, encoder: &mut E) -> BrotResult<u64>
    where
        S: Surface + ?Sized,
        E: ImageEncoder + ?Sized,
    {
        while !self.stop.is_raised() {
            if let Err(e) = self.tick(surface, encoder) {
                error!(frame = self.frame, error = %e, "display failed");
                self.stop.raise();
                return Err(e);
            }
        }
        info!(frames = self.frame, "presentation loop finished");
        Ok(self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PAN_STEP;

    fn presenter_parts() -> (Camera, Framebuffer, StopSignal) {
        let (fb, _) = Framebuffer::new(4, 3, 1);
        (Camera::default(), fb, StopSignal::new())
    }

    #[test]
    fn keys_steer_the_camera() {
        let (camera, fb, stop) = presenter_parts();
        let presenter = Presenter::new(&camera, &fb, stop.clone(), ".");
        let mut input = TickInput::default();

        presenter.apply(Event::KeyDown(Key::Right), &mut input);
        presenter.apply(Event::KeyDown(Key::Down), &mut input);
        let view = camera.view();
        assert!((view.center_x - PAN_STEP).abs() < 1e-12);
        assert!((view.center_y - PAN_STEP).abs() < 1e-12);

        presenter.apply(Event::KeyDown(Key::Left), &mut input);
        presenter.apply(Event::KeyDown(Key::Up), &mut input);
        let view = camera.view();
        assert!(view.center_x.abs() < 1e-12);
        assert!(view.center_y.abs() < 1e-12);

        presenter.apply(Event::KeyDown(Key::Z), &mut input);
        assert!((camera.zoom() - 1.1).abs() < 1e-12);
        presenter.apply(Event::KeyDown(Key::X), &mut input);
        assert!((camera.zoom() - 0.99).abs() < 1e-12);

        assert_eq!(input, TickInput::default());
        assert!(!stop.is_raised());
    }

    #[test]
    fn quit_and_screenshot_only_touch_the_tick() {
        let (camera, fb, stop) = presenter_parts();
        let presenter = Presenter::new(&camera, &fb, stop.clone(), ".");
        let mut input = TickInput::default();

        presenter.apply(Event::KeyDown(Key::F2), &mut input);
        assert!(input.screenshot);
        assert!(!stop.is_raised());

        presenter.apply(Event::Quit, &mut input);
        assert!(input.quit);
        assert!(stop.is_raised());
        assert_eq!(camera.view(), crate::camera::View::default());
    }
}
