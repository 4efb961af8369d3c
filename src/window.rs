// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A [`Surface`] backed by a `minifb` window.

use minifb::{KeyRepeat, Window, WindowOptions};

use crate::error::{BrotError, BrotResult};
use crate::present::{Event, Key, Surface};

/// Maps a window key to one the plotter understands.  Escape closes
/// the plotter like the window's close button does.
pub fn translate(key: minifb::Key) -> Option<Event> {
    let key = match key {
        minifb::Key::Escape => return Some(Event::Quit),
        minifb::Key::Z => Key::Z,
        minifb::Key::X => Key::X,
        minifb::Key::Up => Key::Up,
        minifb::Key::Down => Key::Down,
        minifb::Key::Left => Key::Left,
        minifb::Key::Right => Key::Right,
        minifb::Key::F2 => Key::F2,
        _ => return None,
    };
    Some(Event::KeyDown(key))
}

/// Converts row-major RGBA bytes into the `0RGB` words `minifb`
/// displays, reusing `out`.
pub fn rgba_to_0rgb(rgba: &[u8], out: &mut Vec<u32>) {
    out.clear();
    out.extend(
        rgba.chunks_exact(4)
            .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2])),
    );
}

/// A resizable `minifb` window paced to a target frame rate.
///
/// `minifb` reports the keys that went down during a frame as a set,
/// not as a timed queue, so when several distinct keys are pressed
/// within one frame their relative order is lost and `poll_events`
/// returns them in whatever order `minifb` lists them.  A quit from
/// closing the window always comes last.
pub struct MiniFbSurface {
    window: Window,
    pixels: Vec<u32>,
    closed: bool,
}

impl MiniFbSurface {
    /// Opens a `width` x `height` window.  The frame rate limit is also
    /// the loop's only wait: `present` blocks until the next frame is
    /// due.
    pub fn open(title: &str, width: usize, height: usize, fps: usize) -> BrotResult<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(BrotError::window)?;
        window.set_target_fps(fps);
        Ok(MiniFbSurface {
            window,
            pixels: Vec::with_capacity(width * height),
            closed: false,
        })
    }
}

impl Surface for MiniFbSurface {
    fn poll_events(&mut self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .window
            .get_keys_pressed(KeyRepeat::Yes)
            .into_iter()
            .filter_map(translate)
            .collect();
        if !self.closed && !self.window.is_open() {
            self.closed = true;
            events.push(Event::Quit);
        }
        events
    }

    fn present(&mut self, rgba: &[u8], width: usize, height: usize) -> BrotResult<()> {
        rgba_to_0rgb(rgba, &mut self.pixels);
        self.window
            .update_with_buffer(&self.pixels, width, height)
            .map_err(BrotError::window)
    }
}
