// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use brotplot::planes::Pixel;
use brotplot::{
    BrotError, BrotResult, Camera, Config, Event, Framebuffer, ImageEncoder, Key, Presenter, Rgba,
    StopSignal, Surface,
};

/// Plays back one batch of events per tick and remembers every frame it
/// was asked to show.  Once the script runs out it reports no events.
#[derive(Default)]
struct ScriptedSurface {
    script: VecDeque<Vec<Event>>,
    presented: Vec<Vec<u8>>,
    fail_on_present: Option<usize>,
}

impl ScriptedSurface {
    fn new(script: Vec<Vec<Event>>) -> Self {
        ScriptedSurface {
            script: script.into(),
            ..Default::default()
        }
    }
}

impl Surface for ScriptedSurface {
    fn poll_events(&mut self) -> Vec<Event> {
        self.script.pop_front().unwrap_or_default()
    }

    fn present(&mut self, rgba: &[u8], width: usize, height: usize) -> BrotResult<()> {
        assert_eq!(rgba.len(), width * height * 4);
        if self.fail_on_present == Some(self.presented.len()) {
            return Err(BrotError::window("surface lost"));
        }
        self.presented.push(rgba.to_vec());
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
struct EncodeCall {
    path: PathBuf,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    stride: usize,
}

#[derive(Default)]
struct RecordingEncoder {
    calls: Vec<EncodeCall>,
}

impl ImageEncoder for RecordingEncoder {
    fn encode_png(&mut self, path: &Path, width: u32, height: u32, rgba: &[u8], stride: usize) -> BrotResult<()> {
        self.calls.push(EncodeCall {
            path: path.to_path_buf(),
            width,
            height,
            rgba: rgba.to_vec(),
            stride,
        });
        Ok(())
    }
}

#[derive(Default)]
struct FailingEncoder {
    attempts: usize,
}

impl ImageEncoder for FailingEncoder {
    fn encode_png(&mut self, _: &Path, _: u32, _: u32, _: &[u8], _: usize) -> BrotResult<()> {
        self.attempts += 1;
        Err(image::ImageError::IoError(std::io::Error::other("disk full")).into())
    }
}

fn painted_framebuffer(width: usize, height: usize) -> Framebuffer {
    let (fb, mut bands) = Framebuffer::new(width, height, 2);
    for band in bands.iter_mut() {
        for x in band.columns() {
            for y in 0..height {
                band.put(Pixel(x, y), Rgba::new(x as u8, y as u8, 7, 255));
            }
        }
    }
    fb
}

#[test]
fn screenshot_uses_the_frame_counter_and_the_presented_bytes() {
    let camera = Camera::default();
    let fb = painted_framebuffer(5, 3);
    let stop = StopSignal::new();
    let mut presenter = Presenter::new(&camera, &fb, stop.clone(), "shots");
    let mut surface = ScriptedSurface::new(vec![vec![], vec![], vec![Event::KeyDown(Key::F2)], vec![]]);
    let mut encoder = RecordingEncoder::default();

    for _ in 0..4 {
        presenter.tick(&mut surface, &mut encoder).expect("tick");
    }

    assert_eq!(presenter.frame(), 4);
    assert_eq!(surface.presented.len(), 4);
    assert_eq!(
        encoder.calls,
        vec![EncodeCall {
            path: Path::new("shots").join("frame_2_screenshot.png"),
            width: 5,
            height: 3,
            rgba: surface.presented[2].clone(),
            stride: 20,
        }]
    );
    assert_eq!(&encoder.calls[0].rgba[4..8], &[1, 0, 7, 255]);
    assert!(!stop.is_raised());
}

#[test]
fn two_requests_in_one_tick_make_one_screenshot() {
    let camera = Camera::default();
    let fb = painted_framebuffer(2, 2);
    let mut presenter = Presenter::new(&camera, &fb, StopSignal::new(), ".");
    let mut surface = ScriptedSurface::new(vec![vec![Event::KeyDown(Key::F2), Event::KeyDown(Key::F2)]]);
    let mut encoder = RecordingEncoder::default();

    let input = presenter.tick(&mut surface, &mut encoder).expect("tick");
    assert!(input.screenshot);
    let input = presenter.tick(&mut surface, &mut encoder).expect("tick");
    assert!(!input.screenshot);
    assert_eq!(encoder.calls.len(), 1);
}

#[test]
fn a_failing_encoder_does_not_stop_the_loop() {
    let camera = Camera::default();
    let fb = painted_framebuffer(4, 4);
    let stop = StopSignal::new();
    let mut presenter = Presenter::new(&camera, &fb, stop.clone(), ".");
    let mut surface = ScriptedSurface::new(vec![
        vec![Event::KeyDown(Key::F2)],
        vec![Event::KeyDown(Key::Z)],
        vec![Event::KeyDown(Key::F2)],
        vec![Event::Quit],
    ]);
    let mut encoder = FailingEncoder::default();

    let frames = presenter.run(&mut surface, &mut encoder).expect("run");

    assert_eq!(frames, 4);
    assert_eq!(encoder.attempts, 2);
    assert!((camera.zoom() - 1.1).abs() < 1e-12);
    assert!(stop.is_raised());
}

#[test]
fn events_apply_in_arrival_order() {
    let camera = Camera::default();
    let fb = painted_framebuffer(4, 4);
    let mut presenter = Presenter::new(&camera, &fb, StopSignal::new(), ".");
    // Panning after zooming uses the new zoom for the step.
    let mut surface = ScriptedSurface::new(vec![vec![
        Event::KeyDown(Key::Z),
        Event::KeyDown(Key::Right),
        Event::KeyDown(Key::X),
        Event::KeyDown(Key::Up),
    ]]);
    presenter
        .tick(&mut surface, &mut RecordingEncoder::default())
        .expect("tick");

    let view = camera.view();
    assert!((view.center_x - 1.1 * 0.1).abs() < 1e-12);
    assert!((view.center_y + 0.99 * 0.1).abs() < 1e-12);
    assert!((view.zoom - 0.99).abs() < 1e-12);
}

#[test]
fn quit_finishes_the_tick_and_ends_the_run() {
    let camera = Camera::default();
    let fb = painted_framebuffer(3, 3);
    let stop = StopSignal::new();
    let mut presenter = Presenter::new(&camera, &fb, stop.clone(), ".");
    let mut surface = ScriptedSurface::new(vec![
        vec![Event::KeyDown(Key::Right); 10],
        vec![Event::Quit, Event::KeyDown(Key::Left)],
        vec![Event::KeyDown(Key::Left)],
    ]);
    let frames = presenter
        .run(&mut surface, &mut RecordingEncoder::default())
        .expect("run");

    assert_eq!(frames, 2);
    assert_eq!(surface.presented.len(), 2);
    assert!(stop.is_raised());
    assert!((camera.view().center_x - 0.9).abs() < 1e-12);
}

#[test]
fn a_display_failure_raises_the_stop_signal() {
    let camera = Camera::default();
    let fb = painted_framebuffer(3, 3);
    let stop = StopSignal::new();
    let mut presenter = Presenter::new(&camera, &fb, stop.clone(), ".");
    let mut surface = ScriptedSurface::new(vec![]);
    surface.fail_on_present = Some(3);

    let result = presenter.run(&mut surface, &mut RecordingEncoder::default());
    assert!(matches!(result, Err(BrotError::Window(_))));
    assert!(stop.is_raised());
    assert_eq!(presenter.frame(), 3);
}

/// Keeps the window "open" until a fully painted frame has been shown,
/// then asks for a screenshot and quits on the following tick.
struct UntilPainted {
    deadline: Instant,
    painted: bool,
    quit_sent: bool,
}

impl Surface for UntilPainted {
    fn poll_events(&mut self) -> Vec<Event> {
        assert!(Instant::now() < self.deadline, "workers never painted the frame");
        if self.quit_sent {
            return vec![];
        }
        if self.painted {
            self.quit_sent = true;
            return vec![Event::KeyDown(Key::F2), Event::Quit];
        }
        vec![]
    }

    fn present(&mut self, rgba: &[u8], _: usize, _: usize) -> BrotResult<()> {
        self.painted = rgba.chunks_exact(4).all(|p| p[3] == 255);
        std::thread::sleep(Duration::from_millis(1));
        Ok(())
    }
}

#[test]
fn run_paints_shows_exports_and_joins() {
    let config = Config {
        width: 32,
        height: 16,
        threads: 3,
        ..Config::default()
    };
    let mut surface = UntilPainted {
        deadline: Instant::now() + Duration::from_secs(20),
        painted: false,
        quit_sent: false,
    };
    let mut encoder = RecordingEncoder::default();

    let frames = brotplot::run(&config, &mut surface, &mut encoder).expect("run");

    assert!(frames >= 2);
    assert_eq!(encoder.calls.len(), 1);
    let shot = &encoder.calls[0];
    assert_eq!((shot.width, shot.height, shot.stride), (32, 16, 128));
    assert_eq!(
        shot.path,
        Path::new(".").join(format!("frame_{}_screenshot.png", frames - 1))
    );
    // Nothing moved the camera, so every pixel shows the default view.
    let evaluator = brotplot::EscapeTime::new(32, 16, 100);
    let view = brotplot::View::default();
    for (i, px) in shot.rgba.chunks_exact(4).enumerate() {
        let expected = evaluator.evaluate(Pixel(i % 32, i / 32), &view);
        assert_eq!(px, &[expected.r, expected.g, expected.b, expected.a][..]);
    }
}

#[test]
fn run_refuses_an_empty_window() {
    let config = Config {
        width: 4,
        height: 0,
        ..Config::default()
    };
    let mut surface = ScriptedSurface::new(vec![]);
    let mut encoder = RecordingEncoder::default();

    let err = brotplot::run(&config, &mut surface, &mut encoder).expect_err("no pixels");

    assert!(matches!(err, BrotError::Config(_)));
    assert!(surface.presented.is_empty());
}
