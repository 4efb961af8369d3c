// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line configuration.  With no arguments at all the plotter
//! opens a 640x480 window with one worker per CPU.

use clap::{Arg, ArgMatches, Command};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{BrotError, BrotResult};
use crate::escape::BASE_ITERATIONS;
use crate::pool::default_worker_count;

/// Largest accepted window side.
pub const MAX_SIDE: usize = 16384;

const SIZE: &str = "size";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const FPS: &str = "fps";
const SCREENSHOT_DIR: &str = "screenshot-dir";

/// Everything the binary needs to start.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Window and framebuffer width.
    pub width: usize,
    /// Window and framebuffer height.
    pub height: usize,
    /// Number of render workers.
    pub threads: usize,
    /// Iteration budget at zoom 1.
    pub iterations: u32,
    /// Target display rate.
    pub fps: usize,
    /// Directory screenshots are written to.
    pub screenshot_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 640,
            height: 480,
            threads: default_worker_count(),
            iterations: BASE_ITERATIONS,
            fps: 60,
            screenshot_dir: PathBuf::from("."),
        }
    }
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_size(s: &str) -> Result<(usize, usize), String> {
    match parse_pair::<usize>(s, 'x') {
        Some((w, h)) if (1..=MAX_SIDE).contains(&w) && (1..=MAX_SIDE).contains(&h) => Ok((w, h)),
        Some(_) => Err(format!("Each side must be between 1 and {}", MAX_SIDE)),
        None => Err("Could not parse window size, expected WIDTHxHEIGHT".to_string()),
    }
}

fn parse_range<T>(s: &str, low: T, high: T, what: &str) -> Result<T, String>
where
    T: FromStr + PartialOrd + Display + Copy,
{
    match T::from_str(s) {
        Ok(i) if i >= low && i <= high => Ok(i),
        Ok(_) => Err(format!("{} must be between {} and {}", what, low, high)),
        Err(_) => Err(format!("Could not parse {}", what.to_lowercase())),
    }
}

/// The argument parser.
pub fn command() -> Command {
    let max_threads = default_worker_count() * 4;

    Command::new("brotplot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interactive multithreaded Mandelbrot plotter. Z/X zoom, arrows pan, F2 saves a screenshot.")
        .arg(
            Arg::new(SIZE)
                .long(SIZE)
                .short('s')
                .value_name("WxH")
                .default_value("640x480")
                .value_parser(parse_size)
                .help("Size of the window"),
        )
        .arg(
            Arg::new(THREADS)
                .long(THREADS)
                .short('t')
                .value_name("N")
                .value_parser(move |s: &str| parse_range(s, 1, max_threads, "Thread count"))
                .help("Number of render workers [default: one per CPU]"),
        )
        .arg(
            Arg::new(ITERATIONS)
                .long(ITERATIONS)
                .short('i')
                .value_name("N")
                .default_value("100")
                .value_parser(|s: &str| parse_range(s, 1u32, 100_000, "Iteration count"))
                .help("Iteration budget at zoom 1; grows with the zoom"),
        )
        .arg(
            Arg::new(FPS)
                .long(FPS)
                .short('f')
                .value_name("N")
                .default_value("60")
                .value_parser(|s: &str| parse_range(s, 1usize, 240, "Frame rate"))
                .help("Target display rate"),
        )
        .arg(
            Arg::new(SCREENSHOT_DIR)
                .long(SCREENSHOT_DIR)
                .short('o')
                .value_name("DIR")
                .default_value(".")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Directory F2 screenshots are written to"),
        )
}

impl Config {
    /// Builds a configuration from parsed arguments.
    pub fn from_matches(matches: &ArgMatches) -> BrotResult<Self> {
        let defaults = Config::default();
        let (width, height) = *matches
            .get_one::<(usize, usize)>(SIZE)
            .ok_or_else(|| BrotError::config("missing window size"))?;
        let threads = matches
            .get_one::<usize>(THREADS)
            .copied()
            .unwrap_or(defaults.threads);
        let iterations = matches
            .get_one::<u32>(ITERATIONS)
            .copied()
            .unwrap_or(defaults.iterations);
        let fps = matches.get_one::<usize>(FPS).copied().unwrap_or(defaults.fps);
        let screenshot_dir = matches
            .get_one::<PathBuf>(SCREENSHOT_DIR)
            .cloned()
            .unwrap_or(defaults.screenshot_dir);
        Ok(Config {
            width,
            height,
            threads,
            iterations,
            fps,
            screenshot_dir,
        })
    }

    /// Parses a full argument list, program name first.
    pub fn try_parse_from<I, T>(args: I) -> BrotResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command()
            .try_get_matches_from(args)
            .map_err(|e| BrotError::config(e.to_string()))?;
        Config::from_matches(&matches)
    }
}
