// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::process::ExitCode;

use brotplot::{config, Config, MiniFbSurface, PngEncoder};
use tracing::error;
use tracing_subscriber::EnvFilter;

const TITLE: &str = "CPU Brot Plot";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = config::command().get_matches();
    let config = match Config::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::from(2);
        }
    };

    let mut surface = match MiniFbSurface::open(TITLE, config.width, config.height, config.fps) {
        Ok(surface) => surface,
        Err(e) => {
            error!(error = %e, "could not open the window");
            return ExitCode::FAILURE;
        }
    };

    match brotplot::run(&config, &mut surface, &mut PngEncoder) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "plotter failed");
            ExitCode::FAILURE
        }
    }
}
