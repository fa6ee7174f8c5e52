// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Binary entry point.
//!
//! Concrete platform backends (V4L2/DirectShow capture, PulseAudio/Core
//! Audio, a windowing/GL context provider) are external collaborators
//! the core consumes through traits and are not part of this crate. What
//! ships here wires [`retrocapture::app::Application`] to a small
//! synthetic `VideoSource`/`AudioSource`/`GlContextProvider` set so the
//! pipeline can be smoke-tested end to end without real capture hardware.

mod test_sources;

use std::process::ExitCode;

use retrocapture::app::{self, Application};
use retrocapture::cli;

fn main() -> ExitCode {
    app::init_logging();

    let config = match cli::parse_args() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let frame_interval_us = (1_000_000.0 / config.capture_fps.max(1.0)) as u64;
    let window_size = retrocapture::geometry::Size::new(config.window_width, config.window_height);

    let video = Box::new(test_sources::SyntheticVideoSource::new(frame_interval_us));
    let audio = Box::new(test_sources::SyntheticAudioSource::new());
    let gl = Box::new(test_sources::HeadlessGlContext::new(window_size));

    let mut application = match Application::new(config, video, audio, gl) {
        Ok(application) => application,
        Err(err) => {
            log::error!("Failed to start application: {err}");
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "RetroCapture running (headless smoke harness); streaming urls: {:?}",
        application.stream_urls()
    );

    for _ in 0..600 {
        application.tick();
        std::thread::sleep(std::time::Duration::from_micros(frame_interval_us));
    }

    application.shutdown();
    ExitCode::SUCCESS
}
