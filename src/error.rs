// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Top-level error aggregation and throttled logging.
//!
//! [`crate::app::Application`] coordinates six subsystems, so this adds a
//! thin `#[from]`-composed enum for code that spans them (e.g.
//! `Application::new`), while each subsystem keeps its own focused error
//! type.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::capture::CaptureError;
use crate::preset::PresetError;
use crate::stream::StreamError;

/// Aggregate error for operations that span subsystem boundaries. The core
/// never throws across component boundaries; every public operation
/// returns an explicit success/failure instead.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("preset error: {0}")]
    Preset(#[from] PresetError),
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("streaming error: {0}")]
    Stream(#[from] StreamError),
    #[error("invalid frame dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),
    #[error("GL context initialization failed: {0}")]
    GlContext(String),
}

/// Rate-limits a repeated log line to once every `interval` calls — the
/// mechanism behind every "logged every 60 frames"-style condition (e.g.
/// [`crate::renderer::engine::ShaderEngine::apply_shader`]'s
/// no-runnable-pass warning, or a capture device that keeps failing to
/// deliver a frame).
pub struct Throttle {
    interval: u64,
    count: u64,
}

impl Throttle {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            count: 0,
        }
    }

    /// Returns `true` on the call that should actually emit a log line.
    pub fn tick(&mut self) -> bool {
        let fire = self.count % self.interval == 0;
        self.count += 1;
        fire
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Time-based variant of [`Throttle`] for conditions that recur on a wall
/// clock cadence rather than once per render tick (used by the audio pump
/// and encoder worker loops, which don't have a frame counter of their
/// own).
pub struct TimeThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl TimeThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_fires_on_first_and_every_nth_call() {
        let mut t = Throttle::new(3);
        let fired: Vec<bool> = (0..7).map(|_| t.tick()).collect();
        assert_eq!(fired, vec![true, false, false, true, false, false, true]);
    }
}
