// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! The single monotonic clock every capture timestamp in the pipeline
//! is stamped against. Video and audio sources must share this same
//! clock; the synchronizer performs no clock-domain translation.
//!
//! A per-thread or per-component `Instant::now()` epoch would give each
//! caller its own zero point, which is exactly the clock-domain drift
//! the synchronizer is specified to *not* correct for. This module is
//! the one process-wide epoch every `now_us()` call in the crate reads
//! from, so video and audio timestamps stay comparable regardless of
//! which thread stamped them.

use std::sync::OnceLock;
use std::time::Instant;

fn epoch() -> &'static Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now)
}

/// Microseconds elapsed since the process-wide epoch, on a monotonic
/// clock.
pub fn now_us() -> i64 {
    epoch().elapsed().as_micros() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_us_is_monotonic_non_decreasing() {
        let a = now_us();
        let b = now_us();
        assert!(b >= a);
    }
}
