// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration coverage for the parts of [`retrocapture::present::pbo`]
//! that don't require a live GL context. The actual double-buffered
//! readback needs a bound GL context and belongs to a host integration
//! test driven against a real window/device.

use retrocapture::present::pbo::PboReader;

#[test]
fn fresh_reader_is_uninitialized_and_has_no_pending_read() {
    let reader = PboReader::new();
    assert!(!reader.is_initialized());
    assert!(!reader.has_data_ready());
}

#[test]
fn default_matches_new() {
    let reader = PboReader::default();
    assert!(!reader.is_initialized());
}
