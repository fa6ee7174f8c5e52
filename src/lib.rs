// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! RetroCapture: captures a platform video source, runs a
//! RetroArch-compatible multi-pass GLSL shader chain on the GPU, presents
//! it to a window, and encodes the composited output together with
//! system audio as an MPEG-TS stream.
//!
//! This crate is both a library (re-exported here for the integration
//! tests under `tests/`) and the `retrocapture` binary (`main.rs`). The
//! core media pipeline — preset loading, the GLSL preprocessor, the
//! shader engine, capture/audio abstractions, presentation, the PBO
//! reader, the A/V synchronizer and the streaming orchestrator — is fully
//! implemented here. Concrete platform backends (V4L2/DirectShow/Media
//! Foundation/AVFoundation capture, PulseAudio/Core Audio/WASAPI audio,
//! a windowing/GL context provider, an MPEG-TS codec/mux library, and the
//! REST/web portal) are external collaborators the core consumes through
//! the traits in [`capture`], [`audio`], [`gl_context`] and [`stream`].

pub mod app;
pub mod audio;
pub mod capture;
pub mod clock;
pub mod cli;
pub mod error;
pub mod geometry;
pub mod gl_context;
pub mod present;
pub mod preset;
pub mod renderer;
pub mod shader;
pub mod stream;
pub mod sync;

pub const APP_NAME: &str = "retrocapture";
pub const APP_ABOUT: &str = "Capture, RetroArch shader chain and MPEG-TS streaming pipeline";
pub const APP_AUTHOR: &str = "Harlen Batagelo, hbatagelo@gmail.com";
pub const APP_SEMVER: &str = "0.1.0";
