// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! RetroArch-compatible GLSL preprocessing.
//!
//! This is pure text processing with no GL calls of its own; the GPU
//! side (compiling the preprocessed sources, binding framebuffers,
//! running the pass chain) lives in [`crate::renderer`].

pub mod error;
pub mod patches;
pub mod preprocessor;
pub mod version;

pub use error::ShaderError;
pub use preprocessor::{preprocess, OutputSizeType, ParameterInfo, PassContext, PreprocessResult};
