// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Errors produced while loading or saving a `.glslp` preset.

use std::io;
use thiserror::Error;

/// Errors surfaced by the preset loader/writer (`ConfigError` in the
/// component spec: parse failures, unknown keys, missing files).
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("preset has no passes (missing or zero `shaders = N`)")]
    NoPasses,

    #[error("pass {0} has no shader path")]
    MissingShaderPath(usize),

    #[error("invalid `shaders` count: {0}")]
    InvalidShaderCount(String),
}
