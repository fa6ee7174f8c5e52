// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Re-exports the shader error type shared with [`crate::renderer`].
//!
//! Preprocessing and GL compilation errors are both reported through
//! [`crate::renderer::shader::ShaderError`], which already covers
//! preprocess/compile/link failures, so this reuses it rather than
//! introducing a parallel error type.

pub use crate::renderer::shader::ShaderError;
