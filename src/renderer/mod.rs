// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! OpenGL rendering layer: GL object wrappers plus the RetroArch
//! multi-pass shader engine built on top of them.
//!
//! [`engine`] is the pipeline stage the rest of the crate drives every
//! frame; everything else here is the GL-primitive plumbing it is built
//! from, kept as small single-purpose RAII wrappers.

pub mod engine;
pub mod framebuffer;
pub mod history;
pub mod pass;
pub mod program;
pub mod quad;
pub mod texture;

mod buffer;
#[cfg(debug_assertions)]
mod check_gl_error;
mod shader;
mod vertex_array;

#[cfg(debug_assertions)]
pub use check_gl_error::setup_opengl_debugging;
pub use engine::{GlCapabilities, ShaderEngine};
pub use shader::{Shader, ShaderError};
