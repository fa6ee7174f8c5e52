// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! OpenGL framebuffer abstraction for shader passes.
//!
//! No MSAA or cubemap support — RetroArch passes are plain 2D, never
//! multisampled or cube-faced. Supports the `RGBA32F`/`SRGB8_ALPHA8`
//! internal formats a pass's `float_framebuffer`/`srgb_framebuffer`
//! flags require; a framebuffer is recreated whenever its computed
//! dimensions diverge from the attached texture's.

use crate::geometry::Size;
use gl::types::*;

/// Internal pixel format for a pass's color attachment, chosen from
/// the pass's `float_framebuffer`/`srgb_framebuffer` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferFormat {
    /// `RGBA8`: the default.
    Rgba8,
    /// `RGBA32F`: set when `float_framebuffer` is true.
    Rgba32F,
    /// `SRGB8_ALPHA8`: set when `srgb_framebuffer` is true.
    Srgb8Alpha8,
}

impl FramebufferFormat {
    pub fn from_pass_flags(float_framebuffer: bool, srgb_framebuffer: bool) -> Self {
        if float_framebuffer {
            Self::Rgba32F
        } else if srgb_framebuffer {
            Self::Srgb8Alpha8
        } else {
            Self::Rgba8
        }
    }

    fn gl_internal_format(self) -> GLenum {
        match self {
            Self::Rgba8 => gl::RGBA8,
            Self::Rgba32F => gl::RGBA32F,
            Self::Srgb8Alpha8 => gl::SRGB8_ALPHA8,
        }
    }

    fn gl_type(self) -> GLenum {
        match self {
            Self::Rgba32F => gl::FLOAT,
            _ => gl::UNSIGNED_BYTE,
        }
    }
}

/// Offscreen render target backed by an OpenGL framebuffer and its
/// single color attachment.
///
/// Owns the attachment texture; deletes both on drop. A pass recreates
/// its `Framebuffer` whenever `size` no longer matches the pass's
/// computed output dimensions.
pub struct Framebuffer {
    fbo_id: GLuint,
    texture_id: GLuint,
    size: Size,
    format: FramebufferFormat,
}

impl Framebuffer {
    /// Creates a framebuffer with a color attachment of the given size
    /// and format, using `LINEAR` min/mag filtering and `CLAMP_TO_EDGE`
    /// wrapping; the previously bound framebuffer is restored before
    /// returning.
    pub fn new(size: Size, format: FramebufferFormat) -> Self {
        let previous_fbo = current_framebuffer();

        let fbo_id = gen_framebuffer();
        bind_framebuffer(fbo_id);

        let texture_id = gen_texture();
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, texture_id);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                format.gl_internal_format() as GLint,
                size.width() as GLsizei,
                size.height() as GLsizei,
                0,
                gl::RGBA,
                format.gl_type(),
                std::ptr::null(),
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_WRAP_S,
                gl::CLAMP_TO_EDGE as GLint,
            );
            gl::TexParameteri(
                gl::TEXTURE_2D,
                gl::TEXTURE_WRAP_T,
                gl::CLAMP_TO_EDGE as GLint,
            );
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_2D,
                texture_id,
                0,
            );
        }

        check_framebuffer_status();
        bind_framebuffer(previous_fbo);

        Self {
            fbo_id,
            texture_id,
            size,
            format,
        }
    }

    /// Binds this framebuffer as the current draw framebuffer.
    pub fn bind(&self) {
        bind_framebuffer(self.fbo_id);
    }

    pub fn fbo_id(&self) -> GLuint {
        self.fbo_id
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn format(&self) -> FramebufferFormat {
        self.format
    }

    /// Returns the sampleable color attachment texture.
    #[inline]
    pub fn texture(&self) -> GLuint {
        self.texture_id
    }

    /// True when this framebuffer's attachment no longer matches
    /// `size`/`format` and must be recreated.
    pub fn needs_recreate(&self, size: Size, format: FramebufferFormat) -> bool {
        self.size != size || self.format != format
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, &self.texture_id);
            gl::DeleteFramebuffers(1, &self.fbo_id);
        }
    }
}

fn gen_framebuffer() -> GLuint {
    let mut id = 0;
    unsafe { gl::GenFramebuffers(1, &mut id) };
    id
}

fn gen_texture() -> GLuint {
    let mut id = 0;
    unsafe { gl::GenTextures(1, &mut id) };
    id
}

fn bind_framebuffer(id: GLuint) {
    unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, id) };
}

fn current_framebuffer() -> GLuint {
    let mut id = 0;
    unsafe { gl::GetIntegerv(gl::FRAMEBUFFER_BINDING, &mut id) };
    id as GLuint
}

/// Verifies framebuffer completeness. Logs the specific failure reason; the
/// caller treats an incomplete framebuffer as a skipped frame rather
/// than panicking, except at creation time where it is fatal (a
/// misconfigured driver cannot recover mid-session).
fn check_framebuffer_status() {
    let status = unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) };
    match status {
        gl::FRAMEBUFFER_COMPLETE => {}
        gl::FRAMEBUFFER_UNDEFINED => {
            log::error!("Framebuffer status: GL_FRAMEBUFFER_UNDEFINED.");
        }
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => {
            log::error!("Framebuffer status: GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT.");
        }
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
            log::error!("Framebuffer status: GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT.");
        }
        gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => {
            log::error!("Framebuffer status: GL_FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER.");
        }
        gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => {
            log::error!("Framebuffer status: GL_FRAMEBUFFER_INCOMPLETE_READ_BUFFER.");
        }
        gl::FRAMEBUFFER_UNSUPPORTED => {
            log::error!("Framebuffer status: GL_FRAMEBUFFER_UNSUPPORTED.");
        }
        other => {
            log::error!("Framebuffer status: unknown error code 0x{other:X}");
        }
    }
    if status != gl::FRAMEBUFFER_COMPLETE {
        panic!("Framebuffer not complete!");
    }
}
