// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! GPU texture ownership and LUT PNG loading.
//!
//! RetroCapture's texture model is simple: a capture texture, a chain of
//! per-pass framebuffer attachments ([`super::framebuffer::Framebuffer`])
//! and a flat map of LUT samplers, each owned exclusively by its
//! creator.

use std::path::Path;

use gl::types::*;
use image::GenericImageView;
use thiserror::Error;

use crate::geometry::Size;
use crate::preset::WrapMode;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load LUT image {0:?}: {1}")]
    Image(std::path::PathBuf, #[source] image::ImageError),
}

/// An owned, exclusively-held OpenGL 2D texture.
///
/// Deletes the underlying texture object on drop. Never reference
/// counted: every owner in this crate (capture, shader passes, LUTs,
/// frame history) is a single struct field holding the handle directly.
pub struct GpuTexture {
    id: GLuint,
    size: Size,
}

impl GpuTexture {
    /// Creates an empty `RGBA8` texture of the given size with
    /// `LINEAR` filtering and `CLAMP_TO_EDGE` wrapping (the capture
    /// texture's defaults).
    pub fn new_empty(size: Size) -> Self {
        let id = gen_texture();
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, id);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGB8 as GLint,
                size.width() as GLsizei,
                size.height() as GLsizei,
                0,
                gl::RGB,
                gl::UNSIGNED_BYTE,
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
        }
        Self { id, size }
    }

    /// Uploads an entire RGB24 image, (re)allocating storage.
    pub fn upload_full(&mut self, rgb: &[u8], size: Size) {
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, self.id);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGB8 as GLint,
                size.width() as GLsizei,
                size.height() as GLsizei,
                0,
                gl::RGB,
                gl::UNSIGNED_BYTE,
                rgb.as_ptr() as *const _,
            );
        }
        self.size = size;
    }

    /// Uploads a sub-region matching the texture's current size.
    pub fn upload_sub(&self, rgb: &[u8]) {
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, self.id);
            gl::TexSubImage2D(
                gl::TEXTURE_2D,
                0,
                0,
                0,
                self.size.width() as GLsizei,
                self.size.height() as GLsizei,
                gl::RGB,
                gl::UNSIGNED_BYTE,
                rgb.as_ptr() as *const _,
            );
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bind(&self, unit: GLenum) {
        unsafe {
            gl::ActiveTexture(unit);
            gl::BindTexture(gl::TEXTURE_2D, self.id);
        }
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.id) };
    }
}

/// Loads a LUT reference texture from a PNG file, normalizing any
/// bit depth/color type to RGBA8 as the
/// spec requires.
pub fn load_lut(
    path: &Path,
    wrap_mode: WrapMode,
    mipmap: bool,
    linear: bool,
    border_supported: bool,
) -> Result<GpuTexture, TextureError> {
    let img = image::open(path).map_err(|e| TextureError::Image(path.to_path_buf(), e))?;
    let (w, h) = img.dimensions();
    let rgba = img.to_rgba8();

    let id = gen_texture();
    unsafe {
        gl::BindTexture(gl::TEXTURE_2D, id);
        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            gl::RGBA8 as GLint,
            w as GLsizei,
            h as GLsizei,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            rgba.as_raw().as_ptr() as *const _,
        );

        let filter = if linear { gl::LINEAR } else { gl::NEAREST } as GLint;
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter);
        if mipmap {
            gl::GenerateMipmap(gl::TEXTURE_2D);
            let min_filter = if linear {
                gl::LINEAR_MIPMAP_LINEAR
            } else {
                gl::NEAREST_MIPMAP_NEAREST
            } as GLint;
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min_filter);
        } else {
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter);
        }

        let wrap = wrap_mode.to_gl(border_supported) as GLint;
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap);
    }

    log::info!(
        "Loaded LUT {:?} ({}x{}, mipmap={mipmap}, linear={linear})",
        path,
        w,
        h
    );

    Ok(GpuTexture {
        id,
        size: Size::new(w, h),
    })
}

fn gen_texture() -> GLuint {
    let mut id = 0;
    unsafe { gl::GenTextures(1, &mut id) };
    id
}
