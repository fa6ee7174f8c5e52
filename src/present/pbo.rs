// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Double-buffered pixel buffer objects for asynchronous `glReadPixels`.
//!
//! `start_async_read` issues a read into whichever buffer was read back
//! *last* time; `get_read_data` retrieves the *other* one, which by now
//! has had a full frame to land without stalling the GPU pipeline.

use gl::types::*;

use crate::geometry::Size;

/// Row stride padding RetroCapture's encoder path expects (tight packing
/// would also work; 4-byte alignment matches the default GL pack
/// alignment and keeps every row a whole number of pixels plus padding
/// predictable across drivers).
fn row_stride(width: u32) -> usize {
    let unpadded = width as usize * 3;
    (unpadded + 3) & !3
}

/// Double-buffered async framebuffer reader.
///
/// `init` returns `false` when the host GL has no PBO support (GLES2
/// without the extension, or a broken driver); the caller then falls
/// back to synchronous per-row `glReadPixels` rather than using this
/// type at all.
pub struct PboReader {
    pbo: [GLuint; 2],
    current: usize,
    size: Size,
    buffer_size: usize,
    has_pending_read: bool,
}

impl PboReader {
    pub fn new() -> Self {
        Self {
            pbo: [0, 0],
            current: 0,
            size: Size::new(0, 0),
            buffer_size: 0,
            has_pending_read: false,
        }
    }

    /// Allocates both PBOs at `width`x`height`. Returns `false` (with
    /// `self` left unusable) if `GenBuffers` is unavailable on this GL
    /// context.
    pub fn init(&mut self, width: u32, height: u32) -> bool {
        if gl::GenBuffers::is_loaded() {
            self.allocate(width, height);
            true
        } else {
            false
        }
    }

    fn allocate(&mut self, width: u32, height: u32) {
        self.size = Size::new(width, height);
        self.buffer_size = row_stride(width) * height as usize;

        unsafe {
            if self.pbo[0] == 0 {
                gl::GenBuffers(2, self.pbo.as_mut_ptr());
            }
            for &id in &self.pbo {
                gl::BindBuffer(gl::PIXEL_PACK_BUFFER, id);
                gl::BufferData(
                    gl::PIXEL_PACK_BUFFER,
                    self.buffer_size as isize,
                    std::ptr::null(),
                    gl::STREAM_READ,
                );
            }
            gl::BindBuffer(gl::PIXEL_PACK_BUFFER, 0);
        }
        self.has_pending_read = false;
    }

    /// Reallocates if `width`/`height` diverge from the current size.
    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if self.size != Size::new(width, height) {
            self.allocate(width, height);
        }
    }

    pub fn cleanup(&mut self) {
        if self.pbo[0] != 0 {
            unsafe { gl::DeleteBuffers(2, self.pbo.as_ptr()) };
            self.pbo = [0, 0];
        }
        self.has_pending_read = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.pbo[0] != 0
    }

    /// Swaps to the other PBO and issues an async read into it.
    pub fn start_async_read(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) -> bool {
        if !self.is_initialized() {
            return false;
        }
        self.current = 1 - self.current;
        unsafe {
            gl::BindBuffer(gl::PIXEL_PACK_BUFFER, self.pbo[self.current]);
            gl::ReadPixels(x, y, width, height, gl::RGB, gl::UNSIGNED_BYTE, std::ptr::null_mut());
            gl::BindBuffer(gl::PIXEL_PACK_BUFFER, 0);
        }
        self.has_pending_read = true;
        true
    }

    pub fn has_data_ready(&self) -> bool {
        self.has_pending_read
    }

    /// Maps the *other* PBO (the one `start_async_read` filled on the
    /// prior call) and copies it bottom-up into top-down `dst`, honoring
    /// row padding. `dst` must be exactly `width * height * 3` bytes.
    pub fn get_read_data(&mut self, dst: &mut [u8], width: u32, height: u32) -> bool {
        if !self.has_pending_read || Size::new(width, height) != self.size {
            return false;
        }
        debug_assert_eq!(dst.len(), width as usize * height as usize * 3);

        let previous = 1 - self.current;
        let stride = row_stride(width);

        unsafe {
            gl::BindBuffer(gl::PIXEL_PACK_BUFFER, self.pbo[previous]);
            let ptr = gl::MapBufferRange(
                gl::PIXEL_PACK_BUFFER,
                0,
                self.buffer_size as isize,
                gl::MAP_READ_BIT,
            );
            if ptr.is_null() {
                gl::BindBuffer(gl::PIXEL_PACK_BUFFER, 0);
                return false;
            }
            let mapped = std::slice::from_raw_parts(ptr as *const u8, self.buffer_size);

            let row_bytes = width as usize * 3;
            for row in 0..height as usize {
                let src_row = height as usize - 1 - row;
                let src_start = src_row * stride;
                let dst_start = row * row_bytes;
                dst[dst_start..dst_start + row_bytes]
                    .copy_from_slice(&mapped[src_start..src_start + row_bytes]);
            }

            gl::UnmapBuffer(gl::PIXEL_PACK_BUFFER);
            gl::BindBuffer(gl::PIXEL_PACK_BUFFER, 0);
        }

        true
    }
}

impl Default for PboReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PboReader {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::row_stride;

    #[test]
    fn row_stride_rounds_up_to_four_bytes() {
        assert_eq!(row_stride(1), 4);
        assert_eq!(row_stride(4), 12);
        assert_eq!(row_stride(5), 16);
    }
}
