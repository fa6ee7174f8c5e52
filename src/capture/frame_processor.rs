// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! YUYV → RGB24 conversion and capture-texture upload.

use gl::types::GLuint;

use crate::capture::{Frame, PixelFormat, VideoSource};
use crate::geometry::Size;
use crate::renderer::texture::GpuTexture;

/// Converts a `count`-byte YUYV buffer (`count` a multiple of 4) to RGB24
/// in scanline order using ITU-R BT.601 limited-range coefficients (kept
/// intentionally — some capture devices provide full-range YUYV, but the
/// coefficient choice is device-dependent and no signal exists here to
/// switch on).
///
/// `rgb` must be `yuyv.len() / 4 * 2 * 3` bytes; each 4-byte `{Y0,U,Y1,V}`
/// group shares one `(U,V)` pair across its two emitted pixels.
pub fn yuyv_to_rgb(yuyv: &[u8], rgb: &mut [u8]) {
    debug_assert_eq!(yuyv.len() % 4, 0);
    debug_assert_eq!(rgb.len(), yuyv.len() / 4 * 2 * 3);

    for (quad, pixels) in yuyv.chunks_exact(4).zip(rgb.chunks_exact_mut(6)) {
        let (y0, u, y1, v) = (quad[0] as i32, quad[1] as i32, quad[2] as i32, quad[3] as i32);
        let d = u - 128;
        let e = v - 128;

        let (r0, g0, b0) = convert_one(y0, d, e);
        let (r1, g1, b1) = convert_one(y1, d, e);

        pixels[0] = r0;
        pixels[1] = g0;
        pixels[2] = b0;
        pixels[3] = r1;
        pixels[4] = g1;
        pixels[5] = b1;
    }
}

fn convert_one(y: i32, d: i32, e: i32) -> (u8, u8, u8) {
    let c = y - 16;
    let r = (298 * c + 409 * e + 128) >> 8;
    let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
    let b = (298 * c + 516 * d + 128) >> 8;
    (clamp_u8(r), clamp_u8(g), clamp_u8(b))
}

fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Owns the capture texture and the scratch RGB buffer used to convert
/// incoming frames. One texture, recreated only when dimensions change.
#[derive(Default)]
pub struct FrameProcessor {
    texture: Option<GpuTexture>,
    rgb_scratch: Vec<u8>,
    has_valid_frame: bool,
}

impl FrameProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulls the latest frame from `source`, converts it if necessary,
    /// and uploads it to the capture texture. Returns `true` if a new
    /// frame was processed.
    pub fn process_frame(&mut self, source: &mut dyn VideoSource) -> bool {
        let Some(frame) = source.capture_latest_frame() else {
            return false;
        };

        if frame.width == 0 || frame.height == 0 || frame.width > 7680 || frame.height > 4320 {
            log::warn!("Dropping frame with invalid dimensions {}x{}", frame.width, frame.height);
            return false;
        }

        let size = Size::new(frame.width, frame.height);
        let rgb: &[u8] = match frame.format {
            PixelFormat::Yuyv => {
                let needed = frame.width as usize * frame.height as usize * 3;
                if self.rgb_scratch.len() != needed {
                    self.rgb_scratch = vec![0u8; needed];
                }
                yuyv_to_rgb(&frame.data, &mut self.rgb_scratch);
                &self.rgb_scratch
            }
            PixelFormat::Rgb24 => &frame.data,
            PixelFormat::Rgb32 | PixelFormat::Mjpeg => {
                log::warn!("Unsupported capture pixel format {:?}; skipping frame", frame.format);
                return false;
            }
        };

        match &mut self.texture {
            Some(tex) if tex.size() == size => tex.upload_sub(rgb),
            _ => {
                self.texture = Some(GpuTexture::new_empty(size));
                self.texture.as_mut().unwrap().upload_full(rgb, size);
            }
        }

        self.has_valid_frame = true;
        true
    }

    pub fn texture(&self) -> GLuint {
        self.texture.as_ref().map(GpuTexture::id).unwrap_or(0)
    }

    pub fn texture_size(&self) -> Size {
        self.texture.as_ref().map(GpuTexture::size).unwrap_or(Size::new(0, 0))
    }

    pub fn has_valid_frame(&self) -> bool {
        self.has_valid_frame
    }

    /// Frees the capture texture; called before reconfiguring capture
    /// format/resolution.
    pub fn delete_texture(&mut self) {
        self.texture = None;
        self.has_valid_frame = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn yuyv_black_level_maps_to_near_black() {
        let yuyv = [0x10, 0x80, 0x10, 0x80];
        let mut rgb = [0u8; 6];
        yuyv_to_rgb(&yuyv, &mut rgb);
        assert_eq!(rgb, [0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn yuyv_white_level_maps_to_near_white() {
        let yuyv = [0xEB, 0x80, 0xEB, 0x80];
        let mut rgb = [0u8; 6];
        yuyv_to_rgb(&yuyv, &mut rgb);
        for &channel in &rgb {
            assert!((254..=255).contains(&channel), "expected near-white, got {channel}");
        }
    }

    #[test]
    fn yuyv_quad_shares_chroma_across_two_pixels() {
        let yuyv = [0x80, 0x60, 0x40, 0xA0];
        let mut rgb = [0u8; 6];
        yuyv_to_rgb(&yuyv, &mut rgb);
        // Same U/V feeds both pixels; only luma differs between them.
        assert_ne!(&rgb[0..3], &rgb[3..6]);
    }
}
