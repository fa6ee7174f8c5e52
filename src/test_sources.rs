// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Synthetic platform backends used only by the `retrocapture` binary
//! to smoke-test the pipeline without real capture hardware or a window:
//! source processors that exist purely so the rest of the pipeline can
//! run and be exercised in the absence of a camera or microphone.
//!
//! None of this is part of the library surface; concrete platform
//! backends belong outside this crate.

use std::time::Instant;

use retrocapture::audio::{AudioError, AudioSource};
use retrocapture::capture::{Control, ControlRange, DeviceInfo, CaptureError, Frame, PixelFormat, VideoSource};
use retrocapture::geometry::Size;
use retrocapture::gl_context::{GlContextProvider, GlProfile};

/// Emits a moving color-bar YUYV pattern at a fixed interval, standing
/// in for a real capture device.
pub struct SyntheticVideoSource {
    open: bool,
    width: u32,
    height: u32,
    frame_interval_us: u64,
    started_at: Instant,
    last_emit: Option<Instant>,
    phase: u32,
}

impl SyntheticVideoSource {
    pub fn new(frame_interval_us: u64) -> Self {
        Self {
            open: false,
            width: 0,
            height: 0,
            frame_interval_us,
            started_at: Instant::now(),
            last_emit: None,
            phase: 0,
        }
    }
}

impl VideoSource for SyntheticVideoSource {
    fn open(&mut self, _device_id: &str) -> Result<(), CaptureError> {
        self.open = true;
        Ok(())
    }

    fn set_format(&mut self, width: u32, height: u32, _format: PixelFormat) -> Result<(), CaptureError> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn set_framerate(&mut self, _fps: f32) -> Result<(), CaptureError> {
        Ok(())
    }

    fn start_capture(&mut self) -> Result<(), CaptureError> {
        self.last_emit = None;
        Ok(())
    }

    fn stop_capture(&mut self) {}

    fn close(&mut self) {
        self.open = false;
    }

    fn capture_latest_frame(&mut self) -> Option<Frame> {
        if !self.open || self.width == 0 || self.height == 0 {
            return None;
        }
        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last).as_micros() < self.frame_interval_us as u128 {
                return None;
            }
        }
        self.last_emit = Some(now);
        self.phase = self.phase.wrapping_add(1);

        let mut data = vec![0u8; self.width as usize * self.height as usize * 2];
        for (i, pair) in data.chunks_exact_mut(4).enumerate() {
            let column = (i as u32 * 2) % self.width.max(1);
            let bar = (column.wrapping_add(self.phase) / 32) % 8;
            let y = 16 + (bar * 26) as u8;
            pair[0] = y;
            pair[1] = 128;
            pair[2] = y;
            pair[3] = 128;
        }

        Some(Frame {
            data,
            width: self.width,
            height: self.height,
            format: PixelFormat::Yuyv,
            timestamp_us: self.started_at.elapsed().as_micros() as u64,
        })
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_control(&self, _control: Control) -> Option<i32> {
        None
    }

    fn set_control(&mut self, _control: Control, _value: i32) -> Result<(), CaptureError> {
        Ok(())
    }

    fn control_range(&self, _control: Control) -> Option<ControlRange> {
        None
    }

    fn list_devices(&self) -> Vec<DeviceInfo> {
        vec![DeviceInfo {
            id: "synthetic0".to_string(),
            name: "Synthetic color bars".to_string(),
        }]
    }

    fn get_supported_resolutions(&self) -> Vec<Size> {
        vec![Size::new(1920, 1080), Size::new(1280, 720)]
    }
}

/// Emits silence, standing in for a real audio device.
pub struct SyntheticAudioSource {
    open: bool,
}

impl SyntheticAudioSource {
    pub fn new() -> Self {
        Self { open: false }
    }
}

impl AudioSource for SyntheticAudioSource {
    fn open(&mut self, _device_name: &str) -> Result<(), AudioError> {
        self.open = true;
        Ok(())
    }

    fn start_capture(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_capture(&mut self) {}

    fn close(&mut self) {
        self.open = false;
    }

    fn get_samples(&mut self, buf: &mut [i16]) -> usize {
        if !self.open {
            return 0;
        }
        buf.fill(0);
        buf.len()
    }

    fn sample_rate(&self) -> u32 {
        48_000
    }

    fn channels(&self) -> u16 {
        2
    }
}

/// A `GlContextProvider` with no real window behind it. `make_current`
/// and `swap_buffers` are no-ops; real deployments replace this with a
/// GLFW/SDL2/toolkit-backed implementation.
pub struct HeadlessGlContext {
    size: Size,
}

impl HeadlessGlContext {
    pub fn new(size: Size) -> Self {
        Self { size }
    }
}

impl GlContextProvider for HeadlessGlContext {
    fn make_current(&self) {}

    fn swap_buffers(&self) {}

    fn size(&self) -> Size {
        self.size
    }

    fn gl_version(&self) -> (u32, u32, GlProfile) {
        (4, 2, GlProfile::Core)
    }

    fn gl_version_string(&self) -> String {
        "4.2.0".to_string()
    }

    fn glsl_version_string(&self) -> Option<String> {
        Some("4.20".to_string())
    }
}
