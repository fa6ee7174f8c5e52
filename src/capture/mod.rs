// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Platform-abstract video capture.
//!
//! The core never talks to V4L2/DirectShow/AVFoundation directly: every
//! platform capture backend implements [`VideoSource`] and is injected
//! into the [`crate::app::Application`] at construction — a fixed
//! capability set behind one trait.

pub mod frame_processor;

use std::time::Duration;

use thiserror::Error;

use crate::geometry::Size;

/// Raw pixel layout a [`Frame`] carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Yuyv,
    Rgb24,
    Rgb32,
    Mjpeg,
}

/// One decoded video image straight off the wire.
///
/// Produced by a [`VideoSource`] and consumed by
/// [`frame_processor::FrameProcessor`] within the same render tick; it
/// is never stored past that point.
#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Capture timestamp in microseconds, on the same monotonic clock
    /// used throughout [`crate::sync`].
    pub timestamp_us: u64,
}

/// A capture device's adjustable control (brightness, contrast,
/// saturation, hue, gain, exposure, sharpness, gamma, white balance).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Gain,
    Exposure,
    Sharpness,
    Gamma,
    WhiteBalance,
}

/// Inclusive integer range a device reports for one [`Control`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlRange {
    pub min: i32,
    pub max: i32,
    pub default: i32,
    pub step: i32,
}

/// A device discoverable by [`VideoSource::list_devices`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open capture device {0:?}")]
    Open(String),
    #[error("unsupported capture format {0:?} at {1}x{2}")]
    UnsupportedFormat(PixelFormat, u32, u32),
    #[error("device is not open")]
    NotOpen,
    #[error("control {0:?} is not supported by this device")]
    UnsupportedControl(Control),
}

/// Platform video capture collaborator. Implemented
/// once per platform backend (V4L2, DirectShow, AVFoundation, ...); the
/// core only ever talks to this trait.
pub trait VideoSource: Send {
    fn open(&mut self, device_id: &str) -> Result<(), CaptureError>;
    fn set_format(&mut self, width: u32, height: u32, format: PixelFormat) -> Result<(), CaptureError>;
    fn set_framerate(&mut self, fps: f32) -> Result<(), CaptureError>;
    fn start_capture(&mut self) -> Result<(), CaptureError>;
    fn stop_capture(&mut self);
    fn close(&mut self);

    /// Returns the newest available frame without blocking, or `None`
    /// if no new frame has arrived since the last call.
    fn capture_latest_frame(&mut self) -> Option<Frame>;

    fn is_open(&self) -> bool;
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn get_control(&self, control: Control) -> Option<i32>;
    fn set_control(&mut self, control: Control, value: i32) -> Result<(), CaptureError>;
    fn control_range(&self, control: Control) -> Option<ControlRange>;

    fn list_devices(&self) -> Vec<DeviceInfo>;
    fn get_supported_resolutions(&self) -> Vec<Size>;
}

/// Stops, closes, waits for the driver to release the device, then
/// reopens with the requested format/framerate, rolling back to the
/// previous configuration on any failure.
pub fn reconfigure(
    source: &mut dyn VideoSource,
    device_id: &str,
    width: u32,
    height: u32,
    format: PixelFormat,
    fps: f32,
) -> Result<(), CaptureError> {
    let previous = (source.width(), source.height());

    source.stop_capture();
    source.close();
    std::thread::sleep(Duration::from_millis(100));

    let result = (|| {
        source.open(device_id)?;
        source.set_format(width, height, format)?;
        source.set_framerate(fps)?;
        source.start_capture()?;
        for _ in 0..5 {
            source.capture_latest_frame();
        }
        Ok(())
    })();

    if let Err(ref e) = result {
        log::error!("Capture reconfigure to {width}x{height} failed: {e}; rolling back");
        source.stop_capture();
        source.close();
        let _ = source.open(device_id);
        let _ = source.set_format(previous.0, previous.1, format);
        let _ = source.set_framerate(fps);
        let _ = source.start_capture();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_range_is_copy() {
        let r = ControlRange { min: 0, max: 255, default: 128, step: 1 };
        let r2 = r;
        assert_eq!(r, r2);
    }
}
