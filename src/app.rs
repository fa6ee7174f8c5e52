// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Application coordination and the concurrency model it drives.
//!
//! `Application` owns the lifecycle: construction opens the capture
//! device, spins up the audio pump thread, and optionally starts
//! streaming; `tick()` is one iteration of the render thread's loop
//! (capture → upload → shader chain → present → optional stream
//! readback); `shutdown()` runs the cancellation sequence. Every
//! platform collaborator (capture device, audio device, windowing/GL
//! context) is injected at construction as a trait object, so platform
//! implementations can be swapped without touching this module.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use function_name::named;
use log::{debug, error, info, warn};
use owo_colors::OwoColorize;

use crate::audio::{self, AudioSource};
use crate::capture::frame_processor::FrameProcessor;
use crate::capture::{self, Control, PixelFormat, VideoSource};
use crate::cli::RuntimeConfig;
use crate::error::{CoreError, Throttle};
use crate::geometry::Size;
use crate::gl_context::GlContextProvider;
use crate::present::pbo::PboReader;
use crate::present::{AspectMode, Presenter};
use crate::renderer::{GlCapabilities, ShaderEngine};
use crate::stream::{AudioCodec, HttpTsEncoderSink, StreamConfig, StreamManager, VideoCodec};
use crate::sync::MediaSynchronizer;

/// Smallest and largest frame dimensions the pipeline will act on.
/// Dimensions outside `[1x1, 7680x4320]` are treated as invalid and the
/// frame is skipped.
const MIN_DIMENSION: u32 = 1;
const MAX_WIDTH: u32 = 7680;
const MAX_HEIGHT: u32 = 4320;

fn dimensions_valid(size: Size) -> bool {
    (MIN_DIMENSION..=MAX_WIDTH).contains(&size.width()) && (MIN_DIMENSION..=MAX_HEIGHT).contains(&size.height())
}

/// Initializes the process-global logger. Called once at startup; there
/// is no corresponding teardown beyond process exit.
pub fn init_logging() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .expect("logger already initialized");
}

/// Owns the full RetroCapture lifecycle.
pub struct Application {
    video: Box<dyn VideoSource>,
    gl: Box<dyn GlContextProvider>,
    config: RuntimeConfig,

    frame_processor: FrameProcessor,
    shader_engine: ShaderEngine,
    presenter: Presenter,
    pbo: PboReader,

    synchronizer: Arc<MediaSynchronizer>,
    stream_manager: StreamManager,

    /// Set from a resize callback, cleared after the viewport updates;
    /// gates streaming readback while true.
    resizing: Arc<AtomicBool>,
    /// Serializes shader FBO recreation against PBO read issuance
    /// during a resize.
    resize_lock: Mutex<()>,

    audio_running: Arc<AtomicBool>,
    audio_thread: Option<JoinHandle<()>>,

    stream_scratch: Vec<u8>,
    capture_fail_warnings: Throttle,
}

impl Application {
    /// Opens the capture device, applies capture tunables, loads the
    /// startup preset if any, spawns the audio pump thread, and starts
    /// streaming if requested.
    pub fn new(
        config: RuntimeConfig,
        mut video: Box<dyn VideoSource>,
        mut audio: Box<dyn AudioSource>,
        gl: Box<dyn GlContextProvider>,
    ) -> Result<Self, CoreError> {
        gl.make_current();
        if let Err(err) = crate::gl_context::load_gl_functions_via_epoxy() {
            warn!("GL function loading via epoxy failed (host may have already loaded them): {err}");
        }

        video.open(&config.device_id).map_err(CoreError::Capture)?;
        video
            .set_format(config.capture_width, config.capture_height, PixelFormat::Yuyv)
            .map_err(CoreError::Capture)?;
        video.set_framerate(config.capture_fps).map_err(CoreError::Capture)?;
        video.start_capture().map_err(CoreError::Capture)?;
        apply_capture_controls(video.as_mut(), &config.controls);

        let (major, minor, _profile) = gl.gl_version();
        let capabilities = GlCapabilities {
            gl_version: gl_version_str(major, minor),
            glsl_version: None,
            clamp_to_border_supported: true,
        };
        let mut shader_engine = ShaderEngine::new(capabilities);
        if let Some(preset_path) = &config.preset_path {
            shader_engine.load_preset(preset_path).map_err(CoreError::Preset)?;
        }
        shader_engine.set_viewport(Size::new(config.window_width, config.window_height));

        let gl_version_string = gl.gl_version_string();
        let glsl_version_string = gl.glsl_version_string();
        let presenter = Presenter::new(&gl_version_string, glsl_version_string.as_deref())
            .map_err(|err| CoreError::GlContext(err.to_string()))?;

        let synchronizer = Arc::new(MediaSynchronizer::new());
        let mut stream_manager = StreamManager::new(synchronizer.clone());

        let audio_running = Arc::new(AtomicBool::new(true));
        let audio_thread = {
            let running = audio_running.clone();
            if let Err(err) = audio.open("") {
                warn!("Audio open failed, continuing without audio: {err}");
            }
            let _ = audio.start_capture();
            let synchronizer_for_audio = synchronizer.clone();
            Some(std::thread::spawn(move || {
                let sample_rate = audio.sample_rate();
                let channels = audio.channels() as u32;
                audio::pump(audio.as_mut(), &running, |samples, timestamp_us| {
                    debug!("audio pump: {} samples at {timestamp_us}us", samples.len());
                    synchronizer_for_audio.add_audio_chunk(
                        samples,
                        samples.len(),
                        timestamp_us as i64,
                        sample_rate,
                        channels,
                    );
                });
                audio.stop_capture();
                audio.close();
            }))
        };

        if config.streaming_enabled {
            stream_manager.add_sink(Box::new(HttpTsEncoderSink::new(synchronizer.clone())));
            let stream_config = StreamConfig {
                port: config.stream_port,
                width: config.stream_width,
                height: config.stream_height,
                fps: config.stream_fps,
                video_bitrate_bps: config.stream_video_bitrate_bps,
                audio_bitrate_bps: config.stream_audio_bitrate_bps,
                video_codec: VideoCodec::H264,
                audio_codec: AudioCodec::Aac,
                ..StreamConfig::default()
            };
            match stream_manager.initialize(&stream_config) {
                Ok(()) => match stream_manager.start() {
                    Ok(()) => info!("Streaming started on port {}", config.stream_port),
                    Err(err) => warn!("Could not start streaming at init: {err}"),
                },
                Err(err) => error!("Failed to initialize streaming: {err}"),
            }
        }

        Ok(Self {
            video,
            gl,
            config,
            frame_processor: FrameProcessor::new(),
            shader_engine,
            presenter,
            pbo: PboReader::new(),
            synchronizer,
            stream_manager,
            resizing: Arc::new(AtomicBool::new(false)),
            resize_lock: Mutex::new(()),
            audio_running,
            audio_thread,
            stream_scratch: Vec::new(),
            capture_fail_warnings: Throttle::new(60),
        })
    }

    /// One render-thread iteration: capture, shader chain, present,
    /// optional stream readback.
    pub fn tick(&mut self) {
        self.gl.make_current();

        if !self.frame_processor.process_frame(self.video.as_mut()) && !self.frame_processor.has_valid_frame() {
            if self.capture_fail_warnings.tick() {
                warn!("No capture frame available yet (logged every 60 frames)");
            }
            return;
        }

        let source_size = self.frame_processor.texture_size();
        if !dimensions_valid(source_size) {
            warn!("Skipping frame with out-of-range dimensions {source_size:?}");
            return;
        }

        let shaded_texture = self.shader_engine.apply_shader(self.frame_processor.texture(), source_size);

        let window_size = self.gl.size();
        self.presenter.present(shaded_texture, source_size, window_size);

        if self.stream_manager.is_active() && !self.resizing.load(Ordering::SeqCst) {
            let _guard = self.resize_lock.lock().unwrap();
            self.read_back_for_streaming(window_size);
        }

        self.gl.swap_buffers();
    }

    /// Resamples the presented framebuffer to the stream's output
    /// dimensions with nearest-neighbor sampling (bilinear is explicitly
    /// rejected here as too costly on the render thread) and enqueues
    /// it into the stream manager.
    fn read_back_for_streaming(&mut self, window_size: Size) {
        self.pbo.resize_if_needed(window_size.width(), window_size.height());
        if !self.pbo.is_initialized() && !self.pbo.init(window_size.width(), window_size.height()) {
            return;
        }

        if self.pbo.has_data_ready() {
            let needed = window_size.width() as usize * window_size.height() as usize * 3;
            let mut raw = vec![0u8; needed];
            if self.pbo.get_read_data(&mut raw, window_size.width(), window_size.height()) {
                let stream_width = self.config.stream_width;
                let stream_height = self.config.stream_height;
                resample_nearest(
                    &raw,
                    window_size.width(),
                    window_size.height(),
                    stream_width,
                    stream_height,
                    &mut self.stream_scratch,
                );
                self.stream_manager.push_frame(
                    &self.stream_scratch,
                    stream_width,
                    stream_height,
                    audio::now_us() as i64,
                );
            }
        }

        self.pbo
            .start_async_read(0, 0, window_size.width() as i32, window_size.height() as i32);
    }

    /// Resize callback: sets `m_isResizing`, recreates whatever depends
    /// on window size, then clears it.
    #[named]
    pub fn on_resize(&mut self, new_size: Size) {
        debug!("{} {new_size:?}", function_name!().white().bold());
        self.resizing.store(true, Ordering::SeqCst);
        let _guard = self.resize_lock.lock().unwrap();
        self.shader_engine.set_viewport(new_size);
        self.pbo.cleanup();
        self.resizing.store(false, Ordering::SeqCst);
    }

    /// Reconfigures capture resolution/framerate at runtime, delegating
    /// to [`capture::reconfigure`].
    #[named]
    pub fn reconfigure_capture(&mut self, width: u32, height: u32, fps: f32) -> Result<(), CoreError> {
        debug!("{} {width}x{height}@{fps}", function_name!().white().bold());
        self.frame_processor.delete_texture();
        capture::reconfigure(self.video.as_mut(), &self.config.device_id, width, height, PixelFormat::Yuyv, fps)
            .map_err(CoreError::Capture)?;
        self.config.capture_width = width;
        self.config.capture_height = height;
        self.config.capture_fps = fps;
        Ok(())
    }

    pub fn load_preset(&mut self, path: &std::path::Path) -> Result<(), CoreError> {
        self.shader_engine.load_preset(path).map_err(CoreError::Preset)
    }

    pub fn set_shader_parameter(&mut self, name: &str, value: f32) {
        self.shader_engine.set_shader_parameter(name, value);
    }

    pub fn shader_parameters(&self) -> Vec<(String, crate::shader::ParameterInfo, f32)> {
        self.shader_engine.shader_parameters()
    }

    pub fn set_brightness_contrast(&mut self, brightness: f32, contrast: f32) {
        self.presenter.brightness = brightness;
        self.presenter.contrast = contrast;
    }

    pub fn set_maintain_aspect(&mut self, maintain: bool) {
        self.presenter.aspect_mode = if maintain {
            AspectMode::PreserveAspect
        } else {
            AspectMode::Stretch
        };
    }

    pub fn stream_urls(&self) -> Vec<String> {
        self.stream_manager.stream_urls()
    }

    pub fn synchronizer(&self) -> &Arc<MediaSynchronizer> {
        &self.synchronizer
    }

    /// Cancellation sequence: stop the audio pump, join it, stop the
    /// stream manager, then release GL objects (dropped along with
    /// `self`).
    pub fn shutdown(mut self) {
        self.audio_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
        self.stream_manager.stop();
        self.video.stop_capture();
        self.video.close();
        self.frame_processor.delete_texture();
        self.pbo.cleanup();
    }
}

fn apply_capture_controls(video: &mut dyn VideoSource, controls: &crate::cli::CaptureControls) {
    let pairs = [
        (Control::Brightness, controls.brightness),
        (Control::Contrast, controls.contrast),
        (Control::Saturation, controls.saturation),
        (Control::Hue, controls.hue),
        (Control::Gain, controls.gain),
        (Control::Exposure, controls.exposure),
        (Control::Sharpness, controls.sharpness),
        (Control::Gamma, controls.gamma),
        (Control::WhiteBalance, controls.white_balance),
    ];
    for (control, value) in pairs {
        if let Some(value) = value.get() {
            if let Err(err) = video.set_control(control, value) {
                warn!("Failed to set {control:?} to {value}: {err}");
            }
        }
    }
}

/// Nearest-neighbor resample of an RGB24 buffer. Bilinear is deliberately
/// avoided here — it is too costly to run on the render thread every frame.
fn resample_nearest(src: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32, dst: &mut Vec<u8>) {
    let needed = dst_w as usize * dst_h as usize * 3;
    if dst.len() != needed {
        *dst = vec![0u8; needed];
    }
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return;
    }

    for y in 0..dst_h {
        let src_y = (y * src_h) / dst_h;
        for x in 0..dst_w {
            let src_x = (x * src_w) / dst_w;
            let src_idx = (src_y as usize * src_w as usize + src_x as usize) * 3;
            let dst_idx = (y as usize * dst_w as usize + x as usize) * 3;
            dst[dst_idx..dst_idx + 3].copy_from_slice(&src[src_idx..src_idx + 3]);
        }
    }
}

fn gl_version_str(major: u32, minor: u32) -> &'static str {
    match (major, minor) {
        (4, m) if m >= 2 => "4.2",
        (4, 1) => "4.1",
        (4, 0) => "4.0",
        (3, 3) => "3.3",
        (3, 2) => "3.2",
        (3, _) => "3.0",
        _ => "2.0",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_validate_against_spec_bounds() {
        assert!(dimensions_valid(Size::new(1, 1)));
        assert!(dimensions_valid(Size::new(7680, 4320)));
        assert!(!dimensions_valid(Size::new(0, 1080)));
        assert!(!dimensions_valid(Size::new(7681, 4320)));
        assert!(!dimensions_valid(Size::new(1920, 4321)));
    }

    #[test]
    fn resample_nearest_handles_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let mut dst = Vec::new();
        resample_nearest(&src, 2, 2, 2, 2, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    fn resample_nearest_downscales() {
        let src = vec![255u8, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 0];
        let mut dst = Vec::new();
        resample_nearest(&src, 2, 2, 1, 1, &mut dst);
        assert_eq!(dst, vec![255, 0, 0]);
    }
}
