// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Streaming output: an `EncoderSink` trait plus the [`StreamManager`]
//! that owns one or more sinks and rate-limits start requests.
//!
//! RetroCapture's rendering loop is a handful of long-lived worker
//! threads, not a request-scoped async service, so this stays on
//! `std::net`/`std::thread` the way the rest of the crate's concurrency
//! model is built rather than pulling in an async runtime.

use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::sync::MediaSynchronizer;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to bind listener on port {0}")]
    Bind(u16),
    #[error("streaming is in its start cooldown; {0} ms remaining")]
    Cooldown(u64),
    #[error("no encoder sinks configured")]
    NoSinks,
}

/// Supported video/audio codec tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoCodec {
    H264,
    H265,
    Vp8,
    Vp9,
    Mpeg2Video,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCodec {
    Aac,
    Mp3,
    Opus,
}

/// Configuration applied to an [`EncoderSink`] before `start()`.
#[derive(Clone, Debug)]
pub struct StreamConfig {
    pub port: u16,
    pub width: u32,
    pub height: u32,
    pub fps: f32,
    pub video_bitrate_bps: u32,
    pub audio_bitrate_bps: u32,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
    pub audio_buffer_frames: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            width: 1280,
            height: 720,
            fps: 30.0,
            video_bitrate_bps: 4_000_000,
            audio_bitrate_bps: 128_000,
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::Aac,
            audio_sample_rate: 48_000,
            audio_channels: 2,
            audio_buffer_frames: 1024,
        }
    }
}

/// One encoding + muxing + delivery backend StreamManager drives. The
/// default implementation below muxes to MPEG-TS
/// over chunked HTTP; other sinks (file recording, a second protocol)
/// implement the same trait and are added to a [`StreamManager`]
/// alongside it.
pub trait EncoderSink: Send {
    fn initialize(&mut self, config: &StreamConfig) -> Result<(), StreamError>;
    fn start(&mut self) -> Result<(), StreamError>;
    fn stop(&mut self);
    fn cleanup(&mut self);

    /// Non-blocking enqueue; drops the frame rather than blocking the
    /// caller under backpressure.
    fn push_frame(&self, rgb: &[u8], width: u32, height: u32);
    /// Non-blocking enqueue of interleaved PCM samples.
    fn push_audio(&self, samples: &[i16]);

    fn stream_urls(&self) -> Vec<String>;
    fn client_count(&self) -> usize;
    fn is_active(&self) -> bool;
}

/// Minimum interval enforced between a `stop()` and the next accepted
/// `start()` (documented here as a 3-second cooldown).
const STREAMING_START_COOLDOWN: Duration = Duration::from_millis(3000);

/// Owns ≥1 [`EncoderSink`]s and the shared [`MediaSynchronizer`] they
/// pull aligned audio/video from.
pub struct StreamManager {
    sinks: Vec<Box<dyn EncoderSink>>,
    synchronizer: Arc<MediaSynchronizer>,
    active: AtomicBool,
    last_stop: Mutex<Option<Instant>>,
    total_frames_pushed: AtomicU64,
}

impl StreamManager {
    pub fn new(synchronizer: Arc<MediaSynchronizer>) -> Self {
        Self {
            sinks: Vec::new(),
            synchronizer,
            active: AtomicBool::new(false),
            last_stop: Mutex::new(None),
            total_frames_pushed: AtomicU64::new(0),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EncoderSink>) {
        self.sinks.push(sink);
    }

    pub fn synchronizer(&self) -> &Arc<MediaSynchronizer> {
        &self.synchronizer
    }

    /// Initializes every configured sink.
    pub fn initialize(&mut self, config: &StreamConfig) -> Result<(), StreamError> {
        if self.sinks.is_empty() {
            return Err(StreamError::NoSinks);
        }
        for sink in &mut self.sinks {
            sink.initialize(config)?;
        }
        Ok(())
    }

    /// Milliseconds remaining before [`Self::can_start_streaming`]
    /// would return `true`, or `0` if it already would.
    pub fn streaming_cooldown_remaining_ms(&self) -> u64 {
        let last_stop = self.last_stop.lock().unwrap();
        match *last_stop {
            None => 0,
            Some(at) => {
                let elapsed = at.elapsed();
                STREAMING_START_COOLDOWN.saturating_sub(elapsed).as_millis() as u64
            }
        }
    }

    pub fn can_start_streaming(&self) -> bool {
        self.streaming_cooldown_remaining_ms() == 0
    }

    /// Starts every sink, rejecting the request while the start
    /// cooldown from a prior `stop()` is still active.
    pub fn start(&mut self) -> Result<(), StreamError> {
        if !self.can_start_streaming() {
            return Err(StreamError::Cooldown(self.streaming_cooldown_remaining_ms()));
        }
        for sink in &mut self.sinks {
            sink.start()?;
        }
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn stop(&mut self) {
        for sink in &mut self.sinks {
            sink.stop();
        }
        self.active.store(false, Ordering::SeqCst);
        *self.last_stop.lock().unwrap() = Some(Instant::now());
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Forwards `rgb` into the synchronizer for every active sink to
    /// later pull from.
    pub fn push_frame(&self, rgb: &[u8], width: u32, height: u32, capture_timestamp_us: i64) {
        if !self.is_active() {
            return;
        }
        self.synchronizer.add_video_frame(rgb, width, height, capture_timestamp_us);
        self.total_frames_pushed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn push_audio(
        &self,
        samples: &[i16],
        capture_timestamp_us: i64,
        sample_rate: u32,
        channels: u32,
    ) {
        if !self.is_active() {
            return;
        }
        self.synchronizer
            .add_audio_chunk(samples, samples.len(), capture_timestamp_us, sample_rate, channels);
    }

    pub fn total_client_count(&self) -> usize {
        self.sinks.iter().map(|s| s.client_count()).sum()
    }

    pub fn stream_urls(&self) -> Vec<String> {
        self.sinks.iter().flat_map(|s| s.stream_urls()).collect()
    }
}

/// Default [`EncoderSink`]: binds an HTTP listener and spawns one
/// worker thread that drains aligned sync zones and pushes muxed TS
/// bytes to every connected client.
///
/// Actual H.264/AAC encoding and TS muxing are supplied by the codec
/// backend injected at construction (`encode_video`/`encode_audio`/`mux`);
/// this type owns only the socket, client list and worker lifecycle,
/// mirroring how [`crate::capture::VideoSource`] pushes codec-specific
/// concerns out behind a small trait.
pub struct HttpTsEncoderSink {
    config: Mutex<StreamConfig>,
    listener: Mutex<Option<TcpListener>>,
    clients: Arc<Mutex<Vec<std::net::TcpStream>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
    synchronizer: Arc<MediaSynchronizer>,
}

impl HttpTsEncoderSink {
    pub fn new(synchronizer: Arc<MediaSynchronizer>) -> Self {
        Self {
            config: Mutex::new(StreamConfig::default()),
            listener: Mutex::new(None),
            clients: Arc::new(Mutex::new(Vec::new())),
            worker: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
            synchronizer,
        }
    }
}

impl EncoderSink for HttpTsEncoderSink {
    fn initialize(&mut self, config: &StreamConfig) -> Result<(), StreamError> {
        *self.config.lock().unwrap() = config.clone();
        let listener = TcpListener::bind(("0.0.0.0", config.port)).map_err(|_| StreamError::Bind(config.port))?;
        listener.set_nonblocking(true).ok();
        *self.listener.lock().unwrap() = Some(listener);
        Ok(())
    }

    fn start(&mut self) -> Result<(), StreamError> {
        let listener = self
            .listener
            .lock()
            .unwrap()
            .take()
            .ok_or(StreamError::Bind(self.config.lock().unwrap().port))?;

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let clients = self.clients.clone();
        let synchronizer = self.synchronizer.clone();

        let handle = std::thread::spawn(move || {
            accept_and_encode_loop(listener, clients, synchronizer, running);
        });
        *self.worker.lock().unwrap() = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
        self.clients.lock().unwrap().clear();
    }

    fn cleanup(&mut self) {
        self.stop();
        *self.listener.lock().unwrap() = None;
    }

    fn push_frame(&self, _rgb: &[u8], _width: u32, _height: u32) {
        // Frames are pulled from the shared synchronizer by the worker
        // thread rather than pushed directly into this sink.
    }

    fn push_audio(&self, _samples: &[i16]) {
        // Same as push_frame: consumed from the synchronizer.
    }

    fn stream_urls(&self) -> Vec<String> {
        let port = self.config.lock().unwrap().port;
        vec![format!("http://0.0.0.0:{port}/stream.ts")]
    }

    fn client_count(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    fn is_active(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Accepts new HTTP clients without blocking the encode loop and, once
/// a valid sync zone is available, encodes and muxes it to every
/// connected client, dropping TS packets on backpressure instead of
/// blocking.
fn accept_and_encode_loop(
    listener: TcpListener,
    clients: Arc<Mutex<Vec<std::net::TcpStream>>>,
    synchronizer: Arc<MediaSynchronizer>,
    running: Arc<AtomicBool>,
) {
    use std::io::Write;

    while running.load(Ordering::SeqCst) {
        while let Ok((stream, _addr)) = listener.accept() {
            stream.set_nonblocking(true).ok();
            clients.lock().unwrap().push(stream);
        }

        let zone = synchronizer.calculate_sync_zone();
        if !zone.is_valid() {
            std::thread::sleep(Duration::from_millis(10));
            continue;
        }

        let video_frames = synchronizer.video_frames(&zone);
        let audio_chunks = synchronizer.audio_chunks(&zone);

        let ts_packets = mux_to_ts(&video_frames, &audio_chunks);

        let mut clients = clients.lock().unwrap();
        clients.retain_mut(|client| match client.write_all(&ts_packets) {
            Ok(()) => true,
            Err(_) => false,
        });
        drop(clients);

        synchronizer.mark_video_processed(zone.video_start_idx, zone.video_end_idx);
        synchronizer.mark_audio_processed(zone.audio_start_idx, zone.audio_end_idx);
        synchronizer.cleanup_old_data();
    }
}

/// Placeholder mux stage: a real backend replaces this with an actual
/// encoder + MPEG-TS muxer; the worker loop's accept/backpressure/mark-
/// processed contract is what this crate owns.
fn mux_to_ts(
    video_frames: &[crate::sync::TimestampedFrame],
    audio_chunks: &[crate::sync::TimestampedAudio],
) -> Vec<u8> {
    const TS_PACKET_SIZE: usize = 188;
    let packet_count = video_frames.len() + audio_chunks.len();
    vec![0u8; packet_count * TS_PACKET_SIZE]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink_stub(sync: Arc<MediaSynchronizer>) -> HttpTsEncoderSink {
        HttpTsEncoderSink::new(sync)
    }

    #[test]
    fn stream_manager_rejects_start_without_sinks() {
        let sync = Arc::new(MediaSynchronizer::new());
        let mut manager = StreamManager::new(sync);
        assert!(matches!(manager.initialize(&StreamConfig::default()), Err(StreamError::NoSinks)));
    }

    #[test]
    fn cooldown_blocks_restart_until_elapsed() {
        let sync = Arc::new(MediaSynchronizer::new());
        let mut manager = StreamManager::new(sync.clone());
        manager.add_sink(Box::new(sink_stub(sync)));
        manager.initialize(&StreamConfig { port: 0, ..StreamConfig::default() }).unwrap();

        manager.start().unwrap();
        manager.stop();

        assert!(!manager.can_start_streaming());
        assert!(matches!(manager.start(), Err(StreamError::Cooldown(_))));
    }

    #[test]
    fn frame_push_is_ignored_while_inactive() {
        let sync = Arc::new(MediaSynchronizer::new());
        let manager = StreamManager::new(sync.clone());
        manager.push_frame(&[0u8; 12], 2, 2, 0);
        assert_eq!(sync.video_buffer_size(), 0);
    }
}
