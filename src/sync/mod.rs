// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Audio/video synchronization for streaming and recording.
//!
//! Two independently mutex-guarded, time-ordered deques accumulate
//! captured video frames and audio chunks; [`MediaSynchronizer::calculate_sync_zone`]
//! finds the overlapping time window an encoder can safely consume from
//! both at once. Entries are copy-on-insert behind `Arc` so
//! [`MediaSynchronizer::video_frames`]/[`MediaSynchronizer::audio_chunks`]
//! can hand out cheap snapshots without holding either mutex across the
//! encode.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One captured video frame, timestamped on the same monotonic clock as
/// audio.
#[derive(Clone, Debug)]
pub struct TimestampedFrame {
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub capture_timestamp_us: i64,
    pub processed: bool,
}

/// One captured audio chunk.
#[derive(Clone, Debug)]
pub struct TimestampedAudio {
    pub samples: Arc<Vec<i16>>,
    pub sample_count: usize,
    pub capture_timestamp_us: i64,
    pub duration_us: i64,
    pub processed: bool,
}

/// A time interval with index ranges into both deques. An encoder
/// worker consumes exactly the entries whose
/// indices fall in `[video_start_idx, video_end_idx)` and
/// `[audio_start_idx, audio_end_idx)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncZone {
    pub start_time_us: i64,
    pub end_time_us: i64,
    pub video_start_idx: usize,
    pub video_end_idx: usize,
    pub audio_start_idx: usize,
    pub audio_end_idx: usize,
}

impl SyncZone {
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.start_time_us < self.end_time_us
            && self.video_end_idx > self.video_start_idx
            && self.audio_end_idx > self.audio_start_idx
    }
}

struct SyncParams {
    sync_tolerance_us: i64,
    max_buffer_time_us: i64,
    min_buffer_time_us: i64,
    max_video_buffer: usize,
    max_audio_buffer: usize,
}

impl Default for SyncParams {
    fn default() -> Self {
        Self {
            sync_tolerance_us: 200_000,
            max_buffer_time_us: 5_000_000,
            min_buffer_time_us: 100_000,
            max_video_buffer: 15,
            max_audio_buffer: 30,
        }
    }
}

/// Aligns captured video frames and audio chunks by timestamp for a
/// downstream encoder. It exclusively owns its two deques and mutexes.
pub struct MediaSynchronizer {
    params: SyncParams,
    video: Mutex<VecDeque<TimestampedFrame>>,
    audio: Mutex<VecDeque<TimestampedAudio>>,
    latest_video_ts: Mutex<i64>,
    latest_audio_ts: Mutex<i64>,
}

impl MediaSynchronizer {
    pub fn new() -> Self {
        Self {
            params: SyncParams::default(),
            video: Mutex::new(VecDeque::new()),
            audio: Mutex::new(VecDeque::new()),
            latest_video_ts: Mutex::new(0),
            latest_audio_ts: Mutex::new(0),
        }
    }

    pub fn set_sync_tolerance_us(&mut self, v: i64) {
        self.params.sync_tolerance_us = v;
    }

    pub fn set_max_buffer_time_us(&mut self, v: i64) {
        self.params.max_buffer_time_us = v;
    }

    pub fn set_min_buffer_time_us(&mut self, v: i64) {
        self.params.min_buffer_time_us = v;
    }

    pub fn set_max_video_buffer(&mut self, v: usize) {
        self.params.max_video_buffer = v;
    }

    pub fn set_max_audio_buffer(&mut self, v: usize) {
        self.params.max_audio_buffer = v;
    }

    /// Monotonic microsecond clock. Capture timestamps
    /// supplied by the video/audio sources must already be on this
    /// clock; no clock-domain translation is performed here. Delegates
    /// to [`crate::clock::now_us`], the one process-wide epoch every
    /// timestamp source in the crate shares.
    pub fn now_us(&self) -> i64 {
        crate::clock::now_us()
    }

    /// Copies `data` into an owned buffer and appends it to the video
    /// deque, evicting the oldest entry first if the deque is already
    /// at capacity.
    pub fn add_video_frame(&self, data: &[u8], width: u32, height: u32, capture_timestamp_us: i64) {
        let mut video = self.video.lock().unwrap();
        if video.len() >= self.params.max_video_buffer {
            video.pop_front();
        }
        video.push_back(TimestampedFrame {
            data: Arc::new(data.to_vec()),
            width,
            height,
            capture_timestamp_us,
            processed: false,
        });
        *self.latest_video_ts.lock().unwrap() = capture_timestamp_us;
    }

    /// Copies `samples` and appends a chunk to the audio deque.
    /// Duration is derived from sample count, rate
    /// and channel count per the source's per-channel convention.
    pub fn add_audio_chunk(
        &self,
        samples: &[i16],
        sample_count: usize,
        capture_timestamp_us: i64,
        sample_rate: u32,
        channels: u32,
    ) {
        let frames_per_channel = sample_count as f64 / channels.max(1) as f64;
        let duration_us = (frames_per_channel / sample_rate.max(1) as f64 * 1_000_000.0) as i64;

        let mut audio = self.audio.lock().unwrap();
        if audio.len() >= self.params.max_audio_buffer {
            audio.pop_front();
        }
        audio.push_back(TimestampedAudio {
            samples: Arc::new(samples.to_vec()),
            sample_count,
            capture_timestamp_us,
            duration_us,
            processed: false,
        });
        *self.latest_audio_ts.lock().unwrap() = capture_timestamp_us;
    }

    /// Finds the overlapping time window both deques currently cover.
    pub fn calculate_sync_zone(&self) -> SyncZone {
        let video = self.video.lock().unwrap();
        let audio = self.audio.lock().unwrap();

        if video.is_empty() || audio.is_empty() {
            return SyncZone::invalid();
        }

        let video_front_ts = video.front().unwrap().capture_timestamp_us;
        let audio_front_ts = audio.front().unwrap().capture_timestamp_us;
        let start = video_front_ts.max(audio_front_ts);

        // The zone is still emitted when the streams have drifted past
        // tolerance, clamped to the overlap window below; this only flags
        // the drift so a host can surface it.
        if (video_front_ts - audio_front_ts).abs() > self.params.sync_tolerance_us {
            log::warn!(
                "audio/video drift {}us exceeds sync tolerance {}us",
                (video_front_ts - audio_front_ts).abs(),
                self.params.sync_tolerance_us
            );
        }

        let video_back = video.back().unwrap();
        let audio_back = audio.back().unwrap();
        let video_frame_interval_us = estimate_frame_interval_us(&video);
        let end = (video_back.capture_timestamp_us + video_frame_interval_us)
            .min(audio_back.capture_timestamp_us + audio_back.duration_us);

        if end - start < self.params.min_buffer_time_us {
            return SyncZone::invalid();
        }

        let video_start_idx = video.iter().position(|f| f.capture_timestamp_us >= start).unwrap_or(video.len());
        let video_end_idx = video
            .iter()
            .position(|f| f.capture_timestamp_us > end)
            .unwrap_or(video.len());
        let audio_start_idx = audio.iter().position(|a| a.capture_timestamp_us >= start).unwrap_or(audio.len());
        let audio_end_idx = audio
            .iter()
            .position(|a| a.capture_timestamp_us > end)
            .unwrap_or(audio.len());

        let zone = SyncZone {
            start_time_us: start,
            end_time_us: end,
            video_start_idx,
            video_end_idx,
            audio_start_idx,
            audio_end_idx,
        };

        if !zone.is_valid() {
            return SyncZone::invalid();
        }
        zone
    }

    /// Non-owning snapshot of the video frames in `zone`.
    pub fn video_frames(&self, zone: &SyncZone) -> Vec<TimestampedFrame> {
        let video = self.video.lock().unwrap();
        video
            .range(zone.video_start_idx..zone.video_end_idx.min(video.len()))
            .cloned()
            .collect()
    }

    /// Non-owning snapshot of the audio chunks in `zone`.
    pub fn audio_chunks(&self, zone: &SyncZone) -> Vec<TimestampedAudio> {
        let audio = self.audio.lock().unwrap();
        audio
            .range(zone.audio_start_idx..zone.audio_end_idx.min(audio.len()))
            .cloned()
            .collect()
    }

    pub fn mark_video_processed(&self, start_idx: usize, end_idx: usize) {
        let mut video = self.video.lock().unwrap();
        for entry in video.iter_mut().skip(start_idx).take(end_idx.saturating_sub(start_idx)) {
            entry.processed = true;
        }
    }

    pub fn mark_audio_processed(&self, start_idx: usize, end_idx: usize) {
        let mut audio = self.audio.lock().unwrap();
        for entry in audio.iter_mut().skip(start_idx).take(end_idx.saturating_sub(start_idx)) {
            entry.processed = true;
        }
    }

    /// Marks a single video frame processed by timestamp, for callers
    /// that sort a zone's snapshot and lose index identity.
    pub fn mark_video_processed_by_timestamp(&self, timestamp_us: i64) {
        let mut video = self.video.lock().unwrap();
        if let Some(entry) = video.iter_mut().find(|f| f.capture_timestamp_us == timestamp_us) {
            entry.processed = true;
        }
    }

    pub fn mark_audio_processed_by_timestamp(&self, timestamp_us: i64) {
        let mut audio = self.audio.lock().unwrap();
        if let Some(entry) = audio.iter_mut().find(|a| a.capture_timestamp_us == timestamp_us) {
            entry.processed = true;
        }
    }

    /// Drops entries older than `now - max_buffer_time_us`, or already
    /// marked processed.
    pub fn cleanup_old_data(&self) {
        let now = self.now_us();
        let cutoff = now - self.params.max_buffer_time_us;

        let mut video = self.video.lock().unwrap();
        video.retain(|f| f.capture_timestamp_us >= cutoff && !f.processed);

        let mut audio = self.audio.lock().unwrap();
        audio.retain(|a| a.capture_timestamp_us >= cutoff && !a.processed);
    }

    pub fn clear(&self) {
        self.video.lock().unwrap().clear();
        self.audio.lock().unwrap().clear();
        *self.latest_video_ts.lock().unwrap() = 0;
        *self.latest_audio_ts.lock().unwrap() = 0;
    }

    pub fn video_buffer_size(&self) -> usize {
        self.video.lock().unwrap().len()
    }

    pub fn audio_buffer_size(&self) -> usize {
        self.audio.lock().unwrap().len()
    }

    pub fn latest_video_timestamp(&self) -> i64 {
        *self.latest_video_ts.lock().unwrap()
    }

    pub fn latest_audio_timestamp(&self) -> i64 {
        *self.latest_audio_ts.lock().unwrap()
    }
}

impl Default for MediaSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimates the inter-frame interval from the last two buffered video
/// timestamps, falling back to a 30fps assumption with a single frame.
fn estimate_frame_interval_us(video: &VecDeque<TimestampedFrame>) -> i64 {
    const FALLBACK_30FPS_US: i64 = 33_333;
    if video.len() < 2 {
        return FALLBACK_30FPS_US;
    }
    let last = video[video.len() - 1].capture_timestamp_us;
    let prev = video[video.len() - 2].capture_timestamp_us;
    (last - prev).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sync_zone_covers_expected_window_s4() {
        let sync = MediaSynchronizer::new();
        for ts in [0, 33_333, 66_666] {
            sync.add_video_frame(&[0u8; 4], 2, 2, ts);
        }
        for ts in [0, 23_220, 46_440] {
            sync.add_audio_chunk(&[0i16; 100], 100, ts, 4310, 1);
        }

        let zone = sync.calculate_sync_zone();
        assert!(zone.is_valid());
        assert_eq!(zone.start_time_us, 0);
        assert_eq!(zone.video_start_idx, 0);
        assert_eq!(zone.video_end_idx, 3);
        assert!(zone.end_time_us <= 69_660);
    }

    #[test]
    fn empty_buffers_yield_invalid_zone() {
        let sync = MediaSynchronizer::new();
        assert!(!sync.calculate_sync_zone().is_valid());
    }

    #[test]
    fn video_buffer_evicts_oldest_past_capacity() {
        let sync = MediaSynchronizer::new();
        for i in 0..20 {
            sync.add_video_frame(&[0u8; 4], 1, 1, i * 1000);
        }
        assert_eq!(sync.video_buffer_size(), 15);
        assert_eq!(sync.latest_video_timestamp(), 19_000);
    }

    #[test]
    fn timestamps_remain_monotonic_in_insertion_order() {
        let sync = MediaSynchronizer::new();
        for ts in [10, 20, 30, 40] {
            sync.add_video_frame(&[0u8; 1], 1, 1, ts);
        }
        let zone = SyncZone {
            start_time_us: 0,
            end_time_us: i64::MAX,
            video_start_idx: 0,
            video_end_idx: 4,
            audio_start_idx: 0,
            audio_end_idx: 0,
        };
        let frames = sync.video_frames(&zone);
        let timestamps: Vec<_> = frames.iter().map(|f| f.capture_timestamp_us).collect();
        assert_eq!(timestamps, vec![10, 20, 30, 40]);
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    }
}
