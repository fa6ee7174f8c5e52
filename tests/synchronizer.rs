// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration coverage for audio/video timestamp alignment, exercised
//! purely through the public [`retrocapture::sync`] API.

use retrocapture::sync::{MediaSynchronizer, SyncZone};

#[test]
fn calculates_sync_zone_across_independently_buffered_streams() {
    let sync = MediaSynchronizer::new();
    for (i, ts) in [0i64, 16_667, 33_334, 50_001].into_iter().enumerate() {
        sync.add_video_frame(&vec![0u8; 8], 2, 2, ts);
        let _ = i;
    }
    for ts in [0i64, 20_000, 40_000] {
        sync.add_audio_chunk(&vec![0i16; 960], 960, ts, 48_000, 2);
    }

    let zone = sync.calculate_sync_zone();
    assert!(zone.is_valid());

    let frames = sync.video_frames(&zone);
    let chunks = sync.audio_chunks(&zone);
    assert!(!frames.is_empty());
    assert!(!chunks.is_empty());

    sync.mark_video_processed(zone.video_start_idx, zone.video_end_idx);
    sync.mark_audio_processed(zone.audio_start_idx, zone.audio_end_idx);
    sync.cleanup_old_data();

    assert!(sync.video_buffer_size() <= frames.len());
}

#[test]
fn sparse_streams_with_no_overlap_yield_invalid_zone() {
    let sync = MediaSynchronizer::new();
    sync.add_video_frame(&[0u8; 4], 1, 1, 0);

    let zone = sync.calculate_sync_zone();
    assert_eq!(zone, SyncZone::invalid());
    assert!(!zone.is_valid());
}

#[test]
fn processed_entries_are_dropped_on_cleanup() {
    let sync = MediaSynchronizer::new();
    sync.add_video_frame(&[0u8; 4], 1, 1, 0);
    sync.add_video_frame(&[0u8; 4], 1, 1, 1_000);
    sync.mark_video_processed(0, 1);
    sync.cleanup_old_data();
    assert_eq!(sync.video_buffer_size(), 1);
    assert_eq!(sync.latest_video_timestamp(), 1_000);
}
