// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration coverage for YUYV to RGB24 conversion.

use retrocapture::capture::frame_processor::yuyv_to_rgb;

#[test]
fn full_black_yuyv_converts_to_black_rgb() {
    let yuyv = [16u8, 128, 16, 128];
    let mut rgb = [0u8; 6];
    yuyv_to_rgb(&yuyv, &mut rgb);
    assert_eq!(rgb, [0, 0, 0, 0, 0, 0]);
}

#[test]
fn full_white_yuyv_converts_to_white_rgb() {
    let yuyv = [235u8, 128, 235, 128];
    let mut rgb = [0u8; 6];
    yuyv_to_rgb(&yuyv, &mut rgb);
    for channel in rgb {
        assert!(channel >= 250, "expected near-white channel, got {channel}");
    }
}

#[test]
fn shared_chroma_pair_applies_to_both_luma_samples() {
    let yuyv = [100u8, 90, 150, 170];
    let mut rgb = [0u8; 6];
    yuyv_to_rgb(&yuyv, &mut rgb);

    let mut alone = [0u8; 6];
    yuyv_to_rgb(&[100, 90, 100, 90], &mut alone);
    assert_eq!(rgb[0..3], alone[0..3]);

    let mut alone2 = [0u8; 6];
    yuyv_to_rgb(&[150, 170, 150, 170], &mut alone2);
    assert_eq!(rgb[3..6], alone2[3..6]);
}

#[test]
fn converts_multiple_macropixel_groups_in_scanline_order() {
    let yuyv = [16u8, 128, 16, 128, 235, 128, 235, 128];
    let mut rgb = [0u8; 12];
    yuyv_to_rgb(&yuyv, &mut rgb);
    assert_eq!(&rgb[0..6], &[0, 0, 0, 0, 0, 0]);
    assert!(rgb[6..12].iter().all(|&c| c >= 250));
}
