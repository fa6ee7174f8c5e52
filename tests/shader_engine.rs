// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration coverage for the parts of the multi-pass shader engine
//! that don't require a live GL context: pass-output sizing, and the
//! non-runnable-but-described-by-metadata path a pass takes when its
//! shader source can't even be read. Compiling and running an actual
//! program belongs to a host integration test driven against a real GL
//! context.

use retrocapture::preset::{ScaleType, ShaderPass};
use retrocapture::renderer::pass::compute_output_size;
use retrocapture::renderer::{pass, GlCapabilities};

#[test]
fn three_pass_chain_scales_source_then_viewport_then_fills_viewport_s2() {
    let pass0 = ShaderPass {
        scale_type_x: ScaleType::Source,
        scale_x: 2.0,
        scale_type_y: ScaleType::Source,
        scale_y: 2.0,
        ..Default::default()
    };
    let pass1 = ShaderPass {
        scale_type_x: ScaleType::Absolute,
        scale_x: 256.0,
        scale_type_y: ScaleType::Absolute,
        scale_y: 224.0,
        ..Default::default()
    };
    let pass2 = ShaderPass::default();

    let viewport = retrocapture::geometry::Size::new(1920, 1080);
    let input = retrocapture::geometry::Size::new(320, 240);

    let out0 = compute_output_size(&pass0, false, input, viewport);
    assert_eq!((out0.width(), out0.height()), (640, 480));

    let out1 = compute_output_size(&pass1, false, out0, viewport);
    assert_eq!((out1.width(), out1.height()), (256, 224));

    let out2 = compute_output_size(&pass2, true, out1, viewport);
    assert_eq!((out2.width(), out2.height()), (1920, 1080));
}

#[test]
fn pass_with_unreadable_shader_is_non_runnable_but_keeps_empty_metadata() {
    let missing = ShaderPass {
        shader_path: "/nonexistent/path/does-not-exist.glsl".into(),
        ..Default::default()
    };
    let data = pass::compile(&missing, 0, &[missing.clone()], "4.2 (Core Profile)", Some("4.20"));
    assert!(!data.is_runnable());
    assert!(data.parameters.is_empty());
}

#[test]
fn gl_capabilities_is_plain_copyable_data() {
    let caps = GlCapabilities {
        gl_version: "4.2 (Core Profile)",
        glsl_version: Some("4.20"),
        clamp_to_border_supported: true,
    };
    let copy = caps;
    assert_eq!(copy.gl_version, "4.2 (Core Profile)");
    assert!(copy.clamp_to_border_supported);
}
