// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration coverage for loading a `.glslp` preset from disk and
//! round-tripping it back out.

use std::fs;

use pretty_assertions::assert_eq;
use retrocapture::preset::{parser, ScaleType, WrapMode};

fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("retrocapture-test-{}-{}", std::process::id(), name));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_two_pass_preset_with_parameter_overrides() {
    let shader0 = write_temp("pass0.glsl", "void main() {}\n");
    let shader1 = write_temp("pass1.glsl", "void main() {}\n");

    let preset_src = format!(
        r#"shaders = "2"
shader0 = "{}"
filter_linear0 = "true"
scale_type_x0 = "source"
scale_x0 = "2.0"
scale_type_y0 = "source"
scale_y0 = "2.0"
shader1 = "{}"
wrap_mode1 = "repeat"
STRENGTH = "0.75"
"#,
        shader0.display(),
        shader1.display()
    );
    let preset_path = write_temp("two_pass.glslp", &preset_src);

    let preset = parser::load(&preset_path).expect("preset should load");

    assert_eq!(preset.passes.len(), 2);
    assert!(preset.passes[0].filter_linear);
    assert_eq!(preset.passes[0].scale_type_x, ScaleType::Source);
    assert_eq!(preset.passes[0].scale_x, 2.0);
    assert_eq!(preset.passes[1].wrap_mode, WrapMode::Repeat);
    assert_eq!(preset.parameter("STRENGTH"), Some(0.75));
}

#[test]
fn round_trips_only_non_default_keys() {
    let shader0 = write_temp("rt_pass0.glsl", "void main() {}\n");
    let preset_src = format!(
        "shaders = \"1\"\nshader0 = \"{}\"\nscale_type_x0 = \"viewport\"\nscale_x0 = \"1.0\"\n",
        shader0.display()
    );
    let preset_path = write_temp("rt.glslp", &preset_src);
    let mut preset = parser::load(&preset_path).expect("preset should load");
    preset.set_parameter("GAMMA", 2.2);

    let out_path = write_temp("rt_out.glslp", "");
    parser::save(&preset, &out_path).expect("preset should save");

    let reloaded = parser::load(&out_path).expect("saved preset should reload");
    assert_eq!(reloaded.passes.len(), 1);
    assert_eq!(reloaded.passes[0].scale_type_x, ScaleType::Viewport);
    assert_eq!(reloaded.parameter("GAMMA"), Some(2.2));

    let saved_text = fs::read_to_string(&out_path).unwrap();
    assert!(!saved_text.contains("filter_linear0"), "default keys should be omitted: {saved_text}");
}

#[test]
fn missing_passes_is_rejected() {
    let preset_path = write_temp("empty.glslp", "shaders = \"0\"\n");
    let err = parser::load(&preset_path).unwrap_err();
    assert!(matches!(err, retrocapture::preset::PresetError::NoPasses));
}
