// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration coverage for RetroArch GLSL preprocessing: `#pragma
//! parameter` extraction, `bogus_` filtering, and the `OutputSize`
//! type-inference heuristic under macro packing (S6).

use std::fs;
use std::path::PathBuf;

use retrocapture::preset::ShaderPass;
use retrocapture::shader::{preprocess, OutputSizeType, PassContext};

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("retrocapture-preprocess-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn extracts_parameters_and_skips_bogus_prefixed_ones() {
    let source = r#"#pragma parameter STRENGTH "Effect strength" 0.5 0.0 1.0 0.05
#pragma parameter bogus_internal "Hidden" 1.0 0.0 1.0 0.1
void main() { }
"#;
    let path = temp_path("params.glsl");
    fs::write(&path, source).unwrap();

    let passes = vec![ShaderPass::default()];
    let ctx = PassContext {
        pass_index: 0,
        preset_passes: &passes,
    };
    let result = preprocess(source, &path, "4.2 (Core Profile)", Some("4.20"), &ctx).unwrap();

    assert_eq!(result.parameters.len(), 1);
    assert_eq!(result.parameters[0].0, "STRENGTH");
    assert_eq!(result.parameters[0].1.default, 0.5);
    assert!(result.fragment_source.contains("#version"));
    assert!(!result.fragment_source.to_lowercase().contains("bogus_internal"));
}

#[test]
fn output_size_vec3_declaration_is_forced_to_vec2_under_macro_packing_s6() {
    let source = r#"uniform vec3 OutputSize;
#define COORD vec4(OutputSize, 1.0 / OutputSize)
void main() { }
"#;
    let path = temp_path("output_size.glsl");
    fs::write(&path, source).unwrap();

    let passes = vec![ShaderPass::default()];
    let ctx = PassContext {
        pass_index: 0,
        preset_passes: &passes,
    };
    let result = preprocess(source, &path, "4.2 (Core Profile)", Some("4.20"), &ctx).unwrap();

    assert_eq!(result.output_size_type, OutputSizeType::Vec2);
    assert!(result.fragment_source.contains("uniform vec2 OutputSize"));
}

#[test]
fn resolves_includes_relative_to_shader_directory() {
    let dir = std::env::temp_dir().join(format!("retrocapture-include-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let included_path = dir.join("common.inc");
    fs::write(&included_path, "float helper() { return 1.0; }\n").unwrap();

    let main_path = dir.join("main.glsl");
    let main_source = "#include \"common.inc\"\nvoid main() { }\n";
    fs::write(&main_path, main_source).unwrap();

    let passes = vec![ShaderPass::default()];
    let ctx = PassContext {
        pass_index: 0,
        preset_passes: &passes,
    };
    let result = preprocess(main_source, &main_path, "4.2 (Core Profile)", Some("4.20"), &ctx).unwrap();

    assert!(result.fragment_source.contains("helper"));
    assert!(!result.fragment_source.contains("#include"));
}
