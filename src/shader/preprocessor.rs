// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! RetroArch-compatible GLSL preprocessing: `#include` resolution,
//! `#pragma parameter` extraction, `OutputSize` type inference, and
//! vertex/fragment assembly from one shared source.
//!
//! Unlike a full C preprocessor handling `#if`/macro expansion,
//! RetroArch shaders rely on the GLSL compiler itself for conditional
//! compilation; this preprocessor only resolves includes, pulls out
//! parameter metadata, and patches the handful of things RetroArch
//! layers on top of plain GLSL.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::preset::ShaderPass;
use crate::renderer::shader::ShaderError;

use super::{patches, version};

/// One `#pragma parameter` declaration extracted from a shader.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterInfo {
    pub description: String,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

/// Inferred/corrected GLSL type of the `OutputSize` uniform. The engine
/// needs this to know which overload to pass at uniform-bind time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputSizeType {
    #[default]
    Vec2,
    Vec3,
    Vec4,
}

/// The outcome of preprocessing one shader source into its vertex and
/// fragment stage sources, plus whatever `#pragma parameter`s it declared.
#[derive(Clone, Debug)]
pub struct PreprocessResult {
    pub vertex_source: String,
    pub fragment_source: String,
    pub parameters: Vec<(String, ParameterInfo)>,
    pub output_size_type: OutputSizeType,
}

/// Context needed to resolve a pass's position in the render graph
/// (used only by [`patches::apply`] to detect scaling passes).
pub struct PassContext<'a> {
    pub pass_index: usize,
    pub preset_passes: &'a [ShaderPass],
}

#[allow(clippy::too_many_arguments)]
pub fn preprocess(
    shader_source: &str,
    shader_path: &Path,
    gl_version: &str,
    glsl_version: Option<&str>,
    pass_ctx: &PassContext,
) -> Result<PreprocessResult, ShaderError> {
    let shader_dir = shader_path.parent().unwrap_or_else(|| Path::new(""));
    let included = process_includes(shader_source, shader_dir);

    let (stripped, parameters) = extract_parameters(&included);
    let (corrected, output_size_type) = correct_output_size_type(&stripped);

    let (existing_version, code_after_version) = take_version_line(&corrected);
    let is_es = version::is_opengl_es(gl_version);
    let version_line = existing_version
        .unwrap_or_else(|| version::version_line(gl_version, glsl_version));
    let extension_line = version::desktop_extension_line(is_es);
    let precision_preamble = version::precision_preamble(is_es);

    let code_after_version = if is_es {
        strip_es_incompatible_extensions(&code_after_version)
    } else {
        code_after_version
    };

    let mut vertex_code = code_after_version.clone();
    let mut fragment_code = code_after_version;
    patches::apply(
        &mut vertex_code,
        &mut fragment_code,
        &shader_path.to_string_lossy(),
        pass_ctx.pass_index,
        pass_ctx.preset_passes,
    );

    let (vertex_code, fragment_code) = split_stages(&vertex_code, &fragment_code);

    let vertex_source = format!(
        "{version_line}\n{precision_preamble}{extension_line}#define VERTEX\n#define PARAMETER_UNIFORM\n{vertex_code}"
    );
    let fragment_source = format!(
        "{version_line}\n{precision_preamble}{extension_line}#define FRAGMENT\n#define PARAMETER_UNIFORM\n{fragment_code}"
    );

    Ok(PreprocessResult {
        vertex_source,
        fragment_source,
        parameters,
        output_size_type,
    })
}

/// Stage split: when the source uses `#pragma stage
/// vertex|fragment` markers, the vertex output keeps lines outside any
/// stage block plus lines inside `vertex` blocks, and the fragment
/// output keeps outside + `fragment` blocks. Other `#pragma` lines
/// survive in both outputs. Sources with no stage markers pass through
/// unchanged (the common case: RetroArch's `#if defined(VERTEX)` style
/// shaders do their own splitting via the `#define VERTEX`/`#define
/// FRAGMENT` markers `preprocess` always emits).
fn split_stages(vertex_code: &str, fragment_code: &str) -> (String, String) {
    if !vertex_code.contains("#pragma stage") {
        return (vertex_code.to_string(), fragment_code.to_string());
    }

    #[derive(PartialEq, Clone, Copy)]
    enum Stage {
        None,
        Vertex,
        Fragment,
    }

    let mut vertex_out = Vec::new();
    let mut fragment_out = Vec::new();
    let mut stage = Stage::None;

    for line in vertex_code.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("#pragma stage vertex") {
            stage = Stage::Vertex;
            continue;
        }
        if trimmed.starts_with("#pragma stage fragment") {
            stage = Stage::Fragment;
            continue;
        }
        if trimmed.starts_with("#pragma stage end") {
            stage = Stage::None;
            continue;
        }
        match stage {
            Stage::None => {
                vertex_out.push(line);
                fragment_out.push(line);
            }
            Stage::Vertex => vertex_out.push(line),
            Stage::Fragment => fragment_out.push(line),
        }
    }

    (vertex_out.join("\n"), fragment_out.join("\n"))
}

/// Resolves `#include "path"` / `#include <path>` directives, recursively,
/// against (in order) an absolute path, the including file's directory,
/// `<cwd>/shaders/shaders_glsl/<path>`, `<cwd>/<path>`, and finally a
/// `../`-stripped lookup relative to the including file's directory.
pub fn process_includes(source: &str, base_dir: &Path) -> String {
    let include_re = Regex::new(r#"#include\s+["<]([^">]+)[">]"#).unwrap();
    let mut result = source.to_string();

    while let Some(caps) = include_re.captures(&result) {
        let whole = caps.get(0).unwrap();
        let include_path = caps.get(1).unwrap().as_str().to_string();
        let resolved = resolve_include(&include_path, base_dir);

        let replacement = match resolved.as_ref().and_then(|p| std::fs::read_to_string(p).ok()) {
            Some(contents) => {
                let include_dir = resolved
                    .as_ref()
                    .and_then(|p| p.parent())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| base_dir.to_path_buf());
                log::info!("Included shader file: {include_path}");
                process_includes(&contents, &include_dir)
            }
            None => {
                log::warn!("Include file not found: {include_path}");
                String::new()
            }
        };

        let span = whole.range();
        result.replace_range(span, &replacement);
    }

    result
}

fn resolve_include(include_path: &str, base_dir: &Path) -> Option<PathBuf> {
    let raw = Path::new(include_path);
    if raw.is_absolute() {
        return raw.exists().then(|| raw.to_path_buf());
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let via_base = base_dir.join(raw);
    if via_base.exists() {
        return Some(via_base);
    }

    let via_glsl_root = cwd.join("shaders").join("shaders_glsl").join(raw);
    if via_glsl_root.exists() {
        return Some(via_glsl_root);
    }

    let via_cwd = cwd.join(raw);
    if via_cwd.exists() {
        return Some(via_cwd);
    }

    let mut climbed = base_dir.to_path_buf();
    let mut rest = include_path;
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
        climbed.pop();
    }
    let via_climb = climbed.join(rest);
    via_climb.exists().then_some(via_climb)
}

/// Extracts `#pragma parameter NAME "DESC" DEFAULT MIN MAX STEP` lines,
/// blanking them out in place (so line numbers in later compile errors
/// still line up) and returning their metadata. Names prefixed
/// `bogus_` are RetroArch's convention for section headers and are
/// dropped entirely.
fn extract_parameters(source: &str) -> (String, Vec<(String, ParameterInfo)>) {
    // Only NAME and "DESCRIPTION" are required to recognize the directive;
    // the trailing DEFAULT/MIN/MAX/STEP numbers are read loosely so a
    // malformed or truncated directive (missing or unparsable fields)
    // still gets extracted, falls back to the documented defaults, and is
    // blanked out rather than surviving into the source handed to the GL
    // compiler.
    let re = Regex::new(r#"(?m)^.*#pragma\s+parameter\s+(\w+)\s+"([^"]*)"([^\n]*)$"#).unwrap();

    let mut parameters = Vec::new();
    let blanked = re.replace_all(source, |caps: &regex::Captures| {
        let name = &caps[1];
        if !name.starts_with("bogus_") {
            let mut numbers = caps[3].split_whitespace().map(|tok| tok.parse::<f32>().ok());
            let info = ParameterInfo {
                description: caps[2].to_string(),
                default: numbers.next().flatten().unwrap_or(0.0),
                min: numbers.next().flatten().unwrap_or(0.0),
                max: numbers.next().flatten().unwrap_or(1.0),
                step: numbers.next().flatten().unwrap_or(0.01),
            };
            parameters.push((name.to_string(), info));
        }
        " ".repeat(caps[0].len())
    });

    (blanked.into_owned(), parameters)
}

fn take_version_line(source: &str) -> (Option<String>, String) {
    let re = Regex::new(r"#version\s+\d+[^\n]*").unwrap();
    match re.find(source) {
        Some(m) => {
            let line = m.as_str().to_string();
            let mut rest = source.to_string();
            rest.replace_range(m.range(), "");
            (Some(line), rest)
        }
        None => (None, source.to_string()),
    }
}

fn strip_es_incompatible_extensions(source: &str) -> String {
    let arb_420pack = Regex::new(r"#extension\s+GL_ARB_shading_language_420pack\s*:?\s*\w*\s*\n?").unwrap();
    let other_arb = Regex::new(r"#extension\s+GL_ARB_[^\n]*\n?").unwrap();
    let step1 = arb_420pack.replace_all(source, "");
    other_arb.replace_all(&step1, "").into_owned()
}

/// Infers (or corrects) the declared type of the `OutputSize` uniform
/// from how the shader actually uses it, since stock RetroArch shaders
/// are frequently written assuming `vec2` while others need the
/// `vec3`/`vec4` overloads with the reciprocal packed in.
fn correct_output_size_type(source: &str) -> (String, OutputSizeType) {
    if !source.contains("OutputSize") {
        return (source.to_string(), OutputSizeType::default());
    }

    let vec4_define = Regex::new(r"#define\s+\w+\s+vec4\s*\(\s*OutputSize\s*,\s*[^)]*OutputSize").unwrap();
    let required_type = if vec4_define.is_match(source) {
        "vec2"
    } else {
        infer_output_size_type(source)
    };
    let output_size_type = match required_type {
        "vec3" => OutputSizeType::Vec3,
        "vec4" => OutputSizeType::Vec4,
        _ => OutputSizeType::Vec2,
    };

    let decl_re =
        Regex::new(r"uniform\s+(?:COMPAT_PRECISION\s+|PRECISION\s+)?(vec[234]|float|int|uint)\s+OutputSize")
            .unwrap();

    let text = match decl_re.captures(source) {
        None => {
            let decl = format!("uniform {required_type} OutputSize;\n");
            let version_re = Regex::new(r"#version\s+\d+[^\n]*").unwrap();
            if let Some(m) = version_re.find(source) {
                let mut out = source.to_string();
                out.insert_str(m.end(), &format!("\n{decl}"));
                out
            } else {
                format!("{decl}{source}")
            }
        }
        Some(caps) if caps.get(1).unwrap().as_str() != required_type => {
            let replace_re = Regex::new(
                r"uniform\s+((?:COMPAT_)?PRECISION\s+)?(vec[234]|float|int|uint)\s+OutputSize",
            )
            .unwrap();
            let precision_qualifier = replace_re
                .captures(source)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .unwrap_or("");
            let replacement = format!("uniform {precision_qualifier}{required_type} OutputSize");
            replace_re.replace_all(source, replacement.as_str()).into_owned()
        }
        Some(_) => source.to_string(),
    };

    (text, output_size_type)
}

fn infer_output_size_type(source: &str) -> &'static str {
    let vec3_patterns = [
        r"\bvec3\s+\w+\s*=\s*OutputSize\b",
        r"\bvec3\s*\(\s*OutputSize\s*\)",
        r"\bvec3\s+\w+\s*=\s*OutputSize\s*\.",
        r"\bvec3\s+\w+\s*=\s*vec3\s*\(\s*OutputSize",
    ];
    let vec4_patterns = [
        r"\bvec4\s+\w+\s*=\s*OutputSize\b",
        r"\bvec4\s*\(\s*OutputSize\s*\)",
        r"\bvec4\s+\w+\s*=\s*vec4\s*\(\s*OutputSize",
    ];

    let is_vec3 = vec3_patterns
        .iter()
        .any(|p| Regex::new(p).unwrap().is_match(source));
    let is_vec4 = vec4_patterns
        .iter()
        .any(|p| Regex::new(p).unwrap().is_match(source));

    if is_vec3 {
        return "vec3";
    }
    if is_vec4 {
        return "vec4";
    }

    // Fall back to counting nearby occurrences of vec3/vec4 around each
    // use of OutputSize.
    let (mut vec3_count, mut vec4_count) = (0, 0);
    let bytes = source.as_bytes();
    let mut pos = 0;
    while let Some(rel) = source[pos..].find("OutputSize") {
        let idx = pos + rel;
        let start = idx.saturating_sub(100);
        let end = (idx + 100).min(bytes.len());
        let context = &source[start..end];
        if context.contains("vec3") {
            vec3_count += 1;
        }
        if context.contains("vec4") {
            vec4_count += 1;
        }
        pos = idx + "OutputSize".len();
    }

    if vec3_count > vec4_count && vec3_count > 0 {
        "vec3"
    } else if vec4_count > vec3_count && vec4_count > 0 {
        "vec4"
    } else {
        "vec2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_pragma_parameters_and_blanks_them() {
        let source = "#pragma parameter GAIN \"Gain\" 1.0 0.0 2.0 0.05\nvoid main() {}";
        let (stripped, params) = extract_parameters(source);
        assert!(!stripped.contains("#pragma"));
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].0, "GAIN");
        assert_eq!(params[0].1.default, 1.0);
        assert_eq!(params[0].1.max, 2.0);
    }

    #[test]
    fn ignores_bogus_prefixed_parameters() {
        let source = "#pragma parameter bogus_header \"Section\" 0.0 0.0 1.0 1.0\n";
        let (_, params) = extract_parameters(source);
        assert!(params.is_empty());
    }

    #[test]
    fn truncated_pragma_still_extracts_with_fallback_defaults() {
        let source = "#pragma parameter GAIN \"Gain\" 1.0\nvoid main() {}";
        let (stripped, params) = extract_parameters(source);
        assert!(!stripped.contains("#pragma"));
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].0, "GAIN");
        assert_eq!(params[0].1.default, 1.0);
        assert_eq!(params[0].1.min, 0.0);
        assert_eq!(params[0].1.max, 1.0);
        assert_eq!(params[0].1.step, 0.01);
    }

    #[test]
    fn bare_pragma_with_no_numbers_falls_back_to_spec_defaults() {
        let source = "#pragma parameter SHARPNESS \"Sharpness\"\nvoid main() {}";
        let (stripped, params) = extract_parameters(source);
        assert!(!stripped.contains("#pragma"));
        assert_eq!(params[0].1.default, 0.0);
        assert_eq!(params[0].1.min, 0.0);
        assert_eq!(params[0].1.max, 1.0);
        assert_eq!(params[0].1.step, 0.01);
    }

    #[test]
    fn injects_missing_output_size_uniform() {
        let source = "#version 330\nvoid main() { vec2 o = OutputSize; }";
        let (corrected, ty) = correct_output_size_type(source);
        assert!(corrected.contains("uniform vec2 OutputSize;"));
        assert_eq!(ty, OutputSizeType::Vec2);
    }

    #[test]
    fn widens_output_size_to_vec3_when_needed() {
        let source = "uniform vec2 OutputSize;\nvoid main() { vec3 o = OutputSize; }";
        let (corrected, ty) = correct_output_size_type(source);
        assert!(corrected.contains("uniform vec3 OutputSize"));
        assert_eq!(ty, OutputSizeType::Vec3);
    }

    #[test]
    fn defaults_to_vec2_when_no_vec3_or_vec4_sits_near_any_use() {
        // `vec3` appears far from every `OutputSize` use (outside the
        // ±100-char window) and the nearby-pattern/count heuristics find
        // nothing either, so the default must win rather than the mere
        // presence of "vec3" anywhere in the source.
        let padding = "a".repeat(200);
        let source = format!(
            "uniform vec2 OutputSize;\nvec3 unrelated;\n{padding}\nvoid main() {{ gl_FragColor = texture2D(Texture, OutputSize.xy); }}"
        );
        assert_eq!(infer_output_size_type(&source), "vec2");
    }

    #[test]
    fn macro_packing_forces_vec2_even_with_vec3_declaration() {
        let source = "uniform vec3 OutputSize;\n#define OS vec4(OutputSize, 1.0 / OutputSize)\nvoid main() {}";
        let (corrected, ty) = correct_output_size_type(source);
        assert!(corrected.contains("uniform vec2 OutputSize"));
        assert_eq!(ty, OutputSizeType::Vec2);
    }

    #[test]
    fn splits_pragma_stage_blocks() {
        let source = "common line\n#pragma stage vertex\nvertex only\n#pragma stage fragment\nfragment only\n#pragma stage end\n";
        let (vertex, fragment) = split_stages(source, source);
        assert!(vertex.contains("common line"));
        assert!(vertex.contains("vertex only"));
        assert!(!vertex.contains("fragment only"));
        assert!(fragment.contains("common line"));
        assert!(fragment.contains("fragment only"));
        assert!(!fragment.contains("vertex only"));
    }

    #[test]
    fn resolves_nested_includes_recursively() {
        let dir = std::env::temp_dir().join(format!(
            "retrocapture-preprocessor-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.inc"), "float a() { return 1.0; }\n").unwrap();
        std::fs::write(
            dir.join("main.glsl"),
            "#include \"a.inc\"\nvoid main() {}\n",
        )
        .unwrap();

        let source = std::fs::read_to_string(dir.join("main.glsl")).unwrap();
        let result = process_includes(&source, &dir);
        assert!(result.contains("float a()"));
        assert!(!result.contains("#include"));
    }
}
