// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Runtime companion to a [`crate::preset::ShaderPass`] (`ShaderPassData`):
//! compiled GL program, framebuffer, and the extracted `#pragma parameter`
//! table.
//!
//! The parameter-metadata / GPU-resource split is a first-class
//! invariant, not a side effect: a
//! pass whose shader fails to compile keeps `parameters` populated so
//! the host UI can still list and edit its controls, while `program`
//! and `framebuffer` stay `None` and [`ShaderPassData::is_runnable`]
//! reports false.

use std::path::Path;

use regex::Regex;

use crate::geometry::Size;
use crate::preset::ShaderPass;
use crate::renderer::framebuffer::{Framebuffer, FramebufferFormat};
use crate::renderer::program::Program;
use crate::renderer::shader::{Shader, ShaderError};
use crate::shader::{preprocess, OutputSizeType, ParameterInfo, PassContext};

/// GPU-side state and metadata for one render pass.
pub struct ShaderPassData {
    /// Always present, even when compilation failed.
    pub parameters: Vec<(String, ParameterInfo)>,
    pub output_size_type: OutputSizeType,
    pub alias: Option<String>,
    program: Option<Program>,
    framebuffer: Option<Framebuffer>,
}

impl ShaderPassData {
    pub fn is_runnable(&self) -> bool {
        self.program.is_some()
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.framebuffer.as_ref()
    }

    /// (Re)creates the pass's framebuffer if it is missing or its
    /// dimensions/format diverge from `size`/`format`.
    pub fn ensure_framebuffer(&mut self, size: Size, format: FramebufferFormat) {
        let needs_new = match &self.framebuffer {
            Some(fb) => fb.needs_recreate(size, format),
            None => true,
        };
        if needs_new {
            self.framebuffer = Some(Framebuffer::new(size, format));
        }
    }
}

/// Compiles `pass`'s shader. On a fragment
/// compile error that matches the known "vec4 cannot be assigned to
/// vec3" family, attempts the automatic vec3→vec4 fix once and
/// retries; if that also fails, returns a non-runnable
/// [`ShaderPassData`] with the parameter table from the *first*
/// preprocessing pass (the fix only rewrites declarations, never
/// parameter pragmas, so both attempts yield the same table).
pub fn compile(
    pass: &ShaderPass,
    pass_index: usize,
    preset_passes: &[ShaderPass],
    gl_version: &str,
    glsl_version: Option<&str>,
) -> ShaderPassData {
    let source = match std::fs::read_to_string(&pass.shader_path) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to read shader {:?}: {e}", pass.shader_path);
            return ShaderPassData {
                parameters: Vec::new(),
                output_size_type: OutputSizeType::default(),
                alias: pass.alias.clone(),
                program: None,
                framebuffer: None,
            };
        }
    };

    let ctx = PassContext {
        pass_index,
        preset_passes,
    };

    let preprocessed = match preprocess(&source, &pass.shader_path, gl_version, glsl_version, &ctx)
    {
        Ok(p) => p,
        Err(e) => {
            log::error!("Preprocessing failed for {:?}: {e}", pass.shader_path);
            return ShaderPassData {
                parameters: Vec::new(),
                output_size_type: OutputSizeType::default(),
                alias: pass.alias.clone(),
                program: None,
                framebuffer: None,
            };
        }
    };

    let program = match try_link(&preprocessed.vertex_source, &preprocessed.fragment_source) {
        Ok(program) => Some(program),
        Err(first_err) => {
            if is_vec3_vec4_mismatch(&first_err) {
                log::warn!(
                    "Pass {pass_index} ({:?}): applying automatic vec3->vec4 fix after: {first_err}",
                    pass.shader_path
                );
                let fixed_fragment = apply_vec3_to_vec4_fix(&preprocessed.fragment_source);
                match try_link(&preprocessed.vertex_source, &fixed_fragment) {
                    Ok(program) => Some(program),
                    Err(second_err) => {
                        log::error!(
                            "Pass {pass_index} ({:?}) failed to compile after vec3->vec4 fix: {second_err}",
                            pass.shader_path
                        );
                        None
                    }
                }
            } else {
                log::error!(
                    "Pass {pass_index} ({:?}) failed to compile: {first_err}",
                    pass.shader_path
                );
                None
            }
        }
    };

    ShaderPassData {
        parameters: preprocessed.parameters,
        output_size_type: preprocessed.output_size_type,
        alias: pass.alias.clone(),
        program,
        framebuffer: None,
    }
}

fn try_link(vertex_source: &str, fragment_source: &str) -> Result<Program, ShaderError> {
    let vertex = Shader::new(vertex_source, gl::VERTEX_SHADER)?;
    let fragment = Shader::new(fragment_source, gl::FRAGMENT_SHADER)?;
    Program::new(&[vertex, fragment])
}

/// Recognizes the textual forms RetroArch/driver compilers use for a
/// `vec3`-declared variable fed a `vec4`-returning texture lookup.
fn is_vec3_vec4_mismatch(err: &ShaderError) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("cannot convert from") && msg.contains("vec4") && msg.contains("vec3")
        || msg.contains("cannot be assigned to")
        || (msg.contains("vec3") && msg.contains("vec4") && msg.contains("assign"))
}

/// Widens `vec3 <id> = COMPAT_TEXTURE(...)` (or `texture`/`texture2D`)
/// declarations to `vec4`, then rewrites any `vec4(<id>, <float>)`
/// construction that depended on the narrowed type to `vec4(<id>.rgb,
/// <float>)` so it keeps compiling against the widened variable.
fn apply_vec3_to_vec4_fix(fragment_source: &str) -> String {
    let decl_re = Regex::new(
        r"vec3\s+(\w+)\s*=\s*(COMPAT_TEXTURE|texture2D|texture)\s*\(",
    )
    .unwrap();

    let mut widened_names = Vec::new();
    let fixed = decl_re.replace_all(fragment_source, |caps: &regex::Captures| {
        widened_names.push(caps[1].to_string());
        format!("vec4 {} = {}(", &caps[1], &caps[2])
    });

    let mut result = fixed.into_owned();
    for name in &widened_names {
        let ctor_re = Regex::new(&format!(r"vec4\s*\(\s*{name}\s*,")).unwrap();
        result = ctor_re
            .replace_all(&result, format!("vec4({name}.rgb,").as_str())
            .into_owned();
    }
    result
}

/// Derives a pass's output dimensions from its scale rule. The final
/// pass is promoted from an effective `source`/1.0 to `viewport`/1.0 so
/// it always fills the presentation surface.
pub fn compute_output_size(
    pass: &ShaderPass,
    is_last_pass: bool,
    input_size: Size,
    viewport_size: Size,
) -> Size {
    use crate::preset::ScaleType;

    let (scale_type_x, scale_type_y) = if is_last_pass
        && matches!(pass.scale_type_x, ScaleType::Source)
        && pass.scale_x == 1.0
        && matches!(pass.scale_type_y, ScaleType::Source)
        && pass.scale_y == 1.0
    {
        (ScaleType::Viewport, ScaleType::Viewport)
    } else {
        (pass.scale_type_x, pass.scale_type_y)
    };

    let width = dimension(scale_type_x, pass.scale_x, input_size.width(), viewport_size.width());
    let height = dimension(
        scale_type_y,
        pass.scale_y,
        input_size.height(),
        viewport_size.height(),
    );

    Size::new(width.max(1), height.max(1))
}

fn dimension(scale_type: crate::preset::ScaleType, scale: f32, source: u32, viewport: u32) -> u32 {
    use crate::preset::ScaleType;
    match scale_type {
        ScaleType::Source => (source as f32 * scale).round() as u32,
        ScaleType::Viewport => (viewport as f32 * scale).round() as u32,
        ScaleType::Absolute => scale.round() as u32,
    }
}

pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::ScaleType;
    use pretty_assertions::assert_eq;

    #[test]
    fn two_pass_scaling_matches_s2() {
        let pass0 = ShaderPass {
            scale_type_x: ScaleType::Source,
            scale_x: 2.0,
            scale_type_y: ScaleType::Source,
            scale_y: 2.0,
            ..Default::default()
        };
        let pass1 = ShaderPass::default();

        let input = Size::new(320, 240);
        let viewport = Size::new(1280, 720);

        let out0 = compute_output_size(&pass0, false, input, viewport);
        assert_eq!((out0.width(), out0.height()), (640, 480));

        let out1 = compute_output_size(&pass1, true, out0, viewport);
        assert_eq!((out1.width(), out1.height()), (1280, 720));
    }

    #[test]
    fn vec3_to_vec4_fix_rewrites_declaration_and_constructor() {
        let source = "vec3 col = COMPAT_TEXTURE(Source, tex);\nFragColor = vec4(col, 1.0);";
        let fixed = apply_vec3_to_vec4_fix(source);
        assert!(fixed.contains("vec4 col = COMPAT_TEXTURE("));
        assert!(fixed.contains("vec4(col.rgb,"));
    }
}
