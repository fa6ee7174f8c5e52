// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-shader-basename compatibility patches.
//!
//! A handful of stock RetroArch shaders assume texture coordinates that
//! line up 1:1 with the pass's output, which breaks once a pass scales
//! (`interlacing.glsl`) or reads `gl_FragCoord` directly
//! (`box-center.glsl`).

use crate::preset::{ScaleType, ShaderPass};

/// Rewrites `vertex_code`/`fragment_code` in place to compensate for the
/// named shader's known texture-coordinate assumptions.
pub fn apply(
    vertex_code: &mut String,
    fragment_code: &mut String,
    shader_path: &str,
    pass_index: usize,
    preset_passes: &[ShaderPass],
) {
    let scales_height = preset_passes.get(pass_index).is_some_and(|pass| {
        matches!(pass.scale_type_y, ScaleType::Viewport | ScaleType::Absolute)
            || (pass.scale_type_y == ScaleType::Source && pass.scale_y != 1.0)
    });

    let needs_tex_coord_adjustment = scales_height && shader_path.contains("interlacing.glsl");

    if needs_tex_coord_adjustment {
        let pattern = "TEX0.xy = TexCoord.xy;";
        if let Some(pos) = vertex_code.find(pattern) {
            let insert_at = pos + pattern.len();
            vertex_code.insert_str(
                insert_at,
                "\n   // Replicate each input scanline twice to fill the doubled output height\n   TEX0.y = (floor(TEX0.y * OutputSize.y / 2.0) + 0.5) / InputSize.y;\n",
            );
        }
    }

    if shader_path.contains("box-center.glsl") {
        let pattern = "bordertest = gl_FragCoord.xy;";
        if let Some(pos) = fragment_code.find(pattern) {
            let insert_at = pos + pattern.len();
            fragment_code.insert_str(
                insert_at,
                "\n   bordertest = bordertest / OutputSize.xy;\n",
            );
        }
    }

    if needs_tex_coord_adjustment && shader_path.contains("interlacing.glsl") {
        const DOUBLED: &str = "y = 2.000001 * TextureSize.y * vTexCoord.y";
        const SINGLE: &str = "y = TextureSize.y * vTexCoord.y";
        if fragment_code.contains(DOUBLED) {
            *fragment_code = fragment_code.replace(
                DOUBLED,
                "y = 2.000001 * TextureSize.y * (gl_FragCoord.y / OutputSize.y)",
            );
        } else if fragment_code.contains(SINGLE) {
            *fragment_code = fragment_code.replace(
                SINGLE,
                "y = TextureSize.y * (gl_FragCoord.y / OutputSize.y)",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scaling_pass() -> ShaderPass {
        ShaderPass {
            scale_type_y: ScaleType::Source,
            scale_y: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn adjusts_interlacing_tex_coord_when_pass_scales() {
        let mut vertex = "void main() {\n   TEX0.xy = TexCoord.xy;\n}".to_string();
        let mut fragment = String::new();
        apply(
            &mut vertex,
            &mut fragment,
            "shaders/misc/interlacing.glsl",
            0,
            &[scaling_pass()],
        );
        assert!(vertex.contains("TEX0.y = (floor"));
    }

    #[test]
    fn leaves_unrelated_shaders_untouched() {
        let mut vertex = "void main() {\n   TEX0.xy = TexCoord.xy;\n}".to_string();
        let original = vertex.clone();
        let mut fragment = String::new();
        apply(&mut vertex, &mut fragment, "shaders/blur.glsl", 0, &[scaling_pass()]);
        assert_eq!(vertex, original);
    }

    #[test]
    fn normalizes_box_center_frag_coord() {
        let mut vertex = String::new();
        let mut fragment = "void main() {\n   bordertest = gl_FragCoord.xy;\n}".to_string();
        apply(&mut vertex, &mut fragment, "shaders/box-center.glsl", 0, &[]);
        assert!(fragment.contains("bordertest = bordertest / OutputSize.xy;"));
    }
}
