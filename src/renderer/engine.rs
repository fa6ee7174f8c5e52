// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! The RetroArch multi-pass shader executor.
//!
//! Owns the currently loaded [`Preset`], a parallel vector of
//! [`ShaderPassData`], the shared fullscreen quad, the LUT reference
//! textures, the frame-history ring and the monotonic `FrameCount`/`Time`
//! counters. `load_preset` and `apply_shader` are the two operations the
//! rest of the pipeline calls every frame.

use std::collections::HashMap;

use gl::types::*;

use crate::geometry::Size;
use crate::preset::{self, Preset};
use crate::renderer::framebuffer::FramebufferFormat;
use crate::renderer::history::FrameHistory;
use crate::renderer::pass::{self, ShaderPassData};
use crate::renderer::quad::Quad;
use crate::renderer::texture::{self, GpuTexture, TextureError};
use crate::shader::ParameterInfo;

/// A named GL capability queried once at engine construction. Dynamic
/// `#version` selection and `GL_ARB_shading_language_420pack` gating both
/// need the GL/GLSL version strings; `GL_CLAMP_TO_BORDER` support gates
/// the wrap-mode fallback applied per pass.
#[derive(Clone, Copy, Debug)]
pub struct GlCapabilities {
    pub gl_version: &'static str,
    pub glsl_version: Option<&'static str>,
    pub clamp_to_border_supported: bool,
}

/// Names tried in order for a pass's primary input sampler.
const INPUT_SAMPLER_NAMES: &[&str] = &["Texture", "Source", "Input", "s_p", "tex", "image"];

/// Legacy default values a handful of stock shaders reference without
/// declaring their own `#pragma parameter`.
const LEGACY_DEFAULTS: &[(&str, f32)] = &[
    ("BLURSCALEX", 0.30),
    ("LOWLUMSCAN", 6.0),
    ("HILUMSCAN", 8.0),
    ("BRIGHTBOOST", 1.25),
    ("MASK_DARK", 0.25),
    ("MASK_FADE", 0.8),
];

/// Every ~60 frames without a runnable pass, `apply_shader` logs once
/// instead of spamming the console every frame.
const RUNNABLE_WARNING_INTERVAL: u64 = 60;

/// Runtime RetroArch shader engine. Exclusively owns every GL
/// object it creates; nothing here is reference counted.
pub struct ShaderEngine {
    capabilities: GlCapabilities,
    quad: Quad,
    preset: Preset,
    passes: Vec<ShaderPassData>,
    reference_textures: HashMap<String, GpuTexture>,
    history: FrameHistory,
    frame_count: u64,
    time: f32,
    viewport: Size,
    /// Per-engine parameter overrides, keyed by name.
    overrides: HashMap<String, f32>,
    active: bool,
    unrunnable_warnings: u64,
}

impl ShaderEngine {
    pub fn new(capabilities: GlCapabilities) -> Self {
        Self {
            capabilities,
            quad: Quad::new(),
            preset: Preset::default(),
            passes: Vec::new(),
            reference_textures: HashMap::new(),
            history: FrameHistory::new(),
            frame_count: 0,
            time: 0.0,
            viewport: Size::new(1, 1),
            overrides: HashMap::new(),
            active: false,
            unrunnable_warnings: 0,
        }
    }

    /// The host's display surface size, tracked for `viewport`-typed
    /// scales and the last-pass fill-to-window rule.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
    }

    pub fn is_shader_active(&self) -> bool {
        self.active
    }

    /// Loads a `.glslp` preset.
    ///
    /// Unloads whatever preset is currently active first (freeing pass GL
    /// objects, reference textures and history), then parses and compiles
    /// the new one. Per-parameter overrides survive unload since they are
    /// not preset-scoped state.
    pub fn load_preset(&mut self, path: &std::path::Path) -> Result<(), preset::PresetError> {
        self.unload();

        let preset = preset::parser::load(path)?;

        let mut reference_textures = HashMap::new();
        for tex in &preset.textures {
            match texture::load_lut(
                &tex.path,
                tex.wrap_mode,
                tex.mipmap,
                tex.linear,
                self.capabilities.clamp_to_border_supported,
            ) {
                Ok(gpu_tex) => {
                    reference_textures.insert(tex.name.clone(), gpu_tex);
                }
                Err(TextureError::Image(path, err)) => {
                    log::error!("Failed to load LUT texture {path:?}: {err}");
                    return Err(preset::PresetError::NoPasses);
                }
            }
        }

        reset_gl_state();

        let passes = preset
            .passes
            .iter()
            .enumerate()
            .map(|(i, pass)| {
                pass::compile(
                    pass,
                    i,
                    &preset.passes,
                    self.capabilities.gl_version,
                    self.capabilities.glsl_version,
                )
            })
            .collect();

        self.preset = preset;
        self.passes = passes;
        self.reference_textures = reference_textures;
        self.active = true;
        self.unrunnable_warnings = 0;

        log::info!(
            "Shader preset active: {} passes ({} compiled)",
            self.passes.len(),
            self.passes.iter().filter(|p| p.is_runnable()).count()
        );

        Ok(())
    }

    fn unload(&mut self) {
        self.passes.clear();
        self.reference_textures.clear();
        self.history.clear();
        self.preset = Preset::default();
        self.active = false;
    }

    /// Runs the full pass chain. Returns the final
    /// texture, or `input_texture` unchanged if no pass is runnable.
    pub fn apply_shader(
        &mut self,
        input_texture: GLuint,
        source_size: Size,
    ) -> GLuint {
        if !self.active || !self.passes.iter().any(ShaderPassData::is_runnable) {
            if self.unrunnable_warnings % RUNNABLE_WARNING_INTERVAL == 0 {
                log::warn!("No runnable shader pass; returning input texture unchanged (logged every 60 frames)");
            }
            self.unrunnable_warnings += 1;
            reset_gl_state();
            return input_texture;
        }

        self.frame_count += 1;
        self.time += 1.0 / 60.0;

        let num_passes = self.passes.len();
        let mut current_texture = input_texture;
        let mut current_size = source_size;
        let mut output_sizes = vec![Size::new(0, 0); num_passes];
        let mut input_sizes = vec![Size::new(0, 0); num_passes];

        for i in 0..num_passes {
            let is_last = i == num_passes - 1;
            let pass_def = self.preset.passes[i].clone();
            input_sizes[i] = current_size;

            let output_size = pass::compute_output_size(&pass_def, is_last, current_size, self.viewport);
            output_sizes[i] = output_size;

            let format = FramebufferFormat::from_pass_flags(
                pass_def.float_framebuffer,
                pass_def.srgb_framebuffer,
            );

            if !self.passes[i].is_runnable() {
                // Non-runnable passes are skipped but still occupy their
                // slot in the chain: downstream passes see the last valid
                // texture/size, matching a "transparent" no-op pass.
                continue;
            }

            self.passes[i].ensure_framebuffer(output_size, format);
            let framebuffer = self.passes[i].framebuffer().expect("ensured above");
            framebuffer.bind();

            unsafe {
                gl::Viewport(0, 0, output_size.width() as GLsizei, output_size.height() as GLsizei);
                gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
                gl::ClearColor(0.0, 0.0, 0.0, 0.0);
                gl::Clear(gl::COLOR_BUFFER_BIT);
                gl::Disable(gl::BLEND);
                gl::Disable(gl::DEPTH_TEST);
                gl::Disable(gl::CULL_FACE);
            }

            let program = self.passes[i].program().expect("is_runnable implies Some");
            program.bind();

            unsafe {
                gl::ActiveTexture(gl::TEXTURE0);
                gl::BindTexture(gl::TEXTURE_2D, current_texture);

                let filter = if pass_def.filter_linear { gl::LINEAR } else { gl::NEAREST } as GLint;
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter);
                let wrap = pass_def
                    .wrap_mode
                    .to_gl(self.capabilities.clamp_to_border_supported) as GLint;
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap);
                if pass_def.mipmap_input {
                    gl::GenerateMipmap(gl::TEXTURE_2D);
                }
            }

            let mut next_unit = 1;
            bind_input_sampler(program);

            for j in 0..i {
                next_unit = bind_previous_pass(program, j, i, &self.passes, next_unit);
            }

            if i == 0 {
                next_unit = bind_history(program, &self.history, next_unit);
            }

            next_unit = self.bind_reference_textures(program, next_unit);
            let _ = next_unit;

            self.set_pass_uniforms(
                program,
                i,
                &pass_def,
                input_sizes[i],
                output_sizes[i],
                source_size,
                &output_sizes,
                &input_sizes,
            );

            self.quad.draw();

            current_texture = framebuffer.texture();
            current_size = output_size;
        }

        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        }

        self.update_history(current_texture, current_size);

        // The viewport left active is only a safe placeholder; the
        // presenter re-sets it before its own blit.
        unsafe {
            gl::Viewport(0, 0, self.viewport.width().max(1) as GLsizei, self.viewport.height().max(1) as GLsizei);
        }

        self.unrunnable_warnings = 0;
        current_texture
    }

    fn bind_reference_textures(
        &self,
        program: &crate::renderer::program::Program,
        mut next_unit: u32,
    ) -> u32 {
        for (name, tex) in &self.reference_textures {
            if let Ok(loc) = program.uniform_location(name) {
                if loc >= 0 {
                    let unit = gl::TEXTURE0 + next_unit;
                    tex.bind(unit);
                    unsafe { gl::Uniform1i(loc, next_unit as GLint) };
                    next_unit += 1;
                }
            }
        }
        next_unit
    }

    #[allow(clippy::too_many_arguments)]
    fn set_pass_uniforms(
        &self,
        program: &crate::renderer::program::Program,
        pass_index: usize,
        pass_def: &preset::ShaderPass,
        input_size: Size,
        output_size: Size,
        source_size: Size,
        output_sizes: &[Size],
        input_sizes: &[Size],
    ) {
        set_size4(program, "SourceSize", input_size);
        set_size4(program, "OriginalSize", source_size);
        set_output_size(program, output_size, self.passes[pass_index].output_size_type);
        set_size2(program, "TextureSize", input_size);
        set_size2(program, "InputSize", input_size);

        for j in 0..pass_index {
            set_size4(program, &format!("PassOutputSize{j}"), output_sizes[j]);
            set_size4(program, &format!("PassInputSize{j}"), input_sizes[j]);
        }

        set_f1(program, "PassScale", (pass_def.scale_x + pass_def.scale_y) / 2.0);
        set_f1(program, "PassScaleX", pass_def.scale_x);
        set_f1(program, "PassScaleY", pass_def.scale_y);
        set_f1(program, "PassFilter", if pass_def.filter_linear { 1.0 } else { 0.0 });

        let frame_count_value = if pass_def.frame_count_mod > 0 {
            (self.frame_count % pass_def.frame_count_mod as u64) as f32
        } else {
            self.frame_count as f32
        };
        set_frame_count(program, frame_count_value, self.frame_count);

        set_mat4_identity(program, "MVPMatrix");
        set_i1(program, "FrameDirection", 1);
        set_f1(program, "FRAMEINDEX", self.frame_count as f32);
        set_f1(program, "TIME", self.time);

        for k in 0..=7 {
            set_size4(program, &format!("OriginalHistorySize{k}"), input_size);
        }

        for (name, info) in &self.passes[pass_index].parameters {
            let value = self.effective_parameter_value(name, info);
            set_f1(program, name, value);
        }

        for (name, default) in LEGACY_DEFAULTS {
            set_f1(program, name, *default);
        }
    }

    fn effective_parameter_value(&self, name: &str, info: &ParameterInfo) -> f32 {
        if let Some(v) = self.overrides.get(name) {
            return *v;
        }
        if let Some(v) = self.preset.parameter(name) {
            return v;
        }
        info.default
    }

    /// Renders the final pass output into a history slot. Uses pass 0's
    /// program as the copy shader, which
    /// is always the identity-ish passthrough RetroArch expects for a
    /// chain's first stage.
    fn update_history(&mut self, final_texture: GLuint, final_size: Size) {
        let Some(program) = self.passes.first().and_then(ShaderPassData::program) else {
            return;
        };
        self.history.push(final_texture, final_size, program, &self.quad);
    }

    /// Union of every pass's extracted parameter table, first occurrence
    /// wins, with current effective values.
    pub fn shader_parameters(&self) -> Vec<(String, ParameterInfo, f32)> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for pass in &self.passes {
            for (name, info) in &pass.parameters {
                if seen.insert(name.clone()) {
                    let value = self.effective_parameter_value(name, info);
                    result.push((name.clone(), info.clone(), value));
                }
            }
        }
        result
    }

    /// Sets a per-engine override, clamped to the parameter's `[min,max]`.
    pub fn set_shader_parameter(&mut self, name: &str, value: f32) {
        let bounds = self
            .passes
            .iter()
            .flat_map(|p| p.parameters.iter())
            .find(|(n, _)| n == name)
            .map(|(_, info)| (info.min, info.max));

        let clamped = match bounds {
            Some((min, max)) => value.clamp(min.min(max), min.max(max)),
            None => value,
        };
        self.overrides.insert(name.to_string(), clamped);
    }
}

fn reset_gl_state() {
    unsafe {
        gl::UseProgram(0);
        gl::ActiveTexture(gl::TEXTURE0);
        gl::BindTexture(gl::TEXTURE_2D, 0);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
    }
}

fn bind_input_sampler(program: &crate::renderer::program::Program) {
    for name in INPUT_SAMPLER_NAMES {
        if let Ok(loc) = program.uniform_location(name) {
            if loc >= 0 {
                unsafe { gl::Uniform1i(loc, 0) };
                return;
            }
        }
    }
}

/// Binds prior pass `j`'s output to the next free texture unit under
/// whichever alias name `program` (belonging to pass `i`) declares.
fn bind_previous_pass(
    program: &crate::renderer::program::Program,
    j: usize,
    i: usize,
    passes: &[ShaderPassData],
    next_unit: u32,
) -> u32 {
    let Some(texture) = passes[j].framebuffer().map(|fb| fb.texture()) else {
        return next_unit;
    };

    let distance = i - j;
    let candidates = [
        format!("PassPrev{distance}Texture"),
        format!("Prev{distance}Texture"),
        "PrevTexture".to_string(),
    ];

    for name in &candidates {
        if let Ok(loc) = program.uniform_location(name) {
            if loc >= 0 {
                let unit = gl::TEXTURE0 + next_unit;
                unsafe {
                    gl::ActiveTexture(unit);
                    gl::BindTexture(gl::TEXTURE_2D, texture);
                    gl::Uniform1i(loc, next_unit as GLint);
                }
                return next_unit + 1;
            }
        }
    }
    next_unit
}

/// Binds frame-history slots for pass 0 only, under both the
/// `PrevNTexture` and `PassPrevNTexture` aliases. Leaves a uniform unset
/// (never aliasing the current input) when the ring hasn't filled that
/// far yet — this is what keeps motion-blur from darkening on an empty
/// history.
fn bind_history(
    program: &crate::renderer::program::Program,
    history: &FrameHistory,
    mut next_unit: u32,
) -> u32 {
    for k in 0..crate::renderer::history::MAX_HISTORY {
        let Some(texture) = history.texture(k) else {
            continue;
        };
        let names = if k == 0 {
            vec!["PrevTexture".to_string(), "PassPrev0Texture".to_string()]
        } else {
            vec![format!("Prev{k}Texture"), format!("PassPrev{k}Texture")]
        };
        let mut bound = false;
        for name in &names {
            if let Ok(loc) = program.uniform_location(name) {
                if loc >= 0 {
                    if !bound {
                        let unit = gl::TEXTURE0 + next_unit;
                        unsafe {
                            gl::ActiveTexture(unit);
                            gl::BindTexture(gl::TEXTURE_2D, texture);
                        }
                        bound = true;
                    }
                    unsafe { gl::Uniform1i(loc, next_unit as GLint) };
                }
            }
        }
        if bound {
            next_unit += 1;
        }
    }
    next_unit
}

fn set_size4(program: &crate::renderer::program::Program, name: &str, size: Size) {
    if let Ok(loc) = program.uniform_location(name) {
        if loc >= 0 {
            let (w, h) = (size.width().max(1) as f32, size.height().max(1) as f32);
            unsafe { gl::Uniform4f(loc, w, h, 1.0 / w, 1.0 / h) };
        }
    }
}

fn set_size2(program: &crate::renderer::program::Program, name: &str, size: Size) {
    if let Ok(loc) = program.uniform_location(name) {
        if loc >= 0 {
            unsafe { gl::Uniform2f(loc, size.width() as f32, size.height() as f32) };
        }
    }
}

fn set_output_size(
    program: &crate::renderer::program::Program,
    size: Size,
    ty: crate::shader::OutputSizeType,
) {
    if let Ok(loc) = program.uniform_location("OutputSize") {
        if loc < 0 {
            return;
        }
        let (w, h) = (size.width().max(1) as f32, size.height().max(1) as f32);
        unsafe {
            match ty {
                crate::shader::OutputSizeType::Vec2 => gl::Uniform2f(loc, w, h),
                crate::shader::OutputSizeType::Vec3 => gl::Uniform3f(loc, w, h, 1.0 / w),
                crate::shader::OutputSizeType::Vec4 => gl::Uniform4f(loc, w, h, 1.0 / w, 1.0 / h),
            }
        }
    }
}

fn set_f1(program: &crate::renderer::program::Program, name: &str, value: f32) {
    if let Ok(loc) = program.uniform_location(name) {
        if loc >= 0 {
            unsafe { gl::Uniform1f(loc, value) };
        }
    }
}

fn set_i1(program: &crate::renderer::program::Program, name: &str, value: i32) {
    if let Ok(loc) = program.uniform_location(name) {
        if loc >= 0 {
            unsafe { gl::Uniform1i(loc, value) };
        }
    }
}

/// `FrameCount` may be declared `int` or `float`; RetroArch shaders use
/// both. `glGetActiveUniform` tells us which was actually linked.
fn set_frame_count(program: &crate::renderer::program::Program, value: f32, raw_count: u64) {
    let Ok(loc) = program.uniform_location("FrameCount") else {
        return;
    };
    if loc < 0 {
        return;
    }
    if uniform_is_integer(program, "FrameCount") {
        unsafe { gl::Uniform1i(loc, raw_count as GLint) };
    } else {
        unsafe { gl::Uniform1f(loc, value) };
    }
}

fn uniform_is_integer(program: &crate::renderer::program::Program, name: &str) -> bool {
    // Looked up by linear scan of active uniforms; programs in this
    // engine have at most a few dozen uniforms so this isn't worth a
    // cache keyed on top of the existing uniform-location cache.
    matches!(program.active_uniform_type(name), Some(gl::INT))
}

fn set_mat4_identity(program: &crate::renderer::program::Program, name: &str) {
    if let Ok(loc) = program.uniform_location(name) {
        if loc >= 0 {
            #[rustfmt::skip]
            let identity: [f32; 16] = [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ];
            unsafe { gl::UniformMatrix4fv(loc, 1, gl::FALSE, identity.as_ptr()) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_defaults_match_spec_table() {
        let table: HashMap<_, _> = LEGACY_DEFAULTS.iter().copied().collect();
        assert_eq!(table["BLURSCALEX"], 0.30);
        assert_eq!(table["BRIGHTBOOST"], 1.25);
        assert_eq!(table["MASK_FADE"], 0.8);
    }

    #[test]
    fn input_sampler_priority_matches_spec_order() {
        assert_eq!(INPUT_SAMPLER_NAMES, &["Texture", "Source", "Input", "s_p", "tex", "image"]);
    }
}
