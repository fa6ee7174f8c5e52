// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! RetroArch `.glslp` preset model.
//!
//! A preset is an ordered list of [`ShaderPass`] plus LUT samplers
//! ([`ReferenceTexture`]) and a global parameter map. Loading and
//! round-tripping presets lives in [`parser`]; the runtime GPU-side
//! companion ([`crate::shader::pass::ShaderPassData`]) is built from
//! these once a pass compiles successfully.

pub mod error;
pub mod parser;

use std::path::PathBuf;

pub use error::PresetError;

/// How texture-coordinates outside `[0,1]` are handled for a pass's
/// input sampler, or for a LUT sampler.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
    ClampToBorder,
}

impl WrapMode {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "repeat" => Self::Repeat,
            "mirrored_repeat" => Self::MirroredRepeat,
            "clamp_to_border" => Self::ClampToBorder,
            _ => Self::ClampToEdge,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClampToEdge => "clamp_to_edge",
            Self::Repeat => "repeat",
            Self::MirroredRepeat => "mirrored_repeat",
            Self::ClampToBorder => "clamp_to_border",
        }
    }

    /// GL enum to use, falling back to clamp-to-edge when the driver
    /// lacks `GL_CLAMP_TO_BORDER`.
    pub fn to_gl(self, border_supported: bool) -> gl::types::GLenum {
        match self {
            Self::ClampToEdge => gl::CLAMP_TO_EDGE,
            Self::Repeat => gl::REPEAT,
            Self::MirroredRepeat => gl::MIRRORED_REPEAT,
            Self::ClampToBorder if border_supported => gl::CLAMP_TO_BORDER,
            Self::ClampToBorder => gl::CLAMP_TO_EDGE,
        }
    }
}

/// How a pass's output dimensions are derived from its scale factor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScaleType {
    #[default]
    Source,
    Viewport,
    Absolute,
}

impl ScaleType {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "viewport" => Self::Viewport,
            "absolute" => Self::Absolute,
            _ => Self::Source,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Viewport => "viewport",
            Self::Absolute => "absolute",
        }
    }
}

/// One render pass as declared by the preset (`shader<i>` and friends).
#[derive(Clone, Debug)]
pub struct ShaderPass {
    pub shader_path: PathBuf,
    pub filter_linear: bool,
    pub wrap_mode: WrapMode,
    pub mipmap_input: bool,
    pub alias: Option<String>,
    pub float_framebuffer: bool,
    pub srgb_framebuffer: bool,
    pub scale_type_x: ScaleType,
    pub scale_x: f32,
    pub scale_type_y: ScaleType,
    pub scale_y: f32,
    /// `frame_count_mod<i>`; `0` means "no modulus" (disabled).
    pub frame_count_mod: u32,
}

impl Default for ShaderPass {
    fn default() -> Self {
        Self {
            shader_path: PathBuf::new(),
            filter_linear: true,
            wrap_mode: WrapMode::ClampToEdge,
            mipmap_input: false,
            alias: None,
            float_framebuffer: false,
            srgb_framebuffer: false,
            scale_type_x: ScaleType::Source,
            scale_x: 1.0,
            scale_type_y: ScaleType::Source,
            scale_y: 1.0,
            frame_count_mod: 0,
        }
    }
}

/// A LUT sampler declared by the preset (`<samplerName> = <path>`).
#[derive(Clone, Debug)]
pub struct ReferenceTexture {
    pub name: String,
    pub path: PathBuf,
    pub wrap_mode: WrapMode,
    pub mipmap: bool,
    pub linear: bool,
}

/// A fully parsed `.glslp` preset: passes, LUT samplers and global
/// parameter overrides.
#[derive(Clone, Debug, Default)]
pub struct Preset {
    pub passes: Vec<ShaderPass>,
    pub textures: Vec<ReferenceTexture>,
    /// Global float parameters, in first-seen order (any key in the
    /// preset that isn't a recognized pass/texture key).
    pub parameters: Vec<(String, f32)>,
    /// Absolute path to the preset file itself, if loaded from disk.
    pub preset_path: Option<PathBuf>,
    /// Directory the preset's relative paths are resolved against.
    pub base_path: PathBuf,
}

impl Preset {
    pub fn texture(&self, name: &str) -> Option<&ReferenceTexture> {
        self.textures.iter().find(|t| t.name == name)
    }

    pub fn parameter(&self, name: &str) -> Option<f32> {
        self.parameters
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn set_parameter(&mut self, name: &str, value: f32) {
        if let Some(entry) = self.parameters.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value;
        } else {
            self.parameters.push((name.to_string(), value));
        }
    }
}
