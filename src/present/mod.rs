// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Window presentation: blits the shader chain's final texture to the
//! default framebuffer with brightness/contrast and optional
//! aspect-ratio preservation.

pub mod pbo;

use gl::types::*;

use crate::geometry::{Point, Size};
use crate::renderer::program::Program;
use crate::renderer::quad::Quad;
use crate::renderer::{Shader, ShaderError};
use crate::shader::version;

// Attribute locations are bound explicitly via `glBindAttribLocation`
// (see `Presenter::new`) rather than `layout(location=...)`, which
// isn't available on the GLSL 120/110/100 fallbacks `version_line` can
// emit for older desktop/ES contexts.
const PRESENT_VERTEX_SHADER: &str = r#"
#if __VERSION__ >= 130
#define COMPAT_ATTRIBUTE in
#define COMPAT_VARYING out
#else
#define COMPAT_ATTRIBUTE attribute
#define COMPAT_VARYING varying
#endif

COMPAT_ATTRIBUTE vec4 position;
COMPAT_ATTRIBUTE vec2 texCoord;

COMPAT_VARYING vec2 fragTexCoord;

void main() {
    gl_Position = position;
    fragTexCoord = texCoord;
}
"#;

const PRESENT_FRAGMENT_SHADER: &str = r#"
#if __VERSION__ >= 130
#define COMPAT_VARYING in
#define COMPAT_TEXTURE texture
out vec4 fragColor;
#else
#define COMPAT_VARYING varying
#define COMPAT_TEXTURE texture2D
#define fragColor gl_FragColor
#endif

COMPAT_VARYING vec2 fragTexCoord;

uniform sampler2D uTexture;
uniform float uBrightness;
uniform float uContrast;

void main() {
    vec4 color = COMPAT_TEXTURE(uTexture, fragTexCoord);
    color.rgb = (color.rgb - 0.5) * uContrast + 0.5 + uBrightness;
    fragColor = color;
}
"#;

/// Whether the presented image is stretched to fill the window or
/// letterboxed/pillarboxed to preserve its source aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AspectMode {
    #[default]
    Stretch,
    PreserveAspect,
}

/// Presents a shader chain's output texture to the window with
/// brightness/contrast and optional aspect-preservation.
pub struct Presenter {
    program: Program,
    u_texture: GLint,
    u_brightness: GLint,
    u_contrast: GLint,
    quad: Quad,
    pub brightness: f32,
    pub contrast: f32,
    pub aspect_mode: AspectMode,
}

impl Presenter {
    pub fn new(gl_version: &str, glsl_version: Option<&str>) -> Result<Self, ShaderError> {
        let is_es = version::is_opengl_es(gl_version);
        let version_line = version::version_line(gl_version, glsl_version);
        let precision = version::precision_preamble(is_es);

        let vertex_source = format!("{version_line}\n{precision}{PRESENT_VERTEX_SHADER}");
        let fragment_source = format!("{version_line}\n{precision}{PRESENT_FRAGMENT_SHADER}");

        let vertex = Shader::new(&vertex_source, gl::VERTEX_SHADER)?;
        let fragment = Shader::new(&fragment_source, gl::FRAGMENT_SHADER)?;
        let program = Program::new_with_attrib_locations(
            &[vertex, fragment],
            &[(0, "position"), (1, "texCoord")],
        )?;

        let u_texture = program.uniform_location("uTexture")?;
        let u_brightness = program.uniform_location("uBrightness")?;
        let u_contrast = program.uniform_location("uContrast")?;

        Ok(Self {
            program,
            u_texture,
            u_brightness,
            u_contrast,
            quad: Quad::new(),
            brightness: 0.0,
            contrast: 1.0,
            aspect_mode: AspectMode::default(),
        })
    }

    /// Computes the viewport origin/size that presents `source_size`
    /// into `window_size` under the current [`AspectMode`].
    fn viewport_for(&self, source_size: Size, window_size: Size) -> (Point, Size) {
        match self.aspect_mode {
            AspectMode::Stretch => (Point::default(), window_size),
            AspectMode::PreserveAspect => {
                let source_aspect = source_size.width() as f32 / source_size.height().max(1) as f32;
                let window_aspect = window_size.width() as f32 / window_size.height().max(1) as f32;

                let fitted = if source_aspect > window_aspect {
                    Size::new(
                        window_size.width(),
                        (window_size.width() as f32 / source_aspect).round() as u32,
                    )
                } else {
                    Size::new(
                        (window_size.height() as f32 * source_aspect).round() as u32,
                        window_size.height(),
                    )
                };

                let origin = Point::new(
                    (window_size.width() as i32 - fitted.width() as i32) / 2,
                    (window_size.height() as i32 - fitted.height() as i32) / 2,
                );
                (origin, fitted)
            }
        }
    }

    /// Binds the default framebuffer, clears it if the content won't
    /// cover every pixel, and draws `texture` through the
    /// brightness/contrast program.
    pub fn present(&self, texture: GLuint, source_size: Size, window_size: Size) {
        let (origin, size) = self.viewport_for(source_size, window_size);
        let covers_full_window = origin == Point::default()
            && size.width() >= window_size.width()
            && size.height() >= window_size.height();

        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            if !covers_full_window {
                gl::Viewport(0, 0, window_size.width() as GLsizei, window_size.height() as GLsizei);
                gl::ClearColor(0.0, 0.0, 0.0, 1.0);
                gl::Clear(gl::COLOR_BUFFER_BIT);
            }

            gl::Viewport(origin.x(), origin.y(), size.width() as GLsizei, size.height() as GLsizei);

            self.program.bind();
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindTexture(gl::TEXTURE_2D, texture);
            if self.u_texture >= 0 {
                gl::Uniform1i(self.u_texture, 0);
            }
            if self.u_brightness >= 0 {
                gl::Uniform1f(self.u_brightness, self.brightness);
            }
            if self.u_contrast >= 0 {
                gl::Uniform1f(self.u_contrast, self.contrast);
            }
        }

        self.quad.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_mode_defaults_to_stretch() {
        assert_eq!(AspectMode::default(), AspectMode::Stretch);
    }
}
