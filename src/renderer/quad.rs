// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fullscreen-quad geometry shared by every shader pass.
//!
//! Vertex layout is `vec4 position + vec2 texcoord`, drawn as two
//! triangles (six indices). RetroCapture's only draw primitive is a
//! fullscreen pass, so there is a single fixed quad rather than
//! per-input geometry.

use gl::types::*;

use super::buffer::Buffer;
use super::vertex_array::VertexArray;
use crate::set_attribute;

#[repr(C)]
struct Vertex(
    [f32; 4], // position
    [f32; 2], // texcoord
);

#[rustfmt::skip]
const VERTICES: [Vertex; 4] = [
    Vertex([-1.0, -1.0, 0.0, 1.0], [0.0, 0.0]),
    Vertex([ 1.0, -1.0, 0.0, 1.0], [1.0, 0.0]),
    Vertex([ 1.0,  1.0, 0.0, 1.0], [1.0, 1.0]),
    Vertex([-1.0,  1.0, 0.0, 1.0], [0.0, 1.0]),
];

const INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// RAII-owned fullscreen quad: one VAO, one vertex buffer, one index
/// buffer. Shared by every pass in a [`crate::renderer::engine::ShaderEngine`].
pub struct Quad {
    vao: VertexArray,
    _vbo: Buffer,
    _ebo: Buffer,
}

impl Quad {
    pub fn new() -> Self {
        let vao = VertexArray::new();
        vao.bind();

        let vbo = Buffer::new(gl::ARRAY_BUFFER);
        vbo.set_data(&VERTICES, gl::STATIC_DRAW);

        let ebo = Buffer::new(gl::ELEMENT_ARRAY_BUFFER);
        ebo.bind();
        ebo.set_data(&INDICES, gl::STATIC_DRAW);

        set_attribute!(vao, 0, Vertex::0);
        set_attribute!(vao, 1, Vertex::1);

        Self {
            vao,
            _vbo: vbo,
            _ebo: ebo,
        }
    }

    /// Draws the two-triangle quad. Binds the VAO, which
    /// keeps the index buffer bound alongside it.
    pub fn draw(&self) {
        self.vao.bind();
        unsafe {
            gl::DrawElements(
                gl::TRIANGLES,
                INDICES.len() as GLsizei,
                gl::UNSIGNED_INT,
                std::ptr::null(),
            );
        }
    }
}

impl Default for Quad {
    fn default() -> Self {
        Self::new()
    }
}
