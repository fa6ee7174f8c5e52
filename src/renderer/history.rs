// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ring-buffered frame history for motion-blur/feedback passes.
//!
//! History textures are independent GL objects, never aliases of a
//! pass's framebuffer texture — those are overwritten every frame, so
//! simply storing a handle would make every `PrevTexture` read back the
//! *current* frame instead of a prior one. The fix: render the final
//! texture into a dedicated history texture each frame via pass 0's
//! program.

use gl::types::*;

use crate::geometry::Size;
use crate::renderer::framebuffer::{Framebuffer, FramebufferFormat};
use crate::renderer::program::Program;
use crate::renderer::quad::Quad;

/// Maximum number of retained history slots.
pub const MAX_HISTORY: usize = 7;

/// Bounded ring buffer of prior final-pass outputs. Element 0 is the
/// most recent; inserting past [`MAX_HISTORY`] evicts the oldest
/// (tail) slot.
#[derive(Default)]
pub struct FrameHistory {
    slots: std::collections::VecDeque<Framebuffer>,
}

impl FrameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the history texture at ring position `k` (0 = most
    /// recent), or `None` if the ring hasn't filled that far yet —
    /// callers must leave the corresponding uniform unset rather than
    /// falling back to the current input.
    pub fn texture(&self, k: usize) -> Option<GLuint> {
        self.slots.get(k).map(Framebuffer::texture)
    }

    /// Renders `source_texture` into a (possibly reused) history slot
    /// using pass 0's `program` against the fullscreen `quad`, then
    /// inserts the result at position 0, evicting the tail if the ring
    /// is full.
    ///
    /// Render-through-program rather than a direct blit sidesteps
    /// format mismatches between the final pass's framebuffer and the
    /// history slot.
    ///
    /// TODO: switch to `glBlitFramebuffer` once RGBA8-only LUTs are
    /// guaranteed, skipping the program round-trip. Blocked on float
    /// framebuffers (`FramebufferFormat::Rgba32F`) breaking the
    /// blit-format-compatibility precondition.
    pub fn push(&mut self, source_texture: GLuint, size: Size, program: &Program, quad: &Quad) {
        let mut target = if self.slots.len() >= MAX_HISTORY {
            self.slots.pop_back().unwrap()
        } else {
            Framebuffer::new(size, FramebufferFormat::Rgba8)
        };

        if target.needs_recreate(size, FramebufferFormat::Rgba8) {
            target = Framebuffer::new(size, FramebufferFormat::Rgba8);
        }

        target.bind();
        unsafe {
            gl::Viewport(0, 0, size.width() as GLsizei, size.height() as GLsizei);
            gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
            gl::ClearColor(0.0, 0.0, 0.0, 0.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
            gl::Disable(gl::BLEND);
            gl::Disable(gl::DEPTH_TEST);
            gl::Disable(gl::CULL_FACE);

            program.bind();
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindTexture(gl::TEXTURE_2D, source_texture);
        }
        quad.draw();

        self.slots.push_front(target);
    }

    /// Frees every history texture.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::MAX_HISTORY;

    #[test]
    fn max_history_matches_spec() {
        assert_eq!(MAX_HISTORY, 7);
    }
}
