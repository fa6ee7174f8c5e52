// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! GL context provider contract.
//!
//! RetroCapture's core never creates a window or an OpenGL context itself;
//! that is the host's job. What the core needs from the host is small and
//! fixed, so it is expressed as one trait, construction-injected into
//! [`crate::app::Application`] the same way `VideoSource`/`AudioSource`
//! are — a platform implementation is handed in at construction rather
//! than hardwired.
//!
//! `make_current`/swap and the GL/GLSL version strings used to pick a
//! shader `#version` line are the only two concerns any windowing toolkit
//! needs to supply.

use crate::geometry::Size;

/// Desktop GL, Desktop GL compatibility profile, or an ES context. The
/// preprocessor's `#version`/precision selection switches on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlProfile {
    Core,
    Compatibility,
    Es,
}

/// Host-provided OpenGL context.
///
/// A concrete implementation (GLFW, SDL2, a platform windowing toolkit's
/// GL area) lives outside this crate; RetroCapture only calls through this
/// trait.
pub trait GlContextProvider {
    /// Makes this context current on the calling thread. Must be called
    /// once per render-thread GL call batch before any `gl::*` function
    /// is used.
    fn make_current(&self);

    /// Presents the default framebuffer (swaps the window's back buffer).
    fn swap_buffers(&self);

    /// Current size of the presentation surface, in pixels.
    fn size(&self) -> Size;

    /// `(major, minor, profile)` as reported by the context, used to pick
    /// the dynamic `#version`/precision preamble.
    fn gl_version(&self) -> (u32, u32, GlProfile);

    /// Raw `GL_VERSION` string, as returned by `glGetString`. Preferred
    /// over `gl_version()` by [`crate::shader::version`] when available,
    /// since the preprocessor's rules are expressed directly against that
    /// string's wording (e.g. detecting `"OpenGL ES"`).
    fn gl_version_string(&self) -> String;

    /// Raw `GL_SHADING_LANGUAGE_VERSION` string, when the context exposes
    /// one (desktop GL always does; some ES2 drivers don't).
    fn glsl_version_string(&self) -> Option<String>;
}

/// Loads GL function pointers via libepoxy, for windowing toolkits that
/// don't expose GL symbol loading on their own. Any host whose windowing
/// layer doesn't load GL functions for it can call this once, after the
/// first `make_current()`, before issuing any `gl::*` call.
pub fn load_gl_functions_via_epoxy() -> Result<(), String> {
    let library = unsafe {
        libloading::os::unix::Library::new("libepoxy.so.0")
            .map_err(|err| format!("Failed to load libepoxy.so.0: {err}"))?
    };

    epoxy::load_with(|name| {
        unsafe { library.get::<_>(name.as_bytes()) }
            .map(|symbol| *symbol)
            .unwrap_or(std::ptr::null())
    });

    gl::load_with(epoxy::get_proc_addr);

    let version = unsafe { gl::GetString(gl::VERSION) };
    if version.is_null() {
        return Err("GL functions not loaded properly".to_string());
    }

    // `library` must outlive the process: epoxy's loaded function
    // pointers point into it. Intentionally leaked once at startup.
    std::mem::forget(library);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_profile_variants_are_distinct() {
        assert_ne!(GlProfile::Core, GlProfile::Es);
        assert_ne!(GlProfile::Compatibility, GlProfile::Es);
    }
}
