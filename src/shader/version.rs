// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! GLSL `#version`/precision selection from the active GL context's
//! version strings.

/// True if `gl_version` (the string returned by `glGetString(GL_VERSION)`)
/// names an OpenGL ES context.
pub fn is_opengl_es(gl_version: &str) -> bool {
    gl_version.contains("OpenGL ES")
}

/// Extracts the major version number from a `GL_VERSION`-style string,
/// skipping a leading `"OpenGL ES "` prefix when present.
pub fn major_version(version_string: &str) -> Option<u32> {
    let search = match version_string.find("OpenGL ES") {
        Some(pos) => version_string[pos + "OpenGL ES".len()..].trim_start(),
        None => version_string,
    };
    let digits: String = search.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Picks the `#version` directive to prepend to a shader, given the
/// context's `GL_VERSION` and (for desktop GL) `GL_SHADING_LANGUAGE_VERSION`
/// strings.
pub fn version_line(gl_version: &str, glsl_version: Option<&str>) -> String {
    let is_es = is_opengl_es(gl_version);
    let Some(major) = major_version(gl_version) else {
        log::warn!("Could not detect OpenGL version, falling back to GLSL 1.20");
        return "#version 120".to_string();
    };

    log::info!(
        "Detected OpenGL {} ({})",
        major,
        if is_es { "ES" } else { "Desktop" }
    );

    if is_es {
        if major >= 3 {
            "#version 300 es".to_string()
        } else {
            "#version 100".to_string()
        }
    } else if major >= 3 {
        let glsl_major = glsl_version.and_then(major_version);
        match glsl_major {
            Some(m) if m >= 3 => "#version 330".to_string(),
            Some(m) if m >= 1 => "#version 130".to_string(),
            _ => "#version 330".to_string(),
        }
    } else if major == 2 {
        "#version 120".to_string()
    } else {
        "#version 110".to_string()
    }
}

/// `precision` statements required right after `#version` on ES contexts.
pub fn precision_preamble(is_es: bool) -> &'static str {
    if is_es {
        "precision mediump float;\nprecision mediump int;\n"
    } else {
        ""
    }
}

/// The `GL_ARB_shading_language_420pack` extension line, only valid on
/// desktop GL (enables C-style array/struct initializers).
pub fn desktop_extension_line(is_es: bool) -> &'static str {
    if is_es {
        ""
    } else {
        "#extension GL_ARB_shading_language_420pack : require\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_es_context() {
        assert!(is_opengl_es("OpenGL ES 3.1 Mesa 23.0"));
        assert!(!is_opengl_es("4.6 (Core Profile) Mesa 23.0"));
    }

    #[test]
    fn parses_major_version() {
        assert_eq!(major_version("4.6 (Core Profile) Mesa 23.0"), Some(4));
        assert_eq!(major_version("OpenGL ES 3.1 Mesa 23.0"), Some(3));
        assert_eq!(major_version("garbage"), None);
    }

    #[test]
    fn picks_desktop_version_from_glsl_string() {
        assert_eq!(
            version_line("4.6 (Core Profile) Mesa 23.0", Some("4.60")),
            "#version 330"
        );
    }

    #[test]
    fn picks_es_version() {
        assert_eq!(version_line("OpenGL ES 3.1 Mesa 23.0", None), "#version 300 es");
        assert_eq!(version_line("OpenGL ES 2.0 Mesa 23.0", None), "#version 100");
    }
}
