// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! `.glslp` line-oriented parser, path resolution and round-trip writer.
//!
//! Path resolution tries, in order: absolute, preset-dir-relative,
//! `shaders/`-rooted, `../`-stripped-plus-recursive-search, and finally
//! a last-resort computed path so downstream can report a clean error.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use super::{error::PresetError, Preset, ReferenceTexture, ScaleType, ShaderPass, WrapMode};

const PASS_KEYS: &[&str] = &[
    "shader",
    "filter_linear",
    "wrap_mode",
    "mipmap_input",
    "alias",
    "float_framebuffer",
    "srgb_framebuffer",
    "scale_type_x",
    "scale_x",
    "scale_type_y",
    "scale_y",
    "frame_count_mod",
];

/// Loads a `.glslp` preset from disk.
pub fn load(path: &Path) -> Result<Preset, PresetError> {
    let content = fs::read_to_string(path)?;
    let preset_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let base_path = preset_path
        .parent()
        .map(PathBuf::from)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut preset = Preset {
        base_path: base_path.clone(),
        preset_path: Some(preset_path),
        ..Default::default()
    };

    for raw_line in content.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let Some(eq) = line.find('=') else {
            continue;
        };
        let key = line[..eq].trim();
        let value = unquote(line[eq + 1..].trim());

        if key == "shaders" {
            let count: usize = value
                .parse()
                .map_err(|_| PresetError::InvalidShaderCount(value.clone()))?;
            preset.passes.resize_with(count, ShaderPass::default);
            continue;
        }

        handle_directive(&mut preset, key, &value, &base_path, &cwd);
    }

    if preset.passes.is_empty() {
        return Err(PresetError::NoPasses);
    }
    for (i, pass) in preset.passes.iter().enumerate() {
        if pass.shader_path.as_os_str().is_empty() {
            return Err(PresetError::MissingShaderPath(i));
        }
    }

    log::info!(
        "Preset loaded: {} passes, {} textures",
        preset.passes.len(),
        preset.textures.len()
    );

    Ok(preset)
}

/// Writes `preset` back out, emitting only keys that differ from the
/// RetroArch defaults plus any parameter/texture overrides.
pub fn save(preset: &Preset, path: &Path) -> Result<(), PresetError> {
    let mut out = String::new();
    out.push_str(&format!("shaders = \"{}\"\n", preset.passes.len()));

    let default = ShaderPass::default();
    for (i, pass) in preset.passes.iter().enumerate() {
        out.push_str(&format!(
            "shader{i} = \"{}\"\n",
            display_path(&pass.shader_path, &preset.base_path)
        ));
        if pass.alias.is_some() {
            out.push_str(&format!(
                "alias{i} = \"{}\"\n",
                pass.alias.as_deref().unwrap_or_default()
            ));
        }
        if pass.filter_linear != default.filter_linear {
            out.push_str(&format!("filter_linear{i} = \"{}\"\n", pass.filter_linear));
        }
        if pass.wrap_mode != default.wrap_mode {
            out.push_str(&format!("wrap_mode{i} = \"{}\"\n", pass.wrap_mode.as_str()));
        }
        if pass.mipmap_input != default.mipmap_input {
            out.push_str(&format!("mipmap_input{i} = \"{}\"\n", pass.mipmap_input));
        }
        if pass.float_framebuffer != default.float_framebuffer {
            out.push_str(&format!(
                "float_framebuffer{i} = \"{}\"\n",
                pass.float_framebuffer
            ));
        }
        if pass.srgb_framebuffer != default.srgb_framebuffer {
            out.push_str(&format!(
                "srgb_framebuffer{i} = \"{}\"\n",
                pass.srgb_framebuffer
            ));
        }
        if pass.scale_type_x != default.scale_type_x {
            out.push_str(&format!(
                "scale_type_x{i} = \"{}\"\n",
                pass.scale_type_x.as_str()
            ));
        }
        if pass.scale_x != default.scale_x {
            out.push_str(&format!("scale_x{i} = \"{}\"\n", pass.scale_x));
        }
        if pass.scale_type_y != default.scale_type_y {
            out.push_str(&format!(
                "scale_type_y{i} = \"{}\"\n",
                pass.scale_type_y.as_str()
            ));
        }
        if pass.scale_y != default.scale_y {
            out.push_str(&format!("scale_y{i} = \"{}\"\n", pass.scale_y));
        }
        if pass.frame_count_mod != 0 {
            out.push_str(&format!(
                "frame_count_mod{i} = \"{}\"\n",
                pass.frame_count_mod
            ));
        }
    }

    for tex in &preset.textures {
        out.push_str(&format!(
            "{} = \"{}\"\n",
            tex.name,
            display_path(&tex.path, &preset.base_path)
        ));
        if tex.wrap_mode != WrapMode::ClampToBorder {
            out.push_str(&format!(
                "{}_wrap_mode = \"{}\"\n",
                tex.name,
                tex.wrap_mode.as_str()
            ));
        }
        if tex.mipmap {
            out.push_str(&format!("{}_mipmap = \"true\"\n", tex.name));
        }
        if !tex.linear {
            out.push_str(&format!("{}_linear = \"false\"\n", tex.name));
        }
    }

    for (name, value) in &preset.parameters {
        out.push_str(&format!("{name} = \"{value}\"\n"));
    }

    fs::write(path, out)?;
    Ok(())
}

fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value {
        "true" => true,
        "false" => false,
        _ => default,
    }
}

fn parse_float(value: &str, default: f32) -> f32 {
    value.parse().unwrap_or(default)
}

/// Splits a key like `scale_type_x3` into (`"scale_type_x"`, `Some(3)`).
fn split_index(key: &str) -> (&str, Option<usize>) {
    let mut start = key.len();
    for (i, c) in key.char_indices().rev() {
        if c.is_ascii_digit() {
            start = i;
        } else {
            break;
        }
    }
    if start < key.len() {
        match key[start..].parse::<usize>() {
            Ok(idx) => (&key[..start], Some(idx)),
            Err(_) => (key, None),
        }
    } else {
        (key, None)
    }
}

fn handle_directive(preset: &mut Preset, key: &str, value: &str, base_path: &Path, cwd: &Path) {
    let (base, idx) = split_index(key);
    if let Some(idx) = idx {
        if PASS_KEYS.contains(&base) {
            if idx >= preset.passes.len() {
                preset.passes.resize_with(idx + 1, ShaderPass::default);
            }
            let pass = &mut preset.passes[idx];
            match base {
                "shader" => pass.shader_path = resolve_path(base_path, cwd, value),
                "filter_linear" => pass.filter_linear = parse_bool(value, true),
                "wrap_mode" => pass.wrap_mode = WrapMode::parse(value),
                "mipmap_input" => pass.mipmap_input = parse_bool(value, false),
                "alias" => {
                    pass.alias = if value.is_empty() {
                        None
                    } else {
                        Some(value.to_string())
                    }
                }
                "float_framebuffer" => pass.float_framebuffer = parse_bool(value, false),
                "srgb_framebuffer" => pass.srgb_framebuffer = parse_bool(value, false),
                "scale_type_x" => pass.scale_type_x = ScaleType::parse(value),
                "scale_x" => pass.scale_x = parse_float(value, 1.0),
                "scale_type_y" => pass.scale_type_y = ScaleType::parse(value),
                "scale_y" => pass.scale_y = parse_float(value, 1.0),
                "frame_count_mod" => pass.frame_count_mod = value.parse().unwrap_or(0),
                _ => unreachable!(),
            }
            return;
        }
        // Indexed key we don't recognize (e.g. a per-pass user parameter):
        // fall through and treat the whole key as a global parameter name.
    }

    for (suffix, apply) in [
        (
            "_wrap_mode",
            (|tex: &mut ReferenceTexture, v: &str| tex.wrap_mode = WrapMode::parse(v))
                as fn(&mut ReferenceTexture, &str),
        ),
        ("_mipmap", |tex, v| tex.mipmap = parse_bool(v, false)),
        ("_linear", |tex, v| tex.linear = parse_bool(v, true)),
    ] {
        if let Some(tex_name) = key.strip_suffix(suffix) {
            if let Some(tex) = preset.textures.iter_mut().find(|t| t.name == tex_name) {
                apply(tex, value);
                return;
            }
        }
    }

    if let Ok(f) = value.parse::<f32>() {
        preset.set_parameter(key, f);
    } else {
        preset.textures.push(ReferenceTexture {
            name: key.to_string(),
            path: resolve_path(base_path, cwd, value),
            wrap_mode: WrapMode::ClampToBorder,
            mipmap: false,
            linear: true,
        });
    }
}

/// Resolves a shader/LUT path against an ordered rule set. The first
/// candidate that exists on disk wins; if none exist, the
/// preset-dir-relative candidate is returned so the caller can report a
/// clean "file not found" error.
pub fn resolve_path(preset_dir: &Path, cwd: &Path, raw: &str) -> PathBuf {
    let raw_path = Path::new(raw);

    if raw_path.is_absolute() {
        return raw_path.to_path_buf();
    }

    let preset_relative = preset_dir.join(raw_path);
    if preset_relative.exists() {
        return preset_relative;
    }

    if let Some(rest) = raw.strip_prefix("shaders/") {
        let via_preset_dir = preset_dir.join(rest);
        if via_preset_dir.exists() {
            return via_preset_dir;
        }
        let via_glsl_root = cwd.join("shaders").join("shaders_glsl").join(rest);
        if via_glsl_root.exists() {
            return via_glsl_root;
        }
    }

    let mut stripped = raw;
    let mut levels = 0usize;
    while let Some(rest) = stripped.strip_prefix("../") {
        stripped = rest;
        levels += 1;
    }
    if levels > 0 {
        let glsl_root = cwd.join("shaders").join("shaders_glsl");
        let candidate = glsl_root.join(stripped);
        if candidate.exists() {
            return candidate;
        }
        if let Some(found) = search_recursive(&glsl_root, Path::new(stripped)) {
            return found;
        }
    }

    preset_relative
}

/// Recursively searches `base` (descending into `rel`'s parent
/// directory first) for a file named like `rel`'s final component.
/// Subdirectories are visited in sorted order so repeated runs over the
/// same tree resolve identically.
fn search_recursive(base: &Path, rel: &Path) -> Option<PathBuf> {
    let file_name = rel.file_name()?;
    let search_root = match rel.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => base.join(dir),
        None => base.to_path_buf(),
    };
    walk_for_file(&search_root, file_name)
}

fn walk_for_file(dir: &Path, file_name: &OsStr) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .collect();
    entries.sort();

    let mut subdirs = Vec::new();
    for path in entries {
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name() == Some(file_name) {
            return Some(path);
        }
    }
    for sub in subdirs {
        if let Some(found) = walk_for_file(&sub, file_name) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_file(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn parses_simple_two_pass_preset() {
        let dir = tempdir();
        write_file(&dir.join("a.glsl"), "void main() {}");
        write_file(&dir.join("b.glsl"), "void main() {}");
        let preset_text = format!(
            "shaders = \"2\"\nshader0 = \"a.glsl\"\nscale_type_x0 = \"source\"\nscale_x0 = \"2.0\"\nscale_type_y0 = \"source\"\nscale_y0 = \"2.0\"\nshader1 = \"b.glsl\"\nGAIN = \"1.5\"\n"
        );
        let preset_path = dir.join("test.glslp");
        write_file(&preset_path, &preset_text);

        let preset = load(&preset_path).unwrap();
        assert_eq!(preset.passes.len(), 2);
        assert_eq!(preset.passes[0].scale_x, 2.0);
        assert_eq!(preset.parameter("GAIN"), Some(1.5));
        assert!(preset.passes[0].shader_path.ends_with("a.glsl"));
    }

    #[test]
    fn round_trip_preserves_overrides() {
        let dir = tempdir();
        write_file(&dir.join("a.glsl"), "void main() {}");
        let preset_path = dir.join("test.glslp");
        write_file(
            &preset_path,
            "shaders = \"1\"\nshader0 = \"a.glsl\"\nwrap_mode0 = \"repeat\"\nGAIN = \"1.5\"\n",
        );

        let preset = load(&preset_path).unwrap();
        let save_path = dir.join("roundtrip.glslp");
        save(&preset, &save_path).unwrap();
        let reloaded = load(&save_path).unwrap();

        assert_eq!(reloaded.passes.len(), preset.passes.len());
        assert_eq!(reloaded.passes[0].wrap_mode, WrapMode::Repeat);
        assert_eq!(reloaded.parameter("GAIN"), Some(1.5));
    }

    fn tempdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "retrocapture-preset-test-{}",
            std::process::id(),
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
