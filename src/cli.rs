// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command-line interface and startup configuration.
//!
//! Built on `clap::Command`'s builder style (`std`/`help`/`usage`
//! features only, no derive macro). Fields cover: device path, capture
//! resolution/fps, window geometry, brightness/contrast/aspect,
//! per-control capture tunables (generic rather than tied to any one
//! capture backend), and streaming enable/port/dimensions/fps/bitrate.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use clap::{Arg, ArgAction, Command};
use thiserror::Error;

use crate::{APP_ABOUT, APP_AUTHOR, APP_NAME, APP_SEMVER};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to initialize user preset directory")]
    DataDir(#[from] io::Error),
}

/// A capture control value in V4L2's `-1`-means-"leave at driver default"
/// convention, generalized across backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalControl(pub i32);

impl OptionalControl {
    pub const UNSET: Self = Self(-1);

    pub fn get(self) -> Option<i32> {
        (self.0 != -1).then_some(self.0)
    }
}

/// Per-device capture tunables (brightness, contrast, saturation, hue,
/// gain, exposure, sharpness, gamma, white balance). Each defaults to
/// [`OptionalControl::UNSET`], meaning
/// "don't touch this control at startup".
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureControls {
    pub brightness: OptionalControl,
    pub contrast: OptionalControl,
    pub saturation: OptionalControl,
    pub hue: OptionalControl,
    pub gain: OptionalControl,
    pub exposure: OptionalControl,
    pub sharpness: OptionalControl,
    pub gamma: OptionalControl,
    pub white_balance: OptionalControl,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub device_id: String,
    pub capture_width: u32,
    pub capture_height: u32,
    pub capture_fps: f32,

    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen: bool,
    pub monitor_index: Option<u32>,

    pub brightness: f32,
    pub contrast: f32,
    pub maintain_aspect: bool,

    pub controls: CaptureControls,

    pub streaming_enabled: bool,
    pub stream_port: u16,
    pub stream_width: u32,
    pub stream_height: u32,
    pub stream_fps: f32,
    pub stream_video_bitrate_bps: u32,
    pub stream_audio_bitrate_bps: u32,

    pub preset_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            device_id: String::new(),
            capture_width: 1920,
            capture_height: 1080,
            capture_fps: 60.0,
            window_width: 1280,
            window_height: 720,
            fullscreen: false,
            monitor_index: None,
            brightness: 0.0,
            contrast: 1.0,
            maintain_aspect: true,
            controls: CaptureControls::default(),
            streaming_enabled: false,
            stream_port: 8080,
            stream_width: 1280,
            stream_height: 720,
            stream_fps: 30.0,
            stream_video_bitrate_bps: 4_000_000,
            stream_audio_bitrate_bps: 128_000,
            preset_path: None,
        }
    }
}

/// Parses command-line arguments into a [`RuntimeConfig`].
pub fn parse_args() -> Result<RuntimeConfig, CliError> {
    let matches = Command::new(APP_NAME)
        .author(APP_AUTHOR)
        .version(APP_SEMVER)
        .about(APP_ABOUT)
        .arg(Arg::new("device").long("device").value_name("ID").help("Capture device id or path"))
        .arg(Arg::new("width").long("width").value_name("W").help("Capture width").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("height").long("height").value_name("H").help("Capture height").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("fps").long("fps").value_name("FPS").help("Capture framerate").value_parser(clap::value_parser!(f32)))
        .arg(Arg::new("window-width").long("window-width").value_name("W").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("window-height").long("window-height").value_name("H").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("fullscreen").long("fullscreen").action(ArgAction::SetTrue))
        .arg(Arg::new("monitor").long("monitor").value_name("INDEX").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("brightness").long("brightness").value_name("V").value_parser(clap::value_parser!(f32)))
        .arg(Arg::new("contrast").long("contrast").value_name("V").value_parser(clap::value_parser!(f32)))
        .arg(Arg::new("no-aspect").long("no-aspect").help("Stretch instead of preserving aspect ratio").action(ArgAction::SetTrue))
        .arg(control_arg("ctl-brightness"))
        .arg(control_arg("ctl-contrast"))
        .arg(control_arg("ctl-saturation"))
        .arg(control_arg("ctl-hue"))
        .arg(control_arg("ctl-gain"))
        .arg(control_arg("ctl-exposure"))
        .arg(control_arg("ctl-sharpness"))
        .arg(control_arg("ctl-gamma"))
        .arg(control_arg("ctl-white-balance"))
        .arg(Arg::new("stream").long("stream").help("Enable MPEG-TS streaming").action(ArgAction::SetTrue))
        .arg(Arg::new("stream-port").long("stream-port").value_name("PORT").value_parser(clap::value_parser!(u16)))
        .arg(Arg::new("stream-width").long("stream-width").value_name("W").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("stream-height").long("stream-height").value_name("H").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("stream-fps").long("stream-fps").value_name("FPS").value_parser(clap::value_parser!(f32)))
        .arg(Arg::new("stream-video-bitrate").long("stream-video-bitrate").value_name("BPS").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("stream-audio-bitrate").long("stream-audio-bitrate").value_name("BPS").value_parser(clap::value_parser!(u32)))
        .arg(
            Arg::new("preset")
                .value_name("PRESET")
                .help("Path to a RetroArch .glslp preset")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    let defaults = RuntimeConfig::default();

    Ok(RuntimeConfig {
        device_id: matches.get_one::<String>("device").cloned().unwrap_or(defaults.device_id),
        capture_width: matches.get_one::<u32>("width").copied().unwrap_or(defaults.capture_width),
        capture_height: matches.get_one::<u32>("height").copied().unwrap_or(defaults.capture_height),
        capture_fps: matches.get_one::<f32>("fps").copied().unwrap_or(defaults.capture_fps),
        window_width: matches.get_one::<u32>("window-width").copied().unwrap_or(defaults.window_width),
        window_height: matches.get_one::<u32>("window-height").copied().unwrap_or(defaults.window_height),
        fullscreen: matches.get_flag("fullscreen"),
        monitor_index: matches.get_one::<u32>("monitor").copied(),
        brightness: matches.get_one::<f32>("brightness").copied().unwrap_or(defaults.brightness),
        contrast: matches.get_one::<f32>("contrast").copied().unwrap_or(defaults.contrast),
        maintain_aspect: !matches.get_flag("no-aspect"),
        controls: CaptureControls {
            brightness: control_value(&matches, "ctl-brightness"),
            contrast: control_value(&matches, "ctl-contrast"),
            saturation: control_value(&matches, "ctl-saturation"),
            hue: control_value(&matches, "ctl-hue"),
            gain: control_value(&matches, "ctl-gain"),
            exposure: control_value(&matches, "ctl-exposure"),
            sharpness: control_value(&matches, "ctl-sharpness"),
            gamma: control_value(&matches, "ctl-gamma"),
            white_balance: control_value(&matches, "ctl-white-balance"),
        },
        streaming_enabled: matches.get_flag("stream"),
        stream_port: matches.get_one::<u16>("stream-port").copied().unwrap_or(defaults.stream_port),
        stream_width: matches.get_one::<u32>("stream-width").copied().unwrap_or(defaults.stream_width),
        stream_height: matches.get_one::<u32>("stream-height").copied().unwrap_or(defaults.stream_height),
        stream_fps: matches.get_one::<f32>("stream-fps").copied().unwrap_or(defaults.stream_fps),
        stream_video_bitrate_bps: matches
            .get_one::<u32>("stream-video-bitrate")
            .copied()
            .unwrap_or(defaults.stream_video_bitrate_bps),
        stream_audio_bitrate_bps: matches
            .get_one::<u32>("stream-audio-bitrate")
            .copied()
            .unwrap_or(defaults.stream_audio_bitrate_bps),
        preset_path: match matches.get_one::<PathBuf>("preset").cloned() {
            Some(path) => Some(path),
            None => default_preset_path()?,
        },
    })
}

/// Ensures `$XDG_DATA_HOME/retrocapture/presets` exists, seeding it on
/// first run from the packaged presets installed alongside the binary
/// (`/usr/share/retrocapture/presets`, or `/app/share/retrocapture/presets`
/// under Flatpak), matching the `assets` entries in `Cargo.toml`'s
/// `package.metadata.deb`/`generate-rpm` sections.
fn ensure_user_preset_dir() -> io::Result<PathBuf> {
    let user_data_dir = dirs::data_local_dir().or_else(|| env::current_dir().ok()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "could not determine user data directory ($XDG_DATA_HOME or $HOME/.local/share)",
        )
    })?;

    let preset_dir = user_data_dir.join(APP_NAME).join("presets");

    if !preset_dir.exists() {
        log::info!("Creating {:?}", &preset_dir);
        fs::create_dir_all(&preset_dir)?;

        let system_preset_dir = if env::var("FLATPAK_ID").is_ok() {
            Path::new("/app/share")
        } else {
            Path::new("/usr/share")
        }
        .join(APP_NAME)
        .join("presets");

        if system_preset_dir.exists() {
            log::info!("Copying from {:?} to {:?}", system_preset_dir, preset_dir);
            copy_recursively_overwriting(&system_preset_dir, &preset_dir)?;
        } else {
            log::warn!("No packaged preset directory found: {:?}", &system_preset_dir);
        }
    }

    Ok(preset_dir)
}

fn copy_recursively_overwriting(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> io::Result<()> {
    fs::create_dir_all(&destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let dest = destination.as_ref().join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_recursively_overwriting(entry.path(), dest)?;
        } else {
            fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}

/// Resolves the preset to load when `--preset` wasn't passed: the first
/// `.glslp` file (sorted) found in the user preset directory, seeding
/// that directory from packaged defaults first.
fn default_preset_path() -> Result<Option<PathBuf>, CliError> {
    let preset_dir = ensure_user_preset_dir()?;
    let mut entries: Vec<PathBuf> = fs::read_dir(&preset_dir)
        .map(|dir| {
            dir.filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "glslp"))
                .collect()
        })
        .unwrap_or_default();
    entries.sort();
    Ok(entries.into_iter().next())
}

fn control_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("VALUE")
        .help("-1 leaves the control at its driver default")
        .value_parser(clap::value_parser!(i32))
}

fn control_value(matches: &clap::ArgMatches, name: &str) -> OptionalControl {
    matches
        .get_one::<i32>(name)
        .copied()
        .map(OptionalControl)
        .unwrap_or(OptionalControl::UNSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_control_unset_has_no_value() {
        assert_eq!(OptionalControl::UNSET.get(), None);
        assert_eq!(OptionalControl(42).get(), Some(42));
    }

    #[test]
    fn defaults_match_spec_full() {
        let config = RuntimeConfig::default();
        assert_eq!((config.capture_width, config.capture_height), (1920, 1080));
        assert_eq!(config.capture_fps, 60.0);
        assert_eq!(config.stream_port, 8080);
    }
}
