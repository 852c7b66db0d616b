//! Cache configuration loaded from a TOML file.
//!
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::theme::IconColors;
use crate::error::{CoreError, CoreResult};
use crate::fs::media_path::{default_aliases, PathAlias};
use crate::thumb::bounded::DEFAULT_CAPACITY;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub icons: IconConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub video: VideoConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Bounded cache and thumbnail behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// When `false`, only static category icons are shown.
    #[serde(default = "default_true")]
    pub thumbnails: bool,
    /// Longest edge of a decoded thumbnail, in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            thumbnails: true,
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

/// Static icon set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconConfig {
    /// Directory of `<icon-id>.png` files overriding the built-in glyphs.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Edge of built-in glyphs, in pixels, clamped to 8..=512.
    #[serde(default = "default_icon_size")]
    pub size: u32,
    /// Opacity applied to the folder colour for directory icon backgrounds.
    #[serde(default = "default_folder_opacity")]
    pub folder_opacity: f32,
    #[serde(default)]
    pub colors: IconColors,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            dir: None,
            size: default_icon_size(),
            folder_opacity: default_folder_opacity(),
            colors: IconColors::default(),
        }
    }
}

/// Album detection and path normalisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Roots scanned for album directories.
    #[serde(default)]
    pub music_roots: Vec<PathBuf>,
    /// Watch the music roots and invalidate the album index on change.
    #[serde(default = "default_true")]
    pub watch: bool,
    #[serde(default = "default_scan_depth")]
    pub scan_depth: usize,
    #[serde(default = "default_aliases")]
    pub path_aliases: Vec<PathAlias>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            music_roots: Vec::new(),
            watch: true,
            scan_depth: default_scan_depth(),
            path_aliases: default_aliases(),
        }
    }
}

/// External video frame grabber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
    #[serde(default = "default_seek_seconds")]
    pub seek_seconds: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            seek_seconds: default_seek_seconds(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_thumbnail_size() -> u32 {
    96
}

fn default_icon_size() -> u32 {
    48
}

fn default_folder_opacity() -> f32 {
    0.3
}

fn default_scan_depth() -> usize {
    4
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_seek_seconds() -> f64 {
    1.0
}
