//! Configuration structures and constants for the mediaforge-core library.
//!
//! `CoreConfig` carries the few ambient settings the engine needs: where the
//! ffmpeg and ffprobe binaries live, where temporary files go, and the defaults
//! applied when an operation leaves quality or audio bitrate unset. Values come
//! from `Default`, the builder, and `MEDIAFORGE_*` environment variables.

mod builder;

use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

use crate::error::{CoreResult, invalid_options};
use crate::presets::{DEFAULT_AUDIO_BITRATE, DEFAULT_QUALITY, find_quality};
use crate::utils::parse_bitrate;

// Environment variable names

pub const ENV_FFMPEG: &str = "MEDIAFORGE_FFMPEG";
pub const ENV_FFPROBE: &str = "MEDIAFORGE_FFPROBE";
pub const ENV_TEMP_DIR: &str = "MEDIAFORGE_TEMP_DIR";
pub const ENV_QUALITY: &str = "MEDIAFORGE_QUALITY";
pub const ENV_AUDIO_BITRATE: &str = "MEDIAFORGE_AUDIO_BITRATE";

/// Main configuration structure for the mediaforge-core library.
///
/// # Examples
///
/// ```rust
/// use mediaforge_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path("/opt/ffmpeg/bin/ffmpeg")
///     .default_quality("high")
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// ffmpeg binary, looked up on PATH when not absolute
    pub ffmpeg_path: PathBuf,

    /// ffprobe binary, looked up on PATH when not absolute
    pub ffprobe_path: PathBuf,

    /// Directory for temporary files (defaults to the system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// Quality tier used when an operation does not name one
    pub default_quality: String,

    /// Audio bitrate in bits per second used when an operation does not set one
    pub default_audio_bitrate: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            temp_dir: None,
            default_quality: DEFAULT_QUALITY.to_string(),
            default_audio_bitrate: DEFAULT_AUDIO_BITRATE,
        }
    }
}

impl CoreConfig {
    /// Defaults with `MEDIAFORGE_*` environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Applies overrides from a variable lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = lookup(ENV_FFMPEG) {
            self.ffmpeg_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_FFPROBE) {
            self.ffprobe_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(ENV_TEMP_DIR) {
            self.temp_dir = Some(PathBuf::from(dir));
        }
        if let Some(quality) = lookup(ENV_QUALITY) {
            self.default_quality = quality.trim().to_ascii_lowercase();
        }
        if let Some(bitrate) = lookup(ENV_AUDIO_BITRATE).and_then(|b| parse_bitrate(&b)) {
            self.default_audio_bitrate = bitrate;
        }
    }

    /// Checks the configuration for values the engine cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.ffmpeg_path.as_os_str().is_empty() {
            return Err(invalid_options("ffmpeg path must not be empty"));
        }
        if self.ffprobe_path.as_os_str().is_empty() {
            return Err(invalid_options("ffprobe path must not be empty"));
        }
        if find_quality(&self.default_quality).is_none() {
            return Err(invalid_options(format!(
                "Unknown default quality '{}'",
                self.default_quality
            )));
        }
        if self.default_audio_bitrate == 0 {
            return Err(invalid_options("Default audio bitrate must be greater than zero"));
        }
        Ok(())
    }

    /// Directory for temporary files: the configured one or the system default.
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
