// ============================================================================
// mediaforge-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig starting from the defaults. Validation is
// left to CoreConfig::validate so a builder never panics.

use std::path::PathBuf;

use super::CoreConfig;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one read from the environment.
    #[must_use]
    pub fn from_config(config: CoreConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg_path = path.into();
        self
    }

    #[must_use]
    pub fn ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffprobe_path = path.into();
        self
    }

    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn default_quality(mut self, quality: &str) -> Self {
        self.config.default_quality = quality.trim().to_ascii_lowercase();
        self
    }

    /// Default audio bitrate in bits per second.
    #[must_use]
    pub fn default_audio_bitrate(mut self, bits_per_second: u64) -> Self {
        self.config.default_audio_bitrate = bits_per_second;
        self
    }

    /// Builds the CoreConfig instance.
    #[must_use]
    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfigBuilder::new().build();
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let config = CoreConfigBuilder::new()
            .ffmpeg_path("/usr/local/bin/ffmpeg")
            .ffprobe_path("/usr/local/bin/ffprobe")
            .temp_dir("/tmp/mf")
            .default_quality("LOW")
            .default_audio_bitrate(96_000)
            .build();
        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.temp_dir, Some(PathBuf::from("/tmp/mf")));
        assert_eq!(config.default_quality, "low");
        assert_eq!(config.default_audio_bitrate, 96_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_from_config() {
        let base = CoreConfig { default_quality: "high".into(), ..Default::default() };
        let config = CoreConfigBuilder::from_config(base).ffmpeg_path("ff").build();
        assert_eq!(config.default_quality, "high");
        assert_eq!(config.ffmpeg_path, PathBuf::from("ff"));
    }
}
