//! Extract: pull the audio track, the video track, or still frames.

use std::path::PathBuf;

use super::{BuildResult, input_extension, log_built, parse_optional_bitrate, require_non_negative, require_positive};
use crate::error::{CoreResult, invalid_options};
use crate::external::ffmpeg_builder::{FfmpegArgs, VideoFilterChain};
use crate::output_path::{OutputSuffix, is_sequence_template, resolve_output_path, resolve_pattern_path};
use crate::presets::{FormatPreset, MediaKind, find_format};
use crate::utils::{extension_lowercase, format_decimal, format_kbps};

/// Frame rate used for frame sequences when none is requested.
pub const DEFAULT_FRAME_RATE: f64 = 1.0;

/// Which frames to export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSelection {
    /// One frame at this position (seconds)
    At(f64),
    /// A frame sequence at this many frames per second
    Every(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtractMode {
    Audio,
    Video,
    Frames(FrameSelection),
}

impl ExtractMode {
    /// Turns the raw flags into a mode. A frame position or rate implies frame
    /// mode; exactly one of audio, video and frames must end up selected.
    pub fn from_flags(
        audio: bool,
        video: bool,
        frames: bool,
        at: Option<f64>,
        rate: Option<f64>,
    ) -> CoreResult<Self> {
        let frames = frames || at.is_some() || rate.is_some();
        let selected = [audio, video, frames].iter().filter(|set| **set).count();
        if selected != 1 {
            return Err(invalid_options(format!(
                "Exactly one of audio, video or frames must be extracted ({selected} selected)"
            )));
        }
        if audio {
            return Ok(Self::Audio);
        }
        if video {
            return Ok(Self::Video);
        }
        let selection = match (at, rate) {
            (Some(_), Some(_)) => {
                return Err(invalid_options("A frame position and a frame rate cannot both be set"));
            }
            (Some(at), None) => FrameSelection::At(require_non_negative("Frame position", at)?),
            (None, Some(rate)) => FrameSelection::Every(require_positive("Frame rate", rate)?),
            (None, None) => FrameSelection::Every(DEFAULT_FRAME_RATE),
        };
        Ok(Self::Frames(selection))
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub mode: ExtractMode,
    /// Audio format (default mp3) or image format for frames (default png)
    pub format: Option<String>,
    /// Replaces the codec's default quality flag in audio mode
    pub audio_bitrate: Option<String>,
    pub overwrite: bool,
}

impl ExtractOptions {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, mode: ExtractMode) -> Self {
        Self { input: input.into(), output: None, mode, format: None, audio_bitrate: None, overwrite: false }
    }
}

/// Resolves the format for a mode, from the explicit name or the output
/// extension, and checks that it holds the right kind of media.
fn format_for(options: &ExtractOptions, kind: MediaKind, default: &str) -> CoreResult<&'static FormatPreset> {
    let name = options
        .format
        .clone()
        .or_else(|| options.output.as_deref().and_then(extension_lowercase))
        .unwrap_or_else(|| default.to_string());
    let preset = find_format(&name).ok_or_else(|| invalid_options(format!("Unknown format '{name}'")))?;
    if preset.kind != kind {
        return Err(invalid_options(format!(
            "Format '{}' cannot hold extracted {}",
            preset.name,
            match kind {
                MediaKind::Audio => "audio",
                MediaKind::Image => "frames",
                MediaKind::Video => "video",
            }
        )));
    }
    Ok(preset)
}

/// Codec-specific quality flag for an audio format.
fn audio_quality_args(format: &FormatPreset) -> Option<(&'static str, &'static str)> {
    match format.name {
        "mp3" => Some(("-q:a", "2")),
        "ogg" => Some(("-q:a", "5")),
        "aac" | "m4a" => Some(("-b:a", "192k")),
        "opus" => Some(("-b:a", "128k")),
        _ => None,
    }
}

pub fn build_extract(options: &ExtractOptions) -> CoreResult<BuildResult> {
    let args = FfmpegArgs::new(options.overwrite);

    let result = match options.mode {
        ExtractMode::Audio => {
            let format = format_for(options, MediaKind::Audio, "mp3")?;
            let bitrate = parse_optional_bitrate(options.audio_bitrate.as_deref())?;
            let codec = format.audio_codec.unwrap_or("copy");
            let output_path = resolve_output_path(
                &options.input,
                options.output.as_deref(),
                format.extension,
                OutputSuffix::Audio,
            );

            let mut args = args.input(&options.input).arg("-vn").option("-c:a", codec);
            args = match (bitrate, audio_quality_args(format)) {
                (Some(bitrate), _) => args.option("-b:a", format_kbps(bitrate)),
                (None, Some((flag, value))) => args.option(flag, value),
                (None, None) => args,
            };
            BuildResult::single(args.output(&output_path), output_path)
        }
        ExtractMode::Video => {
            let output_path = resolve_output_path(
                &options.input,
                options.output.as_deref(),
                &input_extension(&options.input),
                OutputSuffix::Video,
            );
            let args = args
                .input(&options.input)
                .arg("-an")
                .option("-c:v", "copy")
                .output(&output_path);
            BuildResult::single(args, output_path)
        }
        ExtractMode::Frames(FrameSelection::At(at)) => {
            let format = format_for(options, MediaKind::Image, "png")?;
            let output_path =
                resolve_pattern_path(&options.input, options.output.as_deref(), "_frame", format.extension);
            let args = args
                .time("-ss", at)
                .input(&options.input)
                .option("-frames:v", "1")
                .output(&output_path);
            BuildResult::single(args, output_path)
        }
        ExtractMode::Frames(FrameSelection::Every(rate)) => {
            let format = format_for(options, MediaKind::Image, "png")?;
            let output_path =
                resolve_pattern_path(&options.input, options.output.as_deref(), "_frame_%04d", format.extension);
            let filters = VideoFilterChain::new().add_filter(format!("fps={}", format_decimal(rate)));
            let args = args.input(&options.input).video_filters(filters).output(&output_path);
            BuildResult {
                args,
                is_template: is_sequence_template(&output_path),
                output_path,
            }
        }
    };

    log_built("extract", &result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_mode_exclusivity() {
        assert!(matches!(ExtractMode::from_flags(false, false, false, None, None), Err(CoreError::InvalidOptions(_))));
        assert!(ExtractMode::from_flags(true, true, false, None, None).is_err());
        assert!(ExtractMode::from_flags(true, false, false, Some(3.0), None).is_err());
        assert!(ExtractMode::from_flags(false, false, true, Some(3.0), Some(2.0)).is_err());
        assert_eq!(ExtractMode::from_flags(true, false, false, None, None).unwrap(), ExtractMode::Audio);
        assert_eq!(
            ExtractMode::from_flags(false, false, false, Some(3.0), None).unwrap(),
            ExtractMode::Frames(FrameSelection::At(3.0))
        );
        assert_eq!(
            ExtractMode::from_flags(false, false, true, None, None).unwrap(),
            ExtractMode::Frames(FrameSelection::Every(1.0))
        );
    }

    #[test]
    fn test_audio_mp3_uses_vbr() {
        let result = build_extract(&ExtractOptions::new("/v/talk.mp4", ExtractMode::Audio)).unwrap();
        assert_eq!(result.args, vec!["-i", "/v/talk.mp4", "-vn", "-c:a", "libmp3lame", "-q:a", "2", "/v/talk.mp3"]);
    }

    #[test]
    fn test_audio_quality_per_format() {
        let mut options = ExtractOptions::new("/v/talk.mp4", ExtractMode::Audio);
        options.format = Some("ogg".into());
        assert_eq!(build_extract(&options).unwrap().value_of("-q:a"), Some("5"));

        options.format = Some("m4a".into());
        assert_eq!(build_extract(&options).unwrap().value_of("-b:a"), Some("192k"));

        options.format = Some("opus".into());
        assert_eq!(build_extract(&options).unwrap().value_of("-b:a"), Some("128k"));

        options.format = Some("flac".into());
        let result = build_extract(&options).unwrap();
        assert!(!result.contains("-b:a") && !result.contains("-q:a"));

        options.format = Some("mp3".into());
        options.audio_bitrate = Some("320k".into());
        let result = build_extract(&options).unwrap();
        assert_eq!(result.value_of("-b:a"), Some("320k"));
        assert!(!result.contains("-q:a"));
    }

    #[test]
    fn test_audio_rejects_video_format() {
        let mut options = ExtractOptions::new("/v/talk.mp4", ExtractMode::Audio);
        options.format = Some("mkv".into());
        assert!(matches!(build_extract(&options), Err(CoreError::InvalidOptions(_))));
    }

    #[test]
    fn test_video_stream_copy() {
        let result = build_extract(&ExtractOptions::new("/v/talk.mp4", ExtractMode::Video)).unwrap();
        assert_eq!(result.args, vec!["-i", "/v/talk.mp4", "-an", "-c:v", "copy", "/v/talk_video.mp4"]);
    }

    #[test]
    fn test_single_frame() {
        let options = ExtractOptions::new("/v/talk.mp4", ExtractMode::Frames(FrameSelection::At(12.5)));
        let result = build_extract(&options).unwrap();
        assert_eq!(result.args, vec!["-ss", "12.5", "-i", "/v/talk.mp4", "-frames:v", "1", "/v/talk_frame.png"]);
        assert!(!result.is_template);
    }

    #[test]
    fn test_frame_sequence() {
        let options = ExtractOptions::new("/v/talk.mp4", ExtractMode::Frames(FrameSelection::Every(0.5)));
        let result = build_extract(&options).unwrap();
        assert_eq!(result.args, vec!["-i", "/v/talk.mp4", "-vf", "fps=0.5", "/v/talk_frame_%04d.png"]);
        assert!(result.is_template);
    }
}
