//! Convert: re-encode or remux into another format.

use std::path::PathBuf;

use super::{
    BuildResult, log_built, parse_optional_bitrate, require_non_negative, require_positive,
};
use crate::builders::trim::TrimEnd;
use crate::error::{CoreResult, invalid_options};
use crate::external::ffmpeg_builder::{FfmpegArgs, VideoFilterChain};
use crate::media::MediaInfo;
use crate::output_path::{OutputSuffix, resolve_output_path};
use crate::presets::{
    COPY_CODEC, CrfSupport, FormatPreset, MediaKind, QualityPreset, Resolution, crf_support,
    find_format, find_quality, quality_or_default, resolve_audio_codec, resolve_video_codec,
};
use crate::utils::{extension_lowercase, format_decimal, format_kbps};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    /// Target format name; falls back to the output extension
    pub format: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    /// Quality tier name (`low` .. `lossless`), `medium` when unset
    pub quality: Option<String>,
    /// Overrides the tier's CRF
    pub crf: Option<u8>,
    /// Preset label or `WIDTHxHEIGHT`
    pub resolution: Option<String>,
    pub frame_rate: Option<f64>,
    pub audio_bitrate: Option<String>,
    pub start: Option<f64>,
    pub end: Option<TrimEnd>,
    pub no_video: bool,
    pub no_audio: bool,
    pub overwrite: bool,
}

impl ConvertOptions {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self { input: input.into(), ..Default::default() }
    }
}

/// Picks the target format: explicit name first, then the output extension.
fn target_format(options: &ConvertOptions) -> CoreResult<&'static FormatPreset> {
    if let Some(name) = options.format.as_deref() {
        return find_format(name).ok_or_else(|| invalid_options(format!("Unknown format '{name}'")));
    }
    let Some(output) = options.output.as_deref() else {
        return Err(invalid_options("No target format: pass a format name or an output path"));
    };
    let ext = extension_lowercase(output).ok_or_else(|| {
        invalid_options(format!("Cannot infer a format from '{}'", output.display()))
    })?;
    find_format(&ext).ok_or_else(|| invalid_options(format!("Unknown output format '{ext}'")))
}

fn quality_tier(options: &ConvertOptions) -> CoreResult<&'static QualityPreset> {
    match options.quality.as_deref() {
        Some(name) => {
            find_quality(name).ok_or_else(|| invalid_options(format!("Unknown quality '{name}'")))
        }
        None => Ok(quality_or_default(None)),
    }
}

pub fn build_convert(options: &ConvertOptions, info: Option<&MediaInfo>) -> CoreResult<BuildResult> {
    let format = target_format(options)?;
    let drop_video = options.no_video || format.kind == MediaKind::Audio;
    let drop_audio = options.no_audio || format.audio_codec.is_none();
    if drop_video && drop_audio {
        return Err(invalid_options(format!(
            "Cannot disable both video and audio: the {} output would contain no streams",
            format.name
        )));
    }
    let quality = quality_tier(options)?;
    let resolution = options.resolution.as_deref().map(Resolution::parse).transpose()?;
    let frame_rate = options.frame_rate.map(|r| require_positive("Frame rate", r)).transpose()?;
    let audio_bitrate = parse_optional_bitrate(options.audio_bitrate.as_deref())?;
    let start = options.start.map(|s| require_non_negative("Start time", s)).transpose()?;
    if let Some(end) = options.end {
        end.length_from(start.unwrap_or(0.0))?;
    }

    let output_path = resolve_output_path(
        &options.input,
        options.output.as_deref(),
        format.extension,
        OutputSuffix::Converted,
    );

    let mut args = FfmpegArgs::new(options.overwrite).input(&options.input);
    if let Some(start) = start {
        args = args.time("-ss", start);
    }
    args = match options.end {
        Some(TrimEnd::End(end)) => args.time("-to", end),
        Some(TrimEnd::Duration(duration)) => args.time("-t", duration),
        None => args,
    };

    // ---- Video stream ----
    if drop_video {
        args = args.arg("-vn");
    } else {
        let codec = options
            .video_codec
            .as_deref()
            .map(resolve_video_codec)
            .or_else(|| format.video_codec.map(str::to_string));
        let copying = codec.as_deref() == Some(COPY_CODEC);
        if copying && (resolution.is_some() || frame_rate.is_some()) {
            return Err(invalid_options(
                "Resolution and frame rate changes need re-encoding; they cannot be combined with video codec copy",
            ));
        }

        if let Some(codec) = codec.as_deref() {
            args = args.option("-c:v", codec);
            let crf = options.crf.unwrap_or(quality.crf).to_string();
            args = match crf_support(codec) {
                Some(CrfSupport::WithSpeedPreset) => {
                    args.option("-crf", crf).option("-preset", quality.speed)
                }
                Some(CrfSupport::WithZeroBitrate) => args.option("-crf", crf).option("-b:v", "0"),
                Some(CrfSupport::CrfOnly) => args.option("-crf", crf),
                None => args,
            };
        }

        let source = info.and_then(MediaInfo::dimensions);
        let filters = VideoFilterChain::new()
            .add_optional(resolution.map(|r| r.scale_filter(source)));
        args = args
            .video_filters(filters)
            .option_if("-r", frame_rate.map(format_decimal));

        if format.kind == MediaKind::Image {
            args = args.option("-frames:v", "1");
        }
    }

    // ---- Audio stream ----
    if drop_audio {
        args = args.arg("-an");
    } else {
        let codec = options
            .audio_codec
            .as_deref()
            .map(resolve_audio_codec)
            .or_else(|| format.audio_codec.map(str::to_string));
        let copying = codec.as_deref() == Some(COPY_CODEC);
        args = args.option_if("-c:a", codec);
        if !copying {
            args = args.option_if("-b:a", audio_bitrate.map(format_kbps));
        }
    }

    // Explicit outputs may carry an extension the muxer cannot infer from
    let extension_matches = extension_lowercase(&output_path).as_deref() == Some(format.extension);
    if !extension_matches {
        args = args.option("-f", format.container);
    }

    let result = BuildResult::single(args.output(&output_path), output_path);
    log_built("convert", &result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::media::VideoStreamInfo;

    fn mp4_to(format: &str) -> ConvertOptions {
        ConvertOptions { format: Some(format.into()), ..ConvertOptions::new("/v/a.mp4") }
    }

    fn hd_info() -> MediaInfo {
        MediaInfo {
            duration: Some(60.0),
            video: Some(VideoStreamInfo {
                codec: "h264".into(),
                width: 1920,
                height: 1080,
                frame_rate: Some(30.0),
                pixel_format: None,
                bit_rate: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_convert_to_mkv_uses_preset_codecs_and_medium_quality() {
        let result = build_convert(&mp4_to("mkv"), None).unwrap();
        assert_eq!(result.output_path, PathBuf::from("/v/a.mkv"));
        assert_eq!(
            result.args,
            vec![
                "-i", "/v/a.mp4", "-c:v", "libx264", "-crf", "23", "-preset", "medium", "-c:a",
                "aac", "/v/a.mkv"
            ]
        );
    }

    #[test]
    fn test_audio_format_forces_vn() {
        let result = build_convert(&mp4_to("mp3"), None).unwrap();
        assert!(result.contains("-vn"));
        assert!(!result.contains("-c:v"));
        assert!(!result.contains("-vf"));
        assert_eq!(result.value_of("-c:a"), Some("libmp3lame"));
        assert_eq!(result.output_path, PathBuf::from("/v/a.mp3"));
    }

    #[test]
    fn test_image_format_takes_one_frame_without_audio() {
        let result = build_convert(&mp4_to("png"), None).unwrap();
        assert_eq!(result.value_of("-frames:v"), Some("1"));
        assert!(result.contains("-an"));
        assert!(!result.contains("-crf"));
    }

    #[test]
    fn test_copy_never_gets_crf() {
        let options = ConvertOptions {
            video_codec: Some("copy".into()),
            audio_codec: Some("copy".into()),
            audio_bitrate: Some("192k".into()),
            ..mp4_to("mkv")
        };
        let result = build_convert(&options, None).unwrap();
        assert_eq!(result.value_of("-c:v"), Some("copy"));
        assert!(!result.contains("-crf"));
        assert!(!result.contains("-preset"));
        assert!(!result.contains("-b:a"));
    }

    #[test]
    fn test_copy_with_scaling_is_rejected() {
        let options = ConvertOptions {
            video_codec: Some("copy".into()),
            resolution: Some("720p".into()),
            ..mp4_to("mkv")
        };
        assert!(matches!(build_convert(&options, None), Err(CoreError::InvalidOptions(_))));
    }

    #[test]
    fn test_explicit_codec_and_crf_override() {
        let options = ConvertOptions {
            video_codec: Some("vp9".into()),
            quality: Some("high".into()),
            crf: Some(31),
            ..mp4_to("webm")
        };
        let result = build_convert(&options, None).unwrap();
        assert_eq!(result.value_of("-c:v"), Some("libvpx-vp9"));
        assert_eq!(result.value_of("-crf"), Some("31"));
        assert_eq!(result.value_of("-b:v"), Some("0"));
        assert!(!result.contains("-preset"));
    }

    #[test]
    fn test_unknown_codec_passes_through_without_crf() {
        let options = ConvertOptions { video_codec: Some("h264_nvenc".into()), ..mp4_to("mp4") };
        let result = build_convert(&options, None).unwrap();
        assert_eq!(result.value_of("-c:v"), Some("h264_nvenc"));
        assert!(!result.contains("-crf"));
        // same extension as the input
        assert_eq!(result.output_path, PathBuf::from("/v/a_converted.mp4"));
    }

    #[test]
    fn test_optional_flags_only_when_requested() {
        let options = ConvertOptions {
            resolution: Some("720p".into()),
            frame_rate: Some(24.0),
            audio_bitrate: Some("160k".into()),
            start: Some(5.0),
            end: Some(TrimEnd::Duration(10.0)),
            ..mp4_to("mkv")
        };
        let result = build_convert(&options, Some(&hd_info())).unwrap();
        assert_eq!(result.value_of("-vf"), Some("scale=1280:720"));
        assert_eq!(result.value_of("-r"), Some("24"));
        assert_eq!(result.value_of("-b:a"), Some("160k"));
        assert_eq!(result.value_of("-ss"), Some("5"));
        assert_eq!(result.value_of("-t"), Some("10"));
        assert!(result.position("-ss").unwrap() > result.position("-i").unwrap());

        let plain = build_convert(&mp4_to("mkv"), Some(&hd_info())).unwrap();
        for flag in ["-vf", "-r", "-b:a", "-ss", "-to", "-t"] {
            assert!(!plain.contains(flag), "{flag} should not be emitted");
        }
    }

    #[test]
    fn test_format_from_output_extension() {
        let options = ConvertOptions { output: Some("/out/b.webm".into()), ..ConvertOptions::new("/v/a.mp4") };
        let result = build_convert(&options, None).unwrap();
        assert_eq!(result.output_path, PathBuf::from("/out/b.webm"));
        assert_eq!(result.value_of("-c:a"), Some("libopus"));
        assert!(!result.contains("-f"));
    }

    #[test]
    fn test_validation_errors() {
        assert!(build_convert(&ConvertOptions::new("/v/a.mp4"), None).is_err());
        assert!(build_convert(&mp4_to("xyz"), None).is_err());
        assert!(build_convert(&ConvertOptions { quality: Some("ultra".into()), ..mp4_to("mkv") }, None).is_err());
        assert!(build_convert(&ConvertOptions { no_video: true, no_audio: true, ..mp4_to("mkv") }, None).is_err());
        assert!(build_convert(&ConvertOptions { frame_rate: Some(0.0), ..mp4_to("mkv") }, None).is_err());
        let backwards = ConvertOptions { start: Some(10.0), end: Some(TrimEnd::End(5.0)), ..mp4_to("mkv") };
        assert!(build_convert(&backwards, None).is_err());
    }

    #[test]
    fn test_disabled_stream_short_circuits() {
        let result = build_convert(
            &ConvertOptions { no_audio: true, audio_codec: Some("mp3".into()), ..mp4_to("mkv") },
            None,
        )
        .unwrap();
        assert!(result.contains("-an"));
        assert!(!result.contains("-c:a"));

        let result = build_convert(
            &ConvertOptions { no_video: true, resolution: Some("720p".into()), ..mp4_to("mkv") },
            None,
        )
        .unwrap();
        assert!(result.contains("-vn"));
        assert!(!result.contains("-vf"));
    }

    #[test]
    fn test_audio_format_with_no_audio_leaves_nothing() {
        let mut options = mp4_to("mp3");
        options.no_audio = true;
        assert!(matches!(build_convert(&options, None), Err(CoreError::InvalidOptions(_))));

        let mut options = mp4_to("gif");
        options.no_video = true;
        assert!(matches!(build_convert(&options, None), Err(CoreError::InvalidOptions(_))));
    }
}
