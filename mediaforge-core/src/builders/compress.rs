//! Compress: single-pass constrained-bitrate encode toward a target.

use std::path::PathBuf;

use super::{BuildResult, input_extension, log_built};
use crate::bitrate::{BitrateInputs, CompressTarget, calculate_audio_bitrate, calculate_video_bitrate};
use crate::error::{CoreResult, invalid_options};
use crate::external::ffmpeg_builder::{FfmpegArgs, VideoFilterChain};
use crate::media::MediaInfo;
use crate::output_path::{OutputSuffix, resolve_output_path};
use crate::presets::{
    CrfSupport, DEFAULT_AUDIO_BITRATE, FormatPreset, Resolution, crf_support, find_format, resolve_video_codec,
};
use crate::utils::{extension_lowercase, format_kbps};

/// Audio encoders without a bitrate knob.
const LOSSLESS_AUDIO_CODECS: &[&str] = &["flac", "pcm_s16le"];

/// Video encoder used when none is requested.
pub const DEFAULT_COMPRESS_CODEC: &str = "libx264";

/// Encoder speed preset used when none is requested.
pub const DEFAULT_COMPRESS_SPEED: &str = "medium";

#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub target: CompressTarget,
    pub video_codec: Option<String>,
    /// bits per second
    pub audio_bitrate: Option<u64>,
    /// Encoder speed preset (`ultrafast` .. `veryslow`)
    pub speed: Option<String>,
    pub resolution: Option<String>,
    pub overwrite: bool,
}

impl CompressOptions {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, target: CompressTarget) -> Self {
        Self {
            input: input.into(),
            output: None,
            target,
            video_codec: None,
            audio_bitrate: None,
            speed: None,
            resolution: None,
            overwrite: false,
        }
    }
}

pub fn build_compress(options: &CompressOptions, info: Option<&MediaInfo>) -> CoreResult<BuildResult> {
    let output_path = resolve_output_path(
        &options.input,
        options.output.as_deref(),
        &input_extension(&options.input),
        OutputSuffix::Compressed,
    );
    let audio_preset = extension_lowercase(&output_path)
        .and_then(|ext| find_format(&ext))
        .filter(|preset| preset.is_audio_only());
    if let Some(preset) = audio_preset {
        return build_audio_compress(options, info, preset, output_path);
    }

    let codec = options
        .video_codec
        .as_deref()
        .map_or_else(|| DEFAULT_COMPRESS_CODEC.to_string(), resolve_video_codec);
    if codec == crate::presets::COPY_CODEC {
        return Err(invalid_options("Compression needs a real video encoder, not copy"));
    }
    let resolution = options.resolution.as_deref().map(Resolution::parse).transpose()?;
    let audio_bitrate = options.audio_bitrate.unwrap_or(DEFAULT_AUDIO_BITRATE);

    let inputs = BitrateInputs {
        duration: info.and_then(MediaInfo::known_duration),
        file_size: info.and_then(|i| i.size_bytes),
        audio_bitrate: Some(audio_bitrate),
    };
    let video_bitrate = calculate_video_bitrate(options.target, inputs)?;
    let maxrate = video_bitrate.saturating_mul(3) / 2;
    let bufsize = video_bitrate.saturating_mul(2);

    let mut args = FfmpegArgs::new(options.overwrite)
        .input(&options.input)
        .option("-c:v", codec.as_str())
        .option("-b:v", format_kbps(video_bitrate))
        .option("-maxrate", format_kbps(maxrate))
        .option("-bufsize", format_kbps(bufsize));
    if crf_support(&codec) == Some(CrfSupport::WithSpeedPreset) {
        args = args.option("-preset", options.speed.as_deref().unwrap_or(DEFAULT_COMPRESS_SPEED));
    }

    let source = info.and_then(MediaInfo::dimensions);
    let args = args
        .video_filters(VideoFilterChain::new().add_optional(resolution.map(|r| r.scale_filter(source))))
        .option("-c:a", "aac")
        .option("-b:a", format_kbps(audio_bitrate))
        .output(&output_path);

    let result = BuildResult::single(args, output_path);
    log_built("compress", &result);
    Ok(result)
}

/// Audio-only containers: drop video and spend the whole target on audio.
fn build_audio_compress(
    options: &CompressOptions,
    info: Option<&MediaInfo>,
    preset: &FormatPreset,
    output_path: PathBuf,
) -> CoreResult<BuildResult> {
    if options.video_codec.is_some() || options.resolution.is_some() {
        return Err(invalid_options(format!(
            "{} output has no video stream; drop the video codec and resolution options",
            preset.name
        )));
    }
    let codec = preset.audio_codec.unwrap_or("aac");
    if LOSSLESS_AUDIO_CODECS.contains(&codec) {
        return Err(invalid_options(format!(
            "{} is lossless and cannot be compressed to a bitrate; pick a lossy output such as .mp3",
            preset.name
        )));
    }

    let inputs = BitrateInputs {
        duration: info.and_then(MediaInfo::known_duration),
        file_size: info.and_then(|i| i.size_bytes),
        audio_bitrate: None,
    };
    let audio_bitrate = calculate_audio_bitrate(options.target, inputs)?;

    let args = FfmpegArgs::new(options.overwrite)
        .input(&options.input)
        .arg("-vn")
        .option("-c:a", codec)
        .option("-b:a", format_kbps(audio_bitrate))
        .output(&output_path);

    let result = BuildResult::single(args, output_path);
    log_built("compress", &result);
    Ok(result)
}
