//! Preset catalog: static tables mapping human vocabulary to encoder settings.
//!
//! Every lookup either resolves a preset or falls back in a well-defined way.
//! Codec aliases that are not in the tables are passed through verbatim so
//! that any encoder the installed ffmpeg knows can still be requested.

use serde::Serialize;

use crate::error::{CoreResult, invalid_options};

/// Kind of media a container holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// A named output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatPreset {
    pub name: &'static str,
    /// ffmpeg muxer name
    pub container: &'static str,
    /// `None` for audio-only containers
    pub video_codec: Option<&'static str>,
    /// `None` for containers without an audio stream
    pub audio_codec: Option<&'static str>,
    pub extension: &'static str,
    pub description: &'static str,
    pub kind: MediaKind,
}

impl FormatPreset {
    #[must_use]
    pub fn is_audio_only(&self) -> bool {
        self.kind == MediaKind::Audio
    }
}

/// A quality tier. CRF decreases as quality increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityPreset {
    pub name: &'static str,
    pub crf: u8,
    /// x264/x265 `-preset` label
    pub speed: &'static str,
    /// bits per second
    pub audio_bitrate: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionPreset {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Default audio bitrate when neither the user nor a quality tier provides one.
pub const DEFAULT_AUDIO_BITRATE: u64 = 128_000;

/// Default quality tier name.
pub const DEFAULT_QUALITY: &str = "medium";

pub const FORMAT_PRESETS: &[FormatPreset] = &[
    FormatPreset { name: "mp4", container: "mp4", video_codec: Some("libx264"), audio_codec: Some("aac"), extension: "mp4", description: "MPEG-4 (H.264 + AAC), plays everywhere", kind: MediaKind::Video },
    FormatPreset { name: "mkv", container: "matroska", video_codec: Some("libx264"), audio_codec: Some("aac"), extension: "mkv", description: "Matroska, flexible container", kind: MediaKind::Video },
    FormatPreset { name: "webm", container: "webm", video_codec: Some("libvpx-vp9"), audio_codec: Some("libopus"), extension: "webm", description: "WebM (VP9 + Opus) for the web", kind: MediaKind::Video },
    FormatPreset { name: "mov", container: "mov", video_codec: Some("libx264"), audio_codec: Some("aac"), extension: "mov", description: "QuickTime movie", kind: MediaKind::Video },
    FormatPreset { name: "avi", container: "avi", video_codec: Some("mpeg4"), audio_codec: Some("libmp3lame"), extension: "avi", description: "AVI (MPEG-4 Part 2 + MP3), legacy players", kind: MediaKind::Video },
    FormatPreset { name: "gif", container: "gif", video_codec: Some("gif"), audio_codec: None, extension: "gif", description: "Animated GIF", kind: MediaKind::Video },
    FormatPreset { name: "mp3", container: "mp3", video_codec: None, audio_codec: Some("libmp3lame"), extension: "mp3", description: "MP3 audio", kind: MediaKind::Audio },
    FormatPreset { name: "aac", container: "adts", video_codec: None, audio_codec: Some("aac"), extension: "aac", description: "Raw AAC audio", kind: MediaKind::Audio },
    FormatPreset { name: "m4a", container: "ipod", video_codec: None, audio_codec: Some("aac"), extension: "m4a", description: "AAC audio in an MPEG-4 container", kind: MediaKind::Audio },
    FormatPreset { name: "wav", container: "wav", video_codec: None, audio_codec: Some("pcm_s16le"), extension: "wav", description: "Uncompressed PCM audio", kind: MediaKind::Audio },
    FormatPreset { name: "flac", container: "flac", video_codec: None, audio_codec: Some("flac"), extension: "flac", description: "Lossless FLAC audio", kind: MediaKind::Audio },
    FormatPreset { name: "ogg", container: "ogg", video_codec: None, audio_codec: Some("libvorbis"), extension: "ogg", description: "Ogg Vorbis audio", kind: MediaKind::Audio },
    FormatPreset { name: "opus", container: "opus", video_codec: None, audio_codec: Some("libopus"), extension: "opus", description: "Opus audio", kind: MediaKind::Audio },
    FormatPreset { name: "png", container: "image2", video_codec: Some("png"), audio_codec: None, extension: "png", description: "PNG still image", kind: MediaKind::Image },
    FormatPreset { name: "jpg", container: "image2", video_codec: Some("mjpeg"), audio_codec: None, extension: "jpg", description: "JPEG still image", kind: MediaKind::Image },
    FormatPreset { name: "webp", container: "webp", video_codec: Some("libwebp"), audio_codec: None, extension: "webp", description: "WebP still image", kind: MediaKind::Image },
];

pub const QUALITY_PRESETS: &[QualityPreset] = &[
    QualityPreset { name: "low", crf: 28, speed: "faster", audio_bitrate: 96_000 },
    QualityPreset { name: "medium", crf: 23, speed: "medium", audio_bitrate: 128_000 },
    QualityPreset { name: "high", crf: 18, speed: "slow", audio_bitrate: 192_000 },
    QualityPreset { name: "veryhigh", crf: 15, speed: "slower", audio_bitrate: 256_000 },
    QualityPreset { name: "lossless", crf: 0, speed: "veryslow", audio_bitrate: 320_000 },
];

pub const RESOLUTION_PRESETS: &[ResolutionPreset] = &[
    ResolutionPreset { label: "2160p", width: 3840, height: 2160 },
    ResolutionPreset { label: "1440p", width: 2560, height: 1440 },
    ResolutionPreset { label: "1080p", width: 1920, height: 1080 },
    ResolutionPreset { label: "720p", width: 1280, height: 720 },
    ResolutionPreset { label: "480p", width: 854, height: 480 },
    ResolutionPreset { label: "360p", width: 640, height: 360 },
    ResolutionPreset { label: "240p", width: 426, height: 240 },
];

/// Short video codec names and the encoders they resolve to.
pub const VIDEO_CODEC_ALIASES: &[(&str, &str)] = &[
    ("h264", "libx264"),
    ("avc", "libx264"),
    ("x264", "libx264"),
    ("h265", "libx265"),
    ("hevc", "libx265"),
    ("x265", "libx265"),
    ("vp8", "libvpx"),
    ("vp9", "libvpx-vp9"),
    ("av1", "libsvtav1"),
    ("mpeg4", "mpeg4"),
    ("prores", "prores_ks"),
    ("gif", "gif"),
    ("copy", COPY_CODEC),
];

pub const AUDIO_CODEC_ALIASES: &[(&str, &str)] = &[
    ("aac", "aac"),
    ("mp3", "libmp3lame"),
    ("opus", "libopus"),
    ("vorbis", "libvorbis"),
    ("flac", "flac"),
    ("wav", "pcm_s16le"),
    ("pcm", "pcm_s16le"),
    ("ac3", "ac3"),
    ("copy", COPY_CODEC),
];

/// Stream pass-through identifier.
pub const COPY_CODEC: &str = "copy";

/// Looks up a format by name, accepting `jpeg` for `jpg` and a leading dot.
#[must_use]
pub fn find_format(name: &str) -> Option<&'static FormatPreset> {
    let name = name.trim().trim_start_matches('.').to_ascii_lowercase();
    let name = match name.as_str() {
        "jpeg" => "jpg",
        "matroska" => "mkv",
        other => other,
    };
    FORMAT_PRESETS.iter().find(|preset| preset.name == name)
}

#[must_use]
pub fn find_quality(name: &str) -> Option<&'static QualityPreset> {
    let name = name.trim().to_ascii_lowercase();
    QUALITY_PRESETS.iter().find(|preset| preset.name == name)
}

/// Looks up a quality tier, falling back to `medium`.
#[must_use]
pub fn quality_or_default(name: Option<&str>) -> &'static QualityPreset {
    name.and_then(find_quality)
        .or_else(|| find_quality(DEFAULT_QUALITY))
        .unwrap_or(&QUALITY_PRESETS[1])
}

#[must_use]
pub fn find_resolution(label: &str) -> Option<&'static ResolutionPreset> {
    let label = label.trim().to_ascii_lowercase();
    let label = match label.as_str() {
        "4k" | "uhd" => "2160p",
        "2k" | "qhd" => "1440p",
        "fhd" => "1080p",
        "hd" => "720p",
        "sd" => "480p",
        other => other,
    };
    RESOLUTION_PRESETS.iter().find(|preset| preset.label == label)
}

/// Requested output size, before it is turned into a scale filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A named tier; the height follows the source aspect ratio.
    Preset(&'static ResolutionPreset),
    /// `WIDTHxHEIGHT` given verbatim.
    Explicit { width: u32, height: u32 },
}

impl Resolution {
    /// Parses a preset label (`720p`, `4k`) or an explicit `1280x720`.
    pub fn parse(input: &str) -> CoreResult<Self> {
        if let Some(preset) = find_resolution(input) {
            return Ok(Self::Preset(preset));
        }

        let lowered = input.trim().to_ascii_lowercase();
        let (w, h) = lowered
            .split_once('x')
            .ok_or_else(|| invalid_options(format!("Unknown resolution '{input}'")))?;
        let width = w.trim().parse::<u32>().ok().filter(|v| *v > 0);
        let height = h.trim().parse::<u32>().ok().filter(|v| *v > 0);
        match (width, height) {
            (Some(width), Some(height)) => Ok(Self::Explicit { width, height }),
            _ => Err(invalid_options(format!(
                "Invalid resolution '{input}', expected WIDTHxHEIGHT with positive numbers"
            ))),
        }
    }

    /// Builds the `scale=` filter. For presets the height is derived from the
    /// source dimensions when known (rounded to an even number) and left to
    /// ffmpeg (`-2`) otherwise.
    #[must_use]
    pub fn scale_filter(&self, source: Option<(u32, u32)>) -> String {
        match self {
            Self::Explicit { width, height } => format!("scale={width}:{height}"),
            Self::Preset(preset) => match source {
                Some((src_w, src_h)) if src_w > 0 && src_h > 0 => {
                    let height = even_scaled_height(preset.width, src_w, src_h);
                    format!("scale={}:{}", preset.width, height)
                }
                _ => format!("scale={}:-2", preset.width),
            },
        }
    }
}

/// Height that keeps the source aspect ratio at `target_width`, rounded to the
/// nearest even value and never below 2.
#[must_use]
pub fn even_scaled_height(target_width: u32, source_width: u32, source_height: u32) -> u32 {
    let exact = f64::from(target_width) * f64::from(source_height) / f64::from(source_width);
    let even = ((exact / 2.0).round() * 2.0) as u32;
    even.max(2)
}

/// Resolves a video codec alias. Unknown names pass through unchanged.
#[must_use]
pub fn resolve_video_codec(name: &str) -> String {
    resolve_alias(VIDEO_CODEC_ALIASES, name)
}

/// Resolves an audio codec alias. Unknown names pass through unchanged.
#[must_use]
pub fn resolve_audio_codec(name: &str) -> String {
    resolve_alias(AUDIO_CODEC_ALIASES, name)
}

fn resolve_alias(table: &[(&str, &str)], name: &str) -> String {
    let trimmed = name.trim();
    let lowered = trimmed.to_ascii_lowercase();
    table
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map_or_else(|| trimmed.to_string(), |(_, encoder)| (*encoder).to_string())
}

/// How an encoder accepts constant-rate-factor quality control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrfSupport {
    /// `-crf N -preset <speed>` (x264/x265)
    WithSpeedPreset,
    /// `-crf N -b:v 0` (libvpx family)
    WithZeroBitrate,
    /// `-crf N` only (AV1 encoders)
    CrfOnly,
}

/// CRF capability of an encoder; `None` means CRF flags must not be emitted.
#[must_use]
pub fn crf_support(encoder: &str) -> Option<CrfSupport> {
    match encoder {
        "libx264" | "libx265" => Some(CrfSupport::WithSpeedPreset),
        "libvpx" | "libvpx-vp9" => Some(CrfSupport::WithZeroBitrate),
        "libsvtav1" | "libaom-av1" => Some(CrfSupport::CrfOnly),
        _ => None,
    }
}
