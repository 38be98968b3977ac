//! Normalized media metadata.
//!
//! `MediaInfo` is produced only by the ffprobe adapter from the report of the
//! `ffprobe` crate and is treated as a read-only snapshot of the file at probe time.

use ffprobe::FfProbe;
use serde::Serialize;

/// First video stream of a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStreamInfo {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<f64>,
    pub pixel_format: Option<String>,
    pub bit_rate: Option<u64>,
}

/// First audio stream of a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioStreamInfo {
    pub codec: String,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    pub bit_rate: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleStreamInfo {
    pub codec: String,
    pub language: Option<String>,
}

/// Metadata snapshot for a media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: Option<f64>,
    /// File size in bytes
    pub size_bytes: Option<u64>,
    /// Overall bitrate in bits per second
    pub bit_rate: Option<u64>,
    /// Container format name as reported by ffprobe (e.g. "mov,mp4,m4a,3gp,3g2,mj2")
    pub format_name: String,
    pub format_long_name: Option<String>,
    pub stream_count: u32,
    pub video: Option<VideoStreamInfo>,
    pub audio: Option<AudioStreamInfo>,
    pub subtitle: Option<SubtitleStreamInfo>,
}

impl MediaInfo {
    /// Duration, only when it is known and positive.
    #[must_use]
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Video dimensions, absent for audio-only media.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.video.as_ref().map(|v| (v.width, v.height))
    }

    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.video.as_ref().map(|v| v.width)
    }

    #[must_use]
    pub fn height(&self) -> Option<u32> {
        self.video.as_ref().map(|v| v.height)
    }

    /// Primary codec name: the video codec, or the audio codec for audio-only media.
    #[must_use]
    pub fn codec_name(&self) -> Option<&str> {
        self.video
            .as_ref()
            .map(|v| v.codec.as_str())
            .or_else(|| self.audio.as_ref().map(|a| a.codec.as_str()))
    }

    #[must_use]
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Reads a textual ffprobe field, treating empty text as absent.
///
/// ffprobe releases disagree on which fields may be missing, so the crate
/// exposes some as `String` and others as `Option<String>`.
trait ProbeText {
    fn text(&self) -> Option<&str>;
}

impl ProbeText for String {
    fn text(&self) -> Option<&str> {
        Some(self.trim()).filter(|s| !s.is_empty())
    }
}

impl ProbeText for Option<String> {
    fn text(&self) -> Option<&str> {
        self.as_ref().and_then(|s| s.text())
    }
}

impl MediaInfo {
    /// Normalizes an ffprobe report, keeping the first stream of each kind.
    #[must_use]
    pub fn from_ffprobe(probe: &FfProbe) -> Self {
        let first_of = |kind: &str| {
            probe
                .streams
                .iter()
                .find(|s| s.codec_type.text() == Some(kind))
        };

        let video = first_of("video").and_then(|s| {
            Some(VideoStreamInfo {
                codec: s.codec_name.text().unwrap_or_default().to_string(),
                width: s.width.and_then(|w| u32::try_from(w).ok())?,
                height: s.height.and_then(|h| u32::try_from(h).ok())?,
                frame_rate: s
                    .avg_frame_rate
                    .text()
                    .and_then(parse_frame_rate)
                    .or_else(|| s.r_frame_rate.text().and_then(parse_frame_rate)),
                pixel_format: s.pix_fmt.text().map(str::to_string),
                bit_rate: parse_number(s.bit_rate.text()),
            })
        });

        let audio = first_of("audio").map(|s| AudioStreamInfo {
            codec: s.codec_name.text().unwrap_or_default().to_string(),
            sample_rate: s.sample_rate.text().and_then(|r| r.parse().ok()),
            channels: s.channels.and_then(|c| u32::try_from(c).ok()),
            bit_rate: parse_number(s.bit_rate.text()),
        });

        let subtitle = first_of("subtitle").map(|s| SubtitleStreamInfo {
            codec: s.codec_name.text().unwrap_or_default().to_string(),
            language: s
                .tags
                .as_ref()
                .and_then(|t| t.language.text())
                .map(str::to_string),
        });

        let format = &probe.format;
        Self {
            duration: format
                .duration
                .text()
                .and_then(|d| d.parse::<f64>().ok())
                .filter(|d| d.is_finite()),
            size_bytes: parse_number(format.size.text()),
            bit_rate: parse_number(format.bit_rate.text()),
            format_name: format.format_name.text().unwrap_or_default().to_string(),
            format_long_name: format.format_long_name.text().map(str::to_string),
            stream_count: u32::try_from(probe.streams.len()).unwrap_or(u32::MAX),
            video,
            audio,
            subtitle,
        }
    }
}

fn parse_number(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse::<u64>().ok())
}

/// Converts an ffprobe rational (`"30000/1001"`) to frames per second.
/// `"0/0"` and other degenerate values yield `None`.
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((num, den)) => (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?),
        None => (rate.trim().parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    let fps = num / den;
    fps.is_finite().then_some(fps)
}
