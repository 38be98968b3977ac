// mediaforge-cli/src/commands/info.rs
//
// `info`: probe a file and show what ffprobe reported.

use log::info;

use mediaforge_core::external::{FfmpegSpawner, FfprobeExecutor, FileMetadataProvider};
use mediaforge_core::utils::{format_kbps, format_timestamp};
use mediaforge_core::{MediaEngine, MediaInfo, format_bytes, format_duration};

use crate::cli::InfoArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{print_heading, print_info, print_section};

/// Execute the info command
pub fn execute_info<S, P, M>(engine: &MediaEngine<S, P, M>, args: &InfoArgs) -> CliResult<()>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    M: FileMetadataProvider,
{
    info!("Probing {}", args.input.display());
    let media = engine
        .probe(&args.input)?
        .cli_with_context(|| format!("ffprobe returned no metadata for {}", args.input.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&media).map_err(std::io::Error::from)?;
        println!("{json}");
    } else {
        print_media_info(&args.input.display().to_string(), &media);
    }
    Ok(())
}

fn print_media_info(name: &str, media: &MediaInfo) {
    print_heading(name);
    print_info("Format", describe_format(media));
    print_info(
        "Duration",
        media
            .known_duration()
            .map_or_else(
                || "unknown".to_string(),
                |d| format!("{} ({})", format_duration(d), format_timestamp(d)),
            ),
    );
    if let Some(size) = media.size_bytes {
        print_info("Size", format_bytes(size));
    }
    if let Some(bit_rate) = media.bit_rate {
        print_info("Bitrate", format_kbps(bit_rate));
    }
    print_info("Streams", describe_streams(media));

    if let Some(video) = &media.video {
        print_section("Video");
        print_info("Codec", &video.codec);
        if let (Some(width), Some(height)) = (media.width(), media.height()) {
            print_info("Resolution", format!("{width}x{height}"));
        }
        if let Some(fps) = video.frame_rate {
            print_info("Frame rate", format!("{fps:.2} fps"));
        }
        if let Some(pixel_format) = &video.pixel_format {
            print_info("Pixel format", pixel_format);
        }
        if let Some(bit_rate) = video.bit_rate {
            print_info("Bitrate", format_kbps(bit_rate));
        }
    }

    if let Some(audio) = &media.audio {
        print_section("Audio");
        print_info("Codec", &audio.codec);
        if let Some(rate) = audio.sample_rate {
            print_info("Sample rate", format!("{rate} Hz"));
        }
        if let Some(channels) = audio.channels {
            print_info("Channels", channels);
        }
        if let Some(bit_rate) = audio.bit_rate {
            print_info("Bitrate", format_kbps(bit_rate));
        }
    }

    if let Some(subtitle) = &media.subtitle {
        print_section("Subtitles");
        print_info("Codec", &subtitle.codec);
        print_info("Language", subtitle.language.as_deref().unwrap_or("und"));
    }
}

fn describe_streams(media: &MediaInfo) -> String {
    let kinds: Vec<&str> = [
        (media.has_video(), "video"),
        (media.has_audio(), "audio"),
        (media.subtitle.is_some(), "subtitles"),
    ]
    .into_iter()
    .filter_map(|(present, kind)| present.then_some(kind))
    .collect();
    if kinds.is_empty() {
        media.stream_count.to_string()
    } else {
        format!("{} ({})", media.stream_count, kinds.join(", "))
    }
}

fn describe_format(media: &MediaInfo) -> String {
    match &media.format_long_name {
        Some(long) if !long.is_empty() => format!("{} ({long})", media.format_name),
        _ => media.format_name.clone(),
    }
}
