// mediaforge-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mediaforge_core::utils::parse_time;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "MediaForge: convert, compress and edit media files",
    long_about = "Runs common media operations through ffmpeg via the mediaforge-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write a timestamped debug log to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// ffmpeg binary to run
    #[arg(long, global = true, value_name = "PATH", env = "MEDIAFORGE_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe binary to run
    #[arg(long, global = true, value_name = "PATH", env = "MEDIAFORGE_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Do not draw a progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts a file to another format, codec, resolution or frame rate
    Convert(ConvertArgs),
    /// Re-encodes a file toward a target size, bitrate or percentage
    Compress(CompressArgs),
    /// Cuts a time range out of a file
    Trim(TrimArgs),
    /// Extracts the audio track, the video track or still frames
    Extract(ExtractArgs),
    /// Joins several files into one
    Merge(MergeArgs),
    /// Turns a clip into an animated GIF
    Gif(GifArgs),
    /// Captures a still, several stills or a contact-sheet grid
    Thumbnail(ThumbnailArgs),
    /// Shows the probed metadata of a file
    Info(InfoArgs),
    /// Lists the built-in formats, quality tiers and resolutions
    Presets,
    /// Checks that ffmpeg and ffprobe can be started
    Check,
}

/// Parses `90`, `1:30` or `01:02:03.5` into seconds.
pub fn parse_time_arg(value: &str) -> Result<f64, String> {
    parse_time(value).ok_or_else(|| format!("invalid time '{value}' (use seconds, MM:SS or HH:MM:SS)"))
}

#[derive(Args, Debug)]
pub struct SingleIo {
    /// Input media file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (derived from the input name when omitted)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Replace the output file if it already exists
    #[arg(short = 'y', long)]
    pub overwrite: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub io: SingleIo,

    /// Target format preset (mp4, webm, mp3, ...); defaults to the output extension
    #[arg(short, long)]
    pub format: Option<String>,

    /// Video codec or alias (h264, h265, vp9, av1, copy, ...)
    #[arg(long, value_name = "CODEC")]
    pub video_codec: Option<String>,

    /// Audio codec or alias (aac, mp3, opus, copy, ...)
    #[arg(long, value_name = "CODEC")]
    pub audio_codec: Option<String>,

    /// Quality tier: low, medium, high, veryhigh, lossless
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Explicit CRF, overriding the quality tier
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=63))]
    pub crf: Option<u8>,

    /// Resolution preset (480p, 720p, 1080p, 4k) or WIDTHxHEIGHT
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Output frame rate
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f64>,

    /// Audio bitrate such as 192k
    #[arg(long, value_name = "BITRATE")]
    pub audio_bitrate: Option<String>,

    /// Start position
    #[arg(long, value_parser = parse_time_arg)]
    pub start: Option<f64>,

    /// End position
    #[arg(long, value_parser = parse_time_arg, conflicts_with = "duration")]
    pub end: Option<f64>,

    /// Length of the converted range
    #[arg(long, value_parser = parse_time_arg)]
    pub duration: Option<f64>,

    /// Drop the video stream
    #[arg(long)]
    pub no_video: bool,

    /// Drop the audio stream
    #[arg(long)]
    pub no_audio: bool,
}

#[derive(Args, Debug)]
pub struct CompressArgs {
    #[command(flatten)]
    pub io: SingleIo,

    /// Target file size such as 10MB or 700KB
    #[arg(short, long)]
    pub size: Option<String>,

    /// Target video bitrate such as 2M or 800k
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// Target percentage of the current bitrate (1-100)
    #[arg(short, long)]
    pub percent: Option<f64>,

    /// Video codec or alias (defaults to h264)
    #[arg(long, value_name = "CODEC")]
    pub video_codec: Option<String>,

    /// Audio bitrate such as 128k
    #[arg(long, value_name = "BITRATE")]
    pub audio_bitrate: Option<String>,

    /// Encoder speed preset (ultrafast ... veryslow)
    #[arg(long)]
    pub speed: Option<String>,

    /// Resolution preset or WIDTHxHEIGHT
    #[arg(short, long)]
    pub resolution: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrimModeArg {
    /// Stream copy with fast, keyframe-aligned seeking
    #[default]
    Copy,
    /// Re-encode with frame-accurate seeking
    Precise,
}

#[derive(Args, Debug)]
pub struct TrimArgs {
    #[command(flatten)]
    pub io: SingleIo,

    /// Start position
    #[arg(short, long, value_parser = parse_time_arg)]
    pub start: Option<f64>,

    /// End position
    #[arg(short, long, value_parser = parse_time_arg, conflicts_with = "duration")]
    pub end: Option<f64>,

    /// Length of the kept range
    #[arg(short, long, value_parser = parse_time_arg)]
    pub duration: Option<f64>,

    /// Cutting mode
    #[arg(short, long, value_enum, default_value_t = TrimModeArg::Copy)]
    pub mode: TrimModeArg,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub io: SingleIo,

    /// Extract the audio track
    #[arg(long)]
    pub audio: bool,

    /// Extract the video track without audio
    #[arg(long)]
    pub video: bool,

    /// Extract still frames
    #[arg(long)]
    pub frames: bool,

    /// Single frame at this position (implies --frames)
    #[arg(long, value_parser = parse_time_arg)]
    pub at: Option<f64>,

    /// Frames per second to export (implies --frames)
    #[arg(long, value_name = "FPS")]
    pub rate: Option<f64>,

    /// Audio format (default mp3) or frame image format (default png)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Audio bitrate such as 192k
    #[arg(long, value_name = "BITRATE")]
    pub audio_bitrate: Option<String>,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Files to join, in order
    #[arg(value_name = "INPUTS", num_args = 2.., required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (defaults to <first>_merged.<ext>)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Re-encode instead of copying; tolerates mixed codecs
    #[arg(long)]
    pub reencode: bool,

    /// Drop audio from the result
    #[arg(long)]
    pub no_audio: bool,

    /// Replace the output file if it already exists
    #[arg(short = 'y', long)]
    pub overwrite: bool,
}

#[derive(Args, Debug)]
pub struct GifArgs {
    #[command(flatten)]
    pub io: SingleIo,

    /// Frames per second (default 10)
    #[arg(long)]
    pub fps: Option<f64>,

    /// Width in pixels (default 480)
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Start position
    #[arg(short, long, value_parser = parse_time_arg)]
    pub start: Option<f64>,

    /// Length of the clip
    #[arg(short, long, value_parser = parse_time_arg)]
    pub duration: Option<f64>,

    /// Generate an optimized palette (slower, better colors)
    #[arg(long)]
    pub high_quality: bool,
}

#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    #[command(flatten)]
    pub io: SingleIo,

    /// Position of a single still (defaults to the middle)
    #[arg(short, long, value_parser = parse_time_arg)]
    pub time: Option<f64>,

    /// Number of evenly spaced stills
    #[arg(short, long)]
    pub count: Option<u32>,

    /// Contact sheet layout such as 4x4
    #[arg(short, long, value_name = "COLSxROWS")]
    pub grid: Option<String>,

    /// Width of each still in pixels (default 320)
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Image format: jpg, png or webp
    #[arg(short, long)]
    pub format: Option<String>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Media file to inspect
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print the metadata as JSON
    #[arg(long)]
    pub json: bool,
}
