//! Thumbnail: a single still, a set of evenly spaced stills, or a tiled grid.

use std::path::PathBuf;

use super::{BuildResult, log_built, require_non_negative};
use crate::error::{CoreError, CoreResult, invalid_options};
use crate::external::ffmpeg_builder::{FfmpegArgs, VideoFilterChain};
use crate::media::MediaInfo;
use crate::output_path::{is_sequence_template, resolve_pattern_path};
use crate::presets::{MediaKind, find_format};
use crate::utils::format_decimal;

pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 320;
pub const DEFAULT_THUMBNAIL_FORMAT: &str = "jpg";

/// Largest number of columns or rows in a contact sheet.
pub const MAX_GRID_SIDE: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThumbnailMode {
    /// One still at the given time, or at the midpoint when `None`
    Single(Option<f64>),
    /// `n` stills spread evenly over the duration
    Multiple(u32),
    /// `cols x rows` stills tiled into one image
    Grid { cols: u32, rows: u32 },
}

impl ThumbnailMode {
    /// Builds the mode from the raw inputs. No input at all means a single
    /// midpoint still; more than one is rejected.
    pub fn from_flags(time: Option<f64>, count: Option<u32>, grid: Option<&str>) -> CoreResult<Self> {
        let selected = [time.is_some(), count.is_some(), grid.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        if selected > 1 {
            return Err(invalid_options("Only one of time, count or grid can be set"));
        }
        if let Some(count) = count {
            if count == 0 {
                return Err(invalid_options("Thumbnail count must be at least 1"));
            }
            return Ok(Self::Multiple(count));
        }
        if let Some(grid) = grid {
            let (cols, rows) = parse_grid(grid)?;
            return Ok(Self::Grid { cols, rows });
        }
        Ok(Self::Single(time.map(|t| require_non_negative("Thumbnail time", t)).transpose()?))
    }

    /// Every mode except a still at an explicit time is placed relative to
    /// the input duration.
    #[must_use]
    pub fn needs_duration(&self) -> bool {
        !matches!(self, Self::Single(Some(_)))
    }
}

/// Parses a grid spec such as `"4x4"`.
pub fn parse_grid(spec: &str) -> CoreResult<(u32, u32)> {
    let lowered = spec.trim().to_ascii_lowercase();
    let parsed = lowered
        .split_once('x')
        .and_then(|(c, r)| Some((c.trim().parse::<u32>().ok()?, r.trim().parse::<u32>().ok()?)));
    match parsed {
        Some((cols, rows)) => check_grid(cols, rows),
        None => Err(invalid_options(format!(
            "Invalid grid '{spec}', expected COLSxROWS with positive numbers"
        ))),
    }
}

fn check_grid(cols: u32, rows: u32) -> CoreResult<(u32, u32)> {
    if (1..=MAX_GRID_SIDE).contains(&cols) && (1..=MAX_GRID_SIDE).contains(&rows) {
        Ok((cols, rows))
    } else {
        Err(invalid_options(format!(
            "Grid {cols}x{rows} is out of range; columns and rows must be between 1 and {MAX_GRID_SIDE}"
        )))
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub mode: ThumbnailMode,
    pub width: Option<u32>,
    /// Image format, jpg by default
    pub format: Option<String>,
    pub overwrite: bool,
}

impl ThumbnailOptions {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, mode: ThumbnailMode) -> Self {
        Self { input: input.into(), output: None, mode, width: None, format: None, overwrite: false }
    }
}

fn require_duration(info: Option<&MediaInfo>, options: &ThumbnailOptions) -> CoreResult<f64> {
    info.and_then(MediaInfo::known_duration)
        .ok_or_else(|| CoreError::MissingDuration(options.input.display().to_string()))
}

pub fn build_thumbnail(options: &ThumbnailOptions, info: Option<&MediaInfo>) -> CoreResult<BuildResult> {
    let width = options.width.unwrap_or(DEFAULT_THUMBNAIL_WIDTH);
    if width == 0 {
        return Err(invalid_options("Thumbnail width must be greater than zero"));
    }
    let format_name = options.format.as_deref().unwrap_or(DEFAULT_THUMBNAIL_FORMAT);
    let format = find_format(format_name)
        .filter(|f| f.kind == MediaKind::Image)
        .ok_or_else(|| invalid_options(format!("'{format_name}' is not an image format")))?;
    let scale = format!("scale={width}:-1");
    let args = FfmpegArgs::new(options.overwrite);

    let result = match options.mode {
        ThumbnailMode::Single(time) => {
            let time = match time {
                Some(time) => time,
                None => require_duration(info, options)? / 2.0,
            };
            if let Some(duration) = info.and_then(MediaInfo::known_duration) {
                if time > duration {
                    return Err(invalid_options(format!(
                        "Thumbnail time {time}s is past the end of the input ({duration}s)"
                    )));
                }
            }
            let output_path =
                resolve_pattern_path(&options.input, options.output.as_deref(), "_thumb", format.extension);
            let args = args
                .time("-ss", time)
                .input(&options.input)
                .video_filters(VideoFilterChain::new().add_filter(scale))
                .option("-frames:v", "1")
                .output(&output_path);
            BuildResult::single(args, output_path)
        }
        ThumbnailMode::Multiple(count) => {
            if count == 0 {
                return Err(invalid_options("Thumbnail count must be at least 1"));
            }
            let duration = require_duration(info, options)?;
            let fps = format_decimal(f64::from(count) / duration);
            let output_path =
                resolve_pattern_path(&options.input, options.output.as_deref(), "_thumb_%02d", format.extension);
            let filters = VideoFilterChain::new().add_filter(format!("fps={fps}")).add_filter(scale);
            let args = args
                .input(&options.input)
                .video_filters(filters)
                .option("-frames:v", count.to_string())
                .output(&output_path);
            BuildResult {
                args,
                is_template: is_sequence_template(&output_path),
                output_path,
            }
        }
        ThumbnailMode::Grid { cols, rows } => {
            check_grid(cols, rows)?;
            let duration = require_duration(info, options)?;
            let fps = format_decimal(f64::from(cols) * f64::from(rows) / duration);
            let output_path =
                resolve_pattern_path(&options.input, options.output.as_deref(), "_grid", format.extension);
            let filters = VideoFilterChain::new()
                .add_filter(format!("fps={fps}"))
                .add_filter(scale)
                .add_filter(format!("tile={cols}x{rows}"));
            let args = args
                .input(&options.input)
                .video_filters(filters)
                .option("-frames:v", "1")
                .output(&output_path);
            BuildResult::single(args, output_path)
        }
    };

    log_built("thumbnail", &result);
    Ok(result)
}
