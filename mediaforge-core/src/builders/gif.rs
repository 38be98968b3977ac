//! GIF: render a looping animation.

use std::path::PathBuf;

use super::{BuildResult, log_built, require_non_negative, require_positive};
use crate::error::{CoreResult, invalid_options};
use crate::external::ffmpeg_builder::{FfmpegArgs, VideoFilterChain};
use crate::output_path::{OutputSuffix, resolve_output_path};
use crate::utils::format_decimal;

pub const DEFAULT_GIF_FPS: f64 = 10.0;
pub const DEFAULT_GIF_WIDTH: u32 = 480;

/// Palette generation appended in high-quality mode.
const PALETTE_FILTER: &str = "split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse";

#[derive(Debug, Clone, Default)]
pub struct GifOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub fps: Option<f64>,
    pub width: Option<u32>,
    pub start: Option<f64>,
    pub duration: Option<f64>,
    /// Two-stage palette for better colors at the cost of speed
    pub high_quality: bool,
    pub overwrite: bool,
}

impl GifOptions {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self { input: input.into(), ..Default::default() }
    }
}

pub fn build_gif(options: &GifOptions) -> CoreResult<BuildResult> {
    let fps = require_positive("GIF frame rate", options.fps.unwrap_or(DEFAULT_GIF_FPS))?;
    let width = options.width.unwrap_or(DEFAULT_GIF_WIDTH);
    if width == 0 {
        return Err(invalid_options("GIF width must be greater than zero"));
    }
    let start = options.start.map(|s| require_non_negative("Start time", s)).transpose()?;
    let duration = options.duration.map(|d| require_positive("Duration", d)).transpose()?;

    let output_path =
        resolve_output_path(&options.input, options.output.as_deref(), "gif", OutputSuffix::Animated);

    let mut filters = VideoFilterChain::new()
        .add_filter(format!("fps={}", format_decimal(fps)))
        .add_filter(format!("scale={width}:-1:flags=lanczos"));
    if options.high_quality {
        filters = filters.add_filter(PALETTE_FILTER);
    }

    let mut args = FfmpegArgs::new(options.overwrite);
    if let Some(start) = start {
        args = args.time("-ss", start);
    }
    args = args.input(&options.input);
    if let Some(duration) = duration {
        args = args.time("-t", duration);
    }
    let args = args
        .video_filters(filters)
        .option("-loop", "0")
        .output(&output_path);

    let result = BuildResult::single(args, output_path);
    log_built("gif", &result);
    Ok(result)
}
