//! Trim: cut a time range out of a file.
//!
//! Copy mode seeks before `-i` (fast, snaps to keyframes) and copies streams.
//! Precise mode seeks after `-i` (frame accurate) and re-encodes.

use std::path::{Path, PathBuf};

use super::{BuildResult, input_extension, log_built, require_non_negative, require_positive};
use crate::error::{CoreResult, invalid_options};
use crate::external::ffmpeg_builder::FfmpegArgs;
use crate::output_path::{OutputSuffix, resolve_output_path};

/// Where a time range stops. End time and duration are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimEnd {
    /// Absolute end position in seconds
    End(f64),
    /// Length in seconds, counted from the start
    Duration(f64),
}

impl TrimEnd {
    /// Combines the optional end and duration inputs. Neither is fine (the
    /// range runs to the end of the file); both is rejected.
    pub fn from_flags(end: Option<f64>, duration: Option<f64>) -> CoreResult<Option<Self>> {
        match (end, duration) {
            (Some(_), Some(_)) => Err(invalid_options("End time and duration cannot both be set")),
            (Some(end), None) => Ok(Some(Self::End(end))),
            (None, Some(duration)) => Ok(Some(Self::Duration(duration))),
            (None, None) => Ok(None),
        }
    }

    /// Length of the range for a given start, validating that it is positive.
    pub fn length_from(&self, start: f64) -> CoreResult<f64> {
        match *self {
            Self::End(end) => {
                if !end.is_finite() || end <= start {
                    return Err(invalid_options(format!(
                        "End time ({end}s) must be after the start time ({start}s)"
                    )));
                }
                Ok(end - start)
            }
            Self::Duration(duration) => require_positive("Duration", duration),
        }
    }
}

/// Seek strategy for a trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimMode {
    /// Input seek plus stream copy
    #[default]
    Copy,
    /// Output seek plus re-encode
    Precise,
}

#[derive(Debug, Clone, Default)]
pub struct TrimOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub start: Option<f64>,
    pub end: Option<TrimEnd>,
    pub mode: TrimMode,
    pub overwrite: bool,
}

impl TrimOptions {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self { input: input.into(), ..Default::default() }
    }
}

pub fn build_trim(options: &TrimOptions) -> CoreResult<BuildResult> {
    if options.start.is_none() && options.end.is_none() {
        return Err(invalid_options("Trim needs at least one of start, end or duration"));
    }
    let start = options.start.map(|s| require_non_negative("Start time", s)).transpose()?;
    let length = options
        .end
        .map(|end| end.length_from(start.unwrap_or(0.0)))
        .transpose()?;

    let output_path = resolve_output_path(
        &options.input,
        options.output.as_deref(),
        &input_extension(&options.input),
        OutputSuffix::Trimmed,
    );

    let args = match options.mode {
        TrimMode::Copy => copy_mode_args(options, start, length, &output_path),
        TrimMode::Precise => precise_mode_args(options, start, &output_path),
    };

    let result = BuildResult::single(args, output_path);
    log_built("trim", &result);
    Ok(result)
}

fn copy_mode_args(
    options: &TrimOptions,
    start: Option<f64>,
    length: Option<f64>,
    output: &Path,
) -> Vec<String> {
    // An absolute end is expressed as a duration because -ss precedes -i
    let mut args = FfmpegArgs::new(options.overwrite);
    if let Some(start) = start {
        args = args.time("-ss", start);
    }
    args = args.input(&options.input);
    if let Some(length) = length {
        args = args.time("-t", length);
    }
    args.option("-c", "copy")
        .option("-avoid_negative_ts", "make_zero")
        .output(output)
}

fn precise_mode_args(options: &TrimOptions, start: Option<f64>, output: &Path) -> Vec<String> {
    let mut args = FfmpegArgs::new(options.overwrite).input(&options.input);
    if let Some(start) = start {
        args = args.time("-ss", start);
    }
    args = match options.end {
        Some(TrimEnd::End(end)) => args.time("-to", end),
        Some(TrimEnd::Duration(duration)) => args.time("-t", duration),
        None => args,
    };
    args.option("-c:v", "libx264")
        .option("-crf", "18")
        .option("-preset", "medium")
        .option("-c:a", "aac")
        .option("-avoid_negative_ts", "make_zero")
        .output(output)
}
