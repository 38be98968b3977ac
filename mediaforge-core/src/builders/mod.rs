// ============================================================================
// mediaforge-core/src/builders/mod.rs
// ============================================================================
//
// ARGUMENT BUILDERS: one deterministic function per media operation
//
// Each builder turns an options struct plus an optional probe snapshot into
// an ordered ffmpeg argument list and the resolved output path. Builders
// validate everything up front and never spawn processes; the only one with a
// filesystem side effect is merge, which writes its concat list file.

use std::path::{Path, PathBuf};

use crate::error::{CoreResult, invalid_options};
use crate::utils::{extension_lowercase, parse_bitrate};

pub mod compress;
pub mod convert;
pub mod extract;
pub mod gif;
pub mod merge;
pub mod thumbnail;
pub mod trim;

pub use compress::{CompressOptions, build_compress};
pub use convert::{ConvertOptions, build_convert};
pub use extract::{ExtractMode, ExtractOptions, FrameSelection, build_extract};
pub use gif::{GifOptions, build_gif};
pub use merge::{MergeBuild, MergeMode, MergeOptions, build_merge};
pub use thumbnail::{ThumbnailMode, ThumbnailOptions, build_thumbnail, parse_grid};
pub use trim::{TrimEnd, TrimMode, TrimOptions, build_trim};

/// Output of a builder. Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    /// Arguments in the exact order they are passed to ffmpeg
    pub args: Vec<String>,
    pub output_path: PathBuf,
    /// The output path is a printf-style sequence template (`%02d`, `%04d`)
    pub is_template: bool,
}

impl BuildResult {
    #[must_use]
    pub fn single(args: Vec<String>, output_path: PathBuf) -> Self {
        Self { args, output_path, is_template: false }
    }

    /// Position of the first occurrence of `arg`, handy for ordering checks.
    #[must_use]
    pub fn position(&self, arg: &str) -> Option<usize> {
        self.args.iter().position(|a| a == arg)
    }

    /// Value following the first occurrence of `flag`.
    #[must_use]
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.position(flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, arg: &str) -> bool {
        self.position(arg).is_some()
    }
}

/// Extension used when an operation keeps the input container.
pub(crate) fn input_extension(input: &Path) -> String {
    extension_lowercase(input).unwrap_or_else(|| "mp4".to_string())
}

pub(crate) fn require_positive(name: &str, value: f64) -> CoreResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid_options(format!("{name} must be greater than zero (got {value})")))
    }
}

pub(crate) fn require_non_negative(name: &str, value: f64) -> CoreResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid_options(format!("{name} must not be negative (got {value})")))
    }
}

/// Parses an optional user bitrate such as `"192k"`.
pub(crate) fn parse_optional_bitrate(value: Option<&str>) -> CoreResult<Option<u64>> {
    value
        .map(|v| parse_bitrate(v).ok_or_else(|| invalid_options(format!("Invalid bitrate '{v}'"))))
        .transpose()
}

/// Logs a finished build at debug level, the way every builder reports.
pub(crate) fn log_built(operation: &str, result: &BuildResult) {
    log::debug!(
        "Built {operation} arguments -> {}: ffmpeg {}",
        result.output_path.display(),
        result.args.join(" ")
    );
}
