//! Core library for media conversion, compression and editing through ffmpeg.
//!
//! This crate turns high-level media operations (convert, compress, trim,
//! extract, merge, gif, thumbnail) into exact ffmpeg argument lists, runs
//! them, and explains failures in plain language.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mediaforge_core::{CompressOptions, CompressTarget, CoreConfig, MediaEngine, Operation};
//!
//! let config = CoreConfig::from_env();
//! config.validate().unwrap();
//! let engine = MediaEngine::new(config);
//!
//! let target = CompressTarget::from_flags(Some("10MB"), None, None).unwrap();
//! let options = CompressOptions::new("holiday.mp4", target);
//! let outcome = engine.run(&Operation::Compress(options));
//! if let Some(path) = outcome.output_path {
//!     println!("Wrote {}", path.display());
//! }
//! ```

pub mod bitrate;
pub mod builders;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod external;
pub mod media;
pub mod output_path;
pub mod presets;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use bitrate::{BitrateInputs, CompressTarget, calculate_video_bitrate};
pub use builders::{
    BuildResult, CompressOptions, ConvertOptions, ExtractMode, ExtractOptions, FrameSelection,
    GifOptions, MergeMode, MergeOptions, ThumbnailMode, ThumbnailOptions, TrimEnd, TrimMode,
    TrimOptions,
};
pub use classifier::{Diagnosis, classify};
pub use config::{CoreConfig, CoreConfigBuilder};
pub use engine::{MediaEngine, Operation, OperationOutcome};
pub use error::{CoreError, CoreResult};
pub use external::ProgressUpdate;
pub use media::MediaInfo;
pub use utils::{format_bytes, format_duration, parse_bitrate, parse_size, parse_time};
