// ============================================================================
// mediaforge-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg, ffprobe and the file system
//
// Everything that leaves the process goes through a trait here so the engine
// can be driven by mocks in tests:
// - FfmpegSpawner / FfmpegProcess for running ffmpeg (ffmpeg-sidecar)
// - FfprobeExecutor for metadata (ffprobe JSON)
// - FileMetadataProvider for existence and size checks

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{CoreResult, command_start_error};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Argument list and filter chain builders
pub mod ffmpeg_builder;

/// Spawning and driving ffmpeg processes
pub mod ffmpeg_executor;

/// Running ffprobe and normalizing its output
pub mod ffprobe_executor;

/// Scripted spawner and prober for tests
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{FfmpegArgs, VideoFilterChain};
pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, ProcessOutput, ProgressUpdate, SidecarProcess, SidecarSpawner,
    run_ffmpeg,
};
pub use ffprobe_executor::{CommandFfprobeExecutor, FfprobeExecutor};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that a required external command can be started.
///
/// Runs `<cmd> -version` and returns the first line of its output (e.g.
/// `ffmpeg version 6.1 ...`). A binary that cannot be found maps to
/// `DependencyNotFound`.
pub fn check_dependency(cmd: &Path) -> CoreResult<String> {
    let output = Command::new(cmd)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            log::warn!("Dependency '{}' could not be started: {e}", cmd.display());
            command_start_error(cmd.display().to_string(), e)
        })?;

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    log::debug!("Found dependency {}: {version}", cmd.display());
    Ok(version)
}

// ============================================================================
// FILE METADATA ACCESS
// ============================================================================

/// Trait for abstracting file metadata access operations.
pub trait FileMetadataProvider {
    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Gets the size of the file at the given path in bytes.
    fn get_size(&self, path: &Path) -> CoreResult<u64>;
}

/// Standard implementation of FileMetadataProvider using the standard library.
#[derive(Debug, Clone, Default)]
pub struct StdFsMetadataProvider;

impl FileMetadataProvider for StdFsMetadataProvider {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn get_size(&self, path: &Path) -> CoreResult<u64> {
        Ok(std::fs::metadata(path)?.len())
    }
}
