//! FFprobe integration for media analysis
//!
//! This module runs ffprobe through the `ffprobe` crate and normalizes its
//! report into [`MediaInfo`]. A probe that runs but yields nothing usable is
//! `Ok(None)`; only failing to start ffprobe at all is an error.

use std::path::{Path, PathBuf};

use ffprobe::{Config, FfProbeError, ffprobe_config};

use crate::error::{CoreResult, command_start_error};
use crate::media::MediaInfo;

/// Trait for probing media metadata.
pub trait FfprobeExecutor {
    /// Probes `input`. `Ok(None)` means no metadata is available.
    fn probe(&self, input: &Path) -> CoreResult<Option<MediaInfo>>;
}

/// Runs the configured ffprobe binary.
#[derive(Debug, Clone)]
pub struct CommandFfprobeExecutor {
    ffprobe_path: PathBuf,
}

impl CommandFfprobeExecutor {
    #[must_use]
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self { ffprobe_path: ffprobe_path.into() }
    }
}

impl Default for CommandFfprobeExecutor {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeExecutor for CommandFfprobeExecutor {
    fn probe(&self, input: &Path) -> CoreResult<Option<MediaInfo>> {
        log::debug!("Running ffprobe on: {}", input.display());
        let config = Config::builder().ffprobe_bin(&self.ffprobe_path).build();

        match ffprobe_config(config, input) {
            Ok(report) => Ok(Some(MediaInfo::from_ffprobe(&report))),
            Err(err) => self.recover(input, err),
        }
    }
}

impl CommandFfprobeExecutor {
    /// Start failures propagate; every other ffprobe failure means "no metadata".
    fn recover(&self, input: &Path, err: FfProbeError) -> CoreResult<Option<MediaInfo>> {
        match err {
            FfProbeError::Io(io_err) => Err(command_start_error(
                self.ffprobe_path.display().to_string(),
                io_err,
            )),
            FfProbeError::Status(output) => {
                log::warn!(
                    "ffprobe exited with {} for {}; continuing without metadata",
                    output.status,
                    input.display()
                );
                log::debug!("ffprobe stderr: {}", String::from_utf8_lossy(&output.stderr).trim());
                Ok(None)
            }
            FfProbeError::Deserialize(err) => {
                log::warn!("Could not parse ffprobe output for {}: {err}", input.display());
                Ok(None)
            }
            err => {
                log::warn!("No usable metadata from ffprobe for {}: {err:?}", input.display());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_missing_binary_is_an_error() {
        let executor = CommandFfprobeExecutor::new("/nonexistent/dir/ffprobe-missing");
        let result = executor.probe(Path::new("a.mp4"));
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_run_yields_no_metadata() {
        // `false` starts fine and exits non-zero.
        let executor = CommandFfprobeExecutor::new("false");
        let result = executor.probe(Path::new("a.mp4"));
        assert!(matches!(result, Ok(None)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unparseable_report_yields_no_metadata() {
        // `echo` exits zero and prints its arguments, which are not JSON.
        let executor = CommandFfprobeExecutor::new("echo");
        let result = executor.probe(Path::new("a.mp4"));
        assert!(matches!(result, Ok(None)));
    }
}
