// mediaforge-cli/src/commands/check.rs
//
// `check`: make sure the configured ffmpeg and ffprobe binaries start.

use mediaforge_core::external::{FfmpegSpawner, FfprobeExecutor, FileMetadataProvider};
use mediaforge_core::{CoreError, MediaEngine};

use crate::error::CliResult;
use crate::output::{print_heading, print_info, print_success, print_warning};

/// Execute the check command
pub fn execute_check<S, P, M>(engine: &MediaEngine<S, P, M>) -> CliResult<()>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    M: FileMetadataProvider,
{
    print_heading("Dependencies");
    let mut missing = Vec::new();
    for (path, result) in engine.check_dependencies() {
        match result {
            Ok(version) => print_info(&path.display().to_string(), version),
            Err(e) => {
                print_warning(&format!("{}: {e}", path.display()));
                missing.push(path.display().to_string());
            }
        }
    }

    if missing.is_empty() {
        print_success("ffmpeg and ffprobe are available");
        Ok(())
    } else {
        Err(CoreError::DependencyNotFound(missing.join(", ")))
    }
}
