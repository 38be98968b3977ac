// ============================================================================
// mediaforge-cli/src/commands/mod.rs
// ============================================================================
//
// COMMAND HANDLERS
//
// Media commands only translate their clap arguments into a core `Operation`;
// running it, drawing progress and reporting the result is shared here.

pub mod check;
pub mod compress;
pub mod convert;
pub mod extract;
pub mod gif;
pub mod info;
pub mod merge;
pub mod presets;
pub mod thumbnail;
pub mod trim;

use std::path::PathBuf;

use mediaforge_core::external::{FfmpegSpawner, FfprobeExecutor, FileMetadataProvider};
use mediaforge_core::{MediaEngine, Operation};

use crate::error::CliResult;
use crate::output::print_success;
use crate::progress::OperationProgress;

/// Label shown next to the progress bar.
fn progress_label(operation: &Operation) -> &'static str {
    match operation {
        Operation::Convert(_) => "Converting",
        Operation::Compress(_) => "Compressing",
        Operation::Trim(_) => "Trimming",
        Operation::Extract(_) => "Extracting",
        Operation::Merge(_) => "Merging",
        Operation::Gif(_) => "Rendering",
        Operation::Thumbnail(_) => "Capturing",
    }
}

/// Runs `operation` with a progress display and prints where the result went.
pub fn execute_operation<S, P, M>(
    engine: &MediaEngine<S, P, M>,
    operation: &Operation,
    show_progress: bool,
) -> CliResult<PathBuf>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    M: FileMetadataProvider,
{
    let mut progress = OperationProgress::new(progress_label(operation), show_progress);
    let result = engine.execute_with_progress(operation, |update| progress.update(&update));
    progress.finish();

    let output = result?;
    if output.to_string_lossy().contains('%') {
        print_success(&format!("Wrote numbered files matching {}", output.display()));
    } else {
        print_success(&format!("Wrote {}", output.display()));
    }
    Ok(output)
}
