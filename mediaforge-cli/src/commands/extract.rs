// mediaforge-cli/src/commands/extract.rs

use mediaforge_core::{ExtractMode, ExtractOptions, Operation};

use crate::cli::ExtractArgs;
use crate::error::CliResult;

/// Maps `extract` arguments onto the core options.
pub fn extract_operation(args: ExtractArgs) -> CliResult<Operation> {
    let mode = ExtractMode::from_flags(args.audio, args.video, args.frames, args.at, args.rate)?;
    Ok(Operation::Extract(ExtractOptions {
        output: args.io.output,
        format: args.format,
        audio_bitrate: args.audio_bitrate,
        overwrite: args.io.overwrite,
        ..ExtractOptions::new(args.io.input, mode)
    }))
}
