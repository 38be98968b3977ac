// mediaforge-cli/src/commands/compress.rs

use std::path::Path;

use mediaforge_core::utils::{calculate_size_reduction, parse_bitrate};
use mediaforge_core::{CompressOptions, CompressTarget, Operation, format_bytes};

use crate::cli::CompressArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::output::print_info;

/// Maps `compress` arguments onto the core options.
pub fn compress_operation(args: CompressArgs) -> CliResult<Operation> {
    let target = CompressTarget::from_flags(args.size.as_deref(), args.bitrate.as_deref(), args.percent)?;
    let audio_bitrate = args
        .audio_bitrate
        .as_deref()
        .map(|value| parse_bitrate(value).cli_with_context(|| format!("Invalid audio bitrate '{value}'")))
        .transpose()?;

    Ok(Operation::Compress(CompressOptions {
        output: args.io.output,
        video_codec: args.video_codec,
        audio_bitrate,
        speed: args.speed,
        resolution: args.resolution,
        overwrite: args.io.overwrite,
        ..CompressOptions::new(args.io.input, target)
    }))
}

/// Prints the before/after sizes of a finished compression.
pub fn print_size_summary(input: &Path, output: &Path) {
    let (Ok(before), Ok(after)) = (std::fs::metadata(input), std::fs::metadata(output)) else {
        return;
    };
    let (before, after) = (before.len(), after.len());
    print_info("Input size", format_bytes(before));
    print_info("Output size", format_bytes(after));
    print_info("Reduction", format!("{}%", calculate_size_reduction(before, after)));
}
