// mediaforge-cli/src/commands/thumbnail.rs

use mediaforge_core::{Operation, ThumbnailMode, ThumbnailOptions};

use crate::cli::ThumbnailArgs;
use crate::error::CliResult;

/// Maps `thumbnail` arguments onto the core options.
pub fn thumbnail_operation(args: ThumbnailArgs) -> CliResult<Operation> {
    let mode = ThumbnailMode::from_flags(args.time, args.count, args.grid.as_deref())?;
    Ok(Operation::Thumbnail(ThumbnailOptions {
        output: args.io.output,
        width: args.width,
        format: args.format,
        overwrite: args.io.overwrite,
        ..ThumbnailOptions::new(args.io.input, mode)
    }))
}
