// mediaforge-cli/src/commands/gif.rs

use mediaforge_core::{GifOptions, Operation};

use crate::cli::GifArgs;

/// Maps `gif` arguments onto the core options.
pub fn gif_operation(args: GifArgs) -> Operation {
    Operation::Gif(GifOptions {
        input: args.io.input,
        output: args.io.output,
        fps: args.fps,
        width: args.width,
        start: args.start,
        duration: args.duration,
        high_quality: args.high_quality,
        overwrite: args.io.overwrite,
    })
}
