// mediaforge-cli/src/commands/merge.rs

use mediaforge_core::{MergeMode, MergeOptions, Operation};

use crate::cli::MergeArgs;

/// Maps `merge` arguments onto the core options.
pub fn merge_operation(args: MergeArgs) -> Operation {
    Operation::Merge(MergeOptions {
        inputs: args.inputs,
        output: args.output,
        mode: if args.reencode { MergeMode::Reencode } else { MergeMode::Demuxer },
        no_audio: args.no_audio,
        overwrite: args.overwrite,
    })
}
