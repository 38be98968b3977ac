// mediaforge-cli/src/commands/convert.rs

use mediaforge_core::{ConvertOptions, Operation, TrimEnd};

use crate::cli::ConvertArgs;
use crate::error::CliResult;

/// Maps `convert` arguments onto the core options.
pub fn convert_operation(args: ConvertArgs) -> CliResult<Operation> {
    let end = TrimEnd::from_flags(args.end, args.duration)?;
    Ok(Operation::Convert(ConvertOptions {
        input: args.io.input,
        output: args.io.output,
        format: args.format,
        video_codec: args.video_codec,
        audio_codec: args.audio_codec,
        quality: args.quality,
        crf: args.crf,
        resolution: args.resolution,
        frame_rate: args.fps,
        audio_bitrate: args.audio_bitrate,
        start: args.start,
        end,
        no_video: args.no_video,
        no_audio: args.no_audio,
        overwrite: args.io.overwrite,
    }))
}
