// mediaforge-cli/src/lib.rs
//
// Library portion of the MediaForge CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;

use log::debug;
use mediaforge_core::{CoreConfig, CoreConfigBuilder, MediaEngine, Operation};

pub use cli::{Cli, Commands};
pub use error::CliResult;

/// Loads the configuration from the environment and applies the global flags.
pub fn build_config(cli: &Cli) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::from_config(CoreConfig::from_env());
    if let Some(ffmpeg) = &cli.ffmpeg {
        builder = builder.ffmpeg_path(ffmpeg);
    }
    if let Some(ffprobe) = &cli.ffprobe {
        builder = builder.ffprobe_path(ffprobe);
    }
    let config = builder.build();
    config.validate()?;
    debug!("Using configuration: {config:?}");
    Ok(config)
}

/// Dispatches the parsed command line.
pub fn run(cli: Cli) -> CliResult<()> {
    let config = build_config(&cli)?;
    let engine = MediaEngine::new(config);
    let show_progress = !cli.no_progress;

    let operation = match cli.command {
        Commands::Info(args) => return commands::info::execute_info(&engine, &args),
        Commands::Presets => {
            commands::presets::execute_presets();
            return Ok(());
        }
        Commands::Check => return commands::check::execute_check(&engine),
        Commands::Convert(args) => commands::convert::convert_operation(args)?,
        Commands::Compress(args) => commands::compress::compress_operation(args)?,
        Commands::Trim(args) => commands::trim::trim_operation(args)?,
        Commands::Extract(args) => commands::extract::extract_operation(args)?,
        Commands::Merge(args) => commands::merge::merge_operation(args),
        Commands::Gif(args) => commands::gif::gif_operation(args),
        Commands::Thumbnail(args) => commands::thumbnail::thumbnail_operation(args)?,
    };

    let output = commands::execute_operation(&engine, &operation, show_progress)?;
    if let Operation::Compress(options) = &operation {
        commands::compress::print_size_summary(&options.input, &output);
    }
    Ok(())
}
