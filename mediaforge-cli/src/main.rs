// mediaforge-cli/src/main.rs
//
// Entry point of the `mediaforge` binary: parse arguments, set up logging,
// dispatch the command and turn failures into a non-zero exit code.

use clap::Parser;
use std::process;

use mediaforge_cli::output::print_error;
use mediaforge_cli::{Cli, logging, run};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e:#}");
        process::exit(1);
    }

    if let Err(e) = run(cli) {
        if e.is_validation() {
            log::debug!("Rejected before ffmpeg was started: {e:?}");
        } else {
            log::debug!("Command failed: {e:?}");
        }
        print_error(&e);
        process::exit(1);
    }
}
