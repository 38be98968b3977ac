// mediaforge-cli/src/commands/trim.rs

use mediaforge_core::{Operation, TrimEnd, TrimMode, TrimOptions};

use crate::cli::{TrimArgs, TrimModeArg};
use crate::error::CliResult;

/// Maps `trim` arguments onto the core options.
pub fn trim_operation(args: TrimArgs) -> CliResult<Operation> {
    let mode = match args.mode {
        TrimModeArg::Copy => TrimMode::Copy,
        TrimModeArg::Precise => TrimMode::Precise,
    };
    Ok(Operation::Trim(TrimOptions {
        input: args.io.input,
        output: args.io.output,
        start: args.start,
        end: TrimEnd::from_flags(args.end, args.duration)?,
        mode,
        overwrite: args.io.overwrite,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_trim_operation() {
        let cli = Cli::try_parse_from(["mediaforge", "trim", "in.mp4", "-s", "5", "-e", "0:20", "-m", "precise"])
            .unwrap();
        let Commands::Trim(args) = cli.command else {
            panic!("expected trim");
        };
        let Operation::Trim(options) = trim_operation(args).unwrap() else {
            panic!("expected trim");
        };
        assert_eq!(options.start, Some(5.0));
        assert_eq!(options.end, Some(TrimEnd::End(20.0)));
        assert_eq!(options.mode, TrimMode::Precise);
    }
}
