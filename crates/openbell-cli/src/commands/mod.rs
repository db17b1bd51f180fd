mod analyze;
mod calendar;
mod sources;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::CommandOutput;

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    match &cli.command {
        Command::Analyze(args) => analyze::run(args).await,
        Command::Calendar(args) => calendar::run(args),
        Command::Sources(args) => sources::run(args),
    }
}
