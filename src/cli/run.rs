use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, discover::discover, export::export, lint::lint},
};

/// Dispatch to the command handler.
///
/// # Returns
/// - `Ok(CommandResult)` with diagnostic counts and exit behavior
/// - `Err` if the command fails (bad config, strict duplicate, unserializable record)
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Discover(cmd)) => discover(cmd),
        Some(Command::Export(cmd)) => export(cmd),
        Some(Command::Lint(cmd)) => lint(cmd),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
