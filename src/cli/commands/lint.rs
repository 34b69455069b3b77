use anyhow::Result;

use super::{CommandResult, CommandSummary, LintSummary, finish};
use crate::{
    cli::args::LintCommand,
    core::DiscoveryContext,
    rules::{LintOptions, lint as lint_discovery},
};

pub fn lint(cmd: LintCommand) -> Result<CommandResult> {
    let ctx = DiscoveryContext::new(&cmd.common)?;

    // Rules disabled in the config file and on the command line both apply.
    let mut disabled = ctx.disabled_rules()?;
    disabled.extend(cmd.disabled.iter().copied());

    let discovery = ctx.discover()?;
    let options = LintOptions {
        disabled,
        fix: cmd.fix,
    };
    let diagnostics = lint_discovery(&discovery, &options);

    Ok(finish(
        CommandSummary::Lint(LintSummary { fix: cmd.fix }),
        diagnostics,
        discovery.syntax_errors.len(),
        discovery.files.len(),
    ))
}
