use anyhow::{Context, Result};

use super::{CommandResult, CommandSummary, DiscoverSummary, finish};
use crate::{
    cli::args::DiscoverCommand,
    core::{DiscoveryContext, Inventory},
};

pub fn discover(cmd: DiscoverCommand) -> Result<CommandResult> {
    let ctx = DiscoveryContext::new(&cmd.common)?;
    let discovery = ctx.discover()?;

    let mut snapshot = discovery.snapshot;
    if let Some(dataset) = &cmd.dataset {
        snapshot = snapshot.filter_by_dataset(dataset);
    }
    if let Some(scope) = &cmd.scope {
        snapshot = snapshot.filter_by_scope(scope);
    }

    let json = if cmd.json {
        let inventory = Inventory::from(&snapshot);
        Some(serde_json::to_string_pretty(&inventory).context("failed to serialize the inventory")?)
    } else {
        None
    };

    let summary = DiscoverSummary {
        duplicates: snapshot.duplicates().to_vec(),
        snapshot,
        json,
        rejected_count: discovery.declaration_errors.len(),
    };
    Ok(finish(
        CommandSummary::Discover(summary),
        Vec::new(),
        discovery.syntax_errors.len(),
        discovery.files.len(),
    ))
}
