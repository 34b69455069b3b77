use anyhow::Result;
use tracing::debug;

use super::{CommandResult, CommandSummary, ExportSummary, finish};
use crate::{cli::args::ExportCommand, core::DiscoveryContext, wire::WireDocument};

/// Serialize the whole snapshot. Any record that cannot be serialized fails the
/// command; no partial document is printed.
pub fn export(cmd: ExportCommand) -> Result<CommandResult> {
    let ctx = DiscoveryContext::new(&cmd.common)?;
    let discovery = ctx.discover()?;

    let snapshot = match cmd.kind {
        Some(kind) => discovery.snapshot.filter_by_kind(kind),
        None => discovery.snapshot,
    };

    let document = WireDocument::from_snapshot(&snapshot)?;
    debug!(resources = document.count(), "built wire document");

    let summary = ExportSummary {
        resource_count: document.count(),
        document: document.to_json(!cmd.compact)?,
    };
    Ok(finish(
        CommandSummary::Export(summary),
        Vec::new(),
        discovery.syntax_errors.len(),
        discovery.files.len(),
    ))
}
