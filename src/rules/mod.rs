//! Lint rules for discovered monitoring resources.
//!
//! Each rule is a pure function over the part of a [`Discovery`] it needs and
//! returns plain [`Diagnostic`]s. Rules never change records; `fix` only attaches
//! a suggestion describing what would change.
//!
//! ## Module Structure
//!
//! - `pipeline`: Problems recorded while discovering (parse errors, rejected declarations, duplicates)
//! - `references`: Names that point at no registered query or SLO
//! - `query`: Query bodies, wherever they appear (datasets, calculations, filters, operators)
//! - `alerting`: SLO targets, trigger thresholds and query shape, recipients
//! - `board`: Boards without panels

pub mod alerting;
pub mod board;
pub mod pipeline;
pub mod query;
pub mod references;

use std::path::Path;

use crate::{
    core::{Discovery, DiscoveryError, DiscoveryOptions, Snapshot, discover},
    issues::{Diagnostic, Rule},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintOptions {
    /// Rules whose diagnostics are dropped.
    pub disabled: Vec<Rule>,
    /// Keep the suggested fix on each diagnostic.
    pub fix: bool,
}

/// Run every enabled rule over one discovery pass. Output is sorted by file,
/// line and rule code.
pub fn lint(discovery: &Discovery, options: &LintOptions) -> Vec<Diagnostic> {
    let snapshot = &discovery.snapshot;

    let mut diagnostics = Vec::new();
    diagnostics.extend(pipeline::check_parse_errors(&discovery.syntax_errors));
    diagnostics.extend(pipeline::check_invalid_declarations(
        &discovery.declaration_errors,
    ));
    diagnostics.extend(pipeline::check_duplicates(snapshot.duplicates()));
    diagnostics.extend(check_records(snapshot));

    diagnostics.retain(|d| !options.disabled.contains(&d.code));
    if !options.fix {
        for diagnostic in &mut diagnostics {
            diagnostic.suggestion = None;
        }
    }
    diagnostics.sort_by(Diagnostic::compare);
    diagnostics
}

fn check_records(snapshot: &Snapshot) -> Vec<Diagnostic> {
    let mut diagnostics = references::check_dangling_refs(snapshot);
    for record in snapshot.records() {
        diagnostics.extend(query::check_queries(record));
        diagnostics.extend(alerting::check_alerting(record, snapshot));
        diagnostics.extend(board::check_empty_board(record));
    }
    diagnostics
}

/// Discover `root` with the default options and lint the result.
pub fn lint_path(
    root: impl AsRef<Path>,
    disabled: &[Rule],
) -> Result<Vec<Diagnostic>, DiscoveryError> {
    let discovery = discover(root.as_ref(), &DiscoveryOptions::default())?;
    let options = LintOptions {
        disabled: disabled.to_vec(),
        fix: false,
    };
    Ok(lint(&discovery, &options))
}
