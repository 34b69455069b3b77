pub mod discover;
pub mod export;
pub mod lint;

use crate::{
    core::registry::{Duplicate, Snapshot},
    issues::{Diagnostic, Severity},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Discover,
    Export,
    Lint,
}

#[derive(Debug)]
pub enum CommandSummary {
    Discover(DiscoverSummary),
    Export(ExportSummary),
    Lint(LintSummary),
}

impl CommandSummary {
    pub fn kind(&self) -> CommandKind {
        match self {
            CommandSummary::Discover(_) => CommandKind::Discover,
            CommandSummary::Export(_) => CommandKind::Export,
            CommandSummary::Lint(_) => CommandKind::Lint,
        }
    }
}

#[derive(Debug)]
pub struct DiscoverSummary {
    /// Registered records after `--dataset` / `--scope` filtering.
    pub snapshot: Snapshot,
    /// Pretty inventory JSON when `--json` was given.
    pub json: Option<String>,
    /// Records dropped as duplicates (lenient mode).
    pub duplicates: Vec<Duplicate>,
    /// Declarations that were recognized but could not be extracted.
    pub rejected_count: usize,
}

#[derive(Debug)]
pub struct ExportSummary {
    pub document: String,
    pub resource_count: usize,
}

#[derive(Debug)]
pub struct LintSummary {
    pub fix: bool,
}

/// Result of running vigil commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    pub exit_on_errors: bool,
    /// Lint findings, sorted. Empty for other commands.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of files that failed to read or parse.
    pub parse_error_count: usize,
    /// Number of source files that were scanned.
    pub files_checked: usize,
}

pub fn finish(
    summary: CommandSummary,
    mut diagnostics: Vec<Diagnostic>,
    parse_error_count: usize,
    files_checked: usize,
) -> CommandResult {
    diagnostics.sort_by(Diagnostic::compare);

    let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity == severity).count();
    let error_count = count(Severity::Error);
    let warning_count = count(Severity::Warning);
    let exit_on_errors = summary.kind() == CommandKind::Lint;

    CommandResult {
        summary,
        error_count,
        warning_count,
        exit_on_errors,
        diagnostics,
        parse_error_count,
        files_checked,
    }
}
