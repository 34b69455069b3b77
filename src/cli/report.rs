//! Report formatting and printing utilities.
//!
//! Diagnostics are printed in cargo style; the inventory is printed as an aligned
//! table. Kept separate from the core so vigil can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{CommandResult, CommandSummary, DiscoverSummary, ExportSummary};
use crate::{
    core::{
        data::{Record, Resource, ResourceKind},
        registry::Snapshot,
    },
    issues::{Diagnostic, Severity},
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print diagnostics in cargo-style format to stdout.
pub fn report(diagnostics: &[Diagnostic]) {
    report_to(diagnostics, &mut io::stdout().lock());
}

/// Print diagnostics to a custom writer.
///
/// Useful for testing or redirecting output.
pub fn report_to<W: Write>(diagnostics: &[Diagnostic], writer: &mut W) {
    if diagnostics.is_empty() {
        return;
    }

    let mut sorted = diagnostics.to_vec();
    sorted.sort_by(Diagnostic::compare);

    for diagnostic in &sorted {
        print_diagnostic(diagnostic, writer);
    }

    print_summary(&sorted, writer);
}

/// Print a success message when no problems are found.
pub fn print_success(source_files: usize) {
    print_success_to(source_files, &mut io::stdout().lock());
}

/// Print a success message to a custom writer.
pub fn print_success_to<W: Write>(source_files: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} source {} - no problems found",
            source_files,
            plural(source_files, "file", "files")
        )
        .green()
    );
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning(count: usize, verbose: bool) {
    print_parse_warning_to(count, verbose, &mut io::stderr().lock());
}

/// Print a parse warning to a custom writer.
pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

/// Print the discovered resources as a table.
pub fn print_inventory_to<W: Write>(summary: &DiscoverSummary, files: usize, writer: &mut W) {
    let records = summary.snapshot.records();
    let name_width = records
        .iter()
        .map(|r| UnicodeWidthStr::width(r.name()))
        .max()
        .unwrap_or(0);

    for record in records {
        print_record(record, name_width, writer);
    }

    for duplicate in &summary.duplicates {
        let _ = writeln!(
            writer,
            "{} {}",
            "warning:".bold().yellow(),
            duplicate
        );
    }
    if summary.rejected_count > 0 {
        let _ = writeln!(
            writer,
            "{} {} declaration(s) could not be read (run {} for details)",
            "warning:".bold().yellow(),
            summary.rejected_count,
            "vigil lint".cyan()
        );
    }

    if !records.is_empty() {
        let _ = writeln!(writer);
    }
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Found {} {} in {} source {} ({})",
            records.len(),
            plural(records.len(), "resource", "resources"),
            files,
            plural(files, "file", "files"),
            kind_counts(&summary.snapshot)
        )
        .green()
    );
}

pub fn print(result: &CommandResult, verbose: bool) {
    let mut stdout = io::stdout().lock();
    match &result.summary {
        CommandSummary::Discover(summary) => match &summary.json {
            Some(json) => {
                let _ = writeln!(stdout, "{}", json);
            }
            None => print_inventory_to(summary, result.files_checked, &mut stdout),
        },
        CommandSummary::Export(summary) => print_export_to(summary, &mut stdout),
        CommandSummary::Lint(_) => {
            report_to(&result.diagnostics, &mut stdout);
            if result.diagnostics.is_empty() {
                print_success_to(result.files_checked, &mut stdout);
            }
            // Parse errors are already diagnostics here.
            return;
        }
    }

    print_parse_warning(result.parse_error_count, verbose);
}

// ============================================================
// Internal Functions
// ============================================================

fn print_diagnostic<W: Write>(diagnostic: &Diagnostic, writer: &mut W) {
    let severity = match diagnostic.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity,
        diagnostic.message,
        diagnostic.code.to_string().dimmed().cyan()
    );

    // Clickable location: --> path:line
    if diagnostic.line > 0 {
        let _ = writeln!(
            writer,
            "  {} {}:{}",
            "-->".blue(),
            diagnostic.file,
            diagnostic.line
        );
    } else {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), diagnostic.file);
    }

    if let Some(suggestion) = &diagnostic.suggestion {
        let _ = writeln!(
            writer,
            "   {} {} {}",
            "=".blue(),
            "fix:".bold().cyan(),
            suggestion
        );
    }

    let _ = writeln!(writer); // Empty line between diagnostics
}

fn print_summary<W: Write>(diagnostics: &[Diagnostic], writer: &mut W) {
    let total_errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let total_warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "{} {} {} ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            plural(total_problems, "problem", "problems"),
            total_errors,
            plural(total_errors, "error", "errors").red(),
            total_warnings,
            plural(total_warnings, "warning", "warnings").yellow()
        );
    }
}

fn print_record<W: Write>(record: &Record, name_width: usize, writer: &mut W) {
    let declaration = record.declaration();
    let name = record.name();
    let padding = name_width.saturating_sub(UnicodeWidthStr::width(name));
    let kind = format!("{:<7}", record.kind().to_string());

    let mut line = format!(
        "{} {}{:padding$}  {}:{}",
        kind.cyan(),
        name.bold(),
        "",
        declaration.file,
        declaration.line,
        padding = padding
    );
    if let Some(dataset) = record.dataset() {
        line.push_str(&format!("  {}", format!("dataset: {}", dataset).dimmed()));
    }
    if let Record::Board(board) = record
        && !board.query_refs.is_empty()
    {
        line.push_str(&format!(
            "  {}",
            format!("queries: {}", board.query_refs.join(", ")).dimmed()
        ));
    }
    let _ = writeln!(writer, "{}", line);
}

fn print_export_to<W: Write>(summary: &ExportSummary, writer: &mut W) {
    let _ = writeln!(writer, "{}", summary.document);
}

fn kind_counts(snapshot: &Snapshot) -> String {
    [
        (ResourceKind::Query, "query", "queries"),
        (ResourceKind::Slo, "SLO", "SLOs"),
        (ResourceKind::Trigger, "trigger", "triggers"),
        (ResourceKind::Board, "board", "boards"),
    ]
    .into_iter()
    .map(|(kind, one, many)| {
        let count = snapshot.of_kind(kind).count();
        format!("{} {}", count, plural(count, one, many))
    })
    .collect::<Vec<_>>()
    .join(", ")
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}
