//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `discover`: List the resources declared under the source root
//! - `export`: Print the combined wire document
//! - `lint`: Run the lint rules

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::{core::data::ResourceKind, issues::Rule};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|common| common.verbose)
    }

    pub fn common(&self) -> Option<&CommonArgs> {
        match &self.command {
            Some(Command::Discover(cmd)) => Some(&cmd.common),
            Some(Command::Export(cmd)) => Some(&cmd.common),
            Some(Command::Lint(cmd)) => Some(&cmd.common),
            None => None,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Directory to scan for monitoring declarations (default: current directory)
    #[arg(long, env = "VIGIL_SOURCE_ROOT")]
    pub source_root: Option<PathBuf>,

    /// Key resource names by declaring directory (overrides config file)
    #[arg(long)]
    pub namespacing: bool,

    /// Fail on the first duplicate resource name (overrides config file)
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct DiscoverCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print the inventory as JSON, with provenance
    #[arg(long)]
    pub json: bool,

    /// Only resources that use this dataset
    #[arg(long)]
    pub dataset: Option<String>,

    /// Only resources declared in this directory (relative to the source root)
    #[arg(long)]
    pub scope: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Only export one kind: query, slo, trigger or board
    #[arg(long)]
    pub kind: Option<ResourceKind>,

    /// Print compact JSON instead of pretty-printed JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct LintCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Disable a rule by code. Can be specified multiple times: --disable empty-board --disable duplicate-name
    #[arg(long = "disable", value_name = "CODE")]
    pub disabled: Vec<Rule>,

    /// Show what a fix would change for each problem (nothing is written)
    #[arg(long)]
    pub fix: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List monitoring resources (queries, SLOs, triggers, boards) declared in source
    Discover(DiscoverCommand),
    /// Print the wire JSON of every discovered resource
    Export(ExportCommand),
    /// Check discovered resources for problems
    Lint(LintCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lint_flags() {
        let args = Arguments::try_parse_from([
            "vigil",
            "lint",
            "--disable",
            "empty-board",
            "--disable",
            "DUPLICATE_NAME",
            "--fix",
            "-v",
        ])
        .unwrap();
        let Some(Command::Lint(cmd)) = &args.command else {
            panic!("expected lint");
        };
        assert_eq!(cmd.disabled, vec![Rule::EmptyBoard, Rule::DuplicateName]);
        assert!(cmd.fix);
        assert!(args.verbose());
    }

    #[test]
    fn test_unknown_rule_code_is_rejected() {
        assert!(Arguments::try_parse_from(["vigil", "lint", "--disable", "nope"]).is_err());
    }

    #[test]
    fn test_export_kind() {
        let args = Arguments::try_parse_from(["vigil", "export", "--kind", "slos", "--compact"]).unwrap();
        let Some(Command::Export(cmd)) = args.command else {
            panic!("expected export");
        };
        assert_eq!(cmd.kind, Some(ResourceKind::Slo));
        assert!(cmd.compact);
    }

    #[test]
    fn verify_cli() {
        Arguments::command().debug_assert();
    }
}
