//! Pipeline orchestration.
//!
//! One pass is: scan → parse → extract → resolve → register. Every pass starts
//! from nothing and ends with an immutable [`Snapshot`] (or a fatal error in
//! strict mode); nothing is cached between passes.
//!
//! # Configuration Priority
//!
//! 1. CLI arguments (e.g., `--strict`)
//! 2. `.vigilrc.json` config file
//! 3. Built-in defaults

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use serde::Serialize;
use swc_common::SourceMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cli::args::CommonArgs,
    config::{Config, load_config},
    core::{
        data::{BoardRecord, QueryRecord, Record, SloRecord, TriggerRecord},
        extract::{DeclarationError, extract_module},
        file_scanner::scan_files,
        parsers::source::{SyntaxError, parse_source},
        registry::{DuplicateDetected, Registry, RegistryOptions, Snapshot},
        resolve::resolve,
    },
    issues::Rule,
};

/// Fatal failure of a pass. Per-file and per-declaration problems are not fatal.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("source root '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Duplicate(#[from] DuplicateDetected),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryOptions {
    pub includes: Vec<String>,
    pub ignores: Vec<String>,
    pub ignore_test_files: bool,
    pub registry: RegistryOptions,
}

impl From<&Config> for DiscoveryOptions {
    fn from(config: &Config) -> Self {
        Self {
            includes: config.includes.clone(),
            ignores: config.ignores.clone(),
            ignore_test_files: config.ignore_test_files,
            registry: RegistryOptions {
                namespacing: config.namespacing,
                strict: config.strict,
            },
        }
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Output of one pass.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Scanned files relative to the root, in scan order.
    pub files: Vec<String>,
    pub skipped_count: usize,
    pub snapshot: Snapshot,
    pub syntax_errors: Vec<SyntaxError>,
    pub declaration_errors: Vec<DeclarationError>,
}

/// Run one discovery pass over `root`.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<Discovery, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let scan = scan_files(
        &root.to_string_lossy(),
        &options.includes,
        &options.ignores,
        options.ignore_test_files,
    );
    if scan.skipped_count > 0 {
        warn!("{} path(s) skipped due to access errors", scan.skipped_count);
    }

    let mut files = Vec::with_capacity(scan.files.len());
    let mut records = Vec::new();
    let mut syntax_errors = Vec::new();
    let mut declaration_errors = Vec::new();

    for path in &scan.files {
        let relative = relative_path(root, Path::new(path));
        let scope = scope_of(&relative);

        let code = match fs::read_to_string(path) {
            Ok(code) => code,
            Err(err) => {
                warn!(file = %relative, "cannot read file: {}", err);
                syntax_errors.push(SyntaxError::unreadable(&relative, &err));
                continue;
            }
        };

        // Each file gets its own SourceMap so positions are file-local.
        match parse_source(code, &relative, Arc::new(SourceMap::default())) {
            Ok(parsed) => {
                let extraction = extract_module(&parsed, &relative, &scope);
                debug!(
                    file = %relative,
                    records = extraction.records.len(),
                    rejected = extraction.errors.len(),
                    "extracted"
                );
                records.extend(extraction.records);
                declaration_errors.extend(extraction.errors);
            }
            Err(err) => {
                warn!("parse failed: {}", err);
                syntax_errors.push(err);
            }
        }
        files.push(relative);
    }

    let snapshot = Registry::build_from(resolve(records), options.registry)?;

    Ok(Discovery {
        files,
        skipped_count: scan.skipped_count,
        snapshot,
        syntax_errors,
        declaration_errors,
    })
}

/// `root/svc/checkout/q.ts` → `svc/checkout/q.ts`, always with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory part of a relative path, `.` for files at the root.
fn scope_of(relative: &str) -> String {
    match relative.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => ".".to_string(),
    }
}

/// Every registered record, grouped by kind, with provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub queries: Vec<QueryRecord>,
    pub boards: Vec<BoardRecord>,
    pub slos: Vec<SloRecord>,
    pub triggers: Vec<TriggerRecord>,
}

impl From<&Snapshot> for Inventory {
    fn from(snapshot: &Snapshot) -> Self {
        let mut inventory = Inventory::default();
        for record in snapshot.records() {
            match record {
                Record::Query(query) => inventory.queries.push(query.clone()),
                Record::Board(board) => inventory.boards.push(board.clone()),
                Record::Slo(slo) => inventory.slos.push(slo.clone()),
                Record::Trigger(trigger) => inventory.triggers.push(trigger.clone()),
            }
        }
        inventory
    }
}

/// Discover every resource under `root` with the default options.
pub fn discover_all(root: impl AsRef<Path>) -> Result<Inventory, DiscoveryError> {
    let discovery = discover(root.as_ref(), &DiscoveryOptions::default())?;
    Ok(Inventory::from(&discovery.snapshot))
}

/// Configuration and source root of one CLI invocation.
pub struct DiscoveryContext {
    /// Merged configuration (CLI args > config file > defaults).
    pub config: Config,
    pub root_dir: PathBuf,
}

impl DiscoveryContext {
    /// Load the config found from the source root and apply CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or invalid.
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let loaded = load_config(&root_dir)?;
        match &loaded.path {
            Some(path) => debug!(path = %path.display(), "loaded configuration"),
            None => debug!("no .vigilrc.json found, using default configuration"),
        }

        let mut config = loaded.config;
        if common_args.namespacing {
            config.namespacing = true;
        }
        if common_args.strict {
            config.strict = true;
        }

        Ok(Self { config, root_dir })
    }

    pub fn discover(&self) -> Result<Discovery, DiscoveryError> {
        discover(&self.root_dir, &DiscoveryOptions::from(&self.config))
    }

    /// Rules disabled by the config file.
    pub fn disabled_rules(&self) -> Result<Vec<Rule>> {
        self.config.disabled_rules()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::core::data::Resource;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_relative_paths_and_scopes() {
        let root = Path::new("/repo");
        let relative = relative_path(root, Path::new("/repo/svc/checkout/q.ts"));
        assert_eq!(relative, "svc/checkout/q.ts");
        assert_eq!(scope_of(&relative), "svc/checkout");
        assert_eq!(scope_of("q.ts"), ".");
    }

    #[test]
    fn test_scenario() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "monitoring/queries.ts",
            r#"
            export const totalRequests = query({ dataset: "api", calculations: [Count()] });
            export const goodRequests = query({
                dataset: "api",
                calculations: [Count()],
                filters: [LT("status", 500)],
            });
            "#,
        );
        write(
            dir.path(),
            "monitoring/alerts.ts",
            r##"
            import { goodRequests, totalRequests } from "./queries";

            export const availability = slo({
                dataset: "api",
                sli: SLI(goodRequests, totalRequests),
                target: Percentage(99.9),
                timePeriod: Days(30),
            });

            export const tooManyRequests = trigger({
                dataset: "api",
                query: totalRequests,
                threshold: GT(10000),
                recipients: [Slack("#oncall")],
            });
            "##,
        );
        write(
            dir.path(),
            "monitoring/boards.ts",
            r#"
            import * as q from "./queries";

            export const overview = board({
                name: "API overview",
                panels: [
                    QueryPanel(q.totalRequests),
                    QueryPanel(q.goodRequests),
                    QueryPanel(query({ dataset: "api", calculations: [P99("duration_ms")] })),
                ],
            });
            "#,
        );

        let inventory = discover_all(dir.path()).unwrap();
        assert_eq!(inventory.queries.len(), 2);
        assert_eq!(inventory.slos.len(), 1);
        assert_eq!(inventory.triggers.len(), 1);
        assert_eq!(inventory.boards.len(), 1);
        assert_eq!(
            inventory.boards[0].query_refs,
            vec!["totalRequests", "goodRequests"]
        );
        assert_eq!(inventory.boards[0].declaration.file, "monitoring/boards.ts");
        assert_eq!(inventory.boards[0].declaration.scope, "monitoring");
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.ts", r#"export const a = query({ dataset: "api" });"#);
        write(dir.path(), "b/b.ts", r#"export const b = board({ panels: [QueryPanel(a)] });"#);

        let first = discover_all(dir.path()).unwrap();
        let second = discover_all(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_errors_do_not_abort_the_scan() {
        let dir = tempdir().unwrap();
        write(dir.path(), "broken.ts", "export const = ;");
        write(dir.path(), "fine.ts", r#"export const fine = query({ dataset: "api" });"#);

        let discovery = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(discovery.syntax_errors.len(), 1);
        assert_eq!(discovery.syntax_errors[0].file, "broken.ts");
        assert_eq!(discovery.snapshot.count(), 1);
        assert_eq!(discovery.files, vec!["broken.ts", "fine.ts"]);
    }

    #[test]
    fn test_first_duplicate_by_path_wins() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b/q.ts", r#"export const latency = query({ dataset: "b" });"#);
        write(dir.path(), "a/q.ts", r#"export const latency = query({ dataset: "a" });"#);

        let discovery = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(discovery.snapshot.count(), 1);
        assert_eq!(discovery.snapshot.records()[0].dataset(), Some("a"));
        assert_eq!(discovery.snapshot.duplicates().len(), 1);

        let strict = DiscoveryOptions {
            registry: RegistryOptions {
                strict: true,
                namespacing: false,
            },
            ..Default::default()
        };
        assert!(matches!(
            discover(dir.path(), &strict),
            Err(DiscoveryError::Duplicate(_))
        ));

        let namespaced = DiscoveryOptions {
            registry: RegistryOptions {
                strict: true,
                namespacing: true,
            },
            ..Default::default()
        };
        assert_eq!(discover(dir.path(), &namespaced).unwrap().snapshot.count(), 2);
    }

    #[test]
    fn test_test_files_and_hidden_directories_are_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "q.test.ts", r#"export const t = query({ dataset: "api" });"#);
        write(dir.path(), ".cache/q.ts", r#"export const h = query({ dataset: "api" });"#);
        write(dir.path(), "q.ts", r#"export const q = query({ dataset: "api" });"#);

        let discovery = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        let names: Vec<_> = discovery.snapshot.records().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["q"]);
    }

    #[test]
    fn test_missing_root() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_all(&missing),
            Err(DiscoveryError::NotADirectory(_))
        ));
    }
}
