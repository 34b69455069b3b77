use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::has_wildcard;

pub struct ScanResult {
    /// Eligible files in lexicographic path order, without duplicates.
    pub files: Vec<String>,
    pub skipped_count: usize,
}

/// Configured ignores, split into directory prefixes and compiled globs.
struct Ignores {
    prefixes: Vec<PathBuf>,
    globs: Vec<Pattern>,
    test_files: bool,
}

impl Ignores {
    fn new(base_dir: &Path, patterns: &[String], test_files: bool) -> Self {
        let mut ignores = Self {
            prefixes: Vec::new(),
            globs: Vec::new(),
            test_files,
        };
        for raw in patterns {
            if !has_wildcard(raw) {
                ignores.prefixes.push(base_dir.join(raw));
                continue;
            }
            match Pattern::new(raw) {
                Ok(pattern) => ignores.globs.push(pattern),
                Err(e) => warn!(pattern = %raw, "invalid ignore pattern: {}", e),
            }
        }
        ignores
    }

    fn excludes(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.prefixes.iter().any(|prefix| path.starts_with(prefix))
            || self.globs.iter().any(|glob| glob.matches(&text))
            || (self.test_files && is_test_file(path))
    }
}

/// Directories named by `includes`, sorted; the base itself when there are none.
fn scan_roots(base_dir: &Path, includes: &[String]) -> Vec<PathBuf> {
    if includes.is_empty() {
        return vec![base_dir.to_path_buf()];
    }

    let mut roots = Vec::new();
    for include in includes {
        let joined = base_dir.join(include);
        if !has_wildcard(include) {
            if joined.exists() {
                roots.push(joined);
            } else {
                warn!(path = %joined.display(), "include path does not exist");
            }
            continue;
        }
        match glob(&joined.to_string_lossy()) {
            Ok(matches) => roots.extend(matches.flatten().filter(|m| m.is_dir())),
            Err(e) => warn!(pattern = %include, "invalid include pattern: {}", e),
        }
    }
    roots.sort();
    roots
}

/// Walk `base_dir` and collect the source files to extract from.
///
/// Directories and files whose name starts with `.` are never entered (the root
/// itself is exempt, so `.` works as a base). The returned order is stable across
/// runs, which is what makes first-wins duplicate handling deterministic.
pub fn scan_files(
    base_dir: &str,
    includes: &[String],
    ignore_patterns: &[String],
    ignore_test_files: bool,
) -> ScanResult {
    let base = Path::new(base_dir);
    let ignores = Ignores::new(base, ignore_patterns, ignore_test_files);
    let mut files: Vec<String> = Vec::new();
    let mut skipped_count = 0;

    for root in scan_roots(base, includes) {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    warn!("cannot access path: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_file() && is_scannable_file(path) && !ignores.excludes(path) {
                files.push(path.to_string_lossy().into());
            }
        }
    }

    // Overlapping includes can yield the same file twice.
    files.sort();
    files.dedup();
    debug!(count = files.len(), skipped = skipped_count, "scanned source files");

    ScanResult {
        files,
        skipped_count,
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// `*.test.*` and `*.spec.*` files, and anything under a `__tests__` directory.
fn is_test_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.contains(".test.")
        || name.contains(".spec.")
        || path.components().any(|c| c.as_os_str() == "__tests__")
}

fn is_scannable_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tsx" | "ts" | "jsx" | "js")
    ) && !path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".d.ts"))
}
