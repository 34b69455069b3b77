use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::issues::Rule;

pub const CONFIG_FILE_NAME: &str = ".vigilrc.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directories or globs to scan, relative to the source root. Empty scans everything.
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_ignore_test_files")]
    pub ignore_test_files: bool,
    /// Key records by (directory, name) instead of bare name.
    #[serde(default)]
    pub namespacing: bool,
    /// Fail the whole pass on the first duplicate name.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub disabled_rules: Vec<String>,
}

fn default_ignores() -> Vec<String> {
    vec!["**/node_modules/**".to_string()]
}

fn default_ignore_test_files() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            ignore_test_files: default_ignore_test_files(),
            namespacing: false,
            strict: false,
            disabled_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Reject glob patterns that do not compile and rule codes that do not exist.
    pub fn validate(&self) -> Result<()> {
        check_globs("ignores", self.ignores.iter())?;
        check_globs(
            "includes",
            self.includes.iter().filter(|include| has_wildcard(include)),
        )?;
        self.disabled_rules()?;
        Ok(())
    }

    pub fn disabled_rules(&self) -> Result<Vec<Rule>> {
        self.disabled_rules
            .iter()
            .map(|code| {
                code.parse::<Rule>()
                    .map_err(|err| anyhow!("Invalid entry in 'disabledRules': {}", err))
            })
            .collect()
    }
}

/// Includes and ignores without `*` or `?` name a directory, not a glob.
pub(crate) fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

fn check_globs<'a>(field: &str, patterns: impl Iterator<Item = &'a String>) -> Result<()> {
    for pattern in patterns {
        Pattern::new(pattern)
            .with_context(|| format!("Invalid glob pattern in '{}': \"{}\"", field, pattern))?;
    }
    Ok(())
}

/// Nearest `.vigilrc.json` at or above `start_dir`. The search stops at a
/// repository root (a directory holding `.git`).
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

pub struct LoadedConfig {
    pub config: Config,
    /// `None` when no config file was found and defaults apply.
    pub path: Option<PathBuf>,
}

pub fn load_config(start_dir: &Path) -> Result<LoadedConfig> {
    let Some(path) = find_config_file(start_dir) else {
        return Ok(LoadedConfig {
            config: Config::default(),
            path: None,
        });
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config.validate()?;

    Ok(LoadedConfig {
        config,
        path: Some(path),
    })
}
