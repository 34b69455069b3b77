use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Ok, Result};
use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

mod discover;
mod export;
mod lint;

const BIN_NAME: &str = "vigil";

/// A small monitoring tree that lints clean.
pub const MONITORING: &str = r#"
export const total = query({ dataset: "api", calculations: [Count()] });
export const good = query({ dataset: "api", calculations: [Count()], filters: [LT("status", 500)] });
export const availability = slo({
    dataset: "api",
    sli: SLI(good, total),
    target: 99.9,
    timePeriod: Days(30),
});
export const overview = board({ panels: [QueryPanel(total), SLOPanel(availability)] });
"#;

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        // Stops the config lookup at the project directory.
        fs::create_dir_all(project_dir.join(".git"))?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    pub fn with_file(path: &str, content: &str) -> Result<Self> {
        let test = Self::new()?;
        test.write_file(path, content)?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd
    }

    pub fn discover_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("discover");
        cmd
    }

    pub fn export_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("export");
        cmd
    }

    pub fn lint_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("lint");
        cmd
    }
}

/// Captured output of one run.
pub struct Run {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub fn run(mut cmd: Command) -> Result<Run> {
    let Output {
        status,
        stdout,
        stderr,
    } = cmd.output().context("Failed to run vigil")?;
    Ok(Run {
        code: status.code(),
        stdout: String::from_utf8(stdout)?,
        stderr: String::from_utf8(stderr)?,
    })
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;
    let run = run(test.command())?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Usage:"));
    assert!(run.stdout.contains("discover"));
    assert!(run.stdout.contains("export"));
    assert!(run.stdout.contains("lint"));

    Ok(())
}

#[test]
fn test_source_root_must_be_a_directory() -> Result<()> {
    let test = CliTest::with_file("monitoring.ts", MONITORING)?;
    let mut cmd = test.discover_command();
    cmd.arg("--source-root").arg(test.root().join("monitoring.ts"));
    let run = run(cmd)?;

    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("is not a directory"));

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file("monitoring.ts", MONITORING)?;
    test.write_file(".vigilrc.json", r#"{ "disabledRules": ["no-such-rule"] }"#)?;
    let run = run(test.lint_command())?;

    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("disabledRules"));

    Ok(())
}
