use anyhow::Result;

use crate::{CliTest, MONITORING, run};

#[test]
fn test_clean_tree() -> Result<()> {
    let test = CliTest::with_file("monitoring/api.ts", MONITORING)?;
    let run = run(test.lint_command())?;

    assert_eq!(run.code, Some(0));
    assert!(
        run.stdout
            .contains("✓ Checked 1 source file - no problems found")
    );

    Ok(())
}

#[test]
fn test_errors_fail_the_run() -> Result<()> {
    let test = CliTest::with_file(
        "monitoring/api.ts",
        r#"
export const latency = query({ calculations: [P99()] });
"#,
    )?;
    let run = run(test.lint_command())?;

    assert_eq!(run.code, Some(1));
    assert!(run.stdout.contains("calculation-missing-column"));
    assert!(run.stdout.contains("missing-dataset"));
    assert!(run.stdout.contains("  --> monitoring/api.ts:2"));
    assert!(run.stdout.contains("✘ 2 problems (2 errors, 0 warnings)"));
    // Suggestions only with --fix.
    assert!(!run.stdout.contains("= fix:"));

    Ok(())
}

#[test]
fn test_warnings_alone_pass() -> Result<()> {
    let test = CliTest::with_file(
        "boards.ts",
        r#"export const overview = board({ panels: [] });"#,
    )?;
    let run = run(test.lint_command())?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("warning: board 'overview' has no panels  empty-board"));
    assert!(run.stdout.contains("✘ 1 problem (0 errors, 1 warning)"));

    Ok(())
}

#[test]
fn test_disable_flag() -> Result<()> {
    let test = CliTest::with_file(
        "monitoring/api.ts",
        r#"export const latency = query({ calculations: [P99("duration_ms")] });"#,
    )?;
    let mut cmd = test.lint_command();
    cmd.args(["--disable", "missing-dataset"]);
    let run = run(cmd)?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("no problems found"));

    Ok(())
}

#[test]
fn test_disabled_rules_from_config() -> Result<()> {
    let test = CliTest::with_file(
        "boards.ts",
        r#"export const overview = board({ panels: [] });"#,
    )?;
    test.write_file(".vigilrc.json", r#"{ "disabledRules": ["empty-board"] }"#)?;
    let run = run(test.lint_command())?;

    assert_eq!(run.code, Some(0));
    assert!(!run.stdout.contains("empty-board"));

    Ok(())
}

#[test]
fn test_fix_prints_suggestions() -> Result<()> {
    let test = CliTest::with_file(
        "boards.ts",
        r#"export const overview = board({ panels: [] });"#,
    )?;
    let mut cmd = test.lint_command();
    cmd.arg("--fix");
    let run = run(cmd)?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("   = fix: "));

    Ok(())
}

#[test]
fn test_parse_error_is_reported() -> Result<()> {
    let test = CliTest::with_file("monitoring/api.ts", MONITORING)?;
    test.write_file("monitoring/broken.ts", "export const = ;")?;
    let run = run(test.lint_command())?;

    assert_eq!(run.code, Some(1));
    assert!(run.stdout.contains("parse-error"));
    assert!(run.stdout.contains("--> monitoring/broken.ts"));

    Ok(())
}

#[test]
fn test_dangling_reference_and_duplicate_are_warnings() -> Result<()> {
    let test = CliTest::with_file(
        "a.ts",
        r#"export const overview = board({ panels: [QueryPanel(missing)] });"#,
    )?;
    test.write_file("b.ts", r#"export const overview = board({ panels: [TextPanel("hi")] });"#)?;
    let run = run(test.lint_command())?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("dangling-query-ref"));
    assert!(run.stdout.contains("duplicate-name"));
    assert!(run.stdout.contains("--> b.ts:1"));

    Ok(())
}
