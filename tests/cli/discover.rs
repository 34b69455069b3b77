use anyhow::Result;
use serde_json::Value;

use crate::{CliTest, MONITORING, run};

#[test]
fn test_discover_table() -> Result<()> {
    let test = CliTest::with_file("monitoring/api.ts", MONITORING)?;
    let run = run(test.discover_command())?;

    assert_eq!(run.code, Some(0));
    let lines: Vec<_> = run.stdout.lines().collect();
    assert!(lines[0].starts_with("query   total"));
    assert!(lines[0].contains("monitoring/api.ts:2"));
    assert!(lines[0].ends_with("dataset: api"));
    assert!(lines[2].starts_with("slo     availability"));
    assert!(lines[3].starts_with("board   overview"));
    assert!(
        run.stdout
            .contains("Found 4 resources in 1 source file (2 queries, 1 SLO, 0 triggers, 1 board)")
    );

    Ok(())
}

#[test]
fn test_discover_json_inventory() -> Result<()> {
    let test = CliTest::with_file("monitoring/api.ts", MONITORING)?;
    let mut cmd = test.discover_command();
    cmd.arg("--json");
    let run = run(cmd)?;

    assert_eq!(run.code, Some(0));
    let inventory: Value = serde_json::from_str(&run.stdout)?;
    assert_eq!(inventory["queries"].as_array().map(Vec::len), Some(2));
    assert_eq!(inventory["queries"][0]["declaration"]["name"], "total");
    assert_eq!(inventory["queries"][0]["declaration"]["file"], "monitoring/api.ts");
    assert_eq!(inventory["slos"][0]["declaration"]["name"], "availability");
    assert_eq!(inventory["boards"][0]["query_refs"][0], "total");
    assert_eq!(inventory["triggers"].as_array().map(Vec::len), Some(0));

    Ok(())
}

#[test]
fn test_discover_filters_by_dataset() -> Result<()> {
    let test = CliTest::with_file("monitoring/api.ts", MONITORING)?;
    test.write_file(
        "monitoring/web.ts",
        r#"export const pageViews = query({ dataset: "web", calculations: [Count()] });"#,
    )?;
    let mut cmd = test.discover_command();
    cmd.args(["--dataset", "web"]);
    let run = run(cmd)?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("pageViews"));
    assert!(!run.stdout.contains("availability"));

    Ok(())
}

#[test]
fn test_duplicates_are_reported_in_lenient_mode() -> Result<()> {
    let test = CliTest::with_file(
        "a.ts",
        r#"export const latency = query({ dataset: "api" });"#,
    )?;
    test.write_file("b.ts", r#"export const latency = query({ dataset: "web" });"#)?;
    let run = run(test.discover_command())?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("a.ts:1"));
    assert!(run.stdout.contains("warning: query 'latency' at b.ts:1 duplicates query declared at a.ts:1"));

    Ok(())
}

#[test]
fn test_strict_duplicate_fails() -> Result<()> {
    let test = CliTest::with_file(
        "a.ts",
        r#"export const latency = query({ dataset: "api" });"#,
    )?;
    test.write_file("b.ts", r#"export const latency = query({ dataset: "web" });"#)?;
    let mut cmd = test.discover_command();
    cmd.arg("--strict");
    let run = run(cmd)?;

    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("Error:"));
    assert!(run.stderr.contains("latency"));

    Ok(())
}

#[test]
fn test_namespacing_keeps_same_name_in_different_directories() -> Result<()> {
    let test = CliTest::with_file(
        "checkout/q.ts",
        r#"export const latency = query({ dataset: "api" });"#,
    )?;
    test.write_file("search/q.ts", r#"export const latency = query({ dataset: "web" });"#)?;
    let mut cmd = test.discover_command();
    cmd.args(["--namespacing", "--strict"]);
    let run = run(cmd)?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Found 2 resources"));

    Ok(())
}
