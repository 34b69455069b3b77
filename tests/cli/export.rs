use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, MONITORING, run};

#[test]
fn test_export_compact_document() -> Result<()> {
    let test = CliTest::with_file("monitoring/api.ts", MONITORING)?;
    let mut cmd = test.export_command();
    cmd.arg("--compact");
    let run = run(cmd)?;

    assert_eq!(run.code, Some(0));
    assert_eq!(
        run.stdout.trim_end(),
        r#"{"queries":[{"name":"total","query":{"dataset":"api","calculations":[{"op":"COUNT"}]}},{"name":"good","query":{"dataset":"api","calculations":[{"op":"COUNT"}],"filters":[{"column":"status","op":"<","value":500}]}}],"slos":[{"name":"availability","dataset":"api","sli":{"good_events":"good","total_events":"total"},"target_per_million":999000,"time_period_days":30}],"triggers":[],"boards":[{"name":"overview","panels":[{"type":"query","query":"total"},{"type":"slo","slo":"availability"}]}]}"#
    );

    Ok(())
}

#[test]
fn test_export_has_no_provenance() -> Result<()> {
    let test = CliTest::with_file("monitoring/api.ts", MONITORING)?;
    let run = run(test.export_command())?;

    assert_eq!(run.code, Some(0));
    let document: Value = serde_json::from_str(&run.stdout)?;
    assert_eq!(document["slos"][0]["target_per_million"], 999000);
    assert!(!run.stdout.contains("monitoring/api.ts"));
    assert!(!run.stdout.contains("declaration"));

    Ok(())
}

#[test]
fn test_export_single_kind() -> Result<()> {
    let test = CliTest::with_file("monitoring/api.ts", MONITORING)?;
    let mut cmd = test.export_command();
    cmd.args(["--kind", "slos", "--compact"]);
    let run = run(cmd)?;

    assert_eq!(run.code, Some(0));
    let document: Value = serde_json::from_str(&run.stdout)?;
    assert_eq!(document["queries"], Value::Array(Vec::new()));
    assert_eq!(document["boards"], Value::Array(Vec::new()));
    assert_eq!(document["slos"][0]["name"], "availability");

    Ok(())
}

#[test]
fn test_unserializable_record_fails_without_output() -> Result<()> {
    let test = CliTest::with_file(
        "alerts.ts",
        r#"
export const errors = query({ dataset: "api", calculations: [Count()] });
export const noisy = trigger({ dataset: "api", query: errors });
"#,
    )?;
    let run = run(test.export_command())?;

    assert_eq!(run.code, Some(2));
    assert_eq!(run.stdout, "");
    assert!(
        run.stderr
            .contains("trigger 'noisy': missing required field 'threshold'")
    );

    Ok(())
}
