//! SLO and trigger rules.

use crate::{
    core::{
        data::{QuerySpec, Record, Resource, ResourceKind, SloRecord, TriggerRecord},
        registry::Snapshot,
    },
    issues::{Diagnostic, Rule},
};

pub fn check_alerting(record: &Record, snapshot: &Snapshot) -> Vec<Diagnostic> {
    match record {
        Record::Slo(slo) => {
            let mut diagnostics = check_slo_target(slo);
            diagnostics.extend(check_burn_alert_recipients(slo));
            diagnostics
        }
        Record::Trigger(trigger) => {
            let mut diagnostics = check_trigger_threshold(trigger);
            diagnostics.extend(check_trigger_query_shape(trigger, snapshot));
            diagnostics.extend(check_trigger_recipients(trigger));
            diagnostics
        }
        Record::Query(_) | Record::Board(_) => Vec::new(),
    }
}

fn diagnostic(rule: Rule, record: &impl Resource, message: String) -> Diagnostic {
    let declaration = record.declaration();
    Diagnostic::new(rule, &declaration.file, declaration.line, message).for_resource(record.name())
}

/// Targets are percentages: anything outside 0..=100 cannot be sent.
fn check_slo_target(slo: &SloRecord) -> Vec<Diagnostic> {
    let Some(target) = slo.spec.target else {
        return Vec::new();
    };
    if (0.0..=100.0).contains(&target) {
        return Vec::new();
    }
    vec![
        diagnostic(
            Rule::SloTargetRange,
            slo,
            format!(
                "SLO '{}' has target {}, which is not a percentage between 0 and 100",
                slo.name(),
                target
            ),
        )
        .with_suggestion("write the target as a percentage, e.g. Percentage(99.9)"),
    ]
}

fn check_burn_alert_recipients(slo: &SloRecord) -> Vec<Diagnostic> {
    slo.spec
        .burn_alerts
        .iter()
        .enumerate()
        .filter(|(_, alert)| alert.recipients.is_empty())
        .map(|(index, alert)| {
            let label = match &alert.name {
                Some(name) => format!("'{}'", name),
                None => format!("{}", index + 1),
            };
            diagnostic(
                Rule::MissingRecipients,
                slo,
                format!(
                    "burn alert {} of SLO '{}' notifies no one",
                    label,
                    slo.name()
                ),
            )
            .with_suggestion("add `recipients` to the burn alert")
        })
        .collect()
}

fn check_trigger_threshold(trigger: &TriggerRecord) -> Vec<Diagnostic> {
    match &trigger.spec.threshold {
        None => vec![
            diagnostic(
                Rule::TriggerMissingThreshold,
                trigger,
                format!("trigger '{}' has no threshold", trigger.name()),
            )
            .with_suggestion("add a threshold, e.g. `threshold: GT(100)`"),
        ],
        Some(threshold) if !threshold.op.is_known() => vec![
            diagnostic(
                Rule::UnknownOperator,
                trigger,
                format!(
                    "unknown threshold operator '{}' in trigger '{}'",
                    threshold.op.code(),
                    trigger.name()
                ),
            )
            .with_suggestion("use GT, GTE, LT or LTE"),
        ],
        Some(_) => Vec::new(),
    }
}

/// A trigger evaluates a single number: its query needs exactly one calculation
/// and no orders or limit. Named queries are checked when they are registered.
fn check_trigger_query_shape(trigger: &TriggerRecord, snapshot: &Snapshot) -> Vec<Diagnostic> {
    let Some(query) = &trigger.spec.query else {
        return Vec::new();
    };
    let (spec, site): (&QuerySpec, String) = match query.name() {
        None => match query.inline() {
            Some(spec) => (spec, "its inline query".to_string()),
            None => return Vec::new(),
        },
        Some(name) => {
            let scope = &trigger.declaration.scope;
            match snapshot.lookup(ResourceKind::Query, name, scope) {
                Some(Record::Query(named)) => (&named.spec, format!("query '{}'", name)),
                _ => return Vec::new(),
            }
        }
    };

    let mut problems = Vec::new();
    if spec.calculations.len() != 1 {
        problems.push(format!(
            "{} calculations instead of exactly one",
            spec.calculations.len()
        ));
    }
    if !spec.orders.is_empty() {
        problems.push("orders".to_string());
    }
    if spec.limit.is_some() {
        problems.push("a limit".to_string());
    }
    if problems.is_empty() {
        return Vec::new();
    }

    vec![
        diagnostic(
            Rule::TriggerQueryShape,
            trigger,
            format!(
                "trigger '{}' cannot evaluate {}: it has {}",
                trigger.name(),
                site,
                problems.join(", ")
            ),
        )
        .with_suggestion("keep one calculation and drop orders and limit"),
    ]
}

fn check_trigger_recipients(trigger: &TriggerRecord) -> Vec<Diagnostic> {
    if trigger.spec.disabled || !trigger.spec.recipients.is_empty() {
        return Vec::new();
    }
    vec![
        diagnostic(
            Rule::MissingRecipients,
            trigger,
            format!("trigger '{}' notifies no one", trigger.name()),
        )
        .with_suggestion("add `recipients`, or set `disabled: true`"),
    ]
}
