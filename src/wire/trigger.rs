use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::{
    SerializationError, Subject,
    alerting::{WireRecipient, recipients_from_wire, recipients_to_wire},
    float, number,
    query::WireQueryRef,
};
use crate::core::data::{ResourceKind, Threshold, ThresholdOp, TriggerRecord, TriggerSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTrigger {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub dataset: String,
    pub query: WireQueryRef,
    pub threshold: WireThreshold,
    /// Seconds between evaluations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<WireRecipient>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireThreshold {
    pub op: String,
    pub value: Number,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl WireTrigger {
    pub fn from_record(trigger: &TriggerRecord) -> Result<Self, SerializationError> {
        let subject = Subject::new(ResourceKind::Trigger, trigger.declaration.name.as_str());
        let spec = &trigger.spec;

        let dataset = spec
            .dataset
            .clone()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| subject.missing("dataset"))?;
        let query = spec.query.as_ref().ok_or_else(|| subject.missing("query"))?;
        let threshold = spec
            .threshold
            .as_ref()
            .ok_or_else(|| subject.missing("threshold"))?;

        Ok(Self {
            name: spec
                .name
                .clone()
                .unwrap_or_else(|| trigger.declaration.name.clone()),
            description: spec.description.clone().filter(|d| !d.is_empty()),
            dataset,
            query: WireQueryRef::from_ref(query, &subject)?,
            threshold: WireThreshold {
                op: threshold.op.wire().to_string(),
                value: number(&subject, "threshold", threshold.value)?,
            },
            frequency: spec.frequency.filter(|f| *f > 0),
            recipients: recipients_to_wire(&spec.recipients),
            disabled: spec.disabled,
        })
    }

    pub fn into_spec(self) -> Result<TriggerSpec, SerializationError> {
        let subject = Subject::new(ResourceKind::Trigger, self.name.as_str());
        Ok(TriggerSpec {
            query: Some(self.query.into_ref(&subject)?),
            threshold: Some(Threshold {
                op: ThresholdOp::parse(&self.threshold.op),
                value: float(&subject, "threshold", &self.threshold.value)?,
            }),
            frequency: self.frequency,
            recipients: recipients_from_wire(self.recipients, &subject)?,
            disabled: self.disabled,
            name: Some(self.name),
            description: self.description,
            dataset: Some(self.dataset),
        })
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        core::{data::QueryRef, extract::tests::extract_one},
        wire::{ResourceSpec, from_wire_json, to_wire_json},
    };

    fn trigger_json(body: &str) -> Result<String, SerializationError> {
        let record =
            extract_one(&format!("export const slowCheckout = trigger({});", body)).unwrap();
        to_wire_json(&record)
    }

    #[test]
    fn test_trigger_wire_format() {
        let json = trigger_json(
            r#"{
                name: "Slow checkout",
                dataset: "api",
                query: latency,
                threshold: GT(500),
                frequency: Minutes(5),
                recipients: [PagerDuty("checkout")],
            }"#,
        )
        .unwrap();
        assert_snapshot!(json, @r#"{"name":"Slow checkout","dataset":"api","query":"latency","threshold":{"op":">","value":500},"frequency":300,"recipients":[{"type":"pagerduty","target":"checkout"}]}"#);
    }

    #[test]
    fn test_inline_query_and_disabled_flag() {
        let json = trigger_json(
            r#"{
                dataset: "api",
                query: { dataset: "api", calculations: [P99("duration_ms")] },
                threshold: { op: "<=", value: 0.5 },
                disabled: true,
            }"#,
        )
        .unwrap();
        assert_snapshot!(json, @r#"{"name":"slowCheckout","dataset":"api","query":{"dataset":"api","calculations":[{"op":"P99","column":"duration_ms"}]},"threshold":{"op":"<=","value":0.5},"disabled":true}"#);
    }

    #[test]
    fn test_missing_threshold_is_an_error() {
        let err = trigger_json(r#"{ dataset: "api", query: latency }"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "trigger 'slowCheckout': missing required field 'threshold'"
        );
    }

    #[test]
    fn test_parse_back() {
        let json = r#"{"name":"Errors","dataset":"api","query":"errors","threshold":{"op":">=","value":10},"frequency":60}"#;
        let ResourceSpec::Trigger(spec) = from_wire_json(ResourceKind::Trigger, json).unwrap() else {
            panic!("expected a trigger spec");
        };
        assert_eq!(spec.query, Some(QueryRef::Named("errors".to_string())));
        assert_eq!(
            spec.threshold,
            Some(Threshold {
                op: ThresholdOp::Gte,
                value: 10.0
            })
        );
        assert_eq!(spec.frequency, Some(60));
        assert!(!spec.disabled);
    }

    #[test]
    fn test_every_threshold_builder_matches_its_literal() {
        for op in ThresholdOp::ALL {
            let body = |threshold: String| {
                format!(
                    r#"{{ dataset: "api", query: latency, threshold: {}, disabled: true }}"#,
                    threshold
                )
            };
            let built = trigger_json(&body(format!("{}(500)", op.code()))).unwrap();
            let from_code =
                trigger_json(&body(format!(r#"{{ op: "{}", value: 500 }}"#, op.code()))).unwrap();
            let from_wire =
                trigger_json(&body(format!(r#"{{ op: "{}", value: 500 }}"#, op.wire()))).unwrap();
            assert_eq!(built, from_code, "{}", op);
            assert_eq!(built, from_wire, "{}", op);
            assert!(
                built.contains(&format!(r#""threshold":{{"op":"{}","value":500}}"#, op.wire())),
                "{}",
                op
            );
        }
    }
}
