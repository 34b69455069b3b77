use serde::Serialize;

use super::{alerting::Recipient, declaration::Declaration, ops::ThresholdOp, query::QueryRef};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threshold {
    pub op: ThresholdOp,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerSpec {
    /// Display name; the declaration name is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    /// Evaluation interval in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<Recipient>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerRecord {
    pub declaration: Declaration,
    #[serde(flatten)]
    pub spec: TriggerSpec,
}
