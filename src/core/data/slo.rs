use serde::Serialize;

use super::{
    alerting::{BurnAlert, TimePeriod},
    declaration::Declaration,
    query::QueryRef,
};

/// Service level indicator: the good/total event query pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sli {
    pub good_events: QueryRef,
    pub total_events: QueryRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SloSpec {
    /// Display name; the declaration name is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sli: Option<Sli>,
    /// Target as a percentage, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub burn_alerts: Vec<BurnAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SloRecord {
    pub declaration: Declaration,
    #[serde(flatten)]
    pub spec: SloSpec,
}
