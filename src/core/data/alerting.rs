//! Alerting pieces shared by SLOs and triggers.

use serde::Serialize;

use super::ops::lookup_key;

/// Where a notification goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    Slack,
    PagerDuty,
    Email,
    Webhook,
}

impl RecipientType {
    pub fn wire(&self) -> &'static str {
        match self {
            RecipientType::Slack => "slack",
            RecipientType::PagerDuty => "pagerduty",
            RecipientType::Email => "email",
            RecipientType::Webhook => "webhook",
        }
    }

    /// Accepts builder names (`PagerDuty`) and literal types (`"pagerduty"`).
    pub fn parse(name: &str) -> Option<Self> {
        match lookup_key(name).as_str() {
            "slack" => Some(RecipientType::Slack),
            "pagerduty" => Some(RecipientType::PagerDuty),
            "email" => Some(RecipientType::Email),
            "webhook" => Some(RecipientType::Webhook),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    #[serde(rename = "type")]
    pub kind: RecipientType,
    pub target: String,
}

impl Recipient {
    pub fn new(kind: RecipientType, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}

/// A period expressed in whole days or whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    Days(u32),
    Hours(u32),
}

impl TimePeriod {
    pub fn hours(&self) -> u64 {
        match self {
            TimePeriod::Days(days) => u64::from(*days) * 24,
            TimePeriod::Hours(hours) => u64::from(*hours),
        }
    }

    /// Whole days, if the period is a multiple of 24 hours.
    pub fn whole_days(&self) -> Option<u32> {
        match self {
            TimePeriod::Days(days) => Some(*days),
            TimePeriod::Hours(hours) if hours % 24 == 0 => Some(hours / 24),
            TimePeriod::Hours(_) => None,
        }
    }
}

/// Kind of SLO burn alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnAlertType {
    /// Fires when the budget is projected to run out within `threshold` minutes.
    ExhaustionTime,
    /// Fires when budget consumption over the window exceeds `threshold` percent.
    BudgetRate,
}

impl BurnAlertType {
    pub fn wire(&self) -> &'static str {
        match self {
            BurnAlertType::ExhaustionTime => "exhaustion_time",
            BurnAlertType::BudgetRate => "budget_rate",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match lookup_key(name).as_str() {
            "exhaustiontime" | "exhaustion" => Some(BurnAlertType::ExhaustionTime),
            "budgetrate" => Some(BurnAlertType::BudgetRate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnAlert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub alert_type: BurnAlertType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<TimePeriod>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<Recipient>,
}
