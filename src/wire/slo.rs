use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::{
    SerializationError, Subject,
    alerting::{WireRecipient, recipients_from_wire, recipients_to_wire},
    float, number,
    query::WireQueryRef,
};
use crate::core::data::{
    BurnAlert, BurnAlertType, ResourceKind, Sli, SloRecord, SloSpec, TimePeriod,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSlo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub dataset: String,
    pub sli: WireSli,
    pub target_per_million: u32,
    pub time_period_days: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub burn_alerts: Vec<WireBurnAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSli {
    pub good_events: WireQueryRef,
    pub total_events: WireQueryRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBurnAlert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub alert_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Number>,
    pub window_hours: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<WireRecipient>,
}

/// `99.9` → `999000`.
pub fn target_per_million(percentage: f64) -> u32 {
    (percentage * 10_000.0).round() as u32
}

impl WireSlo {
    pub fn from_record(slo: &SloRecord) -> Result<Self, SerializationError> {
        let subject = Subject::new(ResourceKind::Slo, slo.declaration.name.as_str());
        let spec = &slo.spec;

        let dataset = spec
            .dataset
            .clone()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| subject.missing("dataset"))?;
        let sli = spec.sli.as_ref().ok_or_else(|| subject.missing("sli"))?;
        let target = spec.target.ok_or_else(|| subject.missing("target"))?;
        if !(0.0..=100.0).contains(&target) {
            return Err(subject.invalid("target", format!("{} is not a percentage", target)));
        }
        let time_period = spec.time_period.ok_or_else(|| subject.missing("time_period"))?;
        let time_period_days = time_period
            .whole_days()
            .ok_or_else(|| subject.invalid("time_period", "must be a whole number of days"))?;

        Ok(Self {
            name: spec.name.clone().unwrap_or_else(|| slo.declaration.name.clone()),
            description: spec.description.clone().filter(|d| !d.is_empty()),
            dataset,
            sli: WireSli {
                good_events: WireQueryRef::from_ref(&sli.good_events, &subject)?,
                total_events: WireQueryRef::from_ref(&sli.total_events, &subject)?,
            },
            target_per_million: target_per_million(target),
            time_period_days,
            burn_alerts: spec
                .burn_alerts
                .iter()
                .map(|alert| WireBurnAlert::from_alert(alert, &subject))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn into_spec(self) -> Result<SloSpec, SerializationError> {
        let subject = Subject::new(ResourceKind::Slo, self.name.as_str());
        Ok(SloSpec {
            sli: Some(Sli {
                good_events: self.sli.good_events.into_ref(&subject)?,
                total_events: self.sli.total_events.into_ref(&subject)?,
            }),
            target: Some(f64::from(self.target_per_million) / 10_000.0),
            time_period: Some(TimePeriod::Days(self.time_period_days)),
            burn_alerts: self
                .burn_alerts
                .into_iter()
                .map(|alert| alert.into_alert(&subject))
                .collect::<Result<_, _>>()?,
            name: Some(self.name),
            description: self.description,
            dataset: Some(self.dataset),
        })
    }
}

impl WireBurnAlert {
    fn from_alert(alert: &BurnAlert, subject: &Subject) -> Result<Self, SerializationError> {
        let window = alert
            .window
            .ok_or_else(|| subject.missing("burn_alerts.window"))?;
        Ok(Self {
            name: alert.name.clone(),
            alert_type: alert.alert_type.wire().to_string(),
            threshold: alert
                .threshold
                .map(|t| number(subject, "burn_alerts.threshold", t))
                .transpose()?,
            window_hours: window.hours(),
            recipients: recipients_to_wire(&alert.recipients),
        })
    }

    fn into_alert(self, subject: &Subject) -> Result<BurnAlert, SerializationError> {
        let alert_type = BurnAlertType::parse(&self.alert_type).ok_or_else(|| {
            subject.invalid(
                "burn_alerts.alert_type",
                format!("unknown alert type '{}'", self.alert_type),
            )
        })?;
        let window = u32::try_from(self.window_hours)
            .map_err(|_| subject.invalid("burn_alerts.window_hours", "out of range"))?;
        Ok(BurnAlert {
            name: self.name,
            alert_type,
            threshold: self
                .threshold
                .map(|t| float(subject, "burn_alerts.threshold", &t))
                .transpose()?,
            window: Some(TimePeriod::Hours(window)),
            recipients: recipients_from_wire(self.recipients, subject)?,
        })
    }
}
