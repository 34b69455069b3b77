use swc_ecma_ast::{Expr, ObjectLit};

use super::{
    error::ExtractError,
    fields::ObjectFields,
    time::TimeUnit,
    value::{Extractor, builder},
};
use crate::core::{
    collect::helpers::unwrap_ts_expr,
    data::{BurnAlert, BurnAlertType, Recipient, RecipientType},
};

impl Extractor<'_> {
    pub fn recipients(&self, expr: &Expr) -> Result<Vec<Recipient>, ExtractError> {
        self.elements("recipients", expr)?
            .into_iter()
            .map(|elem| self.recipient(elem))
            .collect()
    }

    /// `Slack("#oncall")` or `{ type: "slack", target: "#oncall" }`.
    fn recipient(&self, expr: &Expr) -> Result<Recipient, ExtractError> {
        if let Some(call) = builder(expr, "recipient")? {
            let kind = RecipientType::parse(call.name).ok_or_else(|| ExtractError::UnknownBuilder {
                category: "recipient",
                name: call.name.to_string(),
            })?;
            let target = self.string(call.name, call.single()?)?;
            return Ok(Recipient::new(kind, target));
        }
        if let Expr::Object(obj) = unwrap_ts_expr(expr) {
            let mut fields = ObjectFields::new(obj, "recipient")?;
            let kind = fields.take("type").ok_or(ExtractError::MissingField {
                owner: "recipient",
                field: "type",
            })?;
            let target = fields.take("target").ok_or(ExtractError::MissingField {
                owner: "recipient",
                field: "target",
            })?;
            fields.finish()?;
            let kind = self.string("type", &kind)?;
            let kind = RecipientType::parse(&kind).ok_or(ExtractError::UnknownVariant {
                category: "recipient type",
                value: kind,
            })?;
            return Ok(Recipient::new(kind, self.string("target", &target)?));
        }
        Err(ExtractError::invalid(
            "recipients",
            "a recipient builder or a `{ type, target }` object",
        ))
    }

    pub fn burn_alerts(&self, expr: &Expr) -> Result<Vec<BurnAlert>, ExtractError> {
        self.elements("burnAlerts", expr)?
            .into_iter()
            .map(|elem| self.burn_alert(elem))
            .collect()
    }

    /// `ExhaustionTime({ threshold, window, recipients })` or the same object with
    /// an `alertType` field.
    fn burn_alert(&self, expr: &Expr) -> Result<BurnAlert, ExtractError> {
        if let Some(call) = builder(expr, "burn alert")? {
            let alert_type =
                BurnAlertType::parse(call.name).ok_or_else(|| ExtractError::UnknownBuilder {
                    category: "burn alert",
                    name: call.name.to_string(),
                })?;
            let Expr::Object(obj) = unwrap_ts_expr(call.single()?) else {
                return Err(ExtractError::invalid(call.name, "called with an object literal"));
            };
            return self.burn_alert_body(obj, Some(alert_type));
        }
        if let Expr::Object(obj) = unwrap_ts_expr(expr) {
            return self.burn_alert_body(obj, None);
        }
        Err(ExtractError::invalid(
            "burnAlerts",
            "a burn alert builder or a burn alert object",
        ))
    }

    fn burn_alert_body(
        &self,
        obj: &ObjectLit,
        alert_type: Option<BurnAlertType>,
    ) -> Result<BurnAlert, ExtractError> {
        let mut fields = ObjectFields::new(obj, "burn alert")?;
        let alert_type = match (alert_type, fields.take_any(&["alerttype", "type"])) {
            (Some(alert_type), None) => alert_type,
            (None, Some(v)) => {
                let literal = self.string("alertType", &v)?;
                BurnAlertType::parse(&literal).ok_or(ExtractError::UnknownVariant {
                    category: "burn alert type",
                    value: literal,
                })?
            }
            (Some(_), Some(_)) => {
                return Err(ExtractError::UnknownField {
                    owner: "burn alert",
                    field: "alertType".to_string(),
                });
            }
            (None, None) => {
                return Err(ExtractError::MissingField {
                    owner: "burn alert",
                    field: "alertType",
                });
            }
        };
        let name = fields
            .take("name")
            .map(|v| self.string("name", &v))
            .transpose()?;
        let threshold = fields
            .take("threshold")
            .map(|v| self.number("threshold", &v))
            .transpose()?;
        let window = fields
            .take("window")
            .map(|v| self.time_period("window", &v, TimeUnit::Hours))
            .transpose()?;
        let recipients = match fields.take("recipients") {
            Some(v) => self.recipients(&v)?,
            None => Vec::new(),
        };
        fields.finish()?;
        Ok(BurnAlert {
            name,
            alert_type,
            threshold,
            window,
            recipients,
        })
    }
}
