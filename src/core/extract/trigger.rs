use swc_ecma_ast::{Expr, ObjectLit};

use super::{
    error::ExtractError,
    fields::ObjectFields,
    value::{Extractor, builder},
};
use crate::core::{
    collect::helpers::unwrap_ts_expr,
    data::{Threshold, ThresholdOp, TriggerSpec},
};

impl Extractor<'_> {
    pub fn trigger_spec(&self, obj: &ObjectLit) -> Result<TriggerSpec, ExtractError> {
        let mut fields = ObjectFields::new(obj, "trigger")?;
        let mut spec = TriggerSpec::default();

        if let Some(v) = fields.take("name") {
            spec.name = Some(self.string("name", &v)?);
        }
        if let Some(v) = fields.take("description") {
            spec.description = Some(self.string("description", &v)?);
        }
        if let Some(v) = fields.take("dataset") {
            spec.dataset = Some(self.string("dataset", &v)?);
        }
        if let Some(v) = fields.take("query") {
            spec.query = Some(self.query_ref("query", &v)?);
        }
        if let Some(v) = fields.take("threshold") {
            spec.threshold = Some(self.threshold(&v)?);
        }
        if let Some(v) = fields.take("frequency") {
            spec.frequency = Some(self.seconds("frequency", &v)?);
        }
        if let Some(v) = fields.take("recipients") {
            spec.recipients = self.recipients(&v)?;
        }
        if let Some(v) = fields.take("disabled") {
            spec.disabled = self.boolean("disabled", &v)?;
        }

        fields.finish()?;
        Ok(spec)
    }

    /// `GT(100)` or `{ op: ">", value: 100 }`.
    fn threshold(&self, expr: &Expr) -> Result<Threshold, ExtractError> {
        if let Some(call) = builder(expr, "threshold")? {
            return Ok(Threshold {
                op: ThresholdOp::from_builder(call.name),
                value: self.number(call.name, call.single()?)?,
            });
        }
        let Expr::Object(obj) = unwrap_ts_expr(expr) else {
            return Err(ExtractError::invalid(
                "threshold",
                "a threshold builder or an `{ op, value }` object",
            ));
        };
        let mut fields = ObjectFields::new(obj, "threshold")?;
        let op = fields
            .take_any(&["op", "operator"])
            .ok_or(ExtractError::MissingField {
                owner: "threshold",
                field: "op",
            })?;
        let value = fields.take("value").ok_or(ExtractError::MissingField {
            owner: "threshold",
            field: "value",
        })?;
        fields.finish()?;
        Ok(Threshold {
            op: ThresholdOp::parse(&self.string("op", &op)?),
            value: self.number("value", &value)?,
        })
    }
}
