use swc_ecma_ast::{Expr, ObjectLit};

use super::{
    error::ExtractError,
    fields::ObjectFields,
    time::TimeUnit,
    value::{Extractor, builder},
};
use crate::core::{
    collect::helpers::unwrap_ts_expr,
    data::{Sli, SloSpec, ops::lookup_key},
};

impl Extractor<'_> {
    pub fn slo_spec(&self, obj: &ObjectLit) -> Result<SloSpec, ExtractError> {
        let mut fields = ObjectFields::new(obj, "slo")?;
        let mut spec = SloSpec::default();

        if let Some(v) = fields.take("name") {
            spec.name = Some(self.string("name", &v)?);
        }
        if let Some(v) = fields.take("description") {
            spec.description = Some(self.string("description", &v)?);
        }
        if let Some(v) = fields.take("dataset") {
            spec.dataset = Some(self.string("dataset", &v)?);
        }
        if let Some(v) = fields.take("sli") {
            spec.sli = Some(self.sli(&v)?);
        }
        if let Some(v) = fields.take("target") {
            spec.target = Some(self.percentage(&v)?);
        }
        if let Some(v) = fields.take("timeperiod") {
            spec.time_period = Some(self.time_period("timePeriod", &v, TimeUnit::Days)?);
        }
        if let Some(v) = fields.take("burnalerts") {
            spec.burn_alerts = self.burn_alerts(&v)?;
        }

        fields.finish()?;
        Ok(spec)
    }

    /// `SLI(good, total)` or `{ goodEvents, totalEvents }`.
    fn sli(&self, expr: &Expr) -> Result<Sli, ExtractError> {
        if let Some(call) = builder(expr, "sli")? {
            if lookup_key(call.name) != "sli" {
                return Err(ExtractError::UnknownBuilder {
                    category: "sli",
                    name: call.name.to_string(),
                });
            }
            let [good, total] = call.args.as_slice() else {
                return Err(ExtractError::invalid(call.name, "called with a good and a total query"));
            };
            return Ok(Sli {
                good_events: self.query_ref("goodEvents", good)?,
                total_events: self.query_ref("totalEvents", total)?,
            });
        }
        let Expr::Object(obj) = unwrap_ts_expr(expr) else {
            return Err(ExtractError::invalid(
                "sli",
                "an `SLI(good, total)` call or a `{ goodEvents, totalEvents }` object",
            ));
        };
        let mut fields = ObjectFields::new(obj, "sli")?;
        let good = fields.take_any(&["goodevents", "good"]).ok_or(ExtractError::MissingField {
            owner: "sli",
            field: "goodEvents",
        })?;
        let total = fields
            .take_any(&["totalevents", "total"])
            .ok_or(ExtractError::MissingField {
                owner: "sli",
                field: "totalEvents",
            })?;
        fields.finish()?;
        Ok(Sli {
            good_events: self.query_ref("goodEvents", &good)?,
            total_events: self.query_ref("totalEvents", &total)?,
        })
    }

    /// `Percentage(99.9)` or a bare percentage number.
    fn percentage(&self, expr: &Expr) -> Result<f64, ExtractError> {
        if let Some(call) = builder(expr, "target")? {
            if lookup_key(call.name) != "percentage" {
                return Err(ExtractError::UnknownBuilder {
                    category: "target",
                    name: call.name.to_string(),
                });
            }
            return self.number("target", call.single()?);
        }
        self.number("target", expr)
    }
}
