//! Durations, periods and time ranges.
//!
//! `Seconds(30)`, `Minutes(5)`, `Hours(2)` and `Days(30)` all reduce to a seconds
//! count. A bare number is read in the unit the field documents: seconds for query
//! ranges, granularity and trigger frequency, days for SLO periods and hours for
//! burn-alert windows.

use std::{collections::HashMap, sync::LazyLock};

use swc_ecma_ast::{Expr, ObjectLit};

use super::{
    error::ExtractError,
    fields::ObjectFields,
    value::{Extractor, builder},
};
use crate::core::{
    collect::helpers::unwrap_ts_expr,
    data::{TimePeriod, TimeRange, ops::lookup_key},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn seconds(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
        }
    }
}

static TIME_BUILDERS: LazyLock<HashMap<&'static str, TimeUnit>> = LazyLock::new(|| {
    HashMap::from([
        ("seconds", TimeUnit::Seconds),
        ("second", TimeUnit::Seconds),
        ("minutes", TimeUnit::Minutes),
        ("minute", TimeUnit::Minutes),
        ("hours", TimeUnit::Hours),
        ("hour", TimeUnit::Hours),
        ("days", TimeUnit::Days),
        ("day", TimeUnit::Days),
    ])
});

/// An amount of some unit, as authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub amount: u64,
    pub unit: TimeUnit,
}

impl Duration {
    pub fn seconds(&self, field: &str) -> Result<u64, ExtractError> {
        self.amount
            .checked_mul(self.unit.seconds())
            .ok_or_else(|| ExtractError::invalid(field, "a representable duration"))
    }
}

impl Extractor<'_> {
    pub fn duration(
        &self,
        field: &str,
        expr: &Expr,
        literal_unit: TimeUnit,
    ) -> Result<Duration, ExtractError> {
        if let Some(call) = builder(expr, "time")? {
            let unit = TIME_BUILDERS
                .get(lookup_key(call.name).as_str())
                .copied()
                .ok_or_else(|| ExtractError::UnknownBuilder {
                    category: "time",
                    name: call.name.to_string(),
                })?;
            let amount = self.count(call.name, call.single()?)?;
            return Ok(Duration { amount, unit });
        }
        let amount = self.count(field, expr)?;
        Ok(Duration {
            amount,
            unit: literal_unit,
        })
    }

    /// A duration in seconds; bare numbers are seconds.
    pub fn seconds(&self, field: &str, expr: &Expr) -> Result<u64, ExtractError> {
        self.duration(field, expr, TimeUnit::Seconds)?.seconds(field)
    }

    /// A whole-day or whole-hour period. Smaller units must add up to whole hours.
    pub fn time_period(
        &self,
        field: &str,
        expr: &Expr,
        literal_unit: TimeUnit,
    ) -> Result<TimePeriod, ExtractError> {
        let duration = self.duration(field, expr, literal_unit)?;
        let small = |amount: u64| {
            u32::try_from(amount).map_err(|_| ExtractError::invalid(field, "a smaller period"))
        };
        match duration.unit {
            TimeUnit::Days => Ok(TimePeriod::Days(small(duration.amount)?)),
            TimeUnit::Hours => Ok(TimePeriod::Hours(small(duration.amount)?)),
            TimeUnit::Seconds | TimeUnit::Minutes => {
                let seconds = duration.seconds(field)?;
                if seconds % 3_600 != 0 {
                    return Err(ExtractError::invalid(field, "a whole number of hours"));
                }
                Ok(TimePeriod::Hours(small(seconds / 3_600)?))
            }
        }
    }

    /// A query time range: a relative duration, `Absolute(start, end)` or `{ start, end }`.
    pub fn time_range(&self, expr: &Expr) -> Result<TimeRange, ExtractError> {
        if let Some(call) = builder(expr, "timeRange")?
            && lookup_key(call.name) == "absolute"
        {
            return match call.args.as_slice() {
                [start, end] => Ok(TimeRange::Absolute {
                    start: self.integer("start", start)?,
                    end: self.integer("end", end)?,
                }),
                _ => Err(ExtractError::IncompleteTimeRange),
            };
        }
        if let Expr::Object(obj) = unwrap_ts_expr(expr) {
            return self.absolute_range(obj);
        }
        Ok(TimeRange::Relative {
            seconds: self.seconds("timeRange", expr)?,
        })
    }

    fn absolute_range(&self, obj: &ObjectLit) -> Result<TimeRange, ExtractError> {
        let mut fields = ObjectFields::new(obj, "time range")?;
        let start = fields.take_any(&["start", "starttime"]);
        let end = fields.take_any(&["end", "endtime"]);
        fields.finish()?;
        match (start, end) {
            (Some(start), Some(end)) => Ok(TimeRange::Absolute {
                start: self.integer("start", &start)?,
                end: self.integer("end", &end)?,
            }),
            _ => Err(ExtractError::IncompleteTimeRange),
        }
    }
}
