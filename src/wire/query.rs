use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::{SerializationError, Subject};
use crate::core::data::{
    CalcOp, Calculation, Direction, Filter, FilterCombination, FilterOp, FilterValue, Order,
    OrderTarget, QueryRef, QuerySpec, TimeRange,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    /// Relative range in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdowns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calculations: Vec<WireCalculation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<WireFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_combination: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<WireOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCalculation {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFilter {
    pub column: String,
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    pub order: String,
}

/// A query site: the name of a declared query, or an inline query object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireQueryRef {
    Name(String),
    Query(Box<WireQuery>),
}

impl WireQuery {
    pub fn from_spec(spec: &QuerySpec, subject: &Subject) -> Result<Self, SerializationError> {
        let (time_range, start_time, end_time) = match spec.time_range {
            Some(TimeRange::Relative { seconds }) if seconds > 0 => (Some(seconds), None, None),
            Some(TimeRange::Relative { .. }) | None => (None, None, None),
            Some(TimeRange::Absolute { start, end }) => (None, Some(start), Some(end)),
        };

        Ok(Self {
            dataset: spec.dataset.clone().filter(|d| !d.is_empty()),
            time_range,
            start_time,
            end_time,
            breakdowns: spec.breakdowns.clone(),
            calculations: spec
                .calculations
                .iter()
                .map(|calc| WireCalculation {
                    op: calc.op.wire().to_string(),
                    column: calc.column.clone(),
                })
                .collect(),
            filters: spec
                .filters
                .iter()
                .map(|filter| WireFilter::from_filter(filter, subject))
                .collect::<Result<_, _>>()?,
            filter_combination: spec.filter_combination.map(|c| c.wire().to_string()),
            orders: spec.orders.iter().map(WireOrder::from_order).collect(),
            limit: spec.limit.filter(|l| *l > 0),
            granularity: spec.granularity.filter(|g| *g > 0),
        })
    }

    pub fn into_spec(self, subject: &Subject) -> Result<QuerySpec, SerializationError> {
        let time_range = match (self.time_range, self.start_time, self.end_time) {
            (None, None, None) => None,
            (Some(seconds), None, None) => Some(TimeRange::Relative { seconds }),
            (None, Some(start), Some(end)) => Some(TimeRange::Absolute { start, end }),
            (Some(_), _, _) => {
                return Err(subject.invalid(
                    "time_range",
                    "cannot be combined with start_time/end_time",
                ));
            }
            (None, _, _) => {
                return Err(subject.invalid("start_time", "start_time and end_time go together"));
            }
        };
        let filter_combination = self
            .filter_combination
            .map(|c| {
                FilterCombination::parse(&c)
                    .ok_or_else(|| subject.invalid("filter_combination", format!("unknown value '{}'", c)))
            })
            .transpose()?;

        Ok(QuerySpec {
            dataset: self.dataset,
            time_range,
            breakdowns: self.breakdowns,
            calculations: self
                .calculations
                .into_iter()
                .map(|calc| Calculation::new(CalcOp::parse(&calc.op), calc.column))
                .collect(),
            filters: self
                .filters
                .into_iter()
                .map(|filter| filter.into_filter(subject))
                .collect::<Result<_, _>>()?,
            filter_combination,
            orders: self
                .orders
                .into_iter()
                .map(|order| order.into_order(subject))
                .collect::<Result<_, _>>()?,
            limit: self.limit,
            granularity: self.granularity,
        })
    }
}

impl WireFilter {
    pub(crate) fn from_filter(filter: &Filter, subject: &Subject) -> Result<Self, SerializationError> {
        Ok(Self {
            column: filter.column.clone(),
            op: filter.op.wire().to_string(),
            value: filter
                .value
                .as_ref()
                .map(|value| value_to_json(value, subject))
                .transpose()?,
        })
    }

    pub(crate) fn into_filter(self, subject: &Subject) -> Result<Filter, SerializationError> {
        let value = self
            .value
            .map(|value| value_from_json(value, subject))
            .transpose()?;
        Ok(Filter::new(self.column, FilterOp::parse(&self.op), value))
    }
}

fn value_to_json(value: &FilterValue, subject: &Subject) -> Result<Value, SerializationError> {
    Ok(match value {
        FilterValue::Str(s) => Value::String(s.clone()),
        FilterValue::Int(i) => Value::Number(Number::from(*i)),
        FilterValue::Float(f) => Value::Number(
            Number::from_f64(*f).ok_or_else(|| subject.invalid("filters", "not a finite number"))?,
        ),
        FilterValue::Bool(b) => Value::Bool(*b),
        FilterValue::List(values) => Value::Array(
            values
                .iter()
                .map(|v| value_to_json(v, subject))
                .collect::<Result<_, _>>()?,
        ),
    })
}

fn value_from_json(value: Value, subject: &Subject) -> Result<FilterValue, SerializationError> {
    Ok(match value {
        Value::String(s) => FilterValue::Str(s),
        Value::Bool(b) => FilterValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FilterValue::Int(i),
            None => FilterValue::Float(super::float(subject, "filters", &n)?),
        },
        Value::Array(values) => FilterValue::List(
            values
                .into_iter()
                .map(|v| value_from_json(v, subject))
                .collect::<Result<_, _>>()?,
        ),
        Value::Null | Value::Object(_) => {
            return Err(subject.invalid("filters", "value must be a string, number, boolean or list"));
        }
    })
}

impl WireOrder {
    fn from_order(order: &Order) -> Self {
        let (column, op) = match &order.target {
            OrderTarget::Column(column) => (Some(column.clone()), None),
            OrderTarget::Op { op, column } => (column.clone(), Some(op.wire().to_string())),
        };
        Self {
            column,
            op,
            order: order.direction.wire().to_string(),
        }
    }

    fn into_order(self, subject: &Subject) -> Result<Order, SerializationError> {
        let direction = Direction::parse(&self.order)
            .ok_or_else(|| subject.invalid("orders", format!("unknown direction '{}'", self.order)))?;
        let target = match (self.op, self.column) {
            (Some(op), column) => OrderTarget::Op {
                op: CalcOp::parse(&op),
                column,
            },
            (None, Some(column)) => OrderTarget::Column(column),
            (None, None) => return Err(subject.missing("orders.column")),
        };
        Ok(Order { target, direction })
    }
}

impl WireQueryRef {
    pub fn from_ref(query: &QueryRef, subject: &Subject) -> Result<Self, SerializationError> {
        Ok(match query {
            QueryRef::Named(name) => WireQueryRef::Name(name.clone()),
            QueryRef::Inline(spec) => WireQueryRef::Query(Box::new(WireQuery::from_spec(spec, subject)?)),
        })
    }

    pub fn into_ref(self, subject: &Subject) -> Result<QueryRef, SerializationError> {
        Ok(match self {
            WireQueryRef::Name(name) => QueryRef::Named(name),
            WireQueryRef::Query(query) => QueryRef::Inline(Box::new(query.into_spec(subject)?)),
        })
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::{
        data::{Record, ResourceKind, ops::PERCENTILES},
        extract::tests::extract_one,
    };

    fn subject() -> Subject {
        Subject::new(ResourceKind::Query, "q")
    }

    fn wire_json(body: &str) -> String {
        let code = format!("export const q = query({});", body);
        let record = extract_one(&code).unwrap();
        let Record::Query(query) = record else {
            panic!("expected a query");
        };
        serde_json::to_string(&WireQuery::from_spec(&query.spec, &subject()).unwrap()).unwrap()
    }

    #[test]
    fn test_query_wire_format() {
        let json = wire_json(
            r#"{
                dataset: "api",
                timeRange: Hours(2),
                breakdowns: ["endpoint"],
                calculations: [Count(), P99("duration_ms")],
                filters: [GTE("status", 500), Exists("error"), In("region", ["eu", "us"])],
                filterCombination: "OR",
                orders: [Desc(P99("duration_ms")), Asc("endpoint")],
                limit: 10,
            }"#,
        );
        assert_snapshot!(json, @r#"{"dataset":"api","time_range":7200,"breakdowns":["endpoint"],"calculations":[{"op":"COUNT"},{"op":"P99","column":"duration_ms"}],"filters":[{"column":"status","op":">=","value":500},{"column":"error","op":"exists"},{"column":"region","op":"in","value":["eu","us"]}],"filter_combination":"OR","orders":[{"column":"duration_ms","op":"P99","order":"descending"},{"column":"endpoint","order":"ascending"}],"limit":10}"#);
    }

    #[test]
    fn test_builder_and_literal_operators_serialize_identically() {
        for op in FilterOp::ALL {
            let builder_name = op.code().replace('_', "");
            let value = match (op.is_existence(), op.is_membership()) {
                (true, _) => "",
                (_, true) => "[1, 2]",
                _ => "1",
            };
            let built = if value.is_empty() {
                wire_json(&format!(r#"{{ filters: [{}("status")] }}"#, builder_name))
            } else {
                wire_json(&format!(
                    r#"{{ filters: [{}("status", {})] }}"#,
                    builder_name, value
                ))
            };
            let literal_value = if value.is_empty() {
                String::new()
            } else {
                format!(", value: {}", value)
            };
            let from_code = wire_json(&format!(
                r#"{{ filters: [{{ column: "status", op: "{}"{} }}] }}"#,
                op.code(),
                literal_value
            ));
            let from_wire = wire_json(&format!(
                r#"{{ filters: [{{ column: "status", op: "{}"{} }}] }}"#,
                op.wire(),
                literal_value
            ));
            assert_eq!(built, from_code, "{}", op);
            assert_eq!(built, from_wire, "{}", op);
        }
    }

    #[test]
    fn test_every_calculation_builder_matches_its_literal() {
        let ops = [
            CalcOp::Count,
            CalcOp::CountDistinct,
            CalcOp::Sum,
            CalcOp::Avg,
            CalcOp::Min,
            CalcOp::Max,
            CalcOp::Heatmap,
            CalcOp::RateAvg,
            CalcOp::RateSum,
            CalcOp::RateMax,
            CalcOp::Concurrency,
        ]
        .into_iter()
        .chain(PERCENTILES.iter().map(|code| CalcOp::Percentile(code)));

        for op in ops {
            let builder_name = op.code().replace('_', "");
            let (built, literal) = if op.is_count_like() {
                (
                    wire_json(&format!("{{ calculations: [{}()] }}", builder_name)),
                    wire_json(&format!(r#"{{ calculations: ["{}"] }}"#, op.code())),
                )
            } else {
                (
                    wire_json(&format!(
                        r#"{{ calculations: [{}("duration_ms")] }}"#,
                        builder_name
                    )),
                    wire_json(&format!(
                        r#"{{ calculations: [{{ op: "{}", column: "duration_ms" }}] }}"#,
                        op.code()
                    )),
                )
            };
            assert_eq!(built, literal, "{}", op);
            assert!(built.contains(&format!(r#""op":"{}""#, op.code())), "{}", op);
        }
    }

    #[test]
    fn test_camel_case_literals_match_builders() {
        assert_eq!(
            wire_json(r#"{ filters: [StartsWith("path", "/api")] }"#),
            wire_json(r#"{ filters: [{ column: "path", op: "startsWith", value: "/api" }] }"#)
        );
        assert_eq!(
            wire_json(r#"{ calculations: [CountDistinct("user_id")] }"#),
            wire_json(r#"{ calculations: [{ op: "countDistinct", column: "user_id" }] }"#)
        );
    }

    #[test]
    fn test_absolute_time_range() {
        let json = wire_json("{ timeRange: Absolute(1700000000, 1700003600) }");
        assert_snapshot!(json, @r#"{"start_time":1700000000,"end_time":1700003600}"#);
    }

    #[test]
    fn test_zero_fields_are_omitted() {
        let json = wire_json(r#"{ dataset: "api", limit: 0, breakdowns: [] }"#);
        assert_snapshot!(json, @r#"{"dataset":"api"}"#);
    }

    #[test]
    fn test_parse_back() {
        let json = r#"{"dataset":"api","time_range":300,"calculations":[{"op":"P95","column":"duration_ms"}],"filters":[{"column":"status","op":"!=","value":200},{"column":"user","op":"does-not-exist"}],"orders":[{"op":"COUNT","order":"descending"}]}"#;
        let wire: WireQuery = serde_json::from_str(json).unwrap();
        let spec = wire.into_spec(&subject()).unwrap();
        assert_eq!(spec.time_range, Some(TimeRange::Relative { seconds: 300 }));
        assert_eq!(spec.calculations[0].op, CalcOp::Percentile("P95"));
        assert_eq!(
            spec.filters,
            vec![
                Filter::new("status", FilterOp::Ne, Some(FilterValue::Int(200))),
                Filter::new("user", FilterOp::NotExists, None),
            ]
        );
        assert_eq!(
            spec.orders[0],
            Order {
                target: OrderTarget::Op {
                    op: CalcOp::Count,
                    column: None
                },
                direction: Direction::Descending,
            }
        );

        let again = WireQuery::from_spec(&spec, &subject()).unwrap();
        assert_eq!(serde_json::to_string(&again).unwrap(), json);
    }

    #[test]
    fn test_parse_back_rejects_mixed_time_range() {
        let wire: WireQuery =
            serde_json::from_str(r#"{"time_range":60,"start_time":1,"end_time":2}"#).unwrap();
        let err = wire.into_spec(&subject()).unwrap_err();
        assert!(err.to_string().contains("time_range"));
    }
}
