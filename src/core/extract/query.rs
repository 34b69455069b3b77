//! Query bodies: dataset, time range, breakdowns, calculations, filters, orders.

use swc_ecma_ast::{Expr, ObjectLit};

use super::{
    error::ExtractError,
    fields::ObjectFields,
    shape::match_shape,
    value::{Extractor, builder},
};
use crate::core::{
    collect::{ConstValue, helpers::unwrap_ts_expr},
    data::{
        CalcOp, Calculation, Direction, Filter, FilterCombination, FilterOp, FilterValue, Order,
        OrderTarget, QueryRef, QuerySpec, ResourceKind, TimeRange,
    },
};

impl Extractor<'_> {
    pub fn query_spec(&self, obj: &ObjectLit) -> Result<QuerySpec, ExtractError> {
        let mut fields = ObjectFields::new(obj, "query")?;
        let mut spec = QuerySpec::default();

        if let Some(v) = fields.take("dataset") {
            spec.dataset = Some(self.string("dataset", &v)?);
        }
        if let Some(v) = fields.take("timerange") {
            spec.time_range = Some(self.time_range(&v)?);
        }
        let start = fields.take("starttime");
        let end = fields.take("endtime");
        match (start, end) {
            (None, None) => {}
            (Some(start), Some(end)) => {
                if spec.time_range.is_some() {
                    return Err(ExtractError::AmbiguousTimeRange);
                }
                spec.time_range = Some(TimeRange::Absolute {
                    start: self.integer("startTime", &start)?,
                    end: self.integer("endTime", &end)?,
                });
            }
            _ => return Err(ExtractError::IncompleteTimeRange),
        }
        if let Some(v) = fields.take("breakdowns") {
            spec.breakdowns = self.string_list("breakdowns", &v)?;
        }
        if let Some(v) = fields.take("calculations") {
            spec.calculations = self
                .elements("calculations", &v)?
                .into_iter()
                .map(|elem| self.calculation(elem))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = fields.take("filters") {
            spec.filters = self.filters("filters", &v)?;
        }
        if let Some(v) = fields.take("filtercombination") {
            let literal = self.string("filterCombination", &v)?;
            spec.filter_combination = Some(FilterCombination::parse(&literal).ok_or(
                ExtractError::UnknownVariant {
                    category: "filter combination",
                    value: literal,
                },
            )?);
        }
        if let Some(v) = fields.take("orders") {
            spec.orders = self
                .elements("orders", &v)?
                .into_iter()
                .map(|elem| self.order(elem))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = fields.take("limit") {
            spec.limit = Some(self.small_count("limit", &v)?);
        }
        if let Some(v) = fields.take("granularity") {
            let seconds = self.seconds("granularity", &v)?;
            spec.granularity = Some(
                u32::try_from(seconds)
                    .map_err(|_| ExtractError::invalid("granularity", "a shorter duration"))?,
            );
        }

        fields.finish()?;
        Ok(spec)
    }

    /// A query site: a reference to a declared query, or an inline query body.
    pub fn query_ref(&self, field: &str, expr: &Expr) -> Result<QueryRef, ExtractError> {
        if let Some(shape) = match_shape(expr, None) {
            if shape.kind != ResourceKind::Query {
                return Err(ExtractError::invalid(field, "a query reference or an inline query"));
            }
            return Ok(QueryRef::Inline(Box::new(self.query_spec(shape.body)?)));
        }
        if let Expr::Object(obj) = unwrap_ts_expr(expr) {
            return Ok(QueryRef::Inline(Box::new(self.query_spec(obj)?)));
        }
        if let Some(ConstValue::Str(name)) = self.literal(expr)
            && !matches!(unwrap_ts_expr(expr), Expr::Ident(_))
        {
            return Ok(QueryRef::Named(name));
        }
        self.reference_name(expr)
            .map(QueryRef::Named)
            .ok_or_else(|| ExtractError::invalid(field, "a query reference or an inline query"))
    }

    pub fn filters(&self, field: &'static str, expr: &Expr) -> Result<Vec<Filter>, ExtractError> {
        self.elements(field, expr)?
            .into_iter()
            .map(|elem| self.filter(elem))
            .collect()
    }

    /// `P99("duration_ms")`, `Count()`, `{ op: "P99", column: "duration_ms" }` or `"COUNT"`.
    fn calculation(&self, expr: &Expr) -> Result<Calculation, ExtractError> {
        if let Some(call) = builder(expr, "calculation")? {
            let column = match call.args.as_slice() {
                [] => None,
                [column] => Some(self.string("calculation column", column)?),
                _ => {
                    return Err(ExtractError::invalid(
                        call.name,
                        "called with at most one column",
                    ));
                }
            };
            return Ok(Calculation::new(CalcOp::from_builder(call.name), column));
        }
        if let Expr::Object(obj) = unwrap_ts_expr(expr) {
            let mut fields = ObjectFields::new(obj, "calculation")?;
            let op = fields
                .take_any(&["op", "operator"])
                .ok_or(ExtractError::MissingField {
                    owner: "calculation",
                    field: "op",
                })?;
            let op = CalcOp::parse(&self.string("op", &op)?);
            let column = fields
                .take("column")
                .map(|v| self.string("column", &v))
                .transpose()?;
            fields.finish()?;
            return Ok(Calculation::new(op, column));
        }
        if let Some(ConstValue::Str(op)) = self.literal(expr) {
            return Ok(Calculation::new(CalcOp::parse(&op), None));
        }
        Err(ExtractError::invalid(
            "calculations",
            "a calculation builder, an `{ op, column }` object or an op string",
        ))
    }

    /// `GT("duration_ms", 500)`, `Exists("error")`, `In("status", [500, 503])`
    /// or `{ column, op, value }`.
    pub fn filter(&self, expr: &Expr) -> Result<Filter, ExtractError> {
        if let Some(call) = builder(expr, "filter")? {
            let op = FilterOp::from_builder(call.name);
            let (column, rest) = call
                .args
                .split_first()
                .ok_or_else(|| ExtractError::invalid(call.name, "called with a column"))?;
            let column = self.string("filter column", column)?;
            let value = if op.is_membership() {
                match rest {
                    [] => None,
                    [single] if matches!(unwrap_ts_expr(single), Expr::Array(_)) => {
                        Some(self.filter_value(call.name, single)?)
                    }
                    values => Some(FilterValue::List(
                        values
                            .iter()
                            .map(|v| self.filter_value(call.name, v))
                            .collect::<Result<_, _>>()?,
                    )),
                }
            } else {
                match rest {
                    [] => None,
                    [value] => Some(self.filter_value(call.name, value)?),
                    _ => {
                        return Err(ExtractError::invalid(
                            call.name,
                            "called with a column and at most one value",
                        ));
                    }
                }
            };
            return Ok(Filter::new(column, op, value));
        }
        if let Expr::Object(obj) = unwrap_ts_expr(expr) {
            let mut fields = ObjectFields::new(obj, "filter")?;
            let column = fields.take("column").ok_or(ExtractError::MissingField {
                owner: "filter",
                field: "column",
            })?;
            let op = fields
                .take_any(&["op", "operator"])
                .ok_or(ExtractError::MissingField {
                    owner: "filter",
                    field: "op",
                })?;
            let value = fields
                .take("value")
                .map(|v| self.filter_value("value", &v))
                .transpose()?;
            fields.finish()?;
            return Ok(Filter::new(
                self.string("column", &column)?,
                FilterOp::parse(&self.string("op", &op)?),
                value,
            ));
        }
        Err(ExtractError::invalid(
            "filters",
            "a filter builder or a `{ column, op, value }` object",
        ))
    }

    fn filter_value(&self, field: &str, expr: &Expr) -> Result<FilterValue, ExtractError> {
        if let Expr::Array(array) = unwrap_ts_expr(expr) {
            let mut values = Vec::with_capacity(array.elems.len());
            for elem in array.elems.iter().flatten() {
                if elem.spread.is_some() {
                    return Err(ExtractError::Spread { owner: "filter value" });
                }
                values.push(self.filter_value(field, &elem.expr)?);
            }
            return Ok(FilterValue::List(values));
        }
        match self.literal(expr) {
            Some(ConstValue::Str(s)) => Ok(FilterValue::Str(s)),
            Some(ConstValue::Num(n)) => Ok(FilterValue::from_number(n)),
            Some(ConstValue::Bool(b)) => Ok(FilterValue::Bool(b)),
            None => Err(ExtractError::invalid(
                field,
                "a static string, number, boolean or list",
            )),
        }
    }

    /// `Desc(P99("duration_ms"))`, `Asc("endpoint")` or `{ column | op, order }`.
    fn order(&self, expr: &Expr) -> Result<Order, ExtractError> {
        if let Some(call) = builder(expr, "order")? {
            let direction = Direction::parse(call.name).ok_or_else(|| {
                ExtractError::UnknownBuilder {
                    category: "order",
                    name: call.name.to_string(),
                }
            })?;
            let target = self.order_target(call.single()?)?;
            return Ok(Order { target, direction });
        }
        if let Expr::Object(obj) = unwrap_ts_expr(expr) {
            let mut fields = ObjectFields::new(obj, "order")?;
            let direction = match fields.take_any(&["order", "direction"]) {
                Some(v) => {
                    let literal = self.string("order", &v)?;
                    Direction::parse(&literal).ok_or(ExtractError::UnknownVariant {
                        category: "order direction",
                        value: literal,
                    })?
                }
                None => Direction::default(),
            };
            let op = fields
                .take_any(&["op", "operator"])
                .map(|v| self.string("op", &v))
                .transpose()?;
            let column = fields
                .take("column")
                .map(|v| self.string("column", &v))
                .transpose()?;
            fields.finish()?;
            let target = match (op, column) {
                (Some(op), column) => OrderTarget::Op {
                    op: CalcOp::parse(&op),
                    column,
                },
                (None, Some(column)) => OrderTarget::Column(column),
                (None, None) => {
                    return Err(ExtractError::MissingField {
                        owner: "order",
                        field: "column",
                    });
                }
            };
            return Ok(Order { target, direction });
        }
        Err(ExtractError::invalid(
            "orders",
            "an `Asc`/`Desc` builder or an `{ column, order }` object",
        ))
    }

    fn order_target(&self, expr: &Expr) -> Result<OrderTarget, ExtractError> {
        if builder(expr, "order")?.is_some() {
            let calc = self.calculation(expr)?;
            return Ok(OrderTarget::Op {
                op: calc.op,
                column: calc.column,
            });
        }
        Ok(OrderTarget::Column(self.string("order column", expr)?))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::extract::tests::extract_one;

    fn query(body: &str) -> Result<QuerySpec, ExtractError> {
        let code = format!("export const q = query({});", body);
        extract_one(&code).map(|record| record.as_query().unwrap().spec.clone())
    }

    #[test]
    fn test_literal_and_builder_forms_agree() {
        let literal = query(
            r#"{
                dataset: "api",
                timeRange: 7200,
                calculations: [{ op: "P99", column: "duration_ms" }, "COUNT"],
                filters: [
                    { column: "status", op: ">=", value: 500 },
                    { column: "error", op: "exists" },
                    { column: "region", op: "in", value: ["eu", "us"] },
                ],
                orders: [{ op: "P99", column: "duration_ms", order: "descending" }],
                limit: 10,
            }"#,
        )
        .unwrap();
        let built = query(
            r#"{
                dataset: "api",
                timeRange: Hours(2),
                calculations: [P99("duration_ms"), Count()],
                filters: [GTE("status", 500), Exists("error"), In("region", "eu", "us")],
                orders: [Desc(P99("duration_ms"))],
                limit: 10,
            }"#,
        )
        .unwrap();
        assert_eq!(literal, built);
        assert_eq!(built.time_range, Some(TimeRange::Relative { seconds: 7200 }));
        assert_eq!(built.filters[1].value, None);
    }

    #[test]
    fn test_unknown_operator_builder_passes_through() {
        let spec = query(r#"{ filters: [Matches("path", "/api/*")], calculations: [Stddev("x")] }"#)
            .unwrap();
        assert_eq!(spec.filters[0].op, FilterOp::Other("MATCHES".to_string()));
        assert_eq!(spec.calculations[0].op, CalcOp::Other("STDDEV".to_string()));
    }

    #[test]
    fn test_absolute_time_range_forms() {
        let a = query("{ timeRange: Absolute(100, 200) }").unwrap();
        let b = query("{ startTime: 100, endTime: 200 }").unwrap();
        let c = query("{ timeRange: { start: 100, end: 200 } }").unwrap();
        assert_eq!(a.time_range, Some(TimeRange::Absolute { start: 100, end: 200 }));
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_ambiguous_time_range_is_rejected() {
        let err = query("{ timeRange: Minutes(5), startTime: 100, endTime: 200 }").unwrap_err();
        assert_eq!(err, ExtractError::AmbiguousTimeRange);
        let err = query("{ startTime: 100 }").unwrap_err();
        assert_eq!(err, ExtractError::IncompleteTimeRange);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = query(r#"{ dataset: "api", dataste: "typo" }"#).unwrap_err();
        assert_eq!(
            err,
            ExtractError::UnknownField {
                owner: "query",
                field: "dataste".to_string()
            }
        );
    }

    #[test]
    fn test_field_names_ignore_case_and_underscores() {
        let spec = query(r#"{ Dataset: "api", time_range: 60, filter_combination: "or" }"#).unwrap();
        assert_eq!(spec.dataset.as_deref(), Some("api"));
        assert_eq!(spec.time_range, Some(TimeRange::Relative { seconds: 60 }));
        assert_eq!(spec.filter_combination, Some(FilterCombination::Or));
    }

    #[test]
    fn test_order_by_breakdown_column() {
        let spec = query(r#"{ breakdowns: ["endpoint"], orders: [Asc("endpoint")] }"#).unwrap();
        assert_eq!(
            spec.orders,
            vec![Order {
                target: OrderTarget::Column("endpoint".to_string()),
                direction: Direction::Ascending
            }]
        );
    }
}
