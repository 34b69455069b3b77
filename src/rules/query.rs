//! Query body rules.
//!
//! Every query body of a record is checked, whether it is a declared query or
//! inlined into an SLI, a trigger or a board panel.

use crate::{
    core::data::{
        Declaration, Filter, FilterOp, FilterValue, OrderTarget, PanelContent, QuerySpec, Record,
        Resource,
    },
    issues::{Diagnostic, Rule},
};

/// A query body and a phrase naming where it sits.
struct QueryBody<'a> {
    site: String,
    spec: &'a QuerySpec,
}

fn query_bodies(record: &Record) -> Vec<QueryBody<'_>> {
    let name = record.name();
    let mut bodies = Vec::new();
    match record {
        Record::Query(query) => bodies.push(QueryBody {
            site: format!("query '{}'", name),
            spec: &query.spec,
        }),
        Record::Slo(slo) => {
            if let Some(sli) = &slo.spec.sli {
                let sites = [("good events", &sli.good_events), ("total events", &sli.total_events)];
                for (label, query) in sites {
                    if let Some(spec) = query.inline() {
                        bodies.push(QueryBody {
                            site: format!("{} query of SLO '{}'", label, name),
                            spec,
                        });
                    }
                }
            }
        }
        Record::Trigger(trigger) => {
            if let Some(spec) = trigger.spec.query.as_ref().and_then(|q| q.inline()) {
                bodies.push(QueryBody {
                    site: format!("query of trigger '{}'", name),
                    spec,
                });
            }
        }
        Record::Board(board) => {
            for (index, panel) in board.spec.panels.iter().enumerate() {
                if let PanelContent::Query(query) = &panel.content
                    && let Some(spec) = query.inline()
                {
                    bodies.push(QueryBody {
                        site: format!("panel {} of board '{}'", index + 1, name),
                        spec,
                    });
                }
            }
        }
    }
    bodies
}

pub fn check_queries(record: &Record) -> Vec<Diagnostic> {
    let mut diagnostics = check_missing_dataset(record);
    for body in query_bodies(record) {
        diagnostics.extend(check_calculation_columns(record, &body));
        diagnostics.extend(check_filter_values(record, &body));
        diagnostics.extend(check_unknown_operators(record, &body));
    }
    diagnostics
}

fn diagnostic(rule: Rule, record: &Record, message: String) -> Diagnostic {
    let declaration: &Declaration = record.declaration();
    Diagnostic::new(rule, &declaration.file, declaration.line, message).for_resource(record.name())
}

/// Queries, SLOs and triggers need a dataset. Inline board queries need their own,
/// since a board has none to inherit.
fn check_missing_dataset(record: &Record) -> Vec<Diagnostic> {
    let lacks = |dataset: Option<&str>| dataset.is_none_or(str::is_empty);
    let mut diagnostics = Vec::new();
    match record {
        Record::Board(_) => {
            for body in query_bodies(record) {
                if lacks(body.spec.dataset.as_deref()) {
                    diagnostics.push(
                        diagnostic(
                            Rule::MissingDataset,
                            record,
                            format!("{} has no dataset", body.site),
                        )
                        .with_suggestion("add `dataset` to the inline query"),
                    );
                }
            }
        }
        _ if lacks(record.dataset()) => diagnostics.push(
            diagnostic(
                Rule::MissingDataset,
                record,
                format!("{} '{}' has no dataset", record.kind(), record.name()),
            )
            .with_suggestion(format!("add `dataset` to {} '{}'", record.kind(), record.name())),
        ),
        _ => {}
    }
    diagnostics
}

fn check_calculation_columns(record: &Record, body: &QueryBody<'_>) -> Vec<Diagnostic> {
    body.spec
        .calculations
        .iter()
        .filter(|calc| calc.op.is_known() && !calc.op.is_count_like() && calc.column.is_none())
        .map(|calc| {
            diagnostic(
                Rule::CalculationMissingColumn,
                record,
                format!("{} calculation in {} has no column", calc.op.code(), body.site),
            )
            .with_suggestion(format!("pass the column to aggregate: {}(\"column\")", calc.op.code()))
        })
        .collect()
}

fn check_filter_values(record: &Record, body: &QueryBody<'_>) -> Vec<Diagnostic> {
    body.spec
        .filters
        .iter()
        .filter_map(|filter| {
            let expected = value_mismatch(filter)?;
            Some(
                diagnostic(
                    Rule::FilterValueMismatch,
                    record,
                    format!(
                        "filter '{}' on '{}' in {} {}",
                        filter.op.code(),
                        filter.column,
                        body.site,
                        expected
                    ),
                )
                .with_suggestion(format!(
                    "give the '{}' filter {}",
                    filter.op.code(),
                    expected.trim_start_matches("takes ")
                )),
            )
        })
        .collect()
}

/// What the operator expects, when the value does not fit it.
fn value_mismatch(filter: &Filter) -> Option<&'static str> {
    let value = filter.value.as_ref();
    match &filter.op {
        FilterOp::Other(_) => None,
        op if op.is_existence() => value.map(|_| "takes no value"),
        op if op.is_membership() => match value {
            Some(FilterValue::List(values)) if !values.is_empty() => None,
            _ => Some("takes a non-empty list"),
        },
        FilterOp::Contains | FilterOp::NotContains | FilterOp::StartsWith => match value {
            Some(FilterValue::Str(_)) => None,
            _ => Some("takes a string"),
        },
        FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => match value {
            Some(FilterValue::Int(_) | FilterValue::Float(_) | FilterValue::Str(_)) => None,
            _ => Some("takes a number or a string"),
        },
        _ => match value {
            None | Some(FilterValue::List(_)) => Some("takes a single value"),
            Some(_) => None,
        },
    }
}

/// Operators that fell through the builder tables are passed to the platform
/// uppercased; they are probably typos.
fn check_unknown_operators(record: &Record, body: &QueryBody<'_>) -> Vec<Diagnostic> {
    let spec = body.spec;
    let calculations = spec
        .calculations
        .iter()
        .filter(|calc| !calc.op.is_known())
        .map(|calc| ("calculation", calc.op.code()));
    let filters = spec
        .filters
        .iter()
        .filter(|filter| !filter.op.is_known())
        .map(|filter| ("filter", filter.op.code()));
    let orders = spec.orders.iter().filter_map(|order| match &order.target {
        OrderTarget::Op { op, .. } if !op.is_known() => Some(("order", op.code())),
        _ => None,
    });

    calculations
        .chain(filters)
        .chain(orders)
        .map(|(what, code)| {
            diagnostic(
                Rule::UnknownOperator,
                record,
                format!("unknown {} operator '{}' in {}", what, code, body.site),
            )
            .with_suggestion(format!("'{}' is sent as-is; use a known {} builder", code, what))
        })
        .collect()
}
