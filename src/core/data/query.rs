//! Query record model.

use serde::Serialize;

use super::{
    declaration::Declaration,
    ops::{CalcOp, Direction, FilterCombination, FilterOp},
};

/// Query time window.
///
/// Relative and absolute ranges are mutually exclusive; a declaration that sets
/// both is rejected during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Last N seconds.
    Relative { seconds: u64 },
    /// Fixed window, epoch seconds.
    Absolute { start: i64, end: i64 },
}

/// One aggregate of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calculation {
    pub op: CalcOp,
    /// Empty only for count-like ops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl Calculation {
    pub fn new(op: CalcOp, column: Option<String>) -> Self {
        Self { op, column }
    }
}

/// Filter operand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Integral numbers stay integers so they print without a fraction.
    pub fn from_number(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < 9.0e15 {
            FilterValue::Int(value as i64)
        } else {
            FilterValue::Float(value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    /// Absent for existence ops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: Option<FilterValue>) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }
}

/// What an order clause sorts by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderTarget {
    /// A breakdown column.
    Column(String),
    /// A calculation, optionally with the column it aggregates.
    Op { op: CalcOp, column: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub target: OrderTarget,
    pub direction: Direction,
}

/// Body of a query, shared by top-level queries and inline queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuerySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breakdowns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub calculations: Vec<Calculation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_combination: Option<FilterCombination>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<u32>,
}

/// A query site: either the name of a declared query or an inline body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryRef {
    Named(String),
    Inline(Box<QuerySpec>),
}

impl QueryRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            QueryRef::Named(name) => Some(name),
            QueryRef::Inline(_) => None,
        }
    }

    pub fn inline(&self) -> Option<&QuerySpec> {
        match self {
            QueryRef::Named(_) => None,
            QueryRef::Inline(spec) => Some(spec),
        }
    }
}

/// A top-level query declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    pub declaration: Declaration,
    #[serde(flatten)]
    pub spec: QuerySpec,
}
