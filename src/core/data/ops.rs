//! Canonical operator vocabularies.
//!
//! Every operator a resource can carry (filter, calculation, trigger threshold) is
//! normalized to a canonical code here, regardless of whether it was authored as
//! a literal string (`op: ">"`, `op: "gte"`) or as a builder call (`GT(...)`).
//!
//! Builder names are looked up in immutable tables that are built once per process.
//! Names are matched case-insensitively with `_` ignored, so `CountDistinct`,
//! `countDistinct` and `COUNT_DISTINCT` are the same builder.
//!
//! A builder name that is not in a table is *not* rejected: it becomes an
//! [`FilterOp::Other`] / [`CalcOp::Other`] / [`ThresholdOp::Other`] carrying the
//! uppercased name, which is passed through verbatim to the wire format.

use std::{collections::HashMap, fmt, sync::LazyLock};

use serde::{Serialize, Serializer};

/// Normalize a builder or literal spelling for table lookup.
pub fn lookup_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================
// Filter operators
// ============================================================

/// Filter operator (canonical code).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
    Exists,
    NotExists,
    Contains,
    NotContains,
    StartsWith,
    In,
    NotIn,
    /// Unrecognized builder or literal, uppercased.
    Other(String),
}

static FILTER_BUILDERS: LazyLock<HashMap<&'static str, FilterOp>> = LazyLock::new(|| {
    HashMap::from([
        ("gt", FilterOp::Gt),
        ("greaterthan", FilterOp::Gt),
        ("gte", FilterOp::Gte),
        ("ge", FilterOp::Gte),
        ("greaterthanorequal", FilterOp::Gte),
        ("lt", FilterOp::Lt),
        ("lessthan", FilterOp::Lt),
        ("lte", FilterOp::Lte),
        ("le", FilterOp::Lte),
        ("lessthanorequal", FilterOp::Lte),
        ("eq", FilterOp::Eq),
        ("equal", FilterOp::Eq),
        ("equals", FilterOp::Eq),
        ("ne", FilterOp::Ne),
        ("neq", FilterOp::Ne),
        ("notequal", FilterOp::Ne),
        ("notequals", FilterOp::Ne),
        ("exists", FilterOp::Exists),
        ("notexists", FilterOp::NotExists),
        ("doesnotexist", FilterOp::NotExists),
        ("contains", FilterOp::Contains),
        ("notcontains", FilterOp::NotContains),
        ("doesnotcontain", FilterOp::NotContains),
        ("startswith", FilterOp::StartsWith),
        ("in", FilterOp::In),
        ("isin", FilterOp::In),
        ("notin", FilterOp::NotIn),
    ])
});

impl FilterOp {
    /// All modeled operators, in declaration order.
    pub const ALL: [FilterOp; 13] = [
        FilterOp::Gt,
        FilterOp::Gte,
        FilterOp::Lt,
        FilterOp::Lte,
        FilterOp::Eq,
        FilterOp::Ne,
        FilterOp::Exists,
        FilterOp::NotExists,
        FilterOp::Contains,
        FilterOp::NotContains,
        FilterOp::StartsWith,
        FilterOp::In,
        FilterOp::NotIn,
    ];

    /// Canonical code, e.g. `GT`.
    pub fn code(&self) -> &str {
        match self {
            FilterOp::Gt => "GT",
            FilterOp::Gte => "GTE",
            FilterOp::Lt => "LT",
            FilterOp::Lte => "LTE",
            FilterOp::Eq => "EQ",
            FilterOp::Ne => "NE",
            FilterOp::Exists => "EXISTS",
            FilterOp::NotExists => "NOT_EXISTS",
            FilterOp::Contains => "CONTAINS",
            FilterOp::NotContains => "NOT_CONTAINS",
            FilterOp::StartsWith => "STARTS_WITH",
            FilterOp::In => "IN",
            FilterOp::NotIn => "NOT_IN",
            FilterOp::Other(code) => code,
        }
    }

    /// Wire spelling, e.g. `>`.
    pub fn wire(&self) -> &str {
        match self {
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Exists => "exists",
            FilterOp::NotExists => "does-not-exist",
            FilterOp::Contains => "contains",
            FilterOp::NotContains => "does-not-contain",
            FilterOp::StartsWith => "starts-with",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
            FilterOp::Other(code) => code,
        }
    }

    /// Existence checks never carry a value.
    pub fn is_existence(&self) -> bool {
        matches!(self, FilterOp::Exists | FilterOp::NotExists)
    }

    /// Set membership operators take a list value.
    pub fn is_membership(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn)
    }

    /// Resolve a builder call name (`GT`, `notExists`, ...).
    pub fn from_builder(name: &str) -> Self {
        FILTER_BUILDERS
            .get(lookup_key(name).as_str())
            .cloned()
            .unwrap_or_else(|| FilterOp::Other(name.to_uppercase()))
    }

    /// Parse a literal spelling: wire symbol (`>=`, `does-not-exist`), code (`GTE`)
    /// or any spelling the builder accepts (`startsWith`, `greaterThan`).
    pub fn parse(literal: &str) -> Self {
        let trimmed = literal.trim();
        if trimmed == "==" {
            return FilterOp::Eq;
        }
        if let Some(op) = FilterOp::ALL.iter().find(|op| op.wire() == trimmed) {
            return op.clone();
        }
        let upper = trimmed.to_uppercase().replace(['-', ' '], "_");
        FilterOp::ALL
            .iter()
            .find(|op| op.code() == upper)
            .or_else(|| FILTER_BUILDERS.get(lookup_key(trimmed).as_str()))
            .cloned()
            .unwrap_or(FilterOp::Other(upper))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FilterOp::Other(_))
    }
}

// ============================================================
// Calculation operators
// ============================================================

/// Percentile codes supported by the platform, lowest first.
pub const PERCENTILES: &[&str] = &[
    "P001", "P01", "P05", "P10", "P20", "P25", "P50", "P75", "P80", "P90", "P95", "P99", "P999",
];

/// Calculation (aggregate) operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CalcOp {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
    /// One of [`PERCENTILES`].
    Percentile(&'static str),
    Heatmap,
    RateAvg,
    RateSum,
    RateMax,
    Concurrency,
    /// Unrecognized builder or literal, uppercased.
    Other(String),
}

static CALC_BUILDERS: LazyLock<HashMap<String, CalcOp>> = LazyLock::new(|| {
    let mut table: HashMap<String, CalcOp> = [
        ("count", CalcOp::Count),
        ("countdistinct", CalcOp::CountDistinct),
        ("distinct", CalcOp::CountDistinct),
        ("sum", CalcOp::Sum),
        ("avg", CalcOp::Avg),
        ("average", CalcOp::Avg),
        ("mean", CalcOp::Avg),
        ("min", CalcOp::Min),
        ("max", CalcOp::Max),
        ("median", CalcOp::Percentile("P50")),
        ("heatmap", CalcOp::Heatmap),
        ("rateavg", CalcOp::RateAvg),
        ("ratesum", CalcOp::RateSum),
        ("ratemax", CalcOp::RateMax),
        ("concurrency", CalcOp::Concurrency),
    ]
    .into_iter()
    .map(|(name, op)| (name.to_string(), op))
    .collect();
    for code in PERCENTILES.iter().copied() {
        table.insert(code.to_lowercase(), CalcOp::Percentile(code));
    }
    table
});

impl CalcOp {
    pub fn code(&self) -> &str {
        match self {
            CalcOp::Count => "COUNT",
            CalcOp::CountDistinct => "COUNT_DISTINCT",
            CalcOp::Sum => "SUM",
            CalcOp::Avg => "AVG",
            CalcOp::Min => "MIN",
            CalcOp::Max => "MAX",
            CalcOp::Percentile(code) => code,
            CalcOp::Heatmap => "HEATMAP",
            CalcOp::RateAvg => "RATE_AVG",
            CalcOp::RateSum => "RATE_SUM",
            CalcOp::RateMax => "RATE_MAX",
            CalcOp::Concurrency => "CONCURRENCY",
            CalcOp::Other(code) => code,
        }
    }

    /// The platform spells calculation ops with their codes.
    pub fn wire(&self) -> &str {
        self.code()
    }

    /// Ops that are computed without a column.
    pub fn is_count_like(&self) -> bool {
        matches!(self, CalcOp::Count | CalcOp::Concurrency)
    }

    pub fn from_builder(name: &str) -> Self {
        CALC_BUILDERS
            .get(&lookup_key(name))
            .cloned()
            .unwrap_or_else(|| CalcOp::Other(name.to_uppercase()))
    }

    /// Parse a literal spelling (`"P99"`, `"count_distinct"`, `"RATE_AVG"`).
    ///
    /// Anything a builder name accepts (`"countDistinct"`, `"rateAvg"`) is accepted too.
    pub fn parse(literal: &str) -> Self {
        let upper = literal.trim().to_uppercase().replace(['-', ' '], "_");
        match upper.as_str() {
            "COUNT" => CalcOp::Count,
            "COUNT_DISTINCT" => CalcOp::CountDistinct,
            "SUM" => CalcOp::Sum,
            "AVG" => CalcOp::Avg,
            "MIN" => CalcOp::Min,
            "MAX" => CalcOp::Max,
            "HEATMAP" => CalcOp::Heatmap,
            "RATE_AVG" => CalcOp::RateAvg,
            "RATE_SUM" => CalcOp::RateSum,
            "RATE_MAX" => CalcOp::RateMax,
            "CONCURRENCY" => CalcOp::Concurrency,
            other => match PERCENTILES.iter().copied().find(|p| *p == other) {
                Some(code) => CalcOp::Percentile(code),
                None => CALC_BUILDERS
                    .get(&lookup_key(literal))
                    .cloned()
                    .unwrap_or_else(|| CalcOp::Other(other.to_string())),
            },
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CalcOp::Other(_))
    }
}

// ============================================================
// Trigger threshold operators
// ============================================================

/// Comparison used by a trigger threshold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThresholdOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Other(String),
}

static THRESHOLD_BUILDERS: LazyLock<HashMap<&'static str, ThresholdOp>> = LazyLock::new(|| {
    HashMap::from([
        ("gt", ThresholdOp::Gt),
        ("greaterthan", ThresholdOp::Gt),
        ("gte", ThresholdOp::Gte),
        ("ge", ThresholdOp::Gte),
        ("greaterthanorequal", ThresholdOp::Gte),
        ("lt", ThresholdOp::Lt),
        ("lessthan", ThresholdOp::Lt),
        ("lte", ThresholdOp::Lte),
        ("le", ThresholdOp::Lte),
        ("lessthanorequal", ThresholdOp::Lte),
    ])
});

impl ThresholdOp {
    pub const ALL: [ThresholdOp; 4] = [
        ThresholdOp::Gt,
        ThresholdOp::Gte,
        ThresholdOp::Lt,
        ThresholdOp::Lte,
    ];

    pub fn code(&self) -> &str {
        match self {
            ThresholdOp::Gt => "GT",
            ThresholdOp::Gte => "GTE",
            ThresholdOp::Lt => "LT",
            ThresholdOp::Lte => "LTE",
            ThresholdOp::Other(code) => code,
        }
    }

    pub fn wire(&self) -> &str {
        match self {
            ThresholdOp::Gt => ">",
            ThresholdOp::Gte => ">=",
            ThresholdOp::Lt => "<",
            ThresholdOp::Lte => "<=",
            ThresholdOp::Other(code) => code,
        }
    }

    pub fn from_builder(name: &str) -> Self {
        THRESHOLD_BUILDERS
            .get(lookup_key(name).as_str())
            .cloned()
            .unwrap_or_else(|| ThresholdOp::Other(name.to_uppercase()))
    }

    pub fn parse(literal: &str) -> Self {
        let trimmed = literal.trim();
        if let Some(op) = ThresholdOp::ALL.iter().find(|op| op.wire() == trimmed) {
            return op.clone();
        }
        let upper = trimmed.to_uppercase().replace(['-', ' '], "_");
        ThresholdOp::ALL
            .iter()
            .find(|op| op.code() == upper)
            .or_else(|| THRESHOLD_BUILDERS.get(lookup_key(trimmed).as_str()))
            .cloned()
            .unwrap_or(ThresholdOp::Other(upper))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ThresholdOp::Other(_))
    }
}

// ============================================================
// Small enums
// ============================================================

/// Sort direction of an order clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn wire(&self) -> &'static str {
        match self {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        }
    }

    pub fn parse(literal: &str) -> Option<Self> {
        match lookup_key(literal).as_str() {
            "asc" | "ascending" => Some(Direction::Ascending),
            "desc" | "descending" => Some(Direction::Descending),
            _ => None,
        }
    }
}

/// How multiple filters combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterCombination {
    And,
    Or,
}

impl FilterCombination {
    pub fn wire(&self) -> &'static str {
        match self {
            FilterCombination::And => "AND",
            FilterCombination::Or => "OR",
        }
    }

    pub fn parse(literal: &str) -> Option<Self> {
        match lookup_key(literal).as_str() {
            "and" => Some(FilterCombination::And),
            "or" => Some(FilterCombination::Or),
            _ => None,
        }
    }
}

macro_rules! serialize_as_code {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.code())
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.code())
                }
            }
        )*
    };
}

serialize_as_code!(FilterOp, CalcOp, ThresholdOp);

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire())
    }
}

impl Serialize for FilterCombination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire())
    }
}
