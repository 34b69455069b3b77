//! Diagnostic types produced by the lint engine.
//!
//! A diagnostic is plain data: the reporter prints it, the CLI counts it, and
//! nothing in the pipeline changes because of it.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Serialize, Serializer};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Lint rule identifier. The kebab-case spelling is the rule's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    ParseError,
    InvalidDeclaration,
    DuplicateName,
    DanglingQueryRef,
    DanglingSloRef,
    MissingDataset,
    CalculationMissingColumn,
    FilterValueMismatch,
    UnknownOperator,
    SloTargetRange,
    TriggerMissingThreshold,
    TriggerQueryShape,
    MissingRecipients,
    EmptyBoard,
}

impl Rule {
    pub const ALL: [Rule; 14] = [
        Rule::ParseError,
        Rule::InvalidDeclaration,
        Rule::DuplicateName,
        Rule::DanglingQueryRef,
        Rule::DanglingSloRef,
        Rule::MissingDataset,
        Rule::CalculationMissingColumn,
        Rule::FilterValueMismatch,
        Rule::UnknownOperator,
        Rule::SloTargetRange,
        Rule::TriggerMissingThreshold,
        Rule::TriggerQueryShape,
        Rule::MissingRecipients,
        Rule::EmptyBoard,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Rule::ParseError => "parse-error",
            Rule::InvalidDeclaration => "invalid-declaration",
            Rule::DuplicateName => "duplicate-name",
            Rule::DanglingQueryRef => "dangling-query-ref",
            Rule::DanglingSloRef => "dangling-slo-ref",
            Rule::MissingDataset => "missing-dataset",
            Rule::CalculationMissingColumn => "calculation-missing-column",
            Rule::FilterValueMismatch => "filter-value-mismatch",
            Rule::UnknownOperator => "unknown-operator",
            Rule::SloTargetRange => "slo-target-range",
            Rule::TriggerMissingThreshold => "trigger-missing-threshold",
            Rule::TriggerQueryShape => "trigger-query-shape",
            Rule::MissingRecipients => "missing-recipients",
            Rule::EmptyBoard => "empty-board",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Rule::DuplicateName
            | Rule::DanglingQueryRef
            | Rule::DanglingSloRef
            | Rule::UnknownOperator
            | Rule::MissingRecipients
            | Rule::EmptyBoard => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase().replace('_', "-");
        Rule::ALL
            .into_iter()
            .find(|rule| rule.code() == code)
            .ok_or_else(|| format!("unknown rule code '{}'", s))
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

// ============================================================
// Diagnostic
// ============================================================

/// One finding of the lint engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: Rule,
    pub severity: Severity,
    pub message: String,
    pub file: String,
    /// 1-based, 0 when the finding concerns a whole file.
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    /// What a fix would change. Only filled when fixes are requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(code: Rule, file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            file: file.into(),
            line,
            resource_name: None,
            suggestion: None,
        }
    }

    pub fn for_resource(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Report order: file, then line, then rule code.
    pub fn compare(a: &Diagnostic, b: &Diagnostic) -> Ordering {
        a.file
            .cmp(&b.file)
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.code.code().cmp(b.code.code()))
    }
}
