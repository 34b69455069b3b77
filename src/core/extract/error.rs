use thiserror::Error;

/// Why a field value could not be turned into a canonical value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("unknown field '{field}' in {owner}")]
    UnknownField { owner: &'static str, field: String },

    #[error("spread syntax in {owner} cannot be analyzed statically")]
    Spread { owner: &'static str },

    #[error("'{field}' must be {expected}")]
    InvalidValue {
        field: String,
        expected: &'static str,
    },

    #[error("'{field}' is required in {owner}")]
    MissingField {
        owner: &'static str,
        field: &'static str,
    },

    #[error("unknown {category} builder '{name}'")]
    UnknownBuilder {
        category: &'static str,
        name: String,
    },

    #[error("unknown {category} '{value}'")]
    UnknownVariant {
        category: &'static str,
        value: String,
    },

    #[error("time range sets both a relative duration and an absolute start/end")]
    AmbiguousTimeRange,

    #[error("absolute time range needs both a start and an end")]
    IncompleteTimeRange,
}

impl ExtractError {
    pub fn invalid(field: &str, expected: &'static str) -> Self {
        ExtractError::InvalidValue {
            field: field.to_string(),
            expected,
        }
    }
}

/// A recognized declaration that could not be extracted.
///
/// Carries the declaration's provenance; the rest of the file is still extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot extract '{name}': {source}")]
pub struct DeclarationError {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub source: ExtractError,
}
