//! Wire format of the observability platform.
//!
//! Each record kind maps to a serde struct whose field order is the key order of
//! the emitted JSON, so output is byte-stable. Conversion rules:
//!
//! - Optional fields that are absent, zero or empty are omitted, never `null`.
//! - SLO targets are sent per million (`99.9` → `999000`).
//! - SLO periods are sent in whole days, burn alert windows in hours.
//! - Named references are sent as the name string; inline queries as query objects.
//!
//! Provenance is not part of the wire format; parsing wire JSON back yields spec
//! bodies only.
//!
//! ## Module Structure
//!
//! - `query`: Queries and query references
//! - `alerting`: Recipients
//! - `slo` / `trigger` / `board`: Per-kind objects
//! - `document`: The combined document of a whole snapshot

mod alerting;
pub mod board;
pub mod document;
pub mod query;
pub mod slo;
pub mod trigger;

use std::fmt;

use serde::Serialize;
use serde_json::Number;
use thiserror::Error;

use crate::core::data::{
    BoardSpec, QuerySpec, Record, Resource, ResourceKind, SloSpec, TriggerSpec,
};

pub use board::WireBoard;
pub use document::WireDocument;
pub use query::{WireQuery, WireQueryRef};
pub use slo::WireSlo;
pub use trigger::WireTrigger;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("{subject}: missing required field '{field}'")]
    MissingField {
        subject: Subject,
        field: &'static str,
    },

    #[error("{subject}: invalid '{field}': {reason}")]
    InvalidValue {
        subject: Subject,
        field: &'static str,
        reason: String,
    },

    #[error("invalid wire JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The resource an error is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub kind: ResourceKind,
    pub name: String,
}

impl Subject {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn missing(&self, field: &'static str) -> SerializationError {
        SerializationError::MissingField {
            subject: self.clone(),
            field,
        }
    }

    pub(crate) fn invalid(&self, field: &'static str, reason: impl Into<String>) -> SerializationError {
        SerializationError::InvalidValue {
            subject: self.clone(),
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// Whole numbers go out as integers, everything else as floats.
pub(crate) fn number(subject: &Subject, field: &'static str, value: f64) -> Result<Number, SerializationError> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        return Ok(Number::from(value as i64));
    }
    Number::from_f64(value).ok_or_else(|| subject.invalid(field, "not a finite number"))
}

pub(crate) fn float(subject: &Subject, field: &'static str, value: &Number) -> Result<f64, SerializationError> {
    value
        .as_f64()
        .ok_or_else(|| subject.invalid(field, "not representable as a float"))
}

/// Wire object of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireResource {
    Query(WireQuery),
    Slo(WireSlo),
    Trigger(WireTrigger),
    Board(WireBoard),
}

/// Canonical spec body parsed back from wire JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSpec {
    Query(QuerySpec),
    Slo(SloSpec),
    Trigger(TriggerSpec),
    Board(BoardSpec),
}

/// Map one record to its wire object.
pub fn to_wire(record: &Record) -> Result<WireResource, SerializationError> {
    let subject = Subject::new(record.kind(), record.name());
    Ok(match record {
        Record::Query(query) => WireResource::Query(WireQuery::from_spec(&query.spec, &subject)?),
        Record::Slo(slo) => WireResource::Slo(WireSlo::from_record(slo)?),
        Record::Trigger(trigger) => WireResource::Trigger(WireTrigger::from_record(trigger)?),
        Record::Board(board) => WireResource::Board(WireBoard::from_record(board)?),
    })
}

/// Compact wire JSON of one record.
pub fn to_wire_json(record: &Record) -> Result<String, SerializationError> {
    Ok(serde_json::to_string(&to_wire(record)?)?)
}

/// Parse the wire JSON of one `kind` back into a spec body.
pub fn from_wire_json(kind: ResourceKind, json: &str) -> Result<ResourceSpec, SerializationError> {
    Ok(match kind {
        ResourceKind::Query => {
            let wire: WireQuery = serde_json::from_str(json)?;
            ResourceSpec::Query(wire.into_spec(&Subject::new(kind, "query"))?)
        }
        ResourceKind::Slo => ResourceSpec::Slo(serde_json::from_str::<WireSlo>(json)?.into_spec()?),
        ResourceKind::Trigger => {
            ResourceSpec::Trigger(serde_json::from_str::<WireTrigger>(json)?.into_spec()?)
        }
        ResourceKind::Board => {
            ResourceSpec::Board(serde_json::from_str::<WireBoard>(json)?.into_spec()?)
        }
    })
}
