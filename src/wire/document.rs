//! The combined wire document of a snapshot.

use serde::{Deserialize, Serialize};

use super::{ResourceSpec, SerializationError, Subject, WireBoard, WireQuery, WireSlo, WireTrigger};
use crate::core::{
    data::{Record, Resource, ResourceKind},
    registry::Snapshot,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireDocument {
    #[serde(default)]
    pub queries: Vec<NamedQuery>,
    #[serde(default)]
    pub slos: Vec<WireSlo>,
    #[serde(default)]
    pub triggers: Vec<WireTrigger>,
    #[serde(default)]
    pub boards: Vec<WireBoard>,
}

/// Queries carry no name of their own on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    pub query: WireQuery,
}

impl WireDocument {
    /// Serialize every record in registry order. The first failing record aborts
    /// the whole document.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, SerializationError> {
        let mut document = WireDocument::default();
        for record in snapshot.records() {
            match record {
                Record::Query(query) => {
                    let subject = Subject::new(ResourceKind::Query, record.name());
                    document.queries.push(NamedQuery {
                        name: record.name().to_string(),
                        query: WireQuery::from_spec(&query.spec, &subject)?,
                    });
                }
                Record::Slo(slo) => document.slos.push(WireSlo::from_record(slo)?),
                Record::Trigger(trigger) => document.triggers.push(WireTrigger::from_record(trigger)?),
                Record::Board(board) => document.boards.push(WireBoard::from_record(board)?),
            }
        }
        Ok(document)
    }

    pub fn count(&self) -> usize {
        self.queries.len() + self.slos.len() + self.triggers.len() + self.boards.len()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, SerializationError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse every object back into `(name, spec)` pairs, grouped by kind.
    pub fn into_specs(self) -> Result<Vec<(String, ResourceSpec)>, SerializationError> {
        let mut specs = Vec::with_capacity(self.count());
        for named in self.queries {
            let subject = Subject::new(ResourceKind::Query, named.name.as_str());
            let spec = named.query.into_spec(&subject)?;
            specs.push((named.name, ResourceSpec::Query(spec)));
        }
        for slo in self.slos {
            specs.push((slo.name.clone(), ResourceSpec::Slo(slo.into_spec()?)));
        }
        for trigger in self.triggers {
            specs.push((trigger.name.clone(), ResourceSpec::Trigger(trigger.into_spec()?)));
        }
        for board in self.boards {
            specs.push((board.name.clone(), ResourceSpec::Board(board.into_spec()?)));
        }
        Ok(specs)
    }
}
