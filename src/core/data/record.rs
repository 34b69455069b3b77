//! The canonical record sum type.

use std::{fmt, str::FromStr};

use enum_dispatch::enum_dispatch;
use serde::Serialize;

use super::{
    board::{BoardRecord, PanelContent},
    declaration::Declaration,
    query::QueryRecord,
    slo::SloRecord,
    trigger::TriggerRecord,
};

/// Resource kind, used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Query,
    Slo,
    Trigger,
    Board,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Query => write!(f, "query"),
            ResourceKind::Slo => write!(f, "slo"),
            ResourceKind::Trigger => write!(f, "trigger"),
            ResourceKind::Board => write!(f, "board"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_end_matches('s') {
            "query" | "querie" => Ok(ResourceKind::Query),
            "slo" => Ok(ResourceKind::Slo),
            "trigger" => Ok(ResourceKind::Trigger),
            "board" => Ok(ResourceKind::Board),
            other => Err(format!(
                "unknown resource kind '{}' (expected query, slo, trigger or board)",
                other
            )),
        }
    }
}

/// Accessors shared by every record kind.
#[enum_dispatch]
pub trait Resource {
    fn declaration(&self) -> &Declaration;

    fn kind(&self) -> ResourceKind;

    /// Dataset the record declares directly, if any.
    fn dataset(&self) -> Option<&str>;

    /// Display name set in the body, if any.
    fn display_name(&self) -> Option<&str> {
        None
    }

    fn name(&self) -> &str {
        &self.declaration().name
    }
}

impl Resource for QueryRecord {
    fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Query
    }

    fn dataset(&self) -> Option<&str> {
        self.spec.dataset.as_deref()
    }
}

impl Resource for SloRecord {
    fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Slo
    }

    fn dataset(&self) -> Option<&str> {
        self.spec.dataset.as_deref()
    }

    fn display_name(&self) -> Option<&str> {
        self.spec.name.as_deref()
    }
}

impl Resource for TriggerRecord {
    fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Trigger
    }

    fn dataset(&self) -> Option<&str> {
        self.spec.dataset.as_deref()
    }

    fn display_name(&self) -> Option<&str> {
        self.spec.name.as_deref()
    }
}

impl Resource for BoardRecord {
    fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Board
    }

    /// Boards have no dataset of their own; this is the first inline panel query's.
    fn dataset(&self) -> Option<&str> {
        self.spec.panels.iter().find_map(|panel| match &panel.content {
            PanelContent::Query(query) => query.inline().and_then(|q| q.dataset.as_deref()),
            _ => None,
        })
    }

    fn display_name(&self) -> Option<&str> {
        self.spec.name.as_deref()
    }
}

/// One extracted resource.
#[enum_dispatch(Resource)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Query(QueryRecord),
    Slo(SloRecord),
    Trigger(TriggerRecord),
    Board(BoardRecord),
}

impl Record {
    pub fn as_query(&self) -> Option<&QueryRecord> {
        match self {
            Record::Query(query) => Some(query),
            _ => None,
        }
    }

    pub fn as_slo(&self) -> Option<&SloRecord> {
        match self {
            Record::Slo(slo) => Some(slo),
            _ => None,
        }
    }

    pub fn as_trigger(&self) -> Option<&TriggerRecord> {
        match self {
            Record::Trigger(trigger) => Some(trigger),
            _ => None,
        }
    }

    pub fn as_board(&self) -> Option<&BoardRecord> {
        match self {
            Record::Board(board) => Some(board),
            _ => None,
        }
    }
}
