//! Board (dashboard) record model.

use serde::Serialize;

use super::{
    declaration::Declaration,
    query::{Filter, QueryRef},
};

/// Grid placement of a panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// SLO shown on a board: a declared SLO by name, or an SLO managed elsewhere by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SloRef {
    Named(String),
    External(String),
}

/// Panel payload. Closed set: adding a panel kind means adding a variant here and
/// handling it everywhere panels are matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelContent {
    Query(QueryRef),
    Text(String),
    Slo(SloRef),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub content: PanelContent,
}

impl Panel {
    pub fn new(content: PanelContent) -> Self {
        Self {
            title: None,
            position: None,
            content,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.content {
            PanelContent::Query(_) => "query",
            PanelContent::Text(_) => "text",
            PanelContent::Slo(_) => "slo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardSpec {
    /// Display name; the declaration name is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub panels: Vec<Panel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preset_filters: Vec<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardRecord {
    pub declaration: Declaration,
    #[serde(flatten)]
    pub spec: BoardSpec,
    /// Names of queries referenced by panels. Filled by the reference resolver.
    pub query_refs: Vec<String>,
    /// Names of SLOs referenced by panels. Filled by the reference resolver.
    pub slo_refs: Vec<String>,
}

impl BoardRecord {
    pub fn new(declaration: Declaration, spec: BoardSpec) -> Self {
        Self {
            declaration,
            spec,
            query_refs: Vec::new(),
            slo_refs: Vec::new(),
        }
    }
}
