use serde::{Deserialize, Serialize};

use super::{
    SerializationError, Subject,
    query::{WireFilter, WireQueryRef},
};
use crate::core::data::{
    BoardRecord, BoardSpec, Panel, PanelContent, Position, ResourceKind, SloRef, Tag,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBoard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub panels: Vec<WirePanel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preset_filters: Vec<WireFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<WireTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WirePanelType {
    Query,
    Text,
    Slo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePanel {
    #[serde(rename = "type")]
    pub kind: WirePanelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<WirePosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<WireQueryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Name of a declared SLO.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slo: Option<String>,
    /// Id of an SLO managed outside the source tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slo_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePosition {
    pub x_coordinate: u32,
    pub y_coordinate: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTag {
    pub key: String,
    pub value: String,
}

impl From<Position> for WirePosition {
    fn from(position: Position) -> Self {
        Self {
            x_coordinate: position.x,
            y_coordinate: position.y,
            width: position.width,
            height: position.height,
        }
    }
}

impl From<WirePosition> for Position {
    fn from(position: WirePosition) -> Self {
        Self {
            x: position.x_coordinate,
            y: position.y_coordinate,
            width: position.width,
            height: position.height,
        }
    }
}

impl WireBoard {
    pub fn from_record(board: &BoardRecord) -> Result<Self, SerializationError> {
        let subject = Subject::new(ResourceKind::Board, board.declaration.name.as_str());
        let spec = &board.spec;
        Ok(Self {
            name: spec.name.clone().unwrap_or_else(|| board.declaration.name.clone()),
            description: spec.description.clone().filter(|d| !d.is_empty()),
            panels: spec
                .panels
                .iter()
                .map(|panel| WirePanel::from_panel(panel, &subject))
                .collect::<Result<_, _>>()?,
            preset_filters: spec
                .preset_filters
                .iter()
                .map(|filter| WireFilter::from_filter(filter, &subject))
                .collect::<Result<_, _>>()?,
            tags: spec
                .tags
                .iter()
                .map(|tag| WireTag {
                    key: tag.key.clone(),
                    value: tag.value.clone(),
                })
                .collect(),
        })
    }

    pub fn into_spec(self) -> Result<BoardSpec, SerializationError> {
        let subject = Subject::new(ResourceKind::Board, self.name.as_str());
        Ok(BoardSpec {
            panels: self
                .panels
                .into_iter()
                .map(|panel| panel.into_panel(&subject))
                .collect::<Result<_, _>>()?,
            preset_filters: self
                .preset_filters
                .into_iter()
                .map(|filter| filter.into_filter(&subject))
                .collect::<Result<_, _>>()?,
            tags: self
                .tags
                .into_iter()
                .map(|tag| Tag {
                    key: tag.key,
                    value: tag.value,
                })
                .collect(),
            name: Some(self.name),
            description: self.description,
        })
    }
}

impl WirePanel {
    fn from_panel(panel: &Panel, subject: &Subject) -> Result<Self, SerializationError> {
        let mut wire = Self {
            kind: WirePanelType::Text,
            title: panel.title.clone(),
            position: panel.position.map(WirePosition::from),
            query: None,
            content: None,
            slo: None,
            slo_id: None,
        };
        match &panel.content {
            PanelContent::Query(query) => {
                wire.kind = WirePanelType::Query;
                wire.query = Some(WireQueryRef::from_ref(query, subject)?);
            }
            PanelContent::Text(text) => wire.content = Some(text.clone()),
            PanelContent::Slo(slo) => {
                wire.kind = WirePanelType::Slo;
                match slo {
                    SloRef::Named(name) => wire.slo = Some(name.clone()),
                    SloRef::External(id) => wire.slo_id = Some(id.clone()),
                }
            }
        }
        Ok(wire)
    }

    fn into_panel(self, subject: &Subject) -> Result<Panel, SerializationError> {
        let content = match self.kind {
            WirePanelType::Query => PanelContent::Query(
                self.query
                    .ok_or_else(|| subject.missing("panels.query"))?
                    .into_ref(subject)?,
            ),
            WirePanelType::Text => {
                PanelContent::Text(self.content.ok_or_else(|| subject.missing("panels.content"))?)
            }
            WirePanelType::Slo => match (self.slo, self.slo_id) {
                (Some(name), None) => PanelContent::Slo(SloRef::Named(name)),
                (None, Some(id)) => PanelContent::Slo(SloRef::External(id)),
                (None, None) => return Err(subject.missing("panels.slo")),
                (Some(_), Some(_)) => {
                    return Err(subject.invalid("panels.slo", "both slo and slo_id are set"));
                }
            },
        };
        Ok(Panel {
            title: self.title,
            position: self.position.map(Position::from),
            content,
        })
    }
}
