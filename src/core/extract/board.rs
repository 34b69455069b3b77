use swc_ecma_ast::{Expr, ObjectLit};

use super::{
    error::ExtractError,
    fields::ObjectFields,
    value::{Extractor, builder},
};
use crate::core::{
    collect::{ConstValue, helpers::unwrap_ts_expr},
    data::{BoardSpec, Panel, PanelContent, Position, SloRef, Tag, ops::lookup_key},
};

impl Extractor<'_> {
    pub fn board_spec(&self, obj: &ObjectLit) -> Result<BoardSpec, ExtractError> {
        let mut fields = ObjectFields::new(obj, "board")?;
        let mut spec = BoardSpec::default();

        if let Some(v) = fields.take("name") {
            spec.name = Some(self.string("name", &v)?);
        }
        if let Some(v) = fields.take("description") {
            spec.description = Some(self.string("description", &v)?);
        }
        if let Some(v) = fields.take("panels") {
            spec.panels = self
                .elements("panels", &v)?
                .into_iter()
                .map(|elem| self.panel(elem))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = fields.take("presetfilters") {
            spec.preset_filters = self.filters("presetFilters", &v)?;
        }
        if let Some(v) = fields.take("tags") {
            spec.tags = self
                .elements("tags", &v)?
                .into_iter()
                .map(|elem| self.tag(elem))
                .collect::<Result<_, _>>()?;
        }

        fields.finish()?;
        Ok(spec)
    }

    /// `QueryPanel(ref, opts?)`, `TextPanel(markdown, opts?)`, `SLOPanel(ref | "id", opts?)`
    /// or a panel object (`{ type, title, position, query | content | slo | sloId }`).
    fn panel(&self, expr: &Expr) -> Result<Panel, ExtractError> {
        if let Some(call) = builder(expr, "panel")? {
            let (first, options) = match call.args.as_slice() {
                [first] => (*first, None),
                [first, options] => (*first, Some(*options)),
                _ => {
                    return Err(ExtractError::invalid(
                        call.name,
                        "called with a panel source and optional options",
                    ));
                }
            };
            let content = match lookup_key(call.name).as_str() {
                "querypanel" => PanelContent::Query(self.query_ref("query", first)?),
                "textpanel" => PanelContent::Text(self.string("content", first)?),
                "slopanel" => PanelContent::Slo(self.slo_ref(first)?),
                _ => {
                    return Err(ExtractError::UnknownBuilder {
                        category: "panel",
                        name: call.name.to_string(),
                    });
                }
            };
            let mut panel = Panel::new(content);
            if let Some(options) = options {
                let Expr::Object(obj) = unwrap_ts_expr(options) else {
                    return Err(ExtractError::invalid("panel options", "an object literal"));
                };
                let mut fields = ObjectFields::new(obj, "panel options")?;
                self.panel_layout(&mut fields, &mut panel)?;
                fields.finish()?;
            }
            return Ok(panel);
        }

        let Expr::Object(obj) = unwrap_ts_expr(expr) else {
            return Err(ExtractError::invalid(
                "panels",
                "a panel builder or a panel object",
            ));
        };
        let mut fields = ObjectFields::new(obj, "panel")?;
        let declared = fields
            .take("type")
            .map(|v| self.string("type", &v))
            .transpose()?;
        let query = fields.take("query");
        let text = fields.take_any(&["content", "text", "markdown"]);
        let slo = fields.take("slo");
        let slo_id = fields.take("sloid");
        let content = match (query, text, slo, slo_id) {
            (Some(query), None, None, None) => PanelContent::Query(self.query_ref("query", &query)?),
            (None, Some(text), None, None) => PanelContent::Text(self.string("content", &text)?),
            (None, None, Some(slo), None) => PanelContent::Slo(self.slo_ref(&slo)?),
            (None, None, None, Some(id)) => {
                PanelContent::Slo(SloRef::External(self.string("sloId", &id)?))
            }
            (None, None, None, None) => {
                return Err(ExtractError::MissingField {
                    owner: "panel",
                    field: "query",
                });
            }
            _ => {
                return Err(ExtractError::invalid(
                    "panel",
                    "exactly one of query, content, slo or sloId",
                ));
            }
        };
        let mut panel = Panel::new(content);
        if let Some(declared) = declared
            && lookup_key(&declared) != panel.kind()
        {
            return Err(ExtractError::UnknownVariant {
                category: "panel type for this content",
                value: declared,
            });
        }
        self.panel_layout(&mut fields, &mut panel)?;
        fields.finish()?;
        Ok(panel)
    }

    fn panel_layout(&self, fields: &mut ObjectFields<'_>, panel: &mut Panel) -> Result<(), ExtractError> {
        if let Some(v) = fields.take("title") {
            panel.title = Some(self.string("title", &v)?);
        }
        if let Some(v) = fields.take("position") {
            panel.position = Some(self.position(&v)?);
        }
        Ok(())
    }

    /// A declared SLO by reference, or an externally managed SLO by id string.
    fn slo_ref(&self, expr: &Expr) -> Result<SloRef, ExtractError> {
        if !matches!(unwrap_ts_expr(expr), Expr::Ident(_))
            && let Some(ConstValue::Str(id)) = self.literal(expr)
        {
            return Ok(SloRef::External(id));
        }
        self.reference_name(expr)
            .map(SloRef::Named)
            .ok_or_else(|| ExtractError::invalid("slo", "an SLO reference or an SLO id string"))
    }

    fn position(&self, expr: &Expr) -> Result<Position, ExtractError> {
        let Expr::Object(obj) = unwrap_ts_expr(expr) else {
            return Err(ExtractError::invalid("position", "an `{ x, y, width, height }` object"));
        };
        let mut fields = ObjectFields::new(obj, "position")?;
        let mut position = Position::default();
        if let Some(v) = fields.take_any(&["x", "xcoordinate"]) {
            position.x = self.small_count("x", &v)?;
        }
        if let Some(v) = fields.take_any(&["y", "ycoordinate"]) {
            position.y = self.small_count("y", &v)?;
        }
        if let Some(v) = fields.take_any(&["width", "w"]) {
            position.width = self.small_count("width", &v)?;
        }
        if let Some(v) = fields.take_any(&["height", "h"]) {
            position.height = self.small_count("height", &v)?;
        }
        fields.finish()?;
        Ok(position)
    }

    /// `Tag("team", "payments")` or `{ key, value }`.
    fn tag(&self, expr: &Expr) -> Result<Tag, ExtractError> {
        if let Some(call) = builder(expr, "tag")? {
            if lookup_key(call.name) != "tag" {
                return Err(ExtractError::UnknownBuilder {
                    category: "tag",
                    name: call.name.to_string(),
                });
            }
            let [key, value] = call.args.as_slice() else {
                return Err(ExtractError::invalid(call.name, "called with a key and a value"));
            };
            return Ok(Tag {
                key: self.string("tag key", key)?,
                value: self.string("tag value", value)?,
            });
        }
        let Expr::Object(obj) = unwrap_ts_expr(expr) else {
            return Err(ExtractError::invalid("tags", "a `Tag(key, value)` call or a `{ key, value }` object"));
        };
        let mut fields = ObjectFields::new(obj, "tag")?;
        let key = fields.take("key").ok_or(ExtractError::MissingField {
            owner: "tag",
            field: "key",
        })?;
        let value = fields.take("value").ok_or(ExtractError::MissingField {
            owner: "tag",
            field: "value",
        })?;
        fields.finish()?;
        Ok(Tag {
            key: self.string("key", &key)?,
            value: self.string("value", &value)?,
        })
    }
}
