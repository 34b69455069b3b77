//! Phase 2: declaration extraction.
//!
//! Turns the exported, module-level variable declarations of one parsed file into
//! canonical records. A declaration is a resource when its initializer has one of
//! the resource shapes (see `shape`); wrapper objects and arrays are searched for
//! shapes too, and what is found inside them is named by path (`bundle.latency`,
//! `all[0]`). Shapes are never searched: an inline query inside a board is part
//! of the board.
//!
//! ## Module Structure
//!
//! - `shape`: Recognition of the four resource shapes
//! - `fields`: Object literal field access with unknown-field rejection
//! - `value`: Static value evaluation, builder calls and reference naming
//! - `time`: Durations, periods and time ranges
//! - `query` / `board` / `slo` / `trigger` / `alerting`: Per-kind field extraction
//! - `error`: `ExtractError` and `DeclarationError`

mod alerting;
mod board;
pub mod error;
mod fields;
mod query;
pub mod shape;
mod slo;
mod time;
mod trigger;
pub mod value;

use swc_common::{SourceMap, Span, Spanned};
use swc_ecma_ast::{Decl, Expr, ModuleDecl, ModuleItem, Pat, Prop, PropOrSpread, Stmt, TsType, VarDeclarator};
use swc_ecma_visit::VisitWith;
use tracing::debug;

pub use error::{DeclarationError, ExtractError};
pub use value::Extractor;

use crate::core::{
    collect::{SymbolCollector, helpers::{extract_prop_name, unwrap_ts_expr}},
    data::{BoardRecord, Declaration, QueryRecord, Record, ResourceKind, SloRecord, TriggerRecord},
    parsers::source::ParsedSource,
};
use shape::{Shape, match_shape};

/// Records and rejected declarations of one file, in source order.
#[derive(Debug, Default)]
pub struct FileExtraction {
    pub records: Vec<Record>,
    pub errors: Vec<DeclarationError>,
}

impl Extractor<'_> {
    /// Build the canonical record for a recognized shape.
    pub fn record(&self, shape: Shape<'_>, declaration: Declaration) -> Result<Record, ExtractError> {
        Ok(match shape.kind {
            ResourceKind::Query => Record::Query(QueryRecord {
                declaration,
                spec: self.query_spec(shape.body)?,
            }),
            ResourceKind::Slo => Record::Slo(SloRecord {
                declaration,
                spec: self.slo_spec(shape.body)?,
            }),
            ResourceKind::Trigger => Record::Trigger(TriggerRecord {
                declaration,
                spec: self.trigger_spec(shape.body)?,
            }),
            ResourceKind::Board => {
                Record::Board(BoardRecord::new(declaration, self.board_spec(shape.body)?))
            }
        })
    }
}

struct ModuleWalker<'a> {
    extractor: Extractor<'a>,
    source_map: &'a SourceMap,
    file: &'a str,
    scope: &'a str,
    out: FileExtraction,
}

impl ModuleWalker<'_> {
    fn declaration_at(&self, name: &str, span: Span) -> Declaration {
        let loc = self.source_map.lookup_char_pos(span.lo);
        Declaration::new(name, self.scope, self.file, loc.line, loc.col_display + 1)
    }

    fn declarator(&mut self, name: &str, decl: &VarDeclarator) {
        let Some(init) = &decl.init else {
            return;
        };
        let annotation = match &decl.name {
            Pat::Ident(binding) => binding.type_ann.as_ref().map(|ann| &*ann.type_ann),
            _ => None,
        };
        let declaration = self.declaration_at(name, decl.span);
        self.value(init, annotation, declaration);
    }

    fn value(&mut self, expr: &Expr, annotation: Option<&TsType>, declaration: Declaration) {
        if let Some(shape) = match_shape(expr, annotation) {
            match self.extractor.record(shape, declaration.clone()) {
                Ok(record) => self.out.records.push(record),
                Err(source) => {
                    debug!(
                        name = %declaration.name,
                        location = %declaration.location(),
                        "rejected declaration: {}",
                        source
                    );
                    self.out.errors.push(DeclarationError {
                        name: declaration.name,
                        file: declaration.file,
                        line: declaration.line,
                        source,
                    });
                }
            }
            return;
        }

        match unwrap_ts_expr(expr) {
            Expr::Object(obj) => {
                for prop in &obj.props {
                    if let PropOrSpread::Prop(prop) = prop
                        && let Prop::KeyValue(kv) = &**prop
                        && let Some(key) = extract_prop_name(&kv.key)
                    {
                        let nested = self.nested(&declaration, &key, kv.value.span());
                        self.value(&kv.value, None, nested);
                    }
                }
            }
            Expr::Array(array) => {
                for (i, elem) in array.elems.iter().enumerate() {
                    if let Some(elem) = elem
                        && elem.spread.is_none()
                    {
                        let nested = self.nested(&declaration, &format!("[{}]", i), elem.expr.span());
                        self.value(&elem.expr, None, nested);
                    }
                }
            }
            _ => {}
        }
    }

    fn nested(&self, parent: &Declaration, segment: &str, span: Span) -> Declaration {
        let name = parent.nested(segment).name;
        self.declaration_at(&name, span)
    }
}

/// Extract every resource declared by one parsed file.
///
/// `file` is the path recorded as provenance; `scope` is the declaring scope
/// (the file's directory relative to the scan root).
pub fn extract_module(parsed: &ParsedSource, file: &str, scope: &str) -> FileExtraction {
    let mut collector = SymbolCollector::new();
    parsed.module.visit_with(&mut collector);
    let symbols = collector.symbols;

    let mut walker = ModuleWalker {
        extractor: Extractor::new(&symbols),
        source_map: &parsed.source_map,
        file,
        scope,
        out: FileExtraction::default(),
    };

    for item in &parsed.module.body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                if let Decl::Var(var) = &export.decl {
                    for decl in &var.decls {
                        if let Pat::Ident(binding) = &decl.name {
                            walker.declarator(binding.id.sym.as_str(), decl);
                        }
                    }
                }
            }
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                for decl in &var.decls {
                    if let Pat::Ident(binding) = &decl.name {
                        for exported in symbols.exported_names(binding.id.sym.as_str()) {
                            walker.declarator(exported, decl);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    walker.out
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use swc_common::SourceMap;

    use super::*;
    use crate::core::{data::Resource, parsers::source::parse_source};

    pub(crate) fn extract(code: &str) -> FileExtraction {
        extract_in("monitoring/api.ts", "monitoring", code)
    }

    fn extract_in(file: &str, scope: &str, code: &str) -> FileExtraction {
        let parsed = parse_source(code.to_string(), file, Arc::new(SourceMap::default())).unwrap();
        extract_module(&parsed, file, scope)
    }

    /// The single record of `code`, or the first extraction error.
    pub(crate) fn extract_one(code: &str) -> Result<Record, ExtractError> {
        let mut extraction = extract(code);
        if let Some(err) = extraction.errors.into_iter().next() {
            return Err(err.source);
        }
        assert_eq!(extraction.records.len(), 1, "expected exactly one record");
        Ok(extraction.records.remove(0))
    }

    fn names(extraction: &FileExtraction) -> Vec<(ResourceKind, String)> {
        extraction
            .records
            .iter()
            .map(|r| (r.kind(), r.name().to_string()))
            .collect()
    }

    #[test]
    fn test_only_exported_module_level_declarations() {
        let extraction = extract(
            r#"
            export const latency = query({ dataset: "api" });
            const hidden = query({ dataset: "api" });
            export function make() {
                const inner = query({ dataset: "api" });
                return inner;
            }
            export const built = make();
            "#,
        );
        assert_eq!(
            names(&extraction),
            vec![(ResourceKind::Query, "latency".to_string())]
        );
    }

    #[test]
    fn test_export_specifiers_use_the_exported_name() {
        let extraction = extract(
            r#"
            const latency = query({ dataset: "api" });
            export { latency as apiLatency };
            "#,
        );
        assert_eq!(
            names(&extraction),
            vec![(ResourceKind::Query, "apiLatency".to_string())]
        );
    }

    #[test]
    fn test_all_shape_spellings() {
        let extraction = extract(
            r#"
            export const a = query({ dataset: "api" });
            export const b = v.defineBoard({ panels: [] });
            export const c: SLO = { dataset: "api" };
            export const d = { dataset: "api" } satisfies Trigger;
            export const e = { dataset: "api" } as Query;
            export const f = newTrigger({ dataset: "api" }) as Trigger;
            export const notAShape = { dataset: "api" };
            export const alsoNot = query(base);
            "#,
        );
        assert_eq!(
            names(&extraction),
            vec![
                (ResourceKind::Query, "a".to_string()),
                (ResourceKind::Board, "b".to_string()),
                (ResourceKind::Slo, "c".to_string()),
                (ResourceKind::Trigger, "d".to_string()),
                (ResourceKind::Query, "e".to_string()),
                (ResourceKind::Trigger, "f".to_string()),
            ]
        );
    }

    #[test]
    fn test_wrappers_are_searched_and_named_by_path() {
        let extraction = extract(
            r#"
            export const bundle = {
                latency: query({ dataset: "api" }),
                nested: { errors: query({ dataset: "api" }) },
                items: [slo({ dataset: "api" }), "not a resource"],
            };
            export const all = [trigger({ dataset: "api" })];
            "#,
        );
        assert_eq!(
            names(&extraction),
            vec![
                (ResourceKind::Query, "bundle.latency".to_string()),
                (ResourceKind::Query, "bundle.nested.errors".to_string()),
                (ResourceKind::Slo, "bundle.items[0]".to_string()),
                (ResourceKind::Trigger, "all[0]".to_string()),
            ]
        );
    }

    #[test]
    fn test_inline_queries_are_not_top_level_records() {
        let extraction = extract(
            r#"
            export const overview = board({
                panels: [QueryPanel(query({ dataset: "api" }))],
            });
            "#,
        );
        assert_eq!(
            names(&extraction),
            vec![(ResourceKind::Board, "overview".to_string())]
        );
    }

    #[test]
    fn test_rejected_declaration_does_not_abort_the_file() {
        let extraction = extract(
            r#"
            export const broken = query({ dataset: "api", colour: "red" });
            export const fine = query({ dataset: "api" });
            "#,
        );
        assert_eq!(
            names(&extraction),
            vec![(ResourceKind::Query, "fine".to_string())]
        );
        assert_eq!(extraction.errors.len(), 1);
        assert_eq!(extraction.errors[0].name, "broken");
        assert_eq!(extraction.errors[0].line, 2);
    }

    #[test]
    fn test_provenance() {
        let extraction = extract_in(
            "svc/checkout/queries.ts",
            "svc/checkout",
            "\nexport const latency = query({ dataset: \"api\" });\n",
        );
        let declaration = extraction.records[0].declaration();
        assert_eq!(declaration.file, "svc/checkout/queries.ts");
        assert_eq!(declaration.scope, "svc/checkout");
        assert_eq!(declaration.line, 2);
        assert_eq!(declaration.col, 14);
    }

    #[test]
    fn test_imported_aliases_are_normalized_in_references() {
        let record = extract_one(
            r#"
            import { latency as lat } from "./queries";
            export const slow = trigger({ query: lat });
            "#,
        )
        .unwrap();
        assert_eq!(
            record.as_trigger().unwrap().spec.query,
            Some(crate::core::data::QueryRef::Named("latency".to_string()))
        );
    }
}
