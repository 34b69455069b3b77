//! Static evaluation of field values.

use swc_ecma_ast::{Expr, Lit, MemberProp, UnaryOp};

use super::error::ExtractError;
use crate::core::collect::{
    ConstValue, FileSymbols, ImportBinding,
    helpers::{callee_name, has_spread, string_literal, unwrap_ts_expr},
};

/// A call to a named builder function (`P99("duration_ms")`, `Slack("#oncall")`).
pub struct Builder<'e> {
    pub name: &'e str,
    pub args: Vec<&'e Expr>,
}

impl<'e> Builder<'e> {
    /// The single argument of a one-argument builder.
    pub fn single(&self) -> Result<&'e Expr, ExtractError> {
        match self.args.as_slice() {
            [arg] => Ok(*arg),
            _ => Err(ExtractError::invalid(self.name, "called with exactly one argument")),
        }
    }
}

/// Recognize a builder call. Spread arguments cannot be evaluated and are rejected.
pub fn builder<'e>(expr: &'e Expr, owner: &'static str) -> Result<Option<Builder<'e>>, ExtractError> {
    let Expr::Call(call) = unwrap_ts_expr(expr) else {
        return Ok(None);
    };
    let Some(name) = callee_name(&call.callee) else {
        return Ok(None);
    };
    if has_spread(&call.args) {
        return Err(ExtractError::Spread { owner });
    }
    Ok(Some(Builder {
        name,
        args: call.args.iter().map(|arg| &*arg.expr).collect(),
    }))
}

/// Evaluates field values of one file against its module-level symbols.
pub struct Extractor<'a> {
    symbols: &'a FileSymbols,
}

impl<'a> Extractor<'a> {
    pub fn new(symbols: &'a FileSymbols) -> Self {
        Self { symbols }
    }

    /// Literal value, following module-level constants.
    pub fn literal(&self, expr: &Expr) -> Option<ConstValue> {
        let expr = unwrap_ts_expr(expr);
        if let Some(s) = string_literal(expr) {
            return Some(ConstValue::Str(s));
        }
        match expr {
            Expr::Lit(Lit::Num(n)) => Some(ConstValue::Num(n.value)),
            Expr::Lit(Lit::Bool(b)) => Some(ConstValue::Bool(b.value)),
            Expr::Unary(unary) if unary.op == UnaryOp::Minus => match self.literal(&unary.arg)? {
                ConstValue::Num(n) => Some(ConstValue::Num(-n)),
                _ => None,
            },
            Expr::Ident(ident) => self.symbols.constants.get(ident.sym.as_str()).cloned(),
            _ => None,
        }
    }

    pub fn string(&self, field: &str, expr: &Expr) -> Result<String, ExtractError> {
        match self.literal(expr) {
            Some(ConstValue::Str(s)) => Ok(s),
            _ => Err(ExtractError::invalid(field, "a static string")),
        }
    }

    pub fn number(&self, field: &str, expr: &Expr) -> Result<f64, ExtractError> {
        match self.literal(expr) {
            Some(ConstValue::Num(n)) if n.is_finite() => Ok(n),
            _ => Err(ExtractError::invalid(field, "a static number")),
        }
    }

    pub fn integer(&self, field: &str, expr: &Expr) -> Result<i64, ExtractError> {
        let n = self.number(field, expr)?;
        if n.fract() != 0.0 || n.abs() > i64::MAX as f64 {
            return Err(ExtractError::invalid(field, "a whole number"));
        }
        Ok(n as i64)
    }

    /// Non-negative whole number.
    pub fn count(&self, field: &str, expr: &Expr) -> Result<u64, ExtractError> {
        u64::try_from(self.integer(field, expr)?)
            .map_err(|_| ExtractError::invalid(field, "a non-negative whole number"))
    }

    pub fn small_count(&self, field: &str, expr: &Expr) -> Result<u32, ExtractError> {
        u32::try_from(self.count(field, expr)?)
            .map_err(|_| ExtractError::invalid(field, "a number below 2^32"))
    }

    pub fn boolean(&self, field: &str, expr: &Expr) -> Result<bool, ExtractError> {
        match self.literal(expr) {
            Some(ConstValue::Bool(b)) => Ok(b),
            _ => Err(ExtractError::invalid(field, "a static boolean")),
        }
    }

    /// Elements of an array literal. Holes are skipped; spreads are rejected.
    pub fn elements<'e>(
        &self,
        field: &'static str,
        expr: &'e Expr,
    ) -> Result<Vec<&'e Expr>, ExtractError> {
        let Expr::Array(array) = unwrap_ts_expr(expr) else {
            return Err(ExtractError::invalid(field, "an array literal"));
        };
        let mut elements = Vec::with_capacity(array.elems.len());
        for elem in array.elems.iter().flatten() {
            if elem.spread.is_some() {
                return Err(ExtractError::Spread { owner: field });
            }
            elements.push(&*elem.expr);
        }
        Ok(elements)
    }

    /// An array of strings; a single string is accepted as a one-element list.
    pub fn string_list(&self, field: &'static str, expr: &Expr) -> Result<Vec<String>, ExtractError> {
        if let Some(ConstValue::Str(s)) = self.literal(expr) {
            return Ok(vec![s]);
        }
        self.elements(field, expr)?
            .into_iter()
            .map(|elem| self.string(field, elem))
            .collect()
    }

    /// Name a reference expression points at, after import-alias normalization.
    ///
    /// - `latency` -> `latency`, or the exported name if imported under an alias
    /// - `q.latency` with `import * as q` -> `latency`
    /// - `bundle.latency`, `all[0]` -> the nested declaration path
    pub fn reference_name(&self, expr: &Expr) -> Option<String> {
        match unwrap_ts_expr(expr) {
            Expr::Ident(ident) => {
                let local = ident.sym.as_str();
                match self.symbols.imports.get(local) {
                    Some(ImportBinding::Named { imported, .. }) => Some(imported.clone()),
                    _ => Some(local.to_string()),
                }
            }
            Expr::Member(member) => {
                let segment = match &member.prop {
                    MemberProp::Ident(ident) => format!(".{}", ident.sym),
                    MemberProp::Computed(computed) => match self.literal(&computed.expr)? {
                        ConstValue::Str(s) => format!(".{}", s),
                        ConstValue::Num(n) if n >= 0.0 && n.fract() == 0.0 => {
                            format!("[{}]", n as u64)
                        }
                        _ => return None,
                    },
                    _ => return None,
                };
                if let Expr::Ident(obj) = unwrap_ts_expr(&member.obj)
                    && matches!(
                        self.symbols.imports.get(obj.sym.as_str()),
                        Some(ImportBinding::Namespace { .. })
                    )
                {
                    return Some(segment.trim_start_matches('.').to_string());
                }
                let base = self.reference_name(&member.obj)?;
                Some(format!("{}{}", base, segment))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use swc_common::SourceMap;
    use swc_ecma_ast::{Decl, ModuleDecl, ModuleItem};
    use swc_ecma_visit::VisitWith;

    use super::*;
    use crate::core::{collect::SymbolCollector, parsers::source::parse_source};

    /// Symbols of `code` plus the initializer of its last exported const.
    fn last_export(code: &str) -> (FileSymbols, Expr) {
        let parsed =
            parse_source(code.to_string(), "t.ts", Arc::new(SourceMap::default())).unwrap();
        let mut collector = SymbolCollector::new();
        parsed.module.visit_with(&mut collector);
        let init = parsed
            .module
            .body
            .iter()
            .rev()
            .find_map(|item| match item {
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
                    Decl::Var(var) => var.decls[0].init.clone(),
                    _ => None,
                },
                _ => None,
            })
            .unwrap();
        (collector.symbols, *init)
    }

    #[test]
    fn test_literal_follows_constants() {
        let (symbols, expr) = last_export("const DATASET = \"api\";\nexport const x = DATASET;");
        let extractor = Extractor::new(&symbols);
        assert_eq!(extractor.string("dataset", &expr).unwrap(), "api");
    }

    #[test]
    fn test_non_static_value_is_rejected() {
        let (symbols, expr) = last_export("export const x = process.env.DATASET;");
        let extractor = Extractor::new(&symbols);
        assert_eq!(
            extractor.string("dataset", &expr),
            Err(ExtractError::invalid("dataset", "a static string"))
        );
    }

    #[test]
    fn test_count_rejects_fractions_and_negatives() {
        let (symbols, expr) = last_export("export const x = 2.5;");
        let extractor = Extractor::new(&symbols);
        assert!(extractor.count("limit", &expr).is_err());
        let (symbols, expr) = last_export("export const x = -1;");
        let extractor = Extractor::new(&symbols);
        assert!(extractor.count("limit", &expr).is_err());
    }

    #[test]
    fn test_reference_names() {
        let code = r#"
            import { latency as lat } from "./queries";
            import * as q from "./more";
            export const a = lat;
        "#;
        let (symbols, expr) = last_export(code);
        let extractor = Extractor::new(&symbols);
        assert_eq!(extractor.reference_name(&expr), Some("latency".to_string()));

        let (symbols, expr) = last_export(&format!("{}\nexport const b = q.errors;", code));
        let extractor = Extractor::new(&symbols);
        assert_eq!(extractor.reference_name(&expr), Some("errors".to_string()));

        let (symbols, expr) = last_export("export const c = bundle.items[0];");
        let extractor = Extractor::new(&symbols);
        assert_eq!(
            extractor.reference_name(&expr),
            Some("bundle.items[0]".to_string())
        );
    }

    #[test]
    fn test_builder_call() {
        let (_, expr) = last_export("export const x = ops.P99(\"duration_ms\");");
        let call = builder(&expr, "calculation").unwrap().unwrap();
        assert_eq!(call.name, "P99");
        assert_eq!(call.args.len(), 1);

        let (_, expr) = last_export("export const x = Count(...cols);");
        assert_eq!(
            builder(&expr, "calculation").err(),
            Some(ExtractError::Spread {
                owner: "calculation"
            })
        );
    }
}
