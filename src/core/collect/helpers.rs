//! Helper functions for AST node extraction.
//!
//! Pure functions with no state dependencies, shared by the symbol collector and
//! the declaration extractor.

use swc_ecma_ast::{
    Callee, Expr, ExprOrSpread, Lit, MemberProp, ModuleExportName, PropName, TsEntityName, TsType,
};

/// Unwrap TypeScript-specific expression wrappers to get the inner expression.
pub fn unwrap_ts_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::TsAs(ts_as) => unwrap_ts_expr(&ts_as.expr),
        Expr::TsConstAssertion(ts_const) => unwrap_ts_expr(&ts_const.expr),
        Expr::TsSatisfies(ts_sat) => unwrap_ts_expr(&ts_sat.expr),
        Expr::TsNonNull(non_null) => unwrap_ts_expr(&non_null.expr),
        Expr::Paren(paren) => unwrap_ts_expr(&paren.expr),
        _ => expr,
    }
}

/// Extract property name from a PropName node.
pub fn extract_prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string_lossy().to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

/// Name of an export/import specifier.
pub fn module_export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string_lossy().to_string(),
    }
}

/// Last segment of a type reference name (`Query`, `v.Query` -> `Query`).
pub fn type_ref_name(ts_type: &TsType) -> Option<&str> {
    match ts_type {
        TsType::TsTypeRef(type_ref) => match &type_ref.type_name {
            TsEntityName::Ident(ident) => Some(ident.sym.as_str()),
            TsEntityName::TsQualifiedName(qualified) => Some(qualified.right.sym.as_str()),
        },
        _ => None,
    }
}

/// Callee name of a call: `P99(...)` -> `P99`, `v.query(...)` -> `query`.
pub fn callee_name(callee: &Callee) -> Option<&str> {
    let Callee::Expr(expr) = callee else {
        return None;
    };
    match unwrap_ts_expr(expr) {
        Expr::Ident(ident) => Some(ident.sym.as_str()),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(ident) => Some(ident.sym.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// Static string of a literal or substitution-free template.
pub fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string_lossy().to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .and_then(|q| q.cooked.as_ref())
            .and_then(|s| s.as_str().map(|s| s.to_string())),
        _ => None,
    }
}

/// Whether any argument is a spread (`f(...xs)`).
pub fn has_spread(args: &[ExprOrSpread]) -> bool {
    args.iter().any(|arg| arg.spread.is_some())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use swc_common::SourceMap;
    use swc_ecma_ast::{Decl, ModuleDecl, ModuleItem, Pat};

    use super::*;
    use crate::core::parsers::source::parse_source;

    fn first_init(code: &str) -> (Expr, Option<TsType>) {
        let parsed =
            parse_source(code.to_string(), "t.ts", Arc::new(SourceMap::default())).unwrap();
        let ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) = &parsed.module.body[0] else {
            panic!("expected export");
        };
        let Decl::Var(var) = &export.decl else {
            panic!("expected var");
        };
        let decl = &var.decls[0];
        let ann = match &decl.name {
            Pat::Ident(binding) => binding.type_ann.as_ref().map(|a| (*a.type_ann).clone()),
            _ => None,
        };
        (*decl.init.clone().unwrap(), ann)
    }

    #[test]
    fn test_unwrap_ts_expr() {
        let (expr, _) = first_init("export const x = ({ a: 1 } satisfies Query) as const;");
        assert!(matches!(unwrap_ts_expr(&expr), Expr::Object(_)));
    }

    #[test]
    fn test_type_ref_name() {
        let (_, ann) = first_init("export const x: v.Query = {};");
        assert_eq!(type_ref_name(&ann.unwrap()), Some("Query"));
    }

    #[test]
    fn test_callee_name() {
        let (expr, _) = first_init("export const x = monitoring.board({});");
        let Expr::Call(call) = expr else {
            panic!("expected call");
        };
        assert_eq!(callee_name(&call.callee), Some("board"));
    }

    #[test]
    fn test_string_literal() {
        let (expr, _) = first_init("export const x = `api`;");
        assert_eq!(string_literal(&expr), Some("api".to_string()));
        let (expr, _) = first_init("export const x = `api-${env}`;");
        assert_eq!(string_literal(&expr), None);
    }
}
