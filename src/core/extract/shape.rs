use swc_ecma_ast::{Expr, ObjectLit, TsType};

use crate::core::{
    collect::helpers::{callee_name, type_ref_name, unwrap_ts_expr},
    data::{ResourceKind, ops::lookup_key},
};

/// A recognized resource shape: its kind and the object literal carrying its fields.
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    pub kind: ResourceKind,
    pub body: &'a ObjectLit,
}

/// Kind named by a shape constructor or a type name.
///
/// `query`, `defineQuery`, `newQuery` and the type `Query` all name a query;
/// `SLO` and `Slo` both name an SLO.
pub fn kind_from_name(name: &str) -> Option<ResourceKind> {
    let key = lookup_key(name);
    let base = key
        .strip_prefix("define")
        .or_else(|| key.strip_prefix("new"))
        .unwrap_or(key.as_str());
    match base {
        "query" => Some(ResourceKind::Query),
        "board" => Some(ResourceKind::Board),
        "slo" => Some(ResourceKind::Slo),
        "trigger" => Some(ResourceKind::Trigger),
        _ => None,
    }
}

fn annotated_kind(ts_type: &TsType) -> Option<ResourceKind> {
    type_ref_name(ts_type).and_then(kind_from_name)
}

fn object(expr: &Expr) -> Option<&ObjectLit> {
    match unwrap_ts_expr(expr) {
        Expr::Object(obj) => Some(obj),
        _ => None,
    }
}

/// Match an initializer against the resource shapes.
///
/// `annotation` is the binding's type annotation (`const x: Query = {...}`), if any.
pub fn match_shape<'a>(expr: &'a Expr, annotation: Option<&TsType>) -> Option<Shape<'a>> {
    if let Some(kind) = annotation.and_then(annotated_kind)
        && let Some(body) = object(expr)
    {
        return Some(Shape { kind, body });
    }
    match expr {
        Expr::TsSatisfies(sat) => match (annotated_kind(&sat.type_ann), object(&sat.expr)) {
            (Some(kind), Some(body)) => Some(Shape { kind, body }),
            _ => match_shape(&sat.expr, None),
        },
        Expr::TsAs(ts_as) => match (annotated_kind(&ts_as.type_ann), object(&ts_as.expr)) {
            (Some(kind), Some(body)) => Some(Shape { kind, body }),
            _ => match_shape(&ts_as.expr, None),
        },
        Expr::TsConstAssertion(ts_const) => match_shape(&ts_const.expr, None),
        Expr::TsNonNull(non_null) => match_shape(&non_null.expr, None),
        Expr::Paren(paren) => match_shape(&paren.expr, None),
        Expr::Call(call) => {
            let kind = callee_name(&call.callee).and_then(kind_from_name)?;
            let first = call.args.first().filter(|arg| arg.spread.is_none())?;
            let body = object(&first.expr)?;
            Some(Shape { kind, body })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(kind_from_name("query"), Some(ResourceKind::Query));
        assert_eq!(kind_from_name("defineBoard"), Some(ResourceKind::Board));
        assert_eq!(kind_from_name("newTrigger"), Some(ResourceKind::Trigger));
        assert_eq!(kind_from_name("SLO"), Some(ResourceKind::Slo));
        assert_eq!(kind_from_name("Slo"), Some(ResourceKind::Slo));
        assert_eq!(kind_from_name("dashboardQuery"), None);
        assert_eq!(kind_from_name("fetch"), None);
    }
}
