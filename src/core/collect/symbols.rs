//! Phase 1 of per-file extraction: module-level symbols.
//!
//! The `SymbolCollector` makes one pass over a module and records what the
//! extractor needs to interpret field values and references:
//!
//! - import bindings, so references can be normalized to exported names
//! - module-level constants with literal values (`const DATASET = "api"`)
//! - local export specifiers (`export { latency as apiLatency }`)

use std::collections::HashMap;

use swc_ecma_ast::{
    ArrowExpr, BlockStmt, Class, ExportSpecifier, Expr, Function, ImportDecl, ImportSpecifier,
    Lit, NamedExport, Pat, UnaryOp, VarDecl, VarDeclKind,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::helpers::{module_export_name, string_literal, unwrap_ts_expr};

/// Literal value of a module-level constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Str(String),
    Num(f64),
    Bool(bool),
}

/// How a local name was imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import { latency as lat }`: local `lat`, exported name `latency`.
    Named { imported: String, module_path: String },
    /// `import * as q`: members of `q` are exported names.
    Namespace { module_path: String },
    /// `import lat from "./q"`: the exported name is unknown, the local name is kept.
    Default { module_path: String },
}

/// A local binding exported under a (possibly different) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportAlias {
    pub local: String,
    pub exported: String,
}

/// Module-level symbols of one file.
#[derive(Debug, Default, Clone)]
pub struct FileSymbols {
    pub imports: HashMap<String, ImportBinding>,
    pub constants: HashMap<String, ConstValue>,
    /// In source order.
    pub exports: Vec<ExportAlias>,
}

impl FileSymbols {
    /// Exported names of a local (non-`export`) declaration.
    pub fn exported_names<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.exports
            .iter()
            .filter(move |alias| alias.local == local)
            .map(|alias| alias.exported.as_str())
    }
}

pub struct SymbolCollector {
    /// Tracks nesting depth: 0 = module level, >0 = inside function/arrow/class/block.
    scope_depth: usize,
    pub symbols: FileSymbols,
}

impl SymbolCollector {
    pub fn new() -> Self {
        Self {
            scope_depth: 0,
            symbols: FileSymbols::default(),
        }
    }

    fn const_value(&self, expr: &Expr) -> Option<ConstValue> {
        let expr = unwrap_ts_expr(expr);
        if let Some(s) = string_literal(expr) {
            return Some(ConstValue::Str(s));
        }
        match expr {
            Expr::Lit(Lit::Num(n)) => Some(ConstValue::Num(n.value)),
            Expr::Lit(Lit::Bool(b)) => Some(ConstValue::Bool(b.value)),
            Expr::Unary(unary) if unary.op == UnaryOp::Minus => {
                match self.const_value(&unary.arg)? {
                    ConstValue::Num(n) => Some(ConstValue::Num(-n)),
                    _ => None,
                }
            }
            // Alias of an earlier constant.
            Expr::Ident(ident) => self.symbols.constants.get(ident.sym.as_str()).cloned(),
            _ => None,
        }
    }

    fn nested<T: VisitWith<Self>>(&mut self, node: &T) {
        self.scope_depth += 1;
        node.visit_children_with(self);
        self.scope_depth -= 1;
    }
}

impl Default for SymbolCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Visit for SymbolCollector {
    fn visit_import_decl(&mut self, node: &ImportDecl) {
        let module_path = node.src.value.to_string_lossy().to_string();
        for specifier in &node.specifiers {
            let (local, binding) = match specifier {
                ImportSpecifier::Named(named) => {
                    let local = named.local.sym.to_string();
                    let imported = named
                        .imported
                        .as_ref()
                        .map(module_export_name)
                        .unwrap_or_else(|| local.clone());
                    (
                        local,
                        ImportBinding::Named {
                            imported,
                            module_path: module_path.clone(),
                        },
                    )
                }
                ImportSpecifier::Default(default) => (
                    default.local.sym.to_string(),
                    ImportBinding::Default {
                        module_path: module_path.clone(),
                    },
                ),
                ImportSpecifier::Namespace(ns) => (
                    ns.local.sym.to_string(),
                    ImportBinding::Namespace {
                        module_path: module_path.clone(),
                    },
                ),
            };
            self.symbols.imports.insert(local, binding);
        }
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        if self.scope_depth == 0 && node.kind == VarDeclKind::Const {
            for decl in &node.decls {
                if let Pat::Ident(binding) = &decl.name
                    && let Some(init) = &decl.init
                    && let Some(value) = self.const_value(init)
                {
                    self.symbols
                        .constants
                        .insert(binding.id.sym.to_string(), value);
                }
            }
        }
        node.visit_children_with(self);
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        // Re-exports from another module declare nothing here.
        if node.src.is_some() {
            return;
        }
        for specifier in &node.specifiers {
            if let ExportSpecifier::Named(named) = specifier {
                let local = module_export_name(&named.orig);
                let exported = named
                    .exported
                    .as_ref()
                    .map(module_export_name)
                    .unwrap_or_else(|| local.clone());
                self.symbols.exports.push(ExportAlias { local, exported });
            }
        }
    }

    fn visit_function(&mut self, node: &Function) {
        self.nested(node);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.nested(node);
    }

    fn visit_class(&mut self, node: &Class) {
        self.nested(node);
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        self.nested(node);
    }
}
