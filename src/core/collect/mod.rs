//! Phase 1: per-file symbol collection.
//!
//! ## Module Structure
//!
//! - `helpers`: Pure functions for AST node inspection
//! - `symbols`: `SymbolCollector` (imports, literal constants, export specifiers)

pub mod helpers;
pub mod symbols;

pub use symbols::{ConstValue, ExportAlias, FileSymbols, ImportBinding, SymbolCollector};
