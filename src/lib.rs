//! Vigil - monitoring-as-code discovery and linting
//!
//! Vigil is a CLI tool and library that finds monitoring resources (queries, SLOs,
//! triggers and boards) declared in TypeScript/JavaScript sources, lints them, and
//! exports them in the wire format a monitoring backend accepts.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (discover, export, lint)
//! - `config`: Configuration file loading and parsing
//! - `core`: Discovery engine (scan, extract, resolve, register)
//! - `issues`: Diagnostic type definitions
//! - `rules`: Lint rules over a discovered snapshot
//! - `wire`: Conversion between records and the backend wire format

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod rules;
pub mod wire;

pub use core::discover_all;
pub use rules::lint_path;
