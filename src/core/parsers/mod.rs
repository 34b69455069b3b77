//! Source file parsing.
//!
//! - `source`: TS/TSX/JS/JSX parser (uses swc for AST generation)

pub mod source;
