//! Core discovery engine.
//!
//! ## Pipeline
//!
//! 1. `file_scanner`: Walk the source root in lexicographic order
//! 2. `parsers`: Parse each file with swc
//! 3. `collect`: Per-file symbols (imports, literal constants, export aliases)
//! 4. `extract`: Exported declarations → canonical records
//! 5. `resolve`: Names referenced by boards, SLOs and triggers
//! 6. `registry`: Duplicate policy and the immutable snapshot
//!
//! `context` runs the whole pass; `data` holds the record model every phase shares.

pub mod collect;
pub mod context;
pub mod data;
pub mod extract;
pub mod file_scanner;
pub mod parsers;
pub mod registry;
pub mod resolve;

pub use context::{
    Discovery, DiscoveryContext, DiscoveryError, DiscoveryOptions, Inventory, discover,
    discover_all,
};
pub use registry::{Duplicate, DuplicateDetected, NameKey, Registry, RegistryOptions, Snapshot};
pub use resolve::{DanglingRef, ReferenceGraph, References};
