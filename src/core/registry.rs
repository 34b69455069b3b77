//! Phase 4: registration.
//!
//! The registry is the only mutable object of a pass. Records are registered in
//! scan order (sorted paths, then source order within a file), so "first
//! registered" is deterministic. `build` freezes it into a [`Snapshot`].
//!
//! # Collision domain
//!
//! The name key is the bare record name, or `(scope, name)` with namespacing
//! enabled. Kinds share one domain: a query and a board named `checkout` collide.

use std::{collections::HashMap, fmt};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{
    data::{Declaration, PanelContent, Record, Resource, ResourceKind},
    resolve::references,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Key records by (declaring scope, name) instead of bare name.
    pub namespacing: bool,
    /// Treat the first duplicate as fatal.
    pub strict: bool,
}

/// Identity of a record within the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NameKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub name: String,
}

impl NameKey {
    pub fn of(declaration: &Declaration, namespacing: bool) -> Self {
        Self {
            scope: namespacing.then(|| declaration.scope.clone()),
            name: declaration.name.clone(),
        }
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}::{}", scope, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Audit entry for a name collision. The kept record is the first registered one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    pub key: NameKey,
    pub kept_kind: ResourceKind,
    pub kept: Declaration,
    pub dropped_kind: ResourceKind,
    pub dropped: Declaration,
}

impl fmt::Display for Duplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' at {} duplicates {} declared at {}",
            self.dropped_kind,
            self.key,
            self.dropped.location(),
            self.kept_kind,
            self.kept.location()
        )
    }
}

/// A name collision in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate resource name: {0}")]
pub struct DuplicateDetected(pub Duplicate);

#[derive(Debug, Default)]
pub struct Registry {
    options: RegistryOptions,
    records: Vec<Record>,
    index: HashMap<NameKey, usize>,
    duplicates: Vec<Duplicate>,
}

impl Registry {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Register one record.
    ///
    /// A collision is always appended to the audit list. In lenient mode the later
    /// record is dropped and `Ok` is returned; in strict mode the error is returned.
    pub fn register(&mut self, record: Record) -> Result<(), DuplicateDetected> {
        let key = NameKey::of(record.declaration(), self.options.namespacing);
        if let Some(&existing) = self.index.get(&key) {
            let kept = &self.records[existing];
            let duplicate = Duplicate {
                key,
                kept_kind: kept.kind(),
                kept: kept.declaration().clone(),
                dropped_kind: record.kind(),
                dropped: record.declaration().clone(),
            };
            self.duplicates.push(duplicate.clone());
            if self.options.strict {
                return Err(DuplicateDetected(duplicate));
            }
            warn!("dropping {}", duplicate);
            return Ok(());
        }
        debug!(key = %key, kind = %record.kind(), "registered");
        self.index.insert(key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn duplicates(&self) -> &[Duplicate] {
        &self.duplicates
    }

    pub fn build(self) -> Snapshot {
        Snapshot {
            records: self.records,
            duplicates: self.duplicates,
        }
    }

    /// Register a whole batch. In strict mode the first duplicate aborts the build.
    pub fn build_from(
        records: impl IntoIterator<Item = Record>,
        options: RegistryOptions,
    ) -> Result<Snapshot, DuplicateDetected> {
        let mut registry = Registry::new(options);
        for record in records {
            registry.register(record)?;
        }
        Ok(registry.build())
    }
}

/// Immutable result of a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<Record>,
    duplicates: Vec<Duplicate>,
}

impl Snapshot {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Every registered record, in registration order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn duplicates(&self) -> &[Duplicate] {
        &self.duplicates
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.kind() == kind)
    }

    /// The record of `kind` that `name` refers to from a record declared in `scope`.
    ///
    /// With namespacing, several scopes may register the same name; the
    /// referrer's own scope wins, then the first one registered.
    pub fn lookup(&self, kind: ResourceKind, name: &str, scope: &str) -> Option<&Record> {
        let mut candidates = self.of_kind(kind).filter(|r| r.name() == name);
        let first = candidates.next()?;
        if first.declaration().scope == scope {
            return Some(first);
        }
        Some(
            candidates
                .find(|r| r.declaration().scope == scope)
                .unwrap_or(first),
        )
    }

    /// Records that use `dataset`.
    ///
    /// A board has no dataset of its own; it matches when one of its inline panel
    /// queries, or a registered query it references, uses the dataset.
    pub fn filter_by_dataset(&self, dataset: &str) -> Snapshot {
        self.retain(|record| match record {
            Record::Board(board) => {
                let inline = board.spec.panels.iter().any(|panel| match &panel.content {
                    PanelContent::Query(query) => query
                        .inline()
                        .is_some_and(|q| q.dataset.as_deref() == Some(dataset)),
                    _ => false,
                });
                inline
                    || references(record).queries.iter().any(|name| {
                        self.lookup(ResourceKind::Query, name, &board.declaration.scope)
                            .is_some_and(|q| q.dataset() == Some(dataset))
                    })
            }
            other => other.dataset() == Some(dataset),
        })
    }

    /// Records declared in `scope` (the file's directory relative to the root).
    pub fn filter_by_scope(&self, scope: &str) -> Snapshot {
        let scope = scope.trim_end_matches('/');
        let scope = if scope.is_empty() { "." } else { scope };
        self.retain(|record| record.declaration().scope == scope)
    }

    pub fn filter_by_kind(&self, kind: ResourceKind) -> Snapshot {
        self.retain(|record| record.kind() == kind)
    }

    fn retain(&self, keep: impl Fn(&Record) -> bool) -> Snapshot {
        Snapshot {
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
            duplicates: self.duplicates.clone(),
        }
    }
}
