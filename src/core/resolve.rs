//! Phase 3: reference resolution.
//!
//! Records name other records (a board panel showing `checkoutLatency`, an SLI
//! counting `goodRequests`). Resolution is name-only: the referenced name is
//! recorded verbatim, whether or not a record with that name was discovered.
//! Import aliases were already normalized during extraction.

use std::collections::HashSet;

use serde::Serialize;

use crate::core::{
    data::{
        BoardRecord, Declaration, PanelContent, QueryRef, Record, Resource, ResourceKind, SloRef,
    },
    registry::Snapshot,
};

/// Names referenced by one record, in first-use order without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct References {
    pub queries: Vec<String>,
    pub slos: Vec<String>,
}

impl References {
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty() && self.slos.is_empty()
    }

    fn query(&mut self, query: &QueryRef) {
        if let Some(name) = query.name() {
            push_unique(&mut self.queries, name);
        }
    }

    fn slo(&mut self, slo: &SloRef) {
        if let SloRef::Named(name) = slo {
            push_unique(&mut self.slos, name);
        }
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

/// Every reference site of `record` that is a name rather than an inline body.
pub fn references(record: &Record) -> References {
    let mut refs = References::default();
    match record {
        Record::Query(_) => {}
        Record::Slo(slo) => {
            if let Some(sli) = &slo.spec.sli {
                refs.query(&sli.good_events);
                refs.query(&sli.total_events);
            }
        }
        Record::Trigger(trigger) => {
            if let Some(query) = &trigger.spec.query {
                refs.query(query);
            }
        }
        Record::Board(board) => return board_references(board),
    }
    refs
}

fn board_references(board: &BoardRecord) -> References {
    let mut refs = References::default();
    for panel in &board.spec.panels {
        match &panel.content {
            PanelContent::Query(query) => refs.query(query),
            PanelContent::Slo(slo) => refs.slo(slo),
            PanelContent::Text(_) => {}
        }
    }
    refs
}

/// Fill in `query_refs` / `slo_refs` of every board. Other records pass through.
pub fn resolve(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| match record {
            Record::Board(mut board) => {
                let refs = board_references(&board);
                board.query_refs = refs.queries;
                board.slo_refs = refs.slos;
                Record::Board(board)
            }
            other => other,
        })
        .collect()
}

/// A referenced name with no record of the expected kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRef {
    /// Declaration of the referring record.
    pub from: Declaration,
    pub from_kind: ResourceKind,
    pub kind: ResourceKind,
    pub name: String,
}

/// Per-record references of a whole record set. Derived; never stored on records.
///
/// Edges are keyed by declaration, so same-named records in different scopes
/// (namespacing) keep their own references and provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceGraph {
    edges: Vec<(Declaration, ResourceKind, References)>,
}

impl ReferenceGraph {
    pub fn build<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let edges = records
            .into_iter()
            .map(|record| (record.declaration().clone(), record.kind(), references(record)))
            .filter(|(_, _, refs)| !refs.is_empty())
            .collect();
        Self { edges }
    }

    /// References made by the record declared at `from`.
    pub fn references(&self, from: &Declaration) -> Option<&References> {
        self.edges
            .iter()
            .find(|(declaration, _, _)| declaration == from)
            .map(|(_, _, refs)| refs)
    }

    /// Declarations of the records that reference `name` (as a query or an SLO).
    pub fn referrers(&self, name: &str) -> Vec<&Declaration> {
        self.edges
            .iter()
            .filter(|(_, _, refs)| {
                refs.queries.iter().any(|q| q == name) || refs.slos.iter().any(|s| s == name)
            })
            .map(|(declaration, _, _)| declaration)
            .collect()
    }

    /// References that name no registered record of the expected kind.
    pub fn dangling(&self, snapshot: &Snapshot) -> Vec<DanglingRef> {
        let queries = names_of(snapshot, ResourceKind::Query);
        let slos = names_of(snapshot, ResourceKind::Slo);

        let mut dangling = Vec::new();
        for (from, from_kind, refs) in &self.edges {
            for (kind, names, known) in [
                (ResourceKind::Query, &refs.queries, &queries),
                (ResourceKind::Slo, &refs.slos, &slos),
            ] {
                for name in names.iter().filter(|n| !known.contains(n.as_str())) {
                    dangling.push(DanglingRef {
                        from: from.clone(),
                        from_kind: *from_kind,
                        kind,
                        name: name.clone(),
                    });
                }
            }
        }
        dangling
    }
}

fn names_of(snapshot: &Snapshot, kind: ResourceKind) -> HashSet<&str> {
    snapshot
        .records()
        .iter()
        .filter(|r| r.kind() == kind)
        .map(|r| r.name())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::{
        data::{BoardSpec, Panel, QueryRecord, QuerySpec},
        registry::{Registry, RegistryOptions},
    };

    fn query_record(name: &str) -> Record {
        Record::Query(QueryRecord {
            declaration: Declaration::new(name, ".", "queries.ts", 1, 14),
            spec: QuerySpec::default(),
        })
    }

    fn board_record(panels: Vec<Panel>) -> Record {
        Record::Board(BoardRecord::new(
            Declaration::new("overview", ".", "boards.ts", 1, 14),
            BoardSpec {
                panels,
                ..Default::default()
            },
        ))
    }

    fn named(name: &str) -> Panel {
        Panel::new(PanelContent::Query(QueryRef::Named(name.to_string())))
    }

    #[test]
    fn test_board_refs_are_ordered_and_unique() {
        let records = resolve(vec![board_record(vec![
            named("errors"),
            named("latency"),
            Panel::new(PanelContent::Query(QueryRef::Inline(Box::default()))),
            named("errors"),
            Panel::new(PanelContent::Slo(SloRef::Named("availability".to_string()))),
            Panel::new(PanelContent::Slo(SloRef::External("slo-123".to_string()))),
            Panel::new(PanelContent::Text("notes".to_string())),
        ])]);
        let board = records[0].as_board().unwrap();
        assert_eq!(board.query_refs, vec!["errors", "latency"]);
        assert_eq!(board.slo_refs, vec!["availability"]);
    }

    #[test]
    fn test_unresolved_names_are_still_recorded() {
        let records = resolve(vec![board_record(vec![named("missing")])]);
        assert_eq!(records[0].as_board().unwrap().query_refs, vec!["missing"]);
    }

    #[test]
    fn test_dangling_references() {
        let records = resolve(vec![
            query_record("latency"),
            board_record(vec![named("latency"), named("missing")]),
        ]);
        let snapshot = Registry::build_from(records, RegistryOptions::default()).unwrap();
        let graph = ReferenceGraph::build(snapshot.records());

        let board = snapshot.records()[1].declaration();
        assert_eq!(graph.referrers("latency"), vec![board]);
        assert_eq!(
            graph.references(board).map(|refs| refs.queries.clone()),
            Some(vec!["latency".to_string(), "missing".to_string()])
        );
        assert_eq!(
            graph.dangling(&snapshot),
            vec![DanglingRef {
                from: board.clone(),
                from_kind: ResourceKind::Board,
                kind: ResourceKind::Query,
                name: "missing".to_string(),
            }]
        );
    }
}
