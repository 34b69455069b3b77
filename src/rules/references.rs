//! Dangling reference detection.
//!
//! A board panel, SLI or trigger that names a query (or a board panel that names
//! an SLO) with no registered record of that kind. Discovery never fails on
//! these; the names are kept verbatim and reported here.

use crate::{
    core::{
        data::ResourceKind,
        registry::Snapshot,
        resolve::ReferenceGraph,
    },
    issues::{Diagnostic, Rule},
};

pub fn check_dangling_refs(snapshot: &Snapshot) -> Vec<Diagnostic> {
    let graph = ReferenceGraph::build(snapshot.records());
    graph
        .dangling(snapshot)
        .into_iter()
        .map(|dangling| {
            let declaration = &dangling.from;
            let (rule, what) = match dangling.kind {
                ResourceKind::Slo => (Rule::DanglingSloRef, "SLO"),
                _ => (Rule::DanglingQueryRef, "query"),
            };
            Diagnostic::new(
                rule,
                &declaration.file,
                declaration.line,
                format!(
                    "{} '{}' references {} '{}', which is not declared",
                    dangling.from_kind, declaration.name, what, dangling.name
                ),
            )
            .for_resource(&declaration.name)
            .with_suggestion(format!(
                "export a {} named '{}' or inline it",
                what, dangling.name
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::rules::tests::{codes, discovery_of, namespaced_discovery};

    #[test]
    fn test_dangling_query_and_slo_refs() {
        let discovery = discovery_of(
            r#"
            export const errors = query({ dataset: "api" });
            export const overview = board({
                panels: [QueryPanel(errors), QueryPanel(latency), SLOPanel(availability), SLOPanel("slo-1")],
            });
            "#,
        );
        let diagnostics = check_dangling_refs(&discovery.snapshot);
        assert_eq!(codes(&diagnostics), vec!["dangling-query-ref", "dangling-slo-ref"]);
        assert_eq!(
            diagnostics[0].message,
            "board 'overview' references query 'latency', which is not declared"
        );
        assert_eq!(diagnostics[1].resource_name.as_deref(), Some("overview"));
        assert_eq!(diagnostics[1].line, 3);
    }

    #[test]
    fn test_reference_to_record_of_another_kind_dangles() {
        let discovery = discovery_of(
            r#"
            export const overview = board({ panels: [QueryPanel(overview)] });
            export const check = trigger({ dataset: "api", query: overview, threshold: GT(1) });
            "#,
        );
        let diagnostics = check_dangling_refs(&discovery.snapshot);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code == Rule::DanglingQueryRef));
    }

    #[test]
    fn test_sli_refs_resolve_against_queries() {
        let discovery = discovery_of(
            r#"
            export const good = query({ dataset: "api" });
            export const availability = slo({ dataset: "api", sli: SLI(good, total), target: 99, timePeriod: 30 });
            "#,
        );
        let diagnostics = check_dangling_refs(&discovery.snapshot);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.ends_with("query 'total', which is not declared"));
    }

    #[test]
    fn test_namespaced_referrers_keep_their_own_location() {
        let discovery = namespaced_discovery(&[
            ("a/m.ts", "export const overview = board({ panels: [QueryPanel(ghostA)] });"),
            ("b/m.ts", "export const overview = board({ panels: [QueryPanel(ghostB)] });"),
        ]);
        let diagnostics = check_dangling_refs(&discovery.snapshot);
        let located: Vec<_> = diagnostics
            .iter()
            .map(|d| (d.file.as_str(), d.message.as_str()))
            .collect();
        assert_eq!(
            located,
            vec![
                (
                    "a/m.ts",
                    "board 'overview' references query 'ghostA', which is not declared"
                ),
                (
                    "b/m.ts",
                    "board 'overview' references query 'ghostB', which is not declared"
                ),
            ]
        );
    }
}
