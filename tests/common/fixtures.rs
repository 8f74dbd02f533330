//! Shared builders for integration tests.
#![allow(dead_code)]

use depscope::domain::edge::EdgeKind;
use depscope::domain::store::GraphSnapshot;
use depscope::domain::unit::{ResolvedReference, ResolvedUnit};
use petgraph::visit::EdgeRef;

/// A resolved unit with one reference per `(target, kind)` pair.
pub fn unit(name: &str, targets: &[(&str, EdgeKind)]) -> ResolvedUnit {
    let mut unit = ResolvedUnit::new(name);
    for (i, (target, kind)) in targets.iter().enumerate() {
        unit.references.push(ResolvedReference {
            target: Some((*target).to_string()),
            kind: *kind,
            line: Some(i as u32 + 1),
            preview: None,
        });
    }
    unit
}

pub fn failed_unit(name: &str, reason: &str) -> ResolvedUnit {
    ResolvedUnit::failed(name, reason)
}

/// All edges of a snapshot as sorted `(from, to, kind)` triples, for
/// order-independent comparison.
pub fn edge_triples(snapshot: &GraphSnapshot) -> Vec<(String, String, EdgeKind)> {
    let graph = snapshot.graph();
    let mut triples: Vec<(String, String, EdgeKind)> = graph
        .edge_references()
        .map(|edge| {
            (
                snapshot.node(edge.source()).name.clone(),
                snapshot.node(edge.target()).name.clone(),
                edge.weight().kind,
            )
        })
        .collect();
    triples.sort();
    triples
}
