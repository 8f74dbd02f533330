//! Dependency extraction: one resolved source unit in, one edge batch out.
//!
//! Extraction is pure and stateless per unit, so the pipeline can run it on
//! any worker in any order. Unresolvable references are dropped with a
//! diagnostic rather than turned into edges to an "unknown" node, keeping the
//! graph exact rather than speculative.

use crate::domain::edge::{Edge, EdgeKind, SourceLocation};
use crate::domain::failure::UnitFailure;
use crate::domain::node::{NodeKind, QualifiedName};
use crate::domain::unit::ResolvedUnit;
use tracing::debug;

/// Extraction settings: reference targets whose qualified name starts with an
/// excluded prefix (e.g. a standard-library namespace) are skipped entirely.
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    pub excluded_prefixes: Vec<String>,
}

impl ExtractorConfig {
    pub fn new(excluded_prefixes: Vec<String>) -> Self {
        Self { excluded_prefixes }
    }

    fn includes_target(&self, target: &str) -> bool {
        if target.is_empty() {
            return false;
        }
        !self.excluded_prefixes.iter().any(|prefix| {
            target == prefix
                || (target.starts_with(prefix.as_str())
                    && target[prefix.len()..].starts_with('.'))
        })
    }
}

/// A successfully extracted unit: the declaring node plus its outgoing edges.
/// This is the unit of merge into the graph store.
#[derive(Debug, Clone)]
pub struct EdgeBatch {
    pub unit: QualifiedName,
    pub kind: NodeKind,
    pub edges: Vec<Edge>,
    /// References the resolver could not resolve; dropped, not edges.
    pub dropped_references: usize,
}

/// Extract the dependency edges of one resolved unit.
///
/// Returns an explicit failure (no partial edges) when the unit itself failed
/// to resolve upstream, so the pipeline can surface it and continue.
pub fn extract(unit: &ResolvedUnit, config: &ExtractorConfig) -> Result<EdgeBatch, UnitFailure> {
    if let Some(reason) = &unit.failure {
        return Err(UnitFailure::Resolution(reason.clone()));
    }
    if unit.qualified_name.is_empty() {
        return Err(UnitFailure::Extraction(
            "unit has no qualified name".to_string(),
        ));
    }

    let mut edges = Vec::with_capacity(unit.references.len());
    let mut dropped = 0;

    for reference in &unit.references {
        let Some(target) = &reference.target else {
            dropped += 1;
            debug!(
                unit = %unit.qualified_name,
                kind = %reference.kind,
                line = reference.line,
                "dropping unresolved reference"
            );
            continue;
        };
        if !config.includes_target(target) {
            continue;
        }
        // Self-references are kept; whether they count as 1-node cycles is an
        // analyzer option.
        edges.push(Edge {
            from: unit.qualified_name.clone(),
            to: target.clone(),
            kind: reference.kind,
            origin: SourceLocation {
                unit: unit.qualified_name.clone(),
                line: reference.line,
                preview: reference.preview.clone(),
            },
        });
    }

    Ok(EdgeBatch {
        unit: unit.qualified_name.clone(),
        kind: unit.kind,
        edges,
        dropped_references: dropped,
    })
}
