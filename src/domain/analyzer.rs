//! Cycle and metrics analysis over one immutable graph snapshot.
//!
//! Strongly connected components come from Tarjan's algorithm (O(V+E)) on the
//! multigraph; parallel edges between the same pair cannot change component
//! membership. Fan metrics and SCCs use the simple (deduplicated) view;
//! layering rules are checked per kind-edge so each offending relation is
//! reported with its origin.

use crate::domain::failure::ConfigError;
use crate::domain::report::{ComponentReport, NodeMetrics, ProjectDepsReport, Violation};
use crate::domain::rules::{CompiledRules, LayeringRule};
use crate::domain::store::GraphSnapshot;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Analyzer tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    /// When set, a self-edge makes its node a degenerate 1-node component.
    pub count_self_edge_cycles: bool,
}

/// Cycle & metrics analyzer. Holds the compiled rule set; stateless with
/// respect to the graph, so one analyzer can serve many snapshots.
pub struct Analyzer {
    rules: CompiledRules,
    options: AnalyzerOptions,
}

impl Analyzer {
    /// Compile the rule set up front; an unresolvable pattern is a
    /// configuration error and refuses analysis entirely.
    pub fn new(rules: &[LayeringRule], options: AnalyzerOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            rules: CompiledRules::compile(rules)?,
            options,
        })
    }

    /// Produce one report for one snapshot. Deterministic: the same snapshot
    /// and rules yield the same report, independent of ingestion order.
    pub fn analyze(&self, snapshot: &GraphSnapshot, project: &str, partial: bool) -> ComponentReport {
        ComponentReport {
            partial,
            node_count: snapshot.node_count(),
            edge_count: snapshot.edge_count(),
            components: self.components(snapshot),
            violations: self.violations(snapshot),
            metrics: metrics(snapshot),
            rollup: ProjectDepsReport::from_snapshot(snapshot, project),
        }
    }

    fn components(&self, snapshot: &GraphSnapshot) -> Vec<Vec<String>> {
        let graph = snapshot.graph();
        let mut components: Vec<Vec<String>> = tarjan_scc(graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || (self.options.count_self_edge_cycles
                        && component
                            .first()
                            .is_some_and(|&n| graph.find_edge(n, n).is_some()))
            })
            .map(|component| {
                let mut names: Vec<String> = component
                    .into_iter()
                    .map(|idx| snapshot.node(idx).name.clone())
                    .collect();
                names.sort_unstable();
                names
            })
            .collect();
        components.sort_unstable();
        components
    }

    fn violations(&self, snapshot: &GraphSnapshot) -> Vec<Violation> {
        if self.rules.is_empty() {
            return Vec::new();
        }
        let mut violations: Vec<Violation> = snapshot
            .graph()
            .edge_references()
            .filter_map(|edge| {
                let from = &snapshot.node(edge.source()).name;
                let to = &snapshot.node(edge.target()).name;
                let hit = self.rules.first_match(from, to)?;
                if hit.allowed {
                    return None;
                }
                let data = edge.weight();
                Some(Violation {
                    rule_id: hit.rule_id.to_string(),
                    from: from.clone(),
                    to: to.clone(),
                    kind: data.kind,
                    origin: data.origin.clone(),
                })
            })
            .collect();
        violations.sort_by(|a, b| {
            (&a.from, &a.to, a.kind, a.origin.line).cmp(&(&b.from, &b.to, b.kind, b.origin.line))
        });
        violations
    }
}

/// Fan-in/fan-out on the simple graph: parallel edge kinds between the same
/// pair count once, since instability measures structural coupling rather
/// than how many relation kinds link two entities.
fn metrics(snapshot: &GraphSnapshot) -> BTreeMap<String, NodeMetrics> {
    let mut fan_in: HashMap<NodeIndex, usize> = HashMap::new();
    let mut fan_out: HashMap<NodeIndex, usize> = HashMap::new();
    for (from, to) in snapshot.simple_edges() {
        *fan_out.entry(from).or_default() += 1;
        *fan_in.entry(to).or_default() += 1;
    }

    snapshot
        .graph()
        .node_indices()
        .map(|idx| {
            let name = snapshot.node(idx).name.clone();
            let metrics = NodeMetrics::new(
                fan_in.get(&idx).copied().unwrap_or(0),
                fan_out.get(&idx).copied().unwrap_or(0),
            );
            (name, metrics)
        })
        .collect()
}
