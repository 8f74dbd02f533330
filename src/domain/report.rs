//! Analyzer output: the structural report plus the per-unit / per-package /
//! project dependency rollups.

use crate::domain::edge::{EdgeKind, SourceLocation};
use crate::domain::node::{QualifiedName, package_of};
use crate::domain::store::GraphSnapshot;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Coupling metrics for one node, counted on the simple (deduplicated) graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetrics {
    pub fan_in: usize,
    pub fan_out: usize,
    /// fan-out / (fan-in + fan-out); 0.0 for an isolated node.
    pub instability: f64,
}

impl NodeMetrics {
    pub fn new(fan_in: usize, fan_out: usize) -> Self {
        let total = fan_in + fan_out;
        let instability = if total == 0 {
            0.0
        } else {
            fan_out as f64 / total as f64
        };
        Self {
            fan_in,
            fan_out,
            instability,
        }
    }
}

/// A layering-rule violation: the rule that denied the edge, and the edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub rule_id: String,
    pub from: QualifiedName,
    pub to: QualifiedName,
    pub kind: EdgeKind,
    pub origin: SourceLocation,
}

/// Full analyzer output for one graph snapshot.
///
/// Deterministic: the same snapshot and rules always produce the same report,
/// regardless of the order units were ingested. Components and violations are
/// sorted, and metrics use an ordered map.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    /// True when the snapshot was taken before the pipeline went quiescent
    /// (best-effort-so-far analysis) or after a cancelled run.
    pub partial: bool,
    pub node_count: usize,
    pub edge_count: usize,
    /// Non-trivial strongly connected components; singletons appear only when
    /// self-referential and self-edge cycle counting is enabled.
    pub components: Vec<Vec<QualifiedName>>,
    pub violations: Vec<Violation>,
    pub metrics: BTreeMap<QualifiedName, NodeMetrics>,
    pub rollup: ProjectDepsReport,
}

/// One dependency of a unit, as listed in the rollup reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyEntry {
    pub target: QualifiedName,
    pub line: Option<u32>,
    pub preview: Option<String>,
}

/// Dependencies of a single unit, grouped by edge kind.
#[derive(Debug, Clone, Serialize)]
pub struct UnitDepsReport {
    pub unit: QualifiedName,
    pub dependency_count: usize,
    pub dependencies: BTreeMap<EdgeKind, Vec<DependencyEntry>>,
}

/// Dependencies of all units in one package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDepsReport {
    pub package: String,
    pub unit_count: usize,
    pub dependency_count: usize,
    pub units: Vec<UnitDepsReport>,
}

/// Project-wide dependency rollup.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDepsReport {
    pub project: String,
    pub package_count: usize,
    pub unit_count: usize,
    pub dependency_count: usize,
    pub packages: Vec<PackageDepsReport>,
}

impl ProjectDepsReport {
    /// Build the rollup from a snapshot: every declared node becomes a unit
    /// entry (placeholder nodes are targets only), grouped into packages by
    /// qualified-name prefix.
    pub fn from_snapshot(snapshot: &GraphSnapshot, project: &str) -> Self {
        let graph = snapshot.graph();

        let mut units: BTreeMap<&str, UnitDepsReport> = BTreeMap::new();
        for idx in graph.node_indices() {
            let node = snapshot.node(idx);
            if node.declared {
                units.insert(
                    node.name.as_str(),
                    UnitDepsReport {
                        unit: node.name.clone(),
                        dependency_count: 0,
                        dependencies: BTreeMap::new(),
                    },
                );
            }
        }

        for edge in graph.edge_references() {
            let from = snapshot.node(edge.source());
            if !from.declared {
                continue;
            }
            let data = edge.weight();
            let report = units
                .get_mut(from.name.as_str())
                .expect("declared node has a unit entry");
            report.dependency_count += 1;
            report
                .dependencies
                .entry(data.kind)
                .or_default()
                .push(DependencyEntry {
                    target: snapshot.node(edge.target()).name.clone(),
                    line: data.origin.line,
                    preview: data.origin.preview.clone(),
                });
        }

        let mut packages: BTreeMap<String, PackageDepsReport> = BTreeMap::new();
        for (_, mut unit) in units {
            for entries in unit.dependencies.values_mut() {
                entries.sort_by(|a, b| (&a.target, a.line).cmp(&(&b.target, b.line)));
            }
            let package = match package_of(&unit.unit) {
                "" => "(default)".to_string(),
                pkg => pkg.to_string(),
            };
            let entry = packages
                .entry(package.clone())
                .or_insert_with(|| PackageDepsReport {
                    package,
                    unit_count: 0,
                    dependency_count: 0,
                    units: Vec::new(),
                });
            entry.unit_count += 1;
            entry.dependency_count += unit.dependency_count;
            entry.units.push(unit);
        }

        let packages: Vec<PackageDepsReport> = packages.into_values().collect();
        Self {
            project: project.to_string(),
            package_count: packages.len(),
            unit_count: packages.iter().map(|p| p.unit_count).sum(),
            dependency_count: packages.iter().map(|p| p.dependency_count).sum(),
            packages,
        }
    }
}

impl fmt::Display for ProjectDepsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "project {}: {} packages, {} units, {} dependencies",
            self.project, self.package_count, self.unit_count, self.dependency_count
        )?;
        for package in &self.packages {
            writeln!(
                f,
                "  package {}: {} units, {} dependencies",
                package.package, package.unit_count, package.dependency_count
            )?;
            for unit in &package.units {
                writeln!(f, "    unit {} ({} dependencies)", unit.unit, unit.dependency_count)?;
                for (kind, entries) in &unit.dependencies {
                    for entry in entries {
                        write!(f, "      {kind}: {}", entry.target)?;
                        if let Some(line) = entry.line {
                            write!(f, " (line {line})")?;
                        }
                        if let Some(preview) = &entry.preview {
                            write!(f, " `{preview}`")?;
                        }
                        writeln!(f)?;
                    }
                }
            }
        }
        Ok(())
    }
}
