use crate::domain::node::QualifiedName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntactic relation category a dependency edge represents.
///
/// Multiple edges of different kinds may exist between the same pair of nodes;
/// rule checks and the per-unit reports depend on the kind, while SCC
/// detection and fan metrics collapse parallel edges to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Uses,
    Extends,
    Implements,
    Imports,
    FieldType,
    ParamType,
    ReturnType,
    Annotation,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeKind::Uses => "uses",
            EdgeKind::Extends => "extends",
            EdgeKind::Implements => "implements",
            EdgeKind::Imports => "imports",
            EdgeKind::FieldType => "fieldType",
            EdgeKind::ParamType => "paramType",
            EdgeKind::ReturnType => "returnType",
            EdgeKind::Annotation => "annotation",
        };
        f.write_str(name)
    }
}

/// Where an edge came from: the producing source unit plus position and a
/// short code preview. Diagnostic only, not part of edge identity; the first
/// accepted origin for a given `(from, to, kind)` wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub unit: QualifiedName,
    pub line: Option<u32>,
    pub preview: Option<String>,
}

/// A directed dependency relation between two code entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: QualifiedName,
    pub to: QualifiedName,
    pub kind: EdgeKind,
    pub origin: SourceLocation,
}

/// Edge payload as stored in the graph: the kind plus the origin that first
/// produced the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeData {
    pub kind: EdgeKind,
    pub origin: SourceLocation,
}
