use serde::{Deserialize, Serialize};

/// Node identity: the fully qualified name of a code entity.
pub type QualifiedName = String;

/// Kind of code entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Type,
    Package,
    Module,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Type
    }
}

/// A node in the dependency graph.
///
/// Identity is the qualified name: the graph store holds exactly one node per
/// name, created on first reference from any edge and never removed within a
/// run. A node created from an edge target starts as an undeclared
/// placeholder; ingesting the unit that defines it upgrades the kind and sets
/// `declared`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeData {
    pub name: QualifiedName,
    pub kind: NodeKind,
    pub declared: bool,
}

impl NodeData {
    pub fn placeholder(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Type,
            declared: false,
        }
    }
}

/// Package portion of a qualified name: everything before the final dot, or
/// the empty string for an unqualified name.
pub fn package_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_of_qualified_name() {
        assert_eq!(package_of("ui.widgets.Button"), "ui.widgets");
        assert_eq!(package_of("ui.Screen"), "ui");
        assert_eq!(package_of("Standalone"), "");
    }

    #[test]
    fn test_placeholder_is_undeclared_type() {
        let node = NodeData::placeholder("data.Repo");
        assert_eq!(node.kind, NodeKind::Type);
        assert!(!node.declared);
    }
}
