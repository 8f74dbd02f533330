//! Resolver output contract: the shape of a symbol-resolved source unit as
//! handed to the ingestion pipeline.
//!
//! Parsing and symbol resolution happen upstream in an external resolver; by
//! the time a unit reaches this crate every reference either carries a fully
//! qualified target or is explicitly unresolved.

use crate::domain::edge::EdgeKind;
use crate::domain::node::NodeKind;
use serde::{Deserialize, Serialize};

/// A whole resolver run: project identity plus one entry per compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedProject {
    pub project_name: String,
    #[serde(default)]
    pub units: Vec<ResolvedUnit>,
}

/// One resolved compilation unit (typically one file's primary type).
///
/// `failure` is set when the resolver could not produce a usable unit at all;
/// such units contribute no edges and are surfaced as per-unit failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedUnit {
    pub qualified_name: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub failure: Option<String>,
    #[serde(default)]
    pub references: Vec<ResolvedReference>,
}

impl ResolvedUnit {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind: NodeKind::Type,
            failure: None,
            references: Vec::new(),
        }
    }

    pub fn failed(qualified_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind: NodeKind::Type,
            failure: Some(reason.into()),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, target: impl Into<String>, kind: EdgeKind) -> Self {
        self.references.push(ResolvedReference {
            target: Some(target.into()),
            kind,
            line: None,
            preview: None,
        });
        self
    }
}

/// One syntactic reference inside a unit.
///
/// `target` is `None` when the resolver saw the reference but could not
/// resolve it to a qualified name; the extractor drops it with a diagnostic
/// instead of inventing a phantom node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub target: Option<String>,
    pub kind: EdgeKind,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub preview: Option<String>,
}
