use serde::Serialize;
use thiserror::Error;

/// Why a single source unit contributed no edges.
///
/// Per-unit failures are recorded in the run summary and published on the
/// event bus; they never escalate to a run-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnitFailure {
    #[error("resolution failed: {0}")]
    Resolution(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// Invalid analyzer configuration.
///
/// Fatal to the analysis step only: ingestion can still complete, and
/// analysis can be retried once the rule set is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rule `{rule_id}`: invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        rule_id: String,
        pattern: String,
        reason: String,
    },
}
