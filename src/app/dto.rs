use serde::Serialize;

/// Engine status snapshot, served by `/health` and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub project: String,
    pub node_count: usize,
    pub edge_count: usize,
    /// True once every submitted unit has been processed (success or failure).
    pub quiescent: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}
