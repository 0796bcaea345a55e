//! Work request record.

use serde::{Deserialize, Serialize};

/// One build request from the orchestrator.
///
/// Immutable once decoded; a request is consumed by exactly one build
/// cycle and never revisited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRequest {
    /// Ordered flag and source-path arguments, exactly as the orchestrator
    /// would pass them on a one-shot command line.
    #[serde(default)]
    pub arguments: Vec<String>,

    /// Opaque correlation id, echoed back unchanged in the response so the
    /// caller can match responses to requests.
    #[serde(default)]
    pub request_id: i32,
}
