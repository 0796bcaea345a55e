//! Work response record.

use serde::{Deserialize, Serialize};

/// The worker's answer to one [`WorkRequest`](crate::WorkRequest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkResponse {
    /// Accumulated diagnostic text for the request, already bounded by the
    /// builder's output budget.
    pub output: String,

    /// 0 on success, 1 on any failure (compile failure or request error).
    pub exit_code: i32,

    /// Correlation id copied from the request.
    pub request_id: i32,
}

impl WorkResponse {
    /// Build the response for a finished request.
    pub fn for_request(request_id: i32, ok: bool, output: String) -> Self {
        Self {
            output,
            exit_code: if ok { 0 } else { 1 },
            request_id,
        }
    }
}
