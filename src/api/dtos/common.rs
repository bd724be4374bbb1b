use serde::{Deserialize, Serialize};

use crate::error::ValidationIssue;

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    #[serde(default)]
    pub details: Vec<ValidationIssue>,
}
