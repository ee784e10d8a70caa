use serde::{Deserialize, Serialize};

pub mod outcome;

pub use outcome::{AuthenticatedUser, RefreshOutcome, ValidationOutcome};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Body accepted by the validate and refresh endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub cookie: String,
}
