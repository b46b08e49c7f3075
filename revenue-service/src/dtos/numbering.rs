use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextNumberResponse {
    pub next_number: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateNumberRequest {
    #[validate(length(min = 1, max = 32))]
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateNumberResponse {
    /// Canonical form of the accepted number.
    pub number: String,
    pub minimum: String,
}
