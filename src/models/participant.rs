// src/models/participant.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A test taker, identified by their email address.
/// Created on the first start request and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: Uuid,

    /// Normalized (trimmed, lowercased) email. Unique across participants.
    pub email: String,

    pub full_name: String,

    pub institution: Option<String>,

    pub registration_date: chrono::DateTime<chrono::Utc>,

    pub last_test_date: Option<chrono::DateTime<chrono::Utc>>,

    /// Lifetime count of completed tests.
    pub tests_taken: u32,
}

/// DTO for starting a test.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartTestRequest {
    #[validate(email(message = "A valid email is required."))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "Full name is required."))]
    pub full_name: String,

    #[validate(length(max = 200))]
    pub institution: Option<String>,
}

/// Normalizes an email into the participant identity key.
/// Case-variant spellings of the same address map to one participant.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  A@B.Com "), "a@b.com");
        assert_eq!(normalize_email("a@b.com"), "a@b.com");
    }
}
