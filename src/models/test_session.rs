// src/models/test_session.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::participant::Participant;
use crate::models::question::{Category, OptionLabel, PublicQuestion};

/// Lifecycle state of a test session. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// Per-category tally. `total` counts every graded answer in the category,
/// `correct` only the right ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub correct: u32,
    pub total: u32,
}

/// One attempt by one participant.
///
/// Invariant: `end_time`, `duration_seconds`, `score` and `category_scores`
/// are present if and only if `status` is `Completed`. The store enforces
/// the single IN_PROGRESS -> COMPLETED transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSession {
    pub id: Uuid,

    pub participant_id: Uuid,

    pub start_time: chrono::DateTime<chrono::Utc>,

    pub end_time: Option<chrono::DateTime<chrono::Utc>>,

    pub duration_seconds: Option<u64>,

    pub status: SessionStatus,

    /// The sampled question ids, in the order they were served.
    pub question_ids: Vec<String>,

    /// Overall percentage, rounded to 2 decimals.
    pub score: Option<f64>,

    pub category_scores: Option<BTreeMap<Category, CategoryScore>>,
}

/// One answer as submitted by the participant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,

    /// Absent when the participant left the question blank.
    pub selected_option: Option<OptionLabel>,

    #[serde(default, alias = "timeTakenSeconds")]
    pub time_taken: u32,
}

/// DTO for submitting a completed test.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestRequest {
    pub test_id: Uuid,
    pub answers: Vec<SubmittedAnswer>,
}

/// A graded answer row, persisted with the completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnswer {
    pub question_id: String,
    pub selected_option: Option<OptionLabel>,
    pub time_taken: u32,
    pub is_correct: bool,
}

/// Answer row resolved against the catalog for the admin detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetail {
    pub question_id: String,
    pub question_text: String,
    pub category: Category,
    pub selected_option: Option<OptionLabel>,
    pub correct_answer: OptionLabel,
    pub is_correct: bool,
}

/// Response payload for a started test. Questions are the grading-safe
/// projection only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTestResponse {
    pub message: String,
    pub test_id: Uuid,
    pub participant_id: Uuid,
    pub questions: Vec<PublicQuestion>,
    /// Advisory limit in seconds; the server accepts late submissions.
    pub max_duration: u64,
    pub total_questions: usize,
    pub questions_per_category: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestResponse {
    pub message: String,
    pub score: f64,
    pub total_questions: usize,
    pub correct_answers: u32,
    pub category_scores: BTreeMap<Category, CategoryScore>,
    pub duration: u64,
    pub test_id: Uuid,
}

/// A session joined with its participant, for admin listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub id: Uuid,
    pub participant_email: String,
    pub participant_name: String,
    pub institution: Option<String>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub duration: Option<u64>,
    pub score: Option<f64>,
    pub status: SessionStatus,
}

impl TestSummary {
    pub fn from_parts(session: &TestSession, participant: &Participant) -> Self {
        TestSummary {
            id: session.id,
            participant_email: participant.email.clone(),
            participant_name: participant.full_name.clone(),
            institution: participant.institution.clone(),
            start_time: session.start_time,
            end_time: session.end_time,
            duration: session.duration_seconds,
            score: session.score,
            status: session.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDetailResponse {
    pub test: TestSummary,
    pub answers: Vec<AnswerDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: Category,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_participants: usize,
    pub total_tests: usize,
    pub completed_tests: usize,
    pub average_score: f64,
    pub category_stats: Vec<CategoryStat>,
}
