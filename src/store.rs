// src/store.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::participant::{Participant, normalize_email};
use crate::models::question::Category;
use crate::models::test_session::{CategoryScore, SessionStatus, StoredAnswer, TestSession};

/// Everything a submission produces, applied to the session in one atomic
/// step by [`SessionStore::complete_session`].
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub end_time: DateTime<Utc>,
    pub duration_seconds: u64,
    pub score: f64,
    pub category_scores: BTreeMap<Category, CategoryScore>,
    pub answers: Vec<StoredAnswer>,
}

/// Storage collaborator owning participants, test sessions and graded
/// answers. Callers interact only through this contract, so a transactional
/// backend can be swapped in without touching the engine.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Looks up a participant by normalized email, creating one on first
    /// contact. Identity is case-insensitive: `A@B.com` and `a@b.com` are
    /// the same participant.
    async fn get_or_create_participant(
        &self,
        email: &str,
        full_name: &str,
        institution: Option<&str>,
    ) -> Result<Participant, AppError>;

    async fn load_participant(&self, participant_id: Uuid) -> Result<Participant, AppError>;

    /// Always creates a fresh IN_PROGRESS session. A participant may hold
    /// any number of sessions; concurrent duplicate starts are not merged.
    async fn create_session(
        &self,
        participant_id: Uuid,
        question_ids: Vec<String>,
    ) -> Result<TestSession, AppError>;

    async fn load_session(&self, test_id: Uuid) -> Result<TestSession, AppError>;

    /// Atomic check-and-set on session status: exactly one caller wins the
    /// IN_PROGRESS -> COMPLETED transition, every other concurrent submit
    /// observes `AlreadyCompleted` and the stored result is left untouched.
    async fn complete_session(
        &self,
        test_id: Uuid,
        outcome: SessionOutcome,
    ) -> Result<TestSession, AppError>;

    /// Bumps the participant's lifetime completed-test counter and stamps
    /// the completion time. Increments are atomic; ordering between
    /// concurrent sessions of one participant is unspecified.
    async fn record_test_completion(&self, participant_id: Uuid) -> Result<(), AppError>;

    async fn session_answers(&self, test_id: Uuid) -> Result<Vec<StoredAnswer>, AppError>;

    /// All participants, newest registration first.
    async fn list_participants(&self) -> Result<Vec<Participant>, AppError>;

    /// All sessions, newest first, optionally filtered by status.
    async fn list_sessions(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<TestSession>, AppError>;

    /// Every stored graded answer, for dashboard aggregation.
    async fn all_answers(&self) -> Result<Vec<StoredAnswer>, AppError>;
}

#[derive(Default)]
struct Inner {
    participants: HashMap<Uuid, Participant>,
    /// normalized email -> participant id
    email_index: HashMap<String, Uuid>,
    sessions: HashMap<Uuid, TestSession>,
    /// test id -> graded answer rows
    answers: HashMap<Uuid, Vec<StoredAnswer>>,
}

/// In-memory `SessionStore` backend.
///
/// A single `RwLock` guards all tables; write sections are short and never
/// held across an await, which is what makes `complete_session` an honest
/// compare-and-set rather than a read-then-write pair.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, AppError> {
        self.inner
            .read()
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, AppError> {
        self.inner
            .write()
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_or_create_participant(
        &self,
        email: &str,
        full_name: &str,
        institution: Option<&str>,
    ) -> Result<Participant, AppError> {
        let key = normalize_email(email);
        let mut inner = self.write()?;

        if let Some(id) = inner.email_index.get(&key) {
            let existing = inner
                .participants
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::Internal("email index out of sync".to_string()))?;
            return Ok(existing);
        }

        if key.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        if full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            email: key.clone(),
            full_name: full_name.trim().to_string(),
            institution: institution
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty()),
            registration_date: Utc::now(),
            last_test_date: None,
            tests_taken: 0,
        };
        inner.email_index.insert(key, participant.id);
        inner.participants.insert(participant.id, participant.clone());

        Ok(participant)
    }

    async fn load_participant(&self, participant_id: Uuid) -> Result<Participant, AppError> {
        self.read()?
            .participants
            .get(&participant_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))
    }

    async fn create_session(
        &self,
        participant_id: Uuid,
        question_ids: Vec<String>,
    ) -> Result<TestSession, AppError> {
        let mut inner = self.write()?;

        if !inner.participants.contains_key(&participant_id) {
            return Err(AppError::NotFound("Participant not found".to_string()));
        }

        let session = TestSession {
            id: Uuid::new_v4(),
            participant_id,
            start_time: Utc::now(),
            end_time: None,
            duration_seconds: None,
            status: SessionStatus::InProgress,
            question_ids,
            score: None,
            category_scores: None,
        };
        inner.sessions.insert(session.id, session.clone());

        Ok(session)
    }

    async fn load_session(&self, test_id: Uuid) -> Result<TestSession, AppError> {
        self.read()?
            .sessions
            .get(&test_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Test not found".to_string()))
    }

    async fn complete_session(
        &self,
        test_id: Uuid,
        outcome: SessionOutcome,
    ) -> Result<TestSession, AppError> {
        let mut inner = self.write()?;

        let session = inner
            .sessions
            .get_mut(&test_id)
            .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;

        if session.status == SessionStatus::Completed {
            return Err(AppError::AlreadyCompleted(
                "Test already submitted".to_string(),
            ));
        }

        session.status = SessionStatus::Completed;
        session.end_time = Some(outcome.end_time);
        session.duration_seconds = Some(outcome.duration_seconds);
        session.score = Some(outcome.score);
        session.category_scores = Some(outcome.category_scores);
        let completed = session.clone();

        inner.answers.insert(test_id, outcome.answers);

        Ok(completed)
    }

    async fn record_test_completion(&self, participant_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.write()?;

        let participant = inner
            .participants
            .get_mut(&participant_id)
            .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

        participant.tests_taken += 1;
        participant.last_test_date = Some(Utc::now());

        Ok(())
    }

    async fn session_answers(&self, test_id: Uuid) -> Result<Vec<StoredAnswer>, AppError> {
        Ok(self
            .read()?
            .answers
            .get(&test_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_participants(&self) -> Result<Vec<Participant>, AppError> {
        let mut participants: Vec<Participant> =
            self.read()?.participants.values().cloned().collect();
        participants.sort_by(|a, b| b.registration_date.cmp(&a.registration_date));
        Ok(participants)
    }

    async fn list_sessions(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<TestSession>, AppError> {
        let mut sessions: Vec<TestSession> = self
            .read()?
            .sessions
            .values()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }

    async fn all_answers(&self) -> Result<Vec<StoredAnswer>, AppError> {
        Ok(self.read()?.answers.values().flatten().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn outcome(score: f64) -> SessionOutcome {
        SessionOutcome {
            end_time: Utc::now(),
            duration_seconds: 120,
            score,
            category_scores: BTreeMap::new(),
            answers: vec![StoredAnswer {
                question_id: "q1".to_string(),
                selected_option: None,
                time_taken: 5,
                is_correct: false,
            }],
        }
    }

    #[tokio::test]
    async fn participant_creation_is_idempotent_on_email() {
        let store = MemoryStore::new();

        let first = store
            .get_or_create_participant("a@b.com", "Alice", Some("Uni"))
            .await
            .unwrap();
        let second = store
            .get_or_create_participant("a@b.com", "Someone Else", None)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.full_name, "Alice");
    }

    #[tokio::test]
    async fn case_variant_email_is_the_same_participant() {
        let store = MemoryStore::new();

        let first = store
            .get_or_create_participant("a@b.com", "A", Some("X"))
            .await
            .unwrap();
        let second = store
            .get_or_create_participant(" A@B.Com ", "A", Some("X"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_participants().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_identity_fields_are_rejected_on_first_contact() {
        let store = MemoryStore::new();

        let no_email = store.get_or_create_participant("  ", "Alice", None).await;
        let no_name = store.get_or_create_participant("a@b.com", "  ", None).await;

        assert!(matches!(no_email, Err(AppError::Validation(_))));
        assert!(matches!(no_name, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn session_lifecycle_round_trip() {
        let store = MemoryStore::new();
        let participant = store
            .get_or_create_participant("a@b.com", "Alice", None)
            .await
            .unwrap();

        let session = store
            .create_session(participant.id, vec!["q1".to_string(), "q2".to_string()])
            .await
            .unwrap();
        assert_eq!(session.status, SessionStatus::InProgress);
        assert!(session.score.is_none());

        let loaded = store.load_session(session.id).await.unwrap();
        assert_eq!(loaded.question_ids, vec!["q1", "q2"]);

        let completed = store.complete_session(session.id, outcome(80.0)).await.unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);
        assert_eq!(completed.score, Some(80.0));
        assert_eq!(store.session_answers(session.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = MemoryStore::new();

        let result = store.load_session(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn second_submission_conflicts_and_keeps_first_score() {
        let store = MemoryStore::new();
        let participant = store
            .get_or_create_participant("a@b.com", "Alice", None)
            .await
            .unwrap();
        let session = store
            .create_session(participant.id, vec!["q1".to_string()])
            .await
            .unwrap();

        store.complete_session(session.id, outcome(75.0)).await.unwrap();
        let second = store.complete_session(session.id, outcome(10.0)).await;

        assert!(matches!(second, Err(AppError::AlreadyCompleted(_))));
        let stored = store.load_session(session.id).await.unwrap();
        assert_eq!(stored.score, Some(75.0));
    }

    #[tokio::test]
    async fn concurrent_submissions_have_exactly_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let participant = store
            .get_or_create_participant("a@b.com", "Alice", None)
            .await
            .unwrap();
        let session = store
            .create_session(participant.id, vec!["q1".to_string()])
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..16u32 {
            let store = Arc::clone(&store);
            let test_id = session.id;
            handles.push(tokio::spawn(async move {
                store.complete_session(test_id, outcome(f64::from(i))).await
            }));
        }

        let mut winners = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(AppError::AlreadyCompleted(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(conflicts, 15);
    }

    #[tokio::test]
    async fn completion_counter_has_no_lost_updates() {
        let store = Arc::new(MemoryStore::new());
        let participant = store
            .get_or_create_participant("a@b.com", "Alice", None)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            let id = participant.id;
            handles.push(tokio::spawn(async move {
                store.record_test_completion(id).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reloaded = store.load_participant(participant.id).await.unwrap();
        assert_eq!(reloaded.tests_taken, 10);
        assert!(reloaded.last_test_date.is_some());
    }

    #[tokio::test]
    async fn session_listing_filters_by_status() {
        let store = MemoryStore::new();
        let participant = store
            .get_or_create_participant("a@b.com", "Alice", None)
            .await
            .unwrap();
        let open = store
            .create_session(participant.id, vec!["q1".to_string()])
            .await
            .unwrap();
        let done = store
            .create_session(participant.id, vec!["q1".to_string()])
            .await
            .unwrap();
        store.complete_session(done.id, outcome(50.0)).await.unwrap();

        let all = store.list_sessions(None).await.unwrap();
        let completed = store
            .list_sessions(Some(SessionStatus::Completed))
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);
        assert!(all.iter().any(|s| s.id == open.id));
    }
}
