// src/handlers/admin.rs

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{
        question::Category,
        test_session::{CategoryStat, DashboardStats, SessionStatus, TestSummary},
    },
    state::AppState,
};

/// Lists all registered participants, newest first.
/// Admin only.
pub async fn list_participants(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let participants = state.store.list_participants().await?;
    Ok(Json(participants))
}

#[derive(Debug, Deserialize)]
pub struct TestListQuery {
    pub status: Option<SessionStatus>,
}

/// Lists all test sessions joined with their participant, newest first.
/// Admin only.
pub async fn list_tests(
    State(state): State<AppState>,
    Query(query): Query<TestListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.store.list_sessions(query.status).await?;

    let mut summaries = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let participant = state.store.load_participant(session.participant_id).await?;
        summaries.push(TestSummary::from_parts(session, &participant));
    }

    Ok(Json(summaries))
}

/// Aggregated dashboard numbers: participant/test totals, average score
/// over completed sessions and per-category correctness across every
/// stored answer.
/// Admin only.
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let participants = state.store.list_participants().await?;
    let sessions = state.store.list_sessions(None).await?;
    let answers = state.store.all_answers().await?;

    let completed: Vec<_> = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .collect();

    let average_score = if completed.is_empty() {
        0.0
    } else {
        let sum: f64 = completed.iter().filter_map(|s| s.score).sum();
        round2(sum / completed.len() as f64)
    };

    let mut per_category: BTreeMap<Category, (u32, u32)> = BTreeMap::new();
    for answer in &answers {
        let Some(question) = state.catalog.get(&answer.question_id) else {
            continue;
        };
        let entry = per_category.entry(question.category).or_default();
        entry.0 += 1;
        if answer.is_correct {
            entry.1 += 1;
        }
    }

    let category_stats = per_category
        .into_iter()
        .map(|(category, (total, correct))| CategoryStat {
            category,
            total_questions: total,
            correct_answers: correct,
            percentage: round1(f64::from(correct) / f64::from(total) * 100.0),
        })
        .collect();

    Ok(Json(DashboardStats {
        total_participants: participants.len(),
        total_tests: sessions.len(),
        completed_tests: completed.len(),
        average_score,
        category_stats,
    }))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
