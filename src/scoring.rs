// src/scoring.rs

use std::collections::BTreeMap;

use crate::catalog::QuestionCatalog;
use crate::models::question::Category;
use crate::models::test_session::{CategoryScore, StoredAnswer, SubmittedAnswer};

/// Result of grading one submission. Everything the orchestrator needs to
/// complete the session and answer the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    /// Overall percentage, rounded half-up to 2 decimals.
    pub score_percent: f64,
    pub points_earned: u32,
    pub correct_count: u32,
    /// Count of submitted answers that resolved to a known question.
    /// This is the score denominator; unknown ids never count.
    pub total_answered: usize,
    pub category_scores: BTreeMap<Category, CategoryScore>,
    /// Per-answer verdicts, in submission order, for persistence.
    pub graded: Vec<StoredAnswer>,
}

/// Grades a submitted answer set against the catalog.
///
/// Pure: no clock, no randomness, so identical inputs always yield identical
/// output. An answer whose question id is unknown is skipped silently; a
/// blank selection is simply incorrect.
pub fn grade(answers: &[SubmittedAnswer], catalog: &QuestionCatalog) -> GradeOutcome {
    let mut points_earned = 0u32;
    let mut correct_count = 0u32;
    let mut total_answered = 0usize;
    let mut category_scores: BTreeMap<Category, CategoryScore> = BTreeMap::new();
    let mut graded = Vec::with_capacity(answers.len());

    for answer in answers {
        let Some(question) = catalog.get(&answer.question_id) else {
            continue;
        };

        let is_correct = answer.selected_option == Some(question.correct_answer);
        total_answered += 1;

        let entry = category_scores.entry(question.category).or_default();
        entry.total += 1;
        if is_correct {
            entry.correct += 1;
            correct_count += 1;
            points_earned += question.points;
        }

        graded.push(StoredAnswer {
            question_id: answer.question_id.clone(),
            selected_option: answer.selected_option,
            time_taken: answer.time_taken,
            is_correct,
        });
    }

    let score_percent = if total_answered > 0 {
        round2(points_earned as f64 / total_answered as f64 * 100.0)
    } else {
        0.0
    };

    GradeOutcome {
        score_percent,
        points_earned,
        correct_count,
        total_answered,
        category_scores,
        graded,
    }
}

/// Half-up rounding to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
