// src/catalog.rs

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use rand::seq::SliceRandom;

use crate::models::question::{Category, OptionLabel, PublicQuestion, Question};

/// Failure while loading or validating the question bank.
/// A bad bank aborts startup; it must never reach grading.
#[derive(Debug)]
pub enum CatalogError {
    Io(String),
    Parse(String),
    Invalid { question_id: String, reason: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(msg) => write!(f, "failed to read question bank: {}", msg),
            CatalogError::Parse(msg) => write!(f, "failed to parse question bank: {}", msg),
            CatalogError::Invalid {
                question_id,
                reason,
            } => write!(f, "invalid question '{}': {}", question_id, reason),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Immutable, category-indexed question bank.
///
/// Built once at startup and shared read-only across requests, so session
/// operations never need a lock on it.
#[derive(Debug)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
    by_id: HashMap<String, usize>,
    by_category: HashMap<Category, Vec<usize>>,
}

impl QuestionCatalog {
    /// Builds a catalog, rejecting malformed questions up front:
    /// duplicate ids, an incomplete A-D option set, or a correct answer
    /// that is not one of the question's options.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(questions.len());
        let mut by_category: HashMap<Category, Vec<usize>> = HashMap::new();

        for (idx, q) in questions.iter().enumerate() {
            if !q.options.contains_key(&q.correct_answer) {
                return Err(CatalogError::Invalid {
                    question_id: q.id.clone(),
                    reason: format!("correct answer '{}' is not among the options", q.correct_answer),
                });
            }
            if q.options.len() != OptionLabel::ALL.len() {
                return Err(CatalogError::Invalid {
                    question_id: q.id.clone(),
                    reason: format!("expected 4 options, found {}", q.options.len()),
                });
            }
            if by_id.insert(q.id.clone(), idx).is_some() {
                return Err(CatalogError::Invalid {
                    question_id: q.id.clone(),
                    reason: "duplicate question id".to_string(),
                });
            }
            by_category.entry(q.category).or_default().push(idx);
        }

        Ok(Self {
            questions,
            by_id,
            by_category,
        })
    }

    /// Loads and validates a JSON question bank from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        let questions: Vec<Question> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.by_id.get(id).map(|&idx| &self.questions[idx])
    }

    /// Stratified sample: up to `per_category` questions drawn uniformly
    /// without replacement from each requested category (short pools yield
    /// what they have), then one independent shuffle over the combined set
    /// so category order is not inferable from position.
    pub fn sample(&self, categories: &[Category], per_category: usize) -> Vec<&Question> {
        let mut rng = rand::thread_rng();
        let mut selected: Vec<&Question> = Vec::new();

        for category in categories {
            let pool = self
                .by_category
                .get(category)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for &idx in pool.choose_multiple(&mut rng, per_category) {
                selected.push(&self.questions[idx]);
            }
        }

        selected.shuffle(&mut rng);
        selected
    }

    /// Same as [`sample`](Self::sample) but already projected to the
    /// grading-safe view for participant-facing callers.
    pub fn sample_public(
        &self,
        categories: &[Category],
        per_category: usize,
    ) -> Vec<PublicQuestion> {
        self.sample(categories, per_category)
            .into_iter()
            .map(PublicQuestion::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use super::*;
    use crate::models::question::Difficulty;

    fn question(id: &str, category: Category, correct: OptionLabel) -> Question {
        let options: BTreeMap<OptionLabel, String> = OptionLabel::ALL
            .iter()
            .map(|l| (*l, format!("option {}", l)))
            .collect();
        Question {
            id: id.to_string(),
            question_text: format!("text for {}", id),
            category,
            difficulty: Difficulty::Medium,
            options,
            correct_answer: correct,
            explanation: "because".to_string(),
            points: 1,
        }
    }

    fn full_bank() -> Vec<Question> {
        let mut questions = Vec::new();
        for category in Category::ALL {
            for i in 0..5 {
                questions.push(question(
                    &format!("{}-{}", category, i),
                    category,
                    OptionLabel::A,
                ));
            }
        }
        questions
    }

    #[test]
    fn sample_returns_25_unique_questions_balanced_by_category() {
        let catalog = QuestionCatalog::new(full_bank()).unwrap();

        let sampled = catalog.sample(&Category::ALL, 5);

        assert_eq!(sampled.len(), 25);
        let ids: HashSet<&str> = sampled.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 25, "sampled ids must be unique");
        for category in Category::ALL {
            let count = sampled.iter().filter(|q| q.category == category).count();
            assert_eq!(count, 5);
        }
    }

    #[test]
    fn sample_handles_short_pools_without_error() {
        let mut questions = full_bank();
        // Leave only two CAPSTONE questions in the pool.
        questions.retain(|q| {
            q.category != Category::Capstone
                || q.id.ends_with("-0")
                || q.id.ends_with("-1")
        });
        let catalog = QuestionCatalog::new(questions).unwrap();

        let sampled = catalog.sample(&Category::ALL, 5);

        assert_eq!(sampled.len(), 22);
        let capstone = sampled
            .iter()
            .filter(|q| q.category == Category::Capstone)
            .count();
        assert_eq!(capstone, 2);
    }

    #[test]
    fn sample_per_category_subset_never_exceeds_quota() {
        let catalog = QuestionCatalog::new(full_bank()).unwrap();

        let sampled = catalog.sample(&[Category::LinuxFundamentals], 3);

        assert_eq!(sampled.len(), 3);
        assert!(sampled.iter().all(|q| q.category == Category::LinuxFundamentals));
    }

    #[test]
    fn public_projection_strips_answer_and_explanation() {
        let catalog = QuestionCatalog::new(full_bank()).unwrap();

        let public = catalog.sample_public(&Category::ALL, 5);

        assert_eq!(public.len(), 25);
        for q in &public {
            let value = serde_json::to_value(q).unwrap();
            let keys = value.as_object().unwrap();
            assert!(!keys.contains_key("correct_answer"));
            assert!(!keys.contains_key("explanation"));
        }
    }

    #[test]
    fn rejects_correct_answer_missing_from_options() {
        let mut q = question("bad", Category::Capstone, OptionLabel::D);
        q.options.remove(&OptionLabel::D);

        let err = QuestionCatalog::new(vec![q]).unwrap_err();
        match err {
            CatalogError::Invalid { question_id, .. } => assert_eq!(question_id, "bad"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn rejects_incomplete_option_set() {
        let mut q = question("short", Category::Capstone, OptionLabel::A);
        q.options.remove(&OptionLabel::D);

        assert!(QuestionCatalog::new(vec![q]).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let questions = vec![
            question("dup", Category::Capstone, OptionLabel::A),
            question("dup", Category::Capstone, OptionLabel::B),
        ];

        assert!(QuestionCatalog::new(questions).is_err());
    }

    #[test]
    fn lookup_by_id() {
        let catalog = QuestionCatalog::new(full_bank()).unwrap();

        assert!(catalog.get("CAPSTONE-0").is_some());
        assert!(catalog.get("nope").is_none());
    }
}
