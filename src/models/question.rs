// src/models/question.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The five knowledge domains a question can belong to.
/// Wire values match the question bank (`CYBER_FOUNDATIONS`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    CyberFoundations,
    LinuxFundamentals,
    AttackVectors,
    DefenseOps,
    Capstone,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::CyberFoundations,
        Category::LinuxFundamentals,
        Category::AttackVectors,
        Category::DefenseOps,
        Category::Capstone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CyberFoundations => "CYBER_FOUNDATIONS",
            Category::LinuxFundamentals => "LINUX_FUNDAMENTALS",
            Category::AttackVectors => "ATTACK_VECTORS",
            Category::DefenseOps => "DEFENSE_OPS",
            Category::Capstone => "CAPSTONE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Answer option label. Every question carries exactly these four options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [
        OptionLabel::A,
        OptionLabel::B,
        OptionLabel::C,
        OptionLabel::D,
    ];
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        };
        f.write_str(s)
    }
}

fn default_points() -> u32 {
    1
}

/// A question as loaded from the bank file. Immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Opaque unique key (e.g. "cf1").
    pub id: String,

    pub question_text: String,

    pub category: Category,

    pub difficulty: Difficulty,

    /// Display text per option label. Exactly four entries, A through D.
    pub options: BTreeMap<OptionLabel, String>,

    /// The label of the correct option. Must be a key of `options`.
    pub correct_answer: OptionLabel,

    /// Shown to the participant only after grading, never during the test.
    pub explanation: String,

    #[serde(default = "default_points")]
    pub points: u32,
}

/// Grading-safe projection of a question (no answer, no explanation).
/// This is the only question shape that may reach a test-taker.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub question_text: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub options: BTreeMap<OptionLabel, String>,
    pub points: u32,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        PublicQuestion {
            id: q.id.clone(),
            question_text: q.question_text.clone(),
            category: q.category,
            difficulty: q.difficulty,
            options: q.options.clone(),
            points: q.points,
        }
    }
}
