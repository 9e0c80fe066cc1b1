// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Default number of questions drawn from each category.
pub const QUESTIONS_PER_CATEGORY: usize = 5;

/// Advisory test duration in seconds (the client runs the countdown;
/// late submissions are still accepted and scored by elapsed time).
pub const MAX_TEST_DURATION_SECS: u64 = 1800;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub rust_log: String,
    /// Path to the JSON question bank loaded at startup.
    pub question_bank: String,
    pub questions_per_category: usize,
    pub max_test_duration: u64,
    /// Bearer token for the admin surface. Admin routes reject every
    /// request while this is unset.
    pub admin_token: Option<String>,
    /// Comma-separated CORS allowlist.
    pub frontend_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let question_bank =
            env::var("QUESTION_BANK").unwrap_or_else(|_| "data/questions.json".to_string());

        let questions_per_category = env::var("QUESTIONS_PER_CATEGORY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(QUESTIONS_PER_CATEGORY);

        let max_test_duration = env::var("MAX_TEST_DURATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(MAX_TEST_DURATION_SECS);

        let admin_token = env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:3001".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            bind_addr,
            rust_log,
            question_bank,
            questions_per_category,
            max_test_duration,
            admin_token,
            frontend_origins,
        }
    }
}
