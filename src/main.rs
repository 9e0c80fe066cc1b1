// src/main.rs

use std::sync::Arc;

use aptitude_backend::catalog::QuestionCatalog;
use aptitude_backend::config::Config;
use aptitude_backend::routes;
use aptitude_backend::state::AppState;
use aptitude_backend::store::MemoryStore;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Load and validate the question bank. A malformed bank must never
    // reach grading, so startup fails loudly here.
    let catalog = QuestionCatalog::load(&config.question_bank)
        .unwrap_or_else(|e| panic!("Failed to load question bank '{}': {}", config.question_bank, e));
    tracing::info!(
        "Question bank loaded: {} questions from {}",
        catalog.len(),
        config.question_bank
    );

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set; admin endpoints will reject all requests");
    }

    // Create AppState
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        catalog: Arc::new(catalog),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listen address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}
