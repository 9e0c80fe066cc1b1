// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, health, test},
    state::AppState,
    utils::auth::admin_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (health, test, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, catalog, config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let test_routes = Router::new()
        .route("/start", post(test::start_test))
        .route("/submit", post(test::submit_test))
        // Session detail exposes correct answers, so it sits behind the
        // admin guard.
        .merge(
            Router::new()
                .route("/{test_id}", get(test::get_test_details))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    admin_middleware,
                )),
        );

    let admin_routes = Router::new()
        .route("/participants", get(admin::list_participants))
        .route("/tests", get(admin::list_tests))
        .route("/dashboard/stats", get(admin::dashboard_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ));

    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/test", test_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
