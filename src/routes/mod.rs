//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

mod extract;
pub mod http;

/// Build the application router with:
/// - REST API under `/api/v1/...`, identity taken from `X-User-Id`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        // Stacks
        .route("/api/v1/stacks", get(http::http_list_stacks).post(http::http_create_stack))
        .route(
            "/api/v1/stacks/:stack_id",
            get(http::http_get_stack)
                .put(http::http_update_stack)
                .patch(http::http_update_stack)
                .delete(http::http_delete_stack),
        )
        .route("/api/v1/stacks/:stack_id/copy", post(http::http_copy_stack))
        .route("/api/v1/stacks/:stack_id/progress", get(http::http_stack_progress))
        // Resources
        .route(
            "/api/v1/stacks/:stack_id/resources",
            get(http::http_list_resources).post(http::http_create_resource),
        )
        .route(
            "/api/v1/stacks/:stack_id/resources/:resource_id",
            get(http::http_get_resource)
                .put(http::http_update_resource)
                .patch(http::http_update_resource)
                .delete(http::http_delete_resource),
        )
        // Quizzes
        .route(
            "/api/v1/stacks/:stack_id/quizzes",
            get(http::http_list_quizzes).post(http::http_create_quiz),
        )
        .route(
            "/api/v1/stacks/:stack_id/quizzes/:quiz_id",
            get(http::http_get_quiz).delete(http::http_delete_quiz),
        )
        .route(
            "/api/v1/stacks/:stack_id/quizzes/:quiz_id/attempts",
            get(http::http_list_attempts).post(http::http_submit_attempt),
        )
        // Ad-hoc generation
        .route("/api/v1/ai/quiz", get(http::http_get_ai_quiz).post(http::http_post_ai_quiz))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
