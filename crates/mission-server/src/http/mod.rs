//! HTTP server for the task board and calendar.
//!
//! Provides endpoints for:
//! - Task CRUD (`/tasks`)
//! - Calendar CRUD (`/calendar`)
//! - Read-only board page (`/ui/tasks`)
//! - Health check (`/health`)

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod handlers;
pub mod responses;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer for browser clients served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes
        .route(
            "/tasks",
            get(handlers::list_tasks)
                .post(handlers::create_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route(
            "/calendar",
            get(handlers::list_events)
                .post(handlers::create_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        // UI routes
        .route("/ui/tasks", get(handlers::board_html))
        // Observability routes
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
