use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::http::handlers::{self, AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/messages",
            get(handlers::list_messages).post(handlers::store_message),
        )
        .route("/api/tenants", get(handlers::tenant_stats))
        .route("/api/events", get(handlers::list_events))
        .route("/clear-messages", post(handlers::clear_messages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
