use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/notifications", post(handlers::ingest_notification))
        .route("/signatures", post(handlers::create_signature))
        .route("/signatures/:envelope_id", get(handlers::get_signature))
        .route(
            "/signatures/:envelope_id/signers/:recipient_id/sign-url",
            get(handlers::sign_url),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
