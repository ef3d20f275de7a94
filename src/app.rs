use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{auth, health, profile};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/auth", auth::router())
        .nest("/user", profile::router())
        // Dev-only server: the browser client runs on another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
