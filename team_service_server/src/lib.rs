use axum::{Json, Router, routing::get};
use serde::{Serialize, Deserialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod state;
pub mod response;
pub mod teams;
pub mod members;
pub mod import;

use state::AppState;


#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string() })
}

pub async fn app() -> Router {
    let config = config::read_config();
    app_with_state(AppState::new(&config.db_url).await).await
}

pub async fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest(
            "/api",
            teams::router()
                .merge(members::router())
                .merge(import::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
