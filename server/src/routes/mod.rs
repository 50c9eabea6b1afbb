//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every endpoint lives under `/api/v1`. CORS is open to any origin so
//! browser-hosted note apps can call the relay directly; the only custom
//! request header is `X-API-Key`.

pub mod api_key;
pub mod blog;
pub mod pdf;

use agent::relay::{HealthResponse, SERVICE_NAME};
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, HeaderName::from_static("x-api-key")]);

    let api = Router::new()
        .route("/generate", post(blog::generate))
        .route("/chat", post(blog::chat))
        .route("/extract-pdf", post(pdf::extract_pdf))
        .route("/health", get(health));

    Router::new()
        .nest("/api/v1", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
