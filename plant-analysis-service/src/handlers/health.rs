use axum::{
    http::{Method, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use service_core::error::AppError;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "plant-analysis-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Cannot {} {}", method, uri.path()))
}
