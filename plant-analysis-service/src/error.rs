//! Error responses of the public HTTP surface.

use crate::services::ReportError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image uploaded")]
    MissingImage,

    #[error("Model response did not contain any text")]
    InvalidUpstreamResponse,

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Report generation failed: {0}")]
    ReportFailed(#[source] ReportError),

    #[error("Report transmission failed: {0}")]
    TransmissionFailed(#[source] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingImage => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Please upload an image." }),
            ),
            ApiError::InvalidUpstreamResponse => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": "Invalid response from AI." }),
            ),
            ApiError::AnalysisFailed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": "Analysis failed", "details": details }),
            ),
            // Generation failures never leak detail to the caller.
            ApiError::ReportFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": "Download failed" }),
            ),
            ApiError::TransmissionFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Error downloading the PDF report" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
