use crate::dtos::ReportRequest;
use crate::error::ApiError;
use crate::services::{report, CleanupStream, GeneratedReport};
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

pub async fn download_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::error!(%rejection, "Error during download: unreadable request body");
        ApiError::ReportFailed(report::ReportError::InvalidRequest(rejection.body_text()))
    })?;

    let generated = report::generate(
        &state.config.reports.dir,
        &request.result,
        request.image.as_deref(),
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Error during download");
        ApiError::ReportFailed(e)
    })?;

    transmit(generated).await
}

/// Stream the finished PDF as an attachment. The file is deleted once the
/// body has been read to the end, or when the body is dropped early.
async fn transmit(generated: GeneratedReport) -> Result<Response, ApiError> {
    let GeneratedReport {
        file_name,
        artifact,
    } = generated;

    let file = tokio::fs::File::open(artifact.path()).await.map_err(|e| {
        tracing::error!(file_name = %file_name, error = %e, "Error downloading the PDF report");
        ApiError::TransmissionFailed(e)
    })?;

    tracing::info!(file_name = %file_name, "Sending report");

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];

    Ok((headers, Body::from_stream(CleanupStream::new(file, artifact))).into_response())
}
