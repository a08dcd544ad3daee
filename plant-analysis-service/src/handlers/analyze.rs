use crate::dtos::AnalysisResponse;
use crate::error::ApiError;
use crate::services::{data_uri, InlineImage};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    Json,
};

/// Multipart field that carries the photo.
pub const IMAGE_FIELD: &str = "image";

pub const ANALYSIS_PROMPT: &str = "Analyze this plant image and provide a detailed analysis \
of its species, health condition, care recommendations, characteristics, and any interesting \
facts. Format the response in plain text.";

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

struct UploadedImage {
    file_name: String,
    mime_type: String,
    bytes: Bytes,
}

pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    // A body that is not multipart at all simply has no file in it.
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "Analyze request is not multipart");
        ApiError::MissingImage
    })?;

    let upload = read_image_field(multipart)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error during analysis: failed to read upload");
            ApiError::AnalysisFailed(e.to_string())
        })?
        .ok_or(ApiError::MissingImage)?;

    tracing::info!(
        file_name = %upload.file_name,
        mime_type = %upload.mime_type,
        size = upload.bytes.len(),
        "Image received for analysis"
    );

    let image = InlineImage {
        mime_type: upload.mime_type,
        data: data_uri::encode_base64(&upload.bytes),
    };

    let response = state
        .vision
        .analyze(ANALYSIS_PROMPT, &image)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error during analysis");
            ApiError::AnalysisFailed(e.to_string())
        })?;

    let results = response.text.ok_or_else(|| {
        tracing::error!(
            finish_reason = response.finish_reason.as_deref().unwrap_or("UNKNOWN"),
            "Invalid response from AI: no text in first candidate"
        );
        ApiError::InvalidUpstreamResponse
    })?;

    tracing::info!(
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        result_len = results.len(),
        "Analysis completed"
    );

    Ok(Json(AnalysisResponse {
        results,
        image: data_uri::format(&image.mime_type, &image.data),
    }))
}

/// First file in the `image` field; other fields and plain values are skipped.
async fn read_image_field(
    mut multipart: Multipart,
) -> Result<Option<UploadedImage>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let is_image_file = field.name() == Some(IMAGE_FIELD) && field.file_name().is_some();
        if !is_image_file {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let bytes = field.bytes().await?;

        return Ok(Some(UploadedImage {
            file_name,
            mime_type,
            bytes,
        }));
    }

    Ok(None)
}
