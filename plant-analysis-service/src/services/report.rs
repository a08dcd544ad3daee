//! Report generation: turns analysis text and an optional image into a PDF
//! file in the reports directory.

use crate::services::data_uri;
use crate::services::pdf::{self, RenderError, ReportContent};
use crate::services::temp_file::TempArtifact;
use chrono::Local;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const REPORT_FILE_PREFIX: &str = "plant_analysis_report_";
const TEMP_IMAGE_PREFIX: &str = "temp_";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Rendering task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A finished report on disk. Dropping it deletes the file.
#[derive(Debug)]
pub struct GeneratedReport {
    pub file_name: String,
    pub artifact: TempArtifact,
}

/// Write `plant_analysis_report_<millis>.pdf` into `dir`.
///
/// The returned file is complete and synced to storage. Any decoded image is
/// written to a sibling `temp_<millis>.png` for the duration of rendering and
/// removed on every path out of this function, as is a partial PDF.
pub async fn generate(
    dir: &Path,
    body: &str,
    image: Option<&str>,
) -> Result<GeneratedReport, ReportError> {
    fs::create_dir_all(dir).await?;

    let (mut pdf_file, mut pdf_handle) =
        TempArtifact::create_timestamped(dir, REPORT_FILE_PREFIX, "pdf").await?;

    let image_file = match image.filter(|uri| !uri.trim().is_empty()) {
        Some(uri) => {
            let bytes = data_uri::decode_image(uri)?;
            let (temp, mut handle) =
                TempArtifact::create_timestamped(dir, TEMP_IMAGE_PREFIX, "png").await?;
            handle.write_all(&bytes).await?;
            handle.flush().await?;
            tracing::debug!(
                path = %temp.path().display(),
                bytes = bytes.len(),
                "Decoded report image"
            );
            Some(temp)
        }
        None => None,
    };

    let body = body.to_owned();
    let date = Local::now().format("%-m/%-d/%Y").to_string();
    let image_path = image_file.as_ref().map(|temp| temp.path().to_path_buf());

    let rendered = tokio::task::spawn_blocking(move || {
        pdf::render(&ReportContent {
            body: &body,
            date: &date,
            image: image_path.as_deref(),
        })
    })
    .await??;

    drop(image_file);

    if let Err(e) = write_fully(&mut pdf_handle, &rendered).await {
        drop(pdf_handle);
        pdf_file.remove().ok();
        return Err(e.into());
    }

    let file_name = pdf_file.file_name();
    tracing::info!(
        file_name = %file_name,
        bytes = rendered.len(),
        "Report generated"
    );

    Ok(GeneratedReport {
        file_name,
        artifact: pdf_file,
    })
}

async fn write_fully(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}
