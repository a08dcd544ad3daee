use serde::{Deserialize, Serialize};

/// Successful `/analyze` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Plain-text analysis from the model.
    pub results: String,
    /// The uploaded image as `data:<mime>;base64,<payload>`, byte for byte.
    pub image: String,
}
