use serde::{Deserialize, Serialize};

/// `/download` body: what `/analyze` returned, sent back by the caller.
///
/// Neither field is validated up front; a missing `result` renders as an
/// empty body and a missing or empty `image` skips the picture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub image: Option<String>,
}
