pub mod data_uri;
pub mod pdf;
pub mod providers;
pub mod report;
pub mod temp_file;

pub use providers::{InlineImage, ProviderError, ProviderResponse, VisionProvider};
pub use report::{GeneratedReport, ReportError};
pub use temp_file::{CleanupStream, TempArtifact};
