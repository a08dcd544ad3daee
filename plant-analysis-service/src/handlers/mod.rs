pub mod analyze;
pub mod download;
pub mod health;

pub use analyze::analyze_image;
pub use download::download_report;
pub use health::{health_check, not_found};
