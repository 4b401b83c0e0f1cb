pub mod existence;
pub mod manifest;
mod progress;
pub mod runner;
pub mod scan;
pub mod summary;

pub use existence::{ExistenceCheck, ExistenceStatus, ExistenceSummary};
pub use manifest::Manifest;
pub use runner::FileScanner;
pub use scan::ScanPipeline;
pub use summary::Summary;
