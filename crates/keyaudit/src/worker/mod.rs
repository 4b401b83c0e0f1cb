pub mod job;
pub mod pool;

pub use job::{FileReport, JobHandler, ScanJob};
pub use pool::WorkerPool;
