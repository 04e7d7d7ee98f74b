pub mod orchestrator;
pub mod processor;
pub mod progress;

pub use orchestrator::{JobOrchestrator, SubmittedJob};
pub use processor::FileProcessor;
pub use progress::{NoopProgress, ProgressReporter, StoreProgress};
