use std::sync::Arc;

use crate::jobs::{FileUpdate, JobStore};

/// Receives status changes for one file as it moves through processing.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: FileUpdate);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _update: FileUpdate) {}
}

/// Writes updates for one file of one job into the [`JobStore`].
pub struct StoreProgress {
    store: Arc<JobStore>,
    job_id: String,
    index: usize,
}

impl StoreProgress {
    pub fn new(store: Arc<JobStore>, job_id: impl Into<String>, index: usize) -> Self {
        Self {
            store,
            job_id: job_id.into(),
            index,
        }
    }
}

impl ProgressReporter for StoreProgress {
    fn report(&self, update: FileUpdate) {
        // Stale updates (deleted job, terminal file) are dropped and logged by the store.
        self.store.update_file_status(&self.job_id, self.index, update);
    }
}
