//! Fans a batch of files out to concurrent processors and completes the job
//! once every file is terminal.

use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, info_span, Instrument};

use crate::jobs::JobStore;
use crate::pipeline::processor::FileProcessor;
use crate::pipeline::progress::StoreProgress;
use crate::upload::UploadedFile;

const UNFINISHED_MESSAGE: &str = "Processing stopped unexpectedly";

/// Handle returned by [`JobOrchestrator::submit`].
#[derive(Debug)]
pub struct SubmittedJob {
    pub job_id: String,
    pub total_files: usize,
    /// Resolves once the job has been marked completed.
    pub completion: JoinHandle<()>,
}

#[derive(Clone)]
pub struct JobOrchestrator {
    store: Arc<JobStore>,
    processor: Arc<FileProcessor>,
}

impl JobOrchestrator {
    pub fn new(store: Arc<JobStore>, processor: Arc<FileProcessor>) -> Self {
        Self { store, processor }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Registers a job for `files` and starts processing in the background.
    /// Files are expected to be validated already. Must be called from
    /// within a tokio runtime.
    pub fn submit(&self, files: Vec<UploadedFile>) -> SubmittedJob {
        let filenames: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();
        let total_files = files.len();
        let job_id = self.store.create(filenames);
        info!("Submitted job {} with {} file(s)", job_id, total_files);

        let completion = tokio::spawn(supervise(
            Arc::clone(&self.store),
            Arc::clone(&self.processor),
            job_id.clone(),
            files,
        ));

        SubmittedJob {
            job_id,
            total_files,
            completion,
        }
    }
}

/// Runs one task per file, waits for all of them, then completes the job.
async fn supervise(
    store: Arc<JobStore>,
    processor: Arc<FileProcessor>,
    job_id: String,
    files: Vec<UploadedFile>,
) {
    let mut tasks = JoinSet::new();
    for (index, file) in files.into_iter().enumerate() {
        let processor = Arc::clone(&processor);
        let progress = StoreProgress::new(Arc::clone(&store), job_id.as_str(), index);
        let span = info_span!("process_file", job_id = %job_id, index, filename = %file.filename);
        tasks.spawn(
            async move {
                processor
                    .process(&file.content, &file.filename, &progress)
                    .await;
            }
            .instrument(span),
        );
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("A processing task for job {} ended abnormally: {}", job_id, e);
        }
    }

    store.fail_unfinished(&job_id, UNFINISHED_MESSAGE);
    store.complete(&job_id);
}
