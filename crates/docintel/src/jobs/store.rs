//! In-memory job store shared between the orchestrator, processors and
//! query handlers.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::jobs::model::{
    generate_job_id, FileResult, FileStatus, FileUpdate, Job, JobResults, JobStatus,
};

/// Job counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounts {
    pub processing: usize,
    pub completed: usize,
}

/// Jobs keyed by id. Every mutation holds the write lock for its whole
/// duration, so readers always see a consistent snapshot.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_jobs(&self) -> RwLockReadGuard<'_, HashMap<String, Job>> {
        match self.jobs.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_jobs(&self) -> RwLockWriteGuard<'_, HashMap<String, Job>> {
        match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Registers a new job with one pending file per name and returns its id.
    pub fn create(&self, filenames: Vec<String>) -> String {
        let mut jobs = self.write_jobs();
        let mut job_id = generate_job_id();
        while jobs.contains_key(&job_id) {
            job_id = generate_job_id();
        }

        let job = Job::new(job_id.clone(), filenames);
        log::info!("Created job {} with {} file(s)", job_id, job.total_files);
        jobs.insert(job_id.clone(), job);
        job_id
    }

    /// Snapshot of a job.
    pub fn get(&self, job_id: &str) -> Option<Job> {
        self.read_jobs().get(job_id).cloned()
    }

    /// Applies an update to one file. Returns false, leaving the store
    /// untouched, when the job or index is unknown, the file is already
    /// terminal, or the update would move the file backwards.
    pub fn update_file_status(&self, job_id: &str, index: usize, update: FileUpdate) -> bool {
        let mut jobs = self.write_jobs();
        let Some(job) = jobs.get_mut(job_id) else {
            log::warn!(
                "Dropping update for unknown job {} (file {}): {}",
                job_id,
                index,
                update.message
            );
            return false;
        };
        let Some(file) = job.files.get_mut(index) else {
            log::warn!(
                "Dropping update for job {}: file index {} out of range ({} files)",
                job_id,
                index,
                job.total_files
            );
            return false;
        };
        if !file.status.can_advance_to(update.status) {
            log::warn!(
                "Dropping update for job {} file '{}': cannot move from {:?} to {:?}",
                job_id,
                file.filename,
                file.status,
                update.status
            );
            return false;
        }

        log::debug!(
            "Job {} file '{}': {} ({})",
            job_id,
            file.filename,
            update.phase,
            update.message
        );
        file.status = update.status;
        file.phase = update.phase;
        file.message = update.message;
        if update.result.is_some() {
            file.result = update.result;
        }
        true
    }

    /// Marks a job completed. Returns false when the job is unknown.
    pub fn complete(&self, job_id: &str) -> bool {
        let mut jobs = self.write_jobs();
        let Some(job) = jobs.get_mut(job_id) else {
            log::warn!("Cannot complete unknown job {}", job_id);
            return false;
        };
        if job.is_completed() {
            return true;
        }
        if !job.all_files_terminal() {
            log::warn!("Completing job {} while some files are not terminal", job_id);
        }
        job.status = JobStatus::Completed;
        job.completed_at = Some(Utc::now());
        log::info!("Job {} completed", job_id);
        true
    }

    /// Moves every non-terminal file of a job to error. Returns how many
    /// files were changed.
    pub fn fail_unfinished(&self, job_id: &str, message: &str) -> usize {
        let mut jobs = self.write_jobs();
        let Some(job) = jobs.get_mut(job_id) else {
            return 0;
        };

        let mut failed = 0;
        for file in job.files.iter_mut().filter(|f| !f.status.is_terminal()) {
            let update = FileUpdate::failed(&file.filename, message);
            file.status = update.status;
            file.phase = update.phase;
            file.message = update.message;
            file.result = update.result;
            failed += 1;
        }
        if failed > 0 {
            log::error!(
                "Job {}: {} file(s) left unfinished, marked as error",
                job_id,
                failed
            );
        }
        failed
    }

    /// Removes a job. Returns false when it did not exist.
    pub fn delete(&self, job_id: &str) -> bool {
        let removed = self.write_jobs().remove(job_id).is_some();
        if removed {
            log::info!("Deleted job {}", job_id);
        }
        removed
    }

    /// Per-file results once the job is completed, in submission order.
    pub fn results(&self, job_id: &str) -> Option<JobResults> {
        let jobs = self.read_jobs();
        let job = jobs.get(job_id)?;
        if !job.is_completed() {
            return Some(JobResults::Processing);
        }

        let results: Vec<FileResult> = job
            .files
            .iter()
            .map(|file| {
                file.result.clone().unwrap_or_else(|| {
                    FileResult::error(file.filename.as_str(), file.message.as_str())
                })
            })
            .collect();
        Some(JobResults::Completed(results))
    }

    pub fn counts(&self) -> JobCounts {
        let jobs = self.read_jobs();
        let completed = jobs.values().filter(|j| j.is_completed()).count();
        JobCounts {
            processing: jobs.len() - completed,
            completed,
        }
    }

    pub fn len(&self) -> usize {
        self.read_jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_jobs().is_empty()
    }

    pub fn file_status(&self, job_id: &str, index: usize) -> Option<FileStatus> {
        self.read_jobs()
            .get(job_id)
            .and_then(|job| job.files.get(index))
            .map(|file| file.status)
    }
}
