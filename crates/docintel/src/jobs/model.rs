//! Job and per-file state as reported to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::FieldRecord;

/// Status of a whole job. There is no job-level failure: a job is completed
/// once every file is terminal, whatever the per-file outcomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Completed,
}

/// Status of one file within a job. Only moves forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl FileStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Error)
    }

    fn rank(self) -> u8 {
        match self {
            FileStatus::Pending => 0,
            FileStatus::Processing => 1,
            FileStatus::Completed | FileStatus::Error => 2,
        }
    }

    /// Whether a file in `self` may be moved to `next`.
    pub fn can_advance_to(self, next: FileStatus) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

/// Step a file is at while being processed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilePhase {
    Queued,
    Uploading,
    Sending,
    CallingApi,
    WaitingForResult,
    ExtractingFields,
    Completed,
    Failed,
}

impl FilePhase {
    pub fn status(self) -> FileStatus {
        match self {
            FilePhase::Queued => FileStatus::Pending,
            FilePhase::Completed => FileStatus::Completed,
            FilePhase::Failed => FileStatus::Error,
            _ => FileStatus::Processing,
        }
    }

    /// Message shown to callers while the file is in this phase.
    pub fn message(self) -> &'static str {
        match self {
            FilePhase::Queued => "Queued for processing",
            FilePhase::Uploading => "Uploading document...",
            FilePhase::Sending => "Sending to analysis service...",
            FilePhase::CallingApi => "Calling analysis API...",
            FilePhase::WaitingForResult => "Waiting for analysis response...",
            FilePhase::ExtractingFields => "Extracting fields...",
            FilePhase::Completed => "Completed successfully",
            FilePhase::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for FilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilePhase::Queued => write!(f, "Queued"),
            FilePhase::Uploading => write!(f, "Uploading"),
            FilePhase::Sending => write!(f, "Sending"),
            FilePhase::CallingApi => write!(f, "Calling API"),
            FilePhase::WaitingForResult => write!(f, "Waiting for result"),
            FilePhase::ExtractingFields => write!(f, "Extracting fields"),
            FilePhase::Completed => write!(f, "Completed"),
            FilePhase::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Terminal outcome for one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileResult {
    pub filename: String,
    pub status: ResultStatus,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn success(filename: impl Into<String>, fields: Vec<FieldRecord>) -> Self {
        Self {
            filename: filename.into(),
            status: ResultStatus::Success,
            fields,
            error: None,
        }
    }

    pub fn error(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: ResultStatus::Error,
            fields: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEntry {
    pub filename: String,
    pub status: FileStatus,
    pub phase: FilePhase,
    pub message: String,
    #[serde(default)]
    pub result: Option<FileResult>,
}

impl FileEntry {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: FileStatus::Pending,
            phase: FilePhase::Queued,
            message: FilePhase::Queued.message().to_string(),
            result: None,
        }
    }
}

/// A batch of files submitted together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub job_id: String,
    pub total_files: usize,
    pub started_at: DateTime<Utc>,
    pub status: JobStatus,
    /// One entry per submitted file, in submission order.
    pub files: Vec<FileEntry>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(job_id: impl Into<String>, filenames: Vec<String>) -> Self {
        let files: Vec<FileEntry> = filenames.into_iter().map(FileEntry::new).collect();
        Self {
            job_id: job_id.into(),
            total_files: files.len(),
            started_at: Utc::now(),
            status: JobStatus::Processing,
            files,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    pub fn all_files_terminal(&self) -> bool {
        self.files.iter().all(|f| f.status.is_terminal())
    }
}

/// A change to one file, as written by its processor.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpdate {
    pub status: FileStatus,
    pub phase: FilePhase,
    pub message: String,
    pub result: Option<FileResult>,
}

impl FileUpdate {
    /// Moves the file into a non-terminal phase with that phase's message.
    pub fn phase(phase: FilePhase) -> Self {
        Self {
            status: phase.status(),
            phase,
            message: phase.message().to_string(),
            result: None,
        }
    }

    pub fn completed(result: FileResult) -> Self {
        Self {
            status: FileStatus::Completed,
            phase: FilePhase::Completed,
            message: FilePhase::Completed.message().to_string(),
            result: Some(result),
        }
    }

    /// Terminal failure; the message is the error text.
    pub fn failed(filename: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: FileStatus::Error,
            phase: FilePhase::Failed,
            result: Some(FileResult::error(filename, message.clone())),
            message,
        }
    }
}

/// Answer to a results query.
#[derive(Debug, Clone, PartialEq)]
pub enum JobResults {
    /// At least one file is still running; no partial results are exposed.
    Processing,
    Completed(Vec<FileResult>),
}

/// Builds a job id of the form `job_<YYYYmmdd_HHMMSS>_<8 hex>`.
pub fn generate_job_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("job_{}_{}", Utc::now().format("%Y%m%d_%H%M%S"), &suffix[..8])
}
