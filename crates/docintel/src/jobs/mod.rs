pub mod model;
pub mod store;

pub use model::{
    generate_job_id, FileEntry, FilePhase, FileResult, FileStatus, FileUpdate, Job, JobResults,
    JobStatus, ResultStatus,
};
pub use store::{JobCounts, JobStore};
