pub mod analysis;
pub mod config;
pub mod error;
pub mod fields;
pub mod jobs;
pub mod pipeline;
pub mod secrets;
pub mod upload;

pub use analysis::{AnalysisSession, AzureAnalyzer, DocumentAnalyzer, ModelSelector};
pub use config::{load_config, Config};
pub use error::{AnalysisError, ConfigError, DocintelError, Result, UploadError};
pub use fields::{CanonicalFields, FieldNormalizer, FieldRecord};
pub use jobs::{FileResult, Job, JobResults, JobStore};
pub use pipeline::{FileProcessor, JobOrchestrator, SubmittedJob};
pub use secrets::{SecretError, SecretSource};
pub use upload::{validate_uploads, UploadedFile};
