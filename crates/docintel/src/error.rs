use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocintelError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("{name} is not set. Please configure the document analysis {what}.")]
    MissingSetting { name: &'static str, what: &'static str },

    #[error("Environment variable {name} has invalid value '{value}': expected {expected}")]
    InvalidEnvValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("Invalid expected field list: {reason}")]
    InvalidExpectedFields { reason: String },

    #[error("Failed to resolve API key: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("HTTP request to analysis service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Analysis service response did not include an Operation-Location header")]
    MissingOperationLocation,

    #[error("Analysis operation failed ({code}): {message}")]
    OperationFailed { code: String, message: String },

    #[error("Invalid analysis response: {0}")]
    InvalidResponse(String),

    #[error("Analysis did not finish within {0} seconds")]
    Timeout(u64),

    #[error("Analysis session error: {0}")]
    Session(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UploadError {
    #[error("No files provided")]
    NoFiles,

    #[error("Only {allowed} files are supported. Received invalid files: {}", .files.join(", "))]
    InvalidExtensions { allowed: String, files: Vec<String> },

    #[error("File '{0}' is empty")]
    EmptyFile(String),
}

pub type Result<T> = std::result::Result<T, DocintelError>;
