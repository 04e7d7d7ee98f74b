use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::fields::{CanonicalFields, DEFAULT_EXPECTED_FIELDS};
use crate::secrets::SecretSource;

pub const ENV_ENDPOINT: &str = "AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT";
pub const ENV_API_KEY: &str = "AZURE_DOCUMENT_INTELLIGENCE_KEY";
pub const ENV_MODEL_ID: &str = "AZURE_DOCUMENT_MODEL_ID";
pub const ENV_API_VERSION: &str = "AZURE_DOCUMENT_API_VERSION";
pub const ENV_EXPECTED_FIELDS: &str = "DOCINTEL_EXPECTED_FIELDS";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_POLL_INTERVAL_MS: &str = "DOCINTEL_POLL_INTERVAL_MS";
pub const ENV_ANALYSIS_TIMEOUT_SECS: &str = "DOCINTEL_ANALYSIS_TIMEOUT_SECS";
pub const ENV_MAX_UPLOAD_BYTES: &str = "DOCINTEL_MAX_UPLOAD_BYTES";
pub const ENV_LOG_DIR: &str = "DOCINTEL_LOG_DIR";

#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base URL of the analysis service resource.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key inline. Prefer `api_key_file` or `api_key_env` outside local testing.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Canonical field names, in output order.
    #[serde(default = "default_expected_fields")]
    pub expected_fields: Vec<String>,
    /// Accepted upload extensions, lower-case with a leading dot.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on one file's analysis call; `0` disables the limit.
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_api_key_env() -> Option<String> {
    Some(ENV_API_KEY.to_string())
}

fn default_model_id() -> String {
    "prebuilt-layout".to_string()
}

fn default_api_version() -> String {
    "2024-11-30".to_string()
}

fn default_expected_fields() -> Vec<String> {
    DEFAULT_EXPECTED_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".pdf".to_string()]
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_analysis_timeout_secs() -> u64 {
    600
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_key_file: None,
            api_key_env: default_api_key_env(),
            model_id: default_model_id(),
            api_version: default_api_version(),
            expected_fields: default_expected_fields(),
            allowed_extensions: default_allowed_extensions(),
            host: default_host(),
            port: default_port(),
            poll_interval_ms: default_poll_interval_ms(),
            analysis_timeout_secs: default_analysis_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            log_dir: default_log_dir(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_file", &self.api_key_file)
            .field("api_key_env", &self.api_key_env)
            .field("model_id", &self.model_id)
            .field("api_version", &self.api_version)
            .field("expected_fields", &self.expected_fields)
            .field("allowed_extensions", &self.allowed_extensions)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("analysis_timeout_secs", &self.analysis_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Overwrites settings whose environment variable is set and non-blank.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(endpoint) = env_value(ENV_ENDPOINT) {
            self.endpoint = Some(endpoint);
        }
        if let Some(model_id) = env_value(ENV_MODEL_ID) {
            self.model_id = model_id;
        }
        if let Some(api_version) = env_value(ENV_API_VERSION) {
            self.api_version = api_version;
        }
        if let Some(fields) = env_value(ENV_EXPECTED_FIELDS) {
            self.expected_fields = fields
                .split(',')
                .map(|name| name.trim().to_string())
                .collect();
        }
        if let Some(host) = env_value(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = env_parsed(ENV_PORT, "a port number")? {
            self.port = port;
        }
        if let Some(interval) = env_parsed(ENV_POLL_INTERVAL_MS, "milliseconds")? {
            self.poll_interval_ms = interval;
        }
        if let Some(timeout) = env_parsed(ENV_ANALYSIS_TIMEOUT_SECS, "seconds")? {
            self.analysis_timeout_secs = timeout;
        }
        if let Some(limit) = env_parsed(ENV_MAX_UPLOAD_BYTES, "a byte count")? {
            self.max_upload_bytes = limit;
        }
        if let Some(log_dir) = env_value(ENV_LOG_DIR) {
            self.log_dir = log_dir;
        }
        Ok(())
    }

    pub fn canonical_fields(&self) -> Result<CanonicalFields, ConfigError> {
        CanonicalFields::new(self.expected_fields.iter().map(|s| s.trim().to_string()))
    }

    pub fn api_key_source(&self) -> SecretSource<'_> {
        SecretSource::new(
            self.api_key.as_deref(),
            self.api_key_file.as_deref(),
            self.api_key_env.as_deref(),
        )
    }

    /// The configured endpoint without a trailing slash.
    pub fn require_endpoint(&self) -> Result<&str, ConfigError> {
        self.endpoint
            .as_deref()
            .map(|e| e.trim().trim_end_matches('/'))
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::MissingSetting {
                name: ENV_ENDPOINT,
                what: "endpoint",
            })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn analysis_timeout(&self) -> Option<Duration> {
        (self.analysis_timeout_secs > 0).then(|| Duration::from_secs(self.analysis_timeout_secs))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env_value(name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue {
                name,
                value,
                expected,
            }),
    }
}
