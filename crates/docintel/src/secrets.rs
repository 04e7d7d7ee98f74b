//! Resolution of the analysis service API key.
//!
//! The key can be supplied in three ways, checked in this order:
//!
//! 1. **Direct value** (`api_key` in the config file) for local testing
//! 2. **File reference** (`api_key_file`) for Docker/Kubernetes mounted secrets
//! 3. **Env var reference** (`api_key_env`, defaults to
//!    `AZURE_DOCUMENT_INTELLIGENCE_KEY`)
//!
//! The resolved key is wrapped in a [`SecretString`] so it never shows up in
//! `Debug` output or logs.

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },

    #[error("Secret from {origin} is empty")]
    Empty { origin: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Where a secret may come from. Empty strings count as "not provided".
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSource<'a> {
    pub direct: Option<&'a str>,
    pub file_path: Option<&'a str>,
    pub env_var: Option<&'a str>,
}

impl<'a> SecretSource<'a> {
    pub fn new(direct: Option<&'a str>, file_path: Option<&'a str>, env_var: Option<&'a str>) -> Self {
        Self {
            direct: non_empty(direct),
            file_path: non_empty(file_path),
            env_var: non_empty(env_var),
        }
    }

    /// True if at least one source is configured.
    pub fn is_configured(&self) -> bool {
        self.direct.is_some() || self.file_path.is_some() || self.env_var.is_some()
    }

    /// Resolves the first configured source. Values are trimmed; a source
    /// that resolves to an empty string is an error rather than a fallthrough.
    pub fn resolve(&self) -> Result<SecretString> {
        if let Some(value) = self.direct {
            return Ok(SecretString::from(value.trim().to_string()));
        }

        if let Some(path) = self.file_path {
            let expanded = expand_home(path);
            let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
                path: expanded.clone(),
                source: e,
            })?;
            return checked(content.trim(), || format!("file '{}'", expanded));
        }

        if let Some(name) = self.env_var {
            return match std::env::var(name) {
                Ok(value) => checked(value.trim(), || format!("environment variable '{}'", name)),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn checked(value: &str, origin: impl FnOnce() -> String) -> Result<SecretString> {
    if value.is_empty() {
        return Err(SecretError::Empty { origin: origin() });
    }
    Ok(SecretString::from(value.to_string()))
}

/// Expands a leading `~` to the user's home directory (HOME, then USERPROFILE).
/// `~user/path` is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
