use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Checks settings that serde alone cannot. Credentials are not required
/// here; they are checked when the analysis client is built.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config.canonical_fields()?;

    if config.allowed_extensions.is_empty() {
        return Err(ConfigError::InvalidSetting {
            name: "allowed_extensions",
            reason: "at least one extension is required".to_string(),
        });
    }
    for extension in &config.allowed_extensions {
        if !extension.starts_with('.') || extension.len() < 2 {
            return Err(ConfigError::InvalidSetting {
                name: "allowed_extensions",
                reason: format!("'{}' must look like '.pdf'", extension),
            });
        }
    }

    if config.poll_interval_ms == 0 {
        return Err(ConfigError::InvalidSetting {
            name: "poll_interval_ms",
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(())
}
