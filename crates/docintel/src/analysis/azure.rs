//! Azure AI Document Intelligence REST client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use super::wire::{AnalyzeOperation, OperationStatus};
use super::{AnalysisSession, AnalyzeRequest, DocumentAnalyzer, PendingAnalysis};
use crate::config::schema::{Config, ENV_API_KEY};
use crate::error::{AnalysisError, ConfigError};
use crate::fields::AnalysisResult;
use crate::secrets::SecretError;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "operation-location";

/// Default timeout for establishing a connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default timeout for a single request; uploads can be large.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum length of a service error body kept in errors and logs.
const MAX_ERROR_BODY_LENGTH: usize = 500;

fn truncate_error_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let kept: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", kept)
    } else {
        body.to_string()
    }
}

fn create_http_client() -> Result<Client, AnalysisError> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AnalysisError::Session(format!("Failed to create HTTP client: {}", e)))
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Connection settings for one Document Intelligence resource.
#[derive(Debug)]
pub struct AzureSettings {
    /// Resource endpoint without a trailing slash.
    pub endpoint: String,
    pub api_key: SecretString,
    pub api_version: String,
    /// Delay between status polls when the service does not send `Retry-After`.
    pub poll_interval: Duration,
}

impl AzureSettings {
    /// Reads endpoint and key from the config. Missing values produce the
    /// message shown to callers when they try to submit.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let endpoint = config.require_endpoint()?.to_string();
        let api_key = config.api_key_source().resolve().map_err(|e| match e {
            SecretError::NoSourceProvided => ConfigError::MissingSetting {
                name: ENV_API_KEY,
                what: "API key",
            },
            SecretError::EnvVarNotSet { ref name } if name == ENV_API_KEY => {
                ConfigError::MissingSetting {
                    name: ENV_API_KEY,
                    what: "API key",
                }
            }
            other => ConfigError::Secret(other),
        })?;

        Ok(Self {
            endpoint,
            api_key,
            api_version: config.api_version.clone(),
            poll_interval: config.poll_interval(),
        })
    }

    pub fn analyze_url(&self, model_id: &str) -> String {
        format!(
            "{}/documentintelligence/documentModels/{}:analyze",
            self.endpoint, model_id
        )
    }

    pub fn analyze_query(&self, request: &AnalyzeRequest<'_>) -> Vec<(&'static str, String)> {
        let mut query = vec![("api-version", self.api_version.clone())];
        if !request.features.is_empty() {
            let features: Vec<&str> = request.features.iter().map(|f| f.as_str()).collect();
            query.push(("features", features.join(",")));
        }
        if !request.query_fields.is_empty() {
            query.push(("queryFields", request.query_fields.join(",")));
        }
        query
    }
}

/// [`DocumentAnalyzer`] backed by the Document Intelligence REST API.
#[derive(Debug, Clone)]
pub struct AzureAnalyzer {
    settings: Arc<AzureSettings>,
}

impl AzureAnalyzer {
    pub fn new(settings: AzureSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(AzureSettings::from_config(config)?))
    }

    pub fn settings(&self) -> &AzureSettings {
        &self.settings
    }
}

#[async_trait]
impl DocumentAnalyzer for AzureAnalyzer {
    async fn connect(&self) -> Result<Box<dyn AnalysisSession>, AnalysisError> {
        Ok(Box::new(AzureSession {
            client: create_http_client()?,
            settings: Arc::clone(&self.settings),
        }))
    }
}

/// One HTTP client per analysed file; dropped on close.
struct AzureSession {
    client: Client,
    settings: Arc<AzureSettings>,
}

#[async_trait]
impl AnalysisSession for AzureSession {
    async fn begin_analysis(
        &mut self,
        request: &AnalyzeRequest<'_>,
    ) -> Result<PendingAnalysis, AnalysisError> {
        let url = self.settings.analyze_url(request.model.model_id());
        debug!(
            "Submitting {} bytes ({}) to model {}",
            request.document.len(),
            request.content_type,
            request.model
        );

        let response = self
            .client
            .post(&url)
            .query(&self.settings.analyze_query(request))
            .header(SUBSCRIPTION_KEY_HEADER, self.settings.api_key.expose_secret())
            .header(CONTENT_TYPE, request.content_type.as_str())
            .body(request.document.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Rejected {
                status: status.as_u16(),
                body: truncate_error_body(&body),
            });
        }

        let operation_location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AnalysisError::MissingOperationLocation)?
            .to_string();
        info!("Analysis accepted by model {}", request.model);

        Ok(PendingAnalysis {
            operation_location,
            retry_after: retry_after(response.headers()),
        })
    }

    async fn wait_for_result(
        &mut self,
        pending: PendingAnalysis,
    ) -> Result<AnalysisResult, AnalysisError> {
        let mut delay = pending.retry_after.unwrap_or(self.settings.poll_interval);

        loop {
            tokio::time::sleep(delay).await;

            let response = self
                .client
                .get(&pending.operation_location)
                .header(SUBSCRIPTION_KEY_HEADER, self.settings.api_key.expose_secret())
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AnalysisError::Rejected {
                    status: status.as_u16(),
                    body: truncate_error_body(&body),
                });
            }

            let next_delay = retry_after(response.headers());
            let operation: AnalyzeOperation = response.json().await.map_err(|e| {
                AnalysisError::InvalidResponse(format!("Failed to parse operation status: {}", e))
            })?;

            match operation.status {
                OperationStatus::Succeeded => {
                    let result = operation.analyze_result.ok_or_else(|| {
                        AnalysisError::InvalidResponse(
                            "Succeeded operation has no analyzeResult".to_string(),
                        )
                    })?;
                    if let Some(model_id) = &result.model_id {
                        debug!("Analysis finished with model {}", model_id);
                    }
                    return Ok(AnalysisResult::from(result));
                }
                OperationStatus::Failed | OperationStatus::Canceled => {
                    let error = operation.error.unwrap_or_default();
                    return Err(AnalysisError::OperationFailed {
                        code: error.code.unwrap_or_else(|| "unknown".to_string()),
                        message: error
                            .message
                            .unwrap_or_else(|| format!("operation {:?}", operation.status)),
                    });
                }
                OperationStatus::NotStarted | OperationStatus::Running => {
                    delay = next_delay.unwrap_or(self.settings.poll_interval);
                    debug!("Analysis still running, polling again in {:?}", delay);
                }
                OperationStatus::Unknown => {
                    return Err(AnalysisError::InvalidResponse(
                        "Unrecognised operation status".to_string(),
                    ));
                }
            }
        }
    }

    async fn close(self: Box<Self>) -> Result<(), AnalysisError> {
        debug!("Closing analysis session");
        Ok(())
    }
}
