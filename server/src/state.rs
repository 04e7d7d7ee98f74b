//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use docintel::analysis::DocumentAnalyzer;
use docintel::config::Config;
use docintel::{
    AzureAnalyzer, ConfigError, FieldNormalizer, FileProcessor, JobOrchestrator, JobStore,
    ModelSelector,
};
use log::{info, warn};

/// Whether jobs can be submitted.
pub enum Analysis {
    Ready(JobOrchestrator),
    /// The analysis client could not be built; the reason is reported to
    /// callers of the submit endpoint.
    Unavailable(String),
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JobStore>,
    pub analysis: Arc<Analysis>,
    pub allowed_extensions: Arc<Vec<String>>,
}

impl AppState {
    /// Builds the state from configuration. Missing credentials leave the
    /// server running with submission disabled.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let store = Arc::new(JobStore::new());
        let analysis = match AzureAnalyzer::from_config(config) {
            Ok(analyzer) => {
                info!(
                    "Analysis client ready for {} (model {})",
                    analyzer.settings().endpoint,
                    config.model_id
                );
                Analysis::Ready(build_orchestrator(
                    Arc::clone(&store),
                    Arc::new(analyzer),
                    config,
                )?)
            }
            Err(e) => {
                warn!("Document analysis is unavailable: {}", e);
                Analysis::Unavailable(e.to_string())
            }
        };

        Ok(Self {
            store,
            analysis: Arc::new(analysis),
            allowed_extensions: Arc::new(config.allowed_extensions.clone()),
        })
    }

    /// Builds the state around an existing analyzer.
    pub fn with_analyzer(
        analyzer: Arc<dyn DocumentAnalyzer>,
        config: &Config,
    ) -> Result<Self, ConfigError> {
        let store = Arc::new(JobStore::new());
        let orchestrator = build_orchestrator(Arc::clone(&store), analyzer, config)?;
        Ok(Self {
            store,
            analysis: Arc::new(Analysis::Ready(orchestrator)),
            allowed_extensions: Arc::new(config.allowed_extensions.clone()),
        })
    }
}

fn build_orchestrator(
    store: Arc<JobStore>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    config: &Config,
) -> Result<JobOrchestrator, ConfigError> {
    let processor = FileProcessor::new(
        analyzer,
        FieldNormalizer::new(config.canonical_fields()?),
        ModelSelector::parse(&config.model_id),
    )
    .with_timeout(config.analysis_timeout());
    Ok(JobOrchestrator::new(store, Arc::new(processor)))
}
