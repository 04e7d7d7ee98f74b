//! Drives a single file through analysis and normalization.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, info_span, warn, Instrument};

use crate::analysis::{AnalysisSession, AnalyzeRequest, DocumentAnalyzer, ModelSelector};
use crate::error::AnalysisError;
use crate::fields::{AnalysisResult, FieldNormalizer, FieldRecord};
use crate::jobs::{FilePhase, FileResult, FileUpdate};
use crate::pipeline::progress::ProgressReporter;

pub struct FileProcessor {
    analyzer: Arc<dyn DocumentAnalyzer>,
    normalizer: FieldNormalizer,
    model: ModelSelector,
    timeout: Option<Duration>,
}

impl FileProcessor {
    pub fn new(
        analyzer: Arc<dyn DocumentAnalyzer>,
        normalizer: FieldNormalizer,
        model: ModelSelector,
    ) -> Self {
        Self {
            analyzer,
            normalizer,
            model,
            timeout: None,
        }
    }

    /// Bounds the analysis call (submission and polling) for each file.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &ModelSelector {
        &self.model
    }

    /// Processes one file and reports every phase through `progress`. The
    /// last report is always terminal; errors never escape.
    pub async fn process(
        &self,
        content: &[u8],
        filename: &str,
        progress: &dyn ProgressReporter,
    ) -> FileResult {
        progress.report(FileUpdate::phase(FilePhase::Uploading));

        match self.extract(content, filename, progress).await {
            Ok(fields) => {
                info!("Extracted {} field(s) from {}", fields.len(), filename);
                let result = FileResult::success(filename, fields);
                progress.report(FileUpdate::completed(result.clone()));
                result
            }
            Err(e) => {
                let message = e.to_string();
                error!("Processing {} failed: {}", filename, message);
                let update = FileUpdate::failed(filename, message.clone());
                progress.report(update);
                FileResult::error(filename, message)
            }
        }
    }

    async fn extract(
        &self,
        content: &[u8],
        filename: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<FieldRecord>, AnalysisError> {
        let mut session = self.analyzer.connect().await?;
        let outcome = self
            .analyze(session.as_mut(), content, filename, progress)
            .instrument(info_span!("analyze", model = %self.model))
            .await;

        if let Err(e) = session.close().await {
            warn!("Failed to close analysis session for {}: {}", filename, e);
        }

        let result = outcome?;
        progress.report(FileUpdate::phase(FilePhase::ExtractingFields));
        Ok(self.normalizer.normalize(&result))
    }

    async fn analyze(
        &self,
        session: &mut dyn AnalysisSession,
        content: &[u8],
        filename: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<AnalysisResult, AnalysisError> {
        let request = AnalyzeRequest::new(&self.model, content, filename, self.normalizer.canonical());
        progress.report(FileUpdate::phase(FilePhase::Sending));

        let call = async {
            progress.report(FileUpdate::phase(FilePhase::CallingApi));
            let pending = session.begin_analysis(&request).await?;
            progress.report(FileUpdate::phase(FilePhase::WaitingForResult));
            session.wait_for_result(pending).await
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| AnalysisError::Timeout(limit.as_secs()))?,
            None => call.await,
        }
    }
}
