//! Document analysis service seam.
//!
//! A [`DocumentAnalyzer`] opens one [`AnalysisSession`] per file. The session
//! submits the document, waits for the long-running operation to finish and
//! is closed by the caller on every exit path.

pub mod azure;
pub mod wire;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::fields::{AnalysisResult, CanonicalFields};

pub use azure::AzureAnalyzer;

const PREBUILT_PREFIX: &str = "prebuilt-";
const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Opens a session for analysing one document.
    async fn connect(&self) -> Result<Box<dyn AnalysisSession>, AnalysisError>;
}

#[async_trait]
pub trait AnalysisSession: Send {
    /// Submits a document and returns a handle to the running operation.
    async fn begin_analysis(
        &mut self,
        request: &AnalyzeRequest<'_>,
    ) -> Result<PendingAnalysis, AnalysisError>;

    /// Waits until the operation has finished and returns its result.
    async fn wait_for_result(
        &mut self,
        pending: PendingAnalysis,
    ) -> Result<AnalysisResult, AnalysisError>;

    /// Releases the session.
    async fn close(self: Box<Self>) -> Result<(), AnalysisError>;
}

/// Handle to a submitted, not yet finished analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnalysis {
    /// URL the operation status is read from.
    pub operation_location: String,
    /// Delay the service asked for before the first poll.
    pub retry_after: Option<Duration>,
}

/// Optional analysis capabilities a request may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisFeature {
    KeyValuePairs,
    QueryFields,
}

impl AnalysisFeature {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisFeature::KeyValuePairs => "keyValuePairs",
            AnalysisFeature::QueryFields => "queryFields",
        }
    }
}

/// Which model to analyse with. Prebuilt models are generic and need the
/// extra features to surface key-value pairs; custom models emit structured
/// fields themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelector {
    Prebuilt(String),
    Custom(String),
}

impl ModelSelector {
    pub fn parse(model_id: &str) -> Self {
        let model_id = model_id.trim();
        if model_id.starts_with(PREBUILT_PREFIX) {
            ModelSelector::Prebuilt(model_id.to_string())
        } else {
            ModelSelector::Custom(model_id.to_string())
        }
    }

    pub fn model_id(&self) -> &str {
        match self {
            ModelSelector::Prebuilt(id) | ModelSelector::Custom(id) => id,
        }
    }

    pub fn is_prebuilt(&self) -> bool {
        matches!(self, ModelSelector::Prebuilt(_))
    }
}

impl std::fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.model_id())
    }
}

/// One document submission.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest<'a> {
    pub model: &'a ModelSelector,
    pub document: &'a [u8],
    pub content_type: String,
    pub features: Vec<AnalysisFeature>,
    /// Field names the service should look for explicitly.
    pub query_fields: Vec<String>,
}

impl<'a> AnalyzeRequest<'a> {
    /// Builds the request for `filename`, asking prebuilt models for
    /// key-value pairs and the canonical names as query fields.
    pub fn new(
        model: &'a ModelSelector,
        document: &'a [u8],
        filename: &str,
        canonical: &CanonicalFields,
    ) -> Self {
        let (features, query_fields) = if model.is_prebuilt() {
            (
                vec![AnalysisFeature::KeyValuePairs, AnalysisFeature::QueryFields],
                canonical.names().to_vec(),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        Self {
            model,
            document,
            content_type: content_type_for(filename),
            features,
            query_fields,
        }
    }
}

/// MIME type guessed from the file name, `application/pdf` when unknown.
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_selector() {
        let prebuilt = ModelSelector::parse("prebuilt-layout");
        assert!(prebuilt.is_prebuilt());
        assert_eq!(prebuilt.model_id(), "prebuilt-layout");

        let custom = ModelSelector::parse(" utility-bills-v2 ");
        assert!(!custom.is_prebuilt());
        assert_eq!(custom.to_string(), "utility-bills-v2");
    }

    #[test]
    fn test_prebuilt_request_features() {
        let model = ModelSelector::parse("prebuilt-document");
        let canonical = CanonicalFields::default();
        let request = AnalyzeRequest::new(&model, b"%PDF", "bill.pdf", &canonical);

        assert_eq!(
            request.features,
            vec![AnalysisFeature::KeyValuePairs, AnalysisFeature::QueryFields]
        );
        assert_eq!(request.query_fields, canonical.names());
        assert_eq!(request.content_type, "application/pdf");
    }

    #[test]
    fn test_custom_request_has_no_features() {
        let model = ModelSelector::parse("utility-bills-v2");
        let request = AnalyzeRequest::new(&model, b"%PDF", "bill.pdf", &CanonicalFields::default());

        assert!(request.features.is_empty());
        assert!(request.query_fields.is_empty());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("scan.PNG"), "image/png");
        assert_eq!(content_type_for("bill.pdf"), "application/pdf");
        assert_eq!(content_type_for("no_extension"), "application/pdf");
    }
}
