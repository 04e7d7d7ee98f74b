//! Builders for analysis results and wired-up orchestrators.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use docintel::analysis::{DocumentAnalyzer, ModelSelector};
use docintel::fields::{
    AnalysisResult, AnalyzedDocument, CanonicalFields, FieldNormalizer, FieldValue, KeyValuePair,
    RawField,
};
use docintel::jobs::{Job, JobStore};
use docintel::pipeline::{FileProcessor, JobOrchestrator};

/// Builder for [`AnalysisResult`] values.
#[derive(Default)]
pub struct ResultBuilder {
    fields: Vec<(String, RawField)>,
    pairs: Vec<KeyValuePair>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, label: &str, value: &str) -> Self {
        self.fields.push((
            label.to_string(),
            RawField::new(FieldValue::Text(value.to_string())).with_confidence(0.95),
        ));
        self
    }

    pub fn field(mut self, label: &str, field: RawField) -> Self {
        self.fields.push((label.to_string(), field));
        self
    }

    pub fn pair(mut self, key: &str, value: &str) -> Self {
        self.pairs.push(KeyValuePair::new(key, value));
        self
    }

    pub fn build(self) -> AnalysisResult {
        let documents = if self.fields.is_empty() {
            Vec::new()
        } else {
            vec![AnalyzedDocument::new(self.fields)]
        };
        AnalysisResult {
            documents,
            key_value_pairs: self.pairs,
        }
    }
}

/// A typical utility bill with every default canonical field populated.
pub fn complete_bill() -> AnalysisResult {
    ResultBuilder::new()
        .text("SupplyAddress1", "1 High Street")
        .text("SupplyAddress2", "Leeds LS1 1AA")
        .text("ConsumptionPeriod", "01/01/2024 - 31/01/2024")
        .text("AccountNo", "A-1234")
        .text("FixedEnergyPriceRate", "24.50p/kWh")
        .text("TotalPayWithAllCharges", "£142.50")
        .text("TotalEnergyCharge", "£120.00")
        .build()
}

pub struct OrchestratorBuilder {
    analyzer: Arc<dyn DocumentAnalyzer>,
    canonical: CanonicalFields,
    model: ModelSelector,
    timeout: Option<Duration>,
}

impl OrchestratorBuilder {
    pub fn new(analyzer: impl DocumentAnalyzer + 'static) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            canonical: CanonicalFields::default(),
            model: ModelSelector::parse("prebuilt-layout"),
            timeout: None,
        }
    }

    pub fn canonical(mut self, names: &[&str]) -> Self {
        self.canonical = CanonicalFields::new(names.iter().copied()).unwrap();
        self
    }

    pub fn model(mut self, model_id: &str) -> Self {
        self.model = ModelSelector::parse(model_id);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> (JobOrchestrator, Arc<JobStore>) {
        let store = Arc::new(JobStore::new());
        let processor = FileProcessor::new(
            self.analyzer,
            FieldNormalizer::new(self.canonical),
            self.model,
        )
        .with_timeout(self.timeout);
        (
            JobOrchestrator::new(Arc::clone(&store), Arc::new(processor)),
            store,
        )
    }
}

/// Polls the store until `ready` holds for the job, yielding between checks.
pub async fn wait_for(store: &JobStore, job_id: &str, ready: impl Fn(&Job) -> bool) {
    for _ in 0..1000 {
        if store.get(job_id).is_some_and(|job| ready(&job)) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {} never reached the expected state", job_id);
}
