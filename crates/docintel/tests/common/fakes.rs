//! In-memory analyzers standing in for the remote service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use docintel::analysis::{
    AnalysisFeature, AnalysisSession, AnalyzeRequest, DocumentAnalyzer, PendingAnalysis,
};
use docintel::fields::AnalysisResult;
use docintel::AnalysisError;

/// What the fake service does with a given document.
#[derive(Clone)]
pub enum Script {
    Succeed(AnalysisResult),
    Fail(String),
    /// Never finishes.
    Hang,
    Panic,
    /// Succeeds once the gate is notified.
    Gated(Arc<Notify>, AnalysisResult),
}

/// A request as the fake service received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub model_id: String,
    pub content_type: String,
    pub features: Vec<AnalysisFeature>,
    pub query_fields: Vec<String>,
}

#[derive(Default)]
pub struct SessionStats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl SessionStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Picks a [`Script`] by document content.
pub struct ScriptedAnalyzer {
    scripts: HashMap<Vec<u8>, Script>,
    fail_close: bool,
    pub stats: Arc<SessionStats>,
}

impl ScriptedAnalyzer {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            fail_close: false,
            stats: Arc::new(SessionStats::default()),
        }
    }

    pub fn on(mut self, document: &[u8], script: Script) -> Self {
        self.scripts.insert(document.to_vec(), script);
        self
    }

    /// Every session reports an error when closed.
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

#[async_trait]
impl DocumentAnalyzer for ScriptedAnalyzer {
    async fn connect(&self) -> Result<Box<dyn AnalysisSession>, AnalysisError> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            scripts: self.scripts.clone(),
            fail_close: self.fail_close,
            stats: Arc::clone(&self.stats),
            current: None,
        }))
    }
}

struct ScriptedSession {
    scripts: HashMap<Vec<u8>, Script>,
    fail_close: bool,
    stats: Arc<SessionStats>,
    current: Option<Script>,
}

#[async_trait]
impl AnalysisSession for ScriptedSession {
    async fn begin_analysis(
        &mut self,
        request: &AnalyzeRequest<'_>,
    ) -> Result<PendingAnalysis, AnalysisError> {
        self.stats.requests.lock().unwrap().push(RecordedRequest {
            model_id: request.model.model_id().to_string(),
            content_type: request.content_type.clone(),
            features: request.features.clone(),
            query_fields: request.query_fields.clone(),
        });

        let script = self.scripts.get(request.document).cloned().ok_or_else(|| {
            AnalysisError::Rejected {
                status: 400,
                body: "unknown document".to_string(),
            }
        })?;
        self.current = Some(script);

        Ok(PendingAnalysis {
            operation_location: "memory://operations/1".to_string(),
            retry_after: None,
        })
    }

    async fn wait_for_result(
        &mut self,
        _pending: PendingAnalysis,
    ) -> Result<AnalysisResult, AnalysisError> {
        match self.current.take() {
            Some(Script::Succeed(result)) => Ok(result),
            Some(Script::Fail(message)) => Err(AnalysisError::OperationFailed {
                code: "InvalidContent".to_string(),
                message,
            }),
            Some(Script::Hang) => std::future::pending().await,
            Some(Script::Panic) => panic!("analysis backend crashed"),
            Some(Script::Gated(gate, result)) => {
                gate.notified().await;
                Ok(result)
            }
            None => Err(AnalysisError::Session("no analysis in progress".to_string())),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), AnalysisError> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(AnalysisError::Session("connection reset on close".to_string()));
        }
        Ok(())
    }
}

/// Analyzer whose sessions cannot be opened.
pub struct UnreachableAnalyzer;

#[async_trait]
impl DocumentAnalyzer for UnreachableAnalyzer {
    async fn connect(&self) -> Result<Box<dyn AnalysisSession>, AnalysisError> {
        Err(AnalysisError::Session("service unreachable".to_string()))
    }
}
