//! REST client tests against a mock Document Intelligence endpoint.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docintel::analysis::azure::AzureSettings;
use docintel::analysis::{
    AnalysisSession, AnalyzeRequest, AzureAnalyzer, DocumentAnalyzer, ModelSelector,
};
use docintel::fields::{CanonicalFields, FieldNormalizer, FieldValue};
use docintel::AnalysisError;

const ANALYZE_PATH: &str = "/documentintelligence/documentModels/prebuilt-layout:analyze";
const DOCUMENT: &[u8] = b"%PDF-1.7 test document";

fn analyzer(server: &MockServer) -> AzureAnalyzer {
    AzureAnalyzer::new(AzureSettings {
        endpoint: server.uri(),
        api_key: SecretString::from("test-key".to_string()),
        api_version: "2024-11-30".to_string(),
        poll_interval: Duration::from_millis(10),
    })
}

async fn mount_accepted(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(query_param("api-version", "2024-11-30"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Operation-Location", format!("{}/operations/op-1", server.uri()).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn succeeded_body() -> serde_json::Value {
    json!({
        "status": "succeeded",
        "analyzeResult": {
            "modelId": "prebuilt-layout",
            "documents": [{
                "docType": "prebuilt-layout",
                "fields": {
                    "AccountNo": {"type": "string", "valueString": "A-1234", "confidence": 0.97}
                }
            }],
            "keyValuePairs": [
                {"key": {"content": "Total Energy Charge"}, "value": {"content": "£120.00"}, "confidence": 0.88}
            ]
        }
    })
}

#[tokio::test]
async fn test_submit_and_poll_until_succeeded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(query_param("api-version", "2024-11-30"))
        .and(query_param("features", "keyValuePairs,queryFields"))
        .and(query_param("queryFields", "AccountNo,TotalEnergyCharge"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .and(header("content-type", "application/pdf"))
        .and(body_bytes(DOCUMENT.to_vec()))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Operation-Location", format!("{}/operations/op-1", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(succeeded_body()))
        .mount(&server)
        .await;

    let canonical = CanonicalFields::new(["AccountNo", "TotalEnergyCharge"]).unwrap();
    let model = ModelSelector::parse("prebuilt-layout");
    let request = AnalyzeRequest::new(&model, DOCUMENT, "bill.pdf", &canonical);

    let mut session = analyzer(&server).connect().await.unwrap();
    let pending = session.begin_analysis(&request).await.unwrap();
    assert_eq!(pending.operation_location, format!("{}/operations/op-1", server.uri()));

    let result = session.wait_for_result(pending).await.unwrap();
    session.close().await.unwrap();

    assert_eq!(result.documents.len(), 1);
    assert_eq!(
        result.documents[0].fields[0].1.value,
        FieldValue::Text("A-1234".to_string())
    );

    let records = FieldNormalizer::new(canonical).normalize(&result);
    assert_eq!(records[0].field_name, "AccountNo");
    assert_eq!(records[0].field_value, "A-1234");
    assert_eq!(records[0].confidence, Some(97.0));
    assert_eq!(records[1].field_name, "TotalEnergyCharge");
    assert_eq!(records[1].field_value, "£120.00");
    assert_eq!(records[1].confidence, Some(88.0));
}

#[tokio::test]
async fn test_rejected_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "401", "message": "Access denied due to invalid subscription key."}
        })))
        .mount(&server)
        .await;

    let model = ModelSelector::parse("prebuilt-layout");
    let request = AnalyzeRequest::new(&model, DOCUMENT, "bill.pdf", &CanonicalFields::default());
    let mut session = analyzer(&server).connect().await.unwrap();

    match session.begin_analysis(&request).await {
        Err(AnalysisError::Rejected { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid subscription key"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_operation_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let model = ModelSelector::parse("prebuilt-layout");
    let request = AnalyzeRequest::new(&model, DOCUMENT, "bill.pdf", &CanonicalFields::default());
    let mut session = analyzer(&server).connect().await.unwrap();

    assert!(matches!(
        session.begin_analysis(&request).await,
        Err(AnalysisError::MissingOperationLocation)
    ));
}

#[tokio::test]
async fn test_failed_operation_carries_service_message() {
    let server = MockServer::start().await;
    mount_accepted(&server).await;
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "error": {"code": "InvalidContent", "message": "The file is corrupted or format is unsupported."}
        })))
        .mount(&server)
        .await;

    let model = ModelSelector::parse("prebuilt-layout");
    let request = AnalyzeRequest::new(&model, DOCUMENT, "bill.pdf", &CanonicalFields::default());
    let mut session = analyzer(&server).connect().await.unwrap();
    let pending = session.begin_analysis(&request).await.unwrap();

    let err = session.wait_for_result(pending).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Analysis operation failed (InvalidContent): The file is corrupted or format is unsupported."
    );
}

#[tokio::test]
async fn test_unparsable_status_body() {
    let server = MockServer::start().await;
    mount_accepted(&server).await;
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let model = ModelSelector::parse("prebuilt-layout");
    let request = AnalyzeRequest::new(&model, DOCUMENT, "bill.pdf", &CanonicalFields::default());
    let mut session = analyzer(&server).connect().await.unwrap();
    let pending = session.begin_analysis(&request).await.unwrap();

    assert!(matches!(
        session.wait_for_result(pending).await,
        Err(AnalysisError::InvalidResponse(_))
    ));
}
