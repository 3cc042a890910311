//! Gemini analyzer against a mock `generateContent` endpoint.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clearsight::analysis::{ClauseVerdict, GeminiAnalyzer, PolicyAnalyzer, Recommendation};
use clearsight::config::StudyConfig;
use clearsight::error::{AnalysisError, StudyError};
use clearsight::observability::EventEmitter;
use clearsight::randomization::SessionSeed;
use clearsight::runner::StudyRunner;
use clearsight::screen::{ScriptedResponses, ScriptedScreen};
use clearsight::study::ConditionOrder;
use clearsight::study::content::{builtin_document, builtin_report};

const MODEL: &str = "test-model";
const ENDPOINT_PATH: &str = "/v1beta/models/test-model:generateContent";

fn success_body() -> serde_json::Value {
    let report = serde_json::to_string(&builtin_report()).unwrap();
    json!({ "candidates": [{ "content": { "parts": [{ "text": report }] } }] })
}

fn analyzer(server: &MockServer) -> GeminiAnalyzer {
    GeminiAnalyzer::new(server.uri(), MODEL, "secret-key").unwrap()
}

const RESPONSES: &str = "
transparent: { scores: [4, 4, 4] }
opaque: { scores: [3, 3, 3] }
comparison: { preferred: transparent, trustworthy: transparent, reasoning: shows_reasoning }
";

#[tokio::test]
async fn structured_request_yields_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(header("x-goog-api-key", "secret-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let report = analyzer(&server)
        .analyze(&builtin_document())
        .await
        .unwrap();
    assert_eq!(report.conclusion.recommendation, Recommendation::Disagree);
    assert!(report.count(ClauseVerdict::Concerning) > 0);
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .expect(1)
        .mount(&server)
        .await;

    let err = analyzer(&server)
        .analyze(&builtin_document())
        .await
        .unwrap_err();
    let AnalysisError::Status { status, body } = err else {
        panic!("expected status error");
    };
    assert_eq!(status, 429);
    assert_eq!(body, "quota exhausted");
}

#[tokio::test]
async fn unparsable_candidate_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"analysis\": 3}" }] } }]
        })))
        .mount(&server)
        .await;

    let err = analyzer(&server)
        .analyze(&builtin_document())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
}

#[tokio::test]
async fn failed_analysis_is_retried_inside_the_condition_view() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let events_path = dir.path().join("events.jsonl");
    let events = Arc::new(EventEmitter::from_file(&events_path).unwrap());

    let study = StudyConfig::default();
    let gemini = analyzer(&server);
    let runner = StudyRunner::new(&study, &gemini, dir.path()).with_events(events);
    let mut screen = ScriptedScreen::new(ScriptedResponses::parse(RESPONSES).unwrap());
    let seed = SessionSeed::fixed("gemini-retry", ConditionOrder::OPAQUE_FIRST);

    let outcome = runner
        .run(&mut screen, seed, &study.documents[0])
        .await
        .unwrap();
    assert!(outcome.record.final_preference().is_some());

    let log = std::fs::read_to_string(&events_path).unwrap();
    let failures: Vec<serde_json::Value> = log
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .filter(|e| e["type"] == "AnalysisFailed")
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["condition"], "opaque");
}

#[tokio::test]
async fn exhausted_attempts_abort_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let study = StudyConfig::default();
    let gemini = analyzer(&server);
    let runner = StudyRunner::new(&study, &gemini, dir.path());
    let responses = format!("analysis_attempts: 2\n{RESPONSES}");
    let mut screen = ScriptedScreen::new(ScriptedResponses::parse(&responses).unwrap());

    let err = runner
        .run(
            &mut screen,
            SessionSeed::fixed("gemini-down", ConditionOrder::TRANSPARENT_FIRST),
            &study.documents[0],
        )
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), clearsight::error::ExitCode::ANALYSIS_ERROR);
    assert!(matches!(err, StudyError::Screen(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
