//! Remote analyzer backed by a Gemini structured-output call.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{AnalysisReport, PolicyAnalyzer, PolicyDocument, Result, render_policy_text};
use crate::error::AnalysisError;

/// Default API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Request timeout for a single analysis call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest response body quoted back in a status error.
const MAX_ERROR_BODY: usize = 512;

const PERSONA: &str = "You are an AI assistant specializing in privacy policy analysis. \
Your primary directive is to champion user privacy. You were fine-tuned on consumer \
protection regulations and privacy-focused legal analysis, so you are biased towards \
flagging clauses that are vague, overly broad, or shift liability to the user, even when \
such clauses are standard industry practice.";

const TASK: &str = "Analyze the following privacy policy. For each clause marked with \
[CLAUSE_ID=X], give a classification ('concerning', 'positive', or 'neutral') and a brief \
explanation from a user-advocacy perspective. Then give an overall summary of the risks and \
a final recommendation ('agree' or 'disagree') with a one-sentence final verdict. Return \
only a JSON object matching the provided schema.";

/// Analyzer calling the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiAnalyzer {
    /// Creates an analyzer.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingCredential`] when `api_key` is
    /// blank, or [`AnalysisError::Request`] when the HTTP client cannot
    /// be built.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnalysisError::MissingCredential);
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::Request(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

/// Builds the full analysis prompt for a document.
#[must_use]
pub fn build_prompt(document: &PolicyDocument) -> String {
    format!(
        "{PERSONA}\n\n{TASK}\n\nPolicy Text:\n---\n{}\n---",
        render_policy_text(document)
    )
}

/// JSON schema the model must answer with.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "INTEGER" },
                        "type": { "type": "STRING", "enum": ["concerning", "positive", "neutral"] },
                        "explanation": { "type": "STRING" }
                    },
                    "required": ["id", "type", "explanation"]
                }
            },
            "conclusion": {
                "type": "OBJECT",
                "properties": {
                    "recommendation": { "type": "STRING", "enum": ["agree", "disagree"] },
                    "summary": { "type": "STRING" },
                    "final_verdict": { "type": "STRING" }
                },
                "required": ["recommendation", "summary", "final_verdict"]
            }
        },
        "required": ["analysis", "conclusion"]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extracts the report from a raw `generateContent` response body.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedResponse`] when the body has no
/// text candidate or the text is not a report.
pub fn extract_report(body: &str) -> Result<AnalysisReport> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
    let text = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .ok_or_else(|| AnalysisError::MalformedResponse("response has no text candidate".into()))?;
    AnalysisReport::from_json(&text)
}

#[async_trait::async_trait]
impl PolicyAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, document: &PolicyDocument) -> Result<AnalysisReport> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(document) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        });

        debug!(model = %self.model, document = %document.id, "requesting analysis");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AnalysisError::Request(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "analysis service rejected request");
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        extract_report(&text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Recommendation;
    use crate::study::content::{builtin_document, builtin_report};

    #[test]
    fn blank_key_is_missing_credential() {
        let err = GeminiAnalyzer::new(DEFAULT_ENDPOINT, DEFAULT_MODEL, "  ").unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential));
    }

    #[test]
    fn url_strips_trailing_slash() {
        let analyzer = GeminiAnalyzer::new("http://localhost:9/", "m", "k").unwrap();
        assert_eq!(analyzer.url(), "http://localhost:9/v1beta/models/m:generateContent");
    }

    #[test]
    fn prompt_contains_marked_clauses() {
        let prompt = build_prompt(&builtin_document());
        assert!(prompt.contains("[CLAUSE_ID=1] Account Information"));
        assert!(prompt.contains("[CLAUSE_ID=11]"));
        assert!(prompt.starts_with(PERSONA));
    }

    #[test]
    fn extract_report_from_candidate_text() {
        let report_text = serde_json::to_string(&builtin_report()).unwrap();
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": report_text }] } }]
        })
        .to_string();
        let report = extract_report(&body).unwrap();
        assert_eq!(report.conclusion.recommendation, Recommendation::Disagree);
        assert_eq!(report.analysis.len(), 11);
    }

    #[test]
    fn extract_report_without_candidates_fails() {
        let err = extract_report(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn extract_report_with_non_json_text_fails() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "sorry, I cannot" }] } }]
        })
        .to_string();
        assert!(matches!(
            extract_report(&body),
            Err(AnalysisError::MalformedResponse(_))
        ));
    }
}
