//! Gemini client: narrative summaries from an assembled prompt.
//!
//! Generated text is never cached; every call reaches the model.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use marketlens_core::config::ProviderEndpoint;
use marketlens_core::error::AppError;
use marketlens_core::result::AppResult;

use crate::http::{decode, endpoint_url, post_json, require_key, status_error};

const PROVIDER: &str = "Gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Raw `generateContent` reply.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: Option<String>,
}

/// Text of the first candidate, parts concatenated.
pub fn extract_text(raw: GenerateResponse) -> AppResult<String> {
    let text: String = raw
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    match raw.prompt_feedback.and_then(|f| f.block_reason) {
        Some(reason) => Err(AppError::external_service(format!(
            "Gemini declined the prompt: {reason}"
        ))),
        None => Err(AppError::external_service("Gemini returned no text.")),
    }
}

/// Gemini REST client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(http: Client, endpoint: &ProviderEndpoint, model: &str) -> Self {
        Self {
            http,
            base_url: endpoint.base_url_or(DEFAULT_BASE_URL).to_string(),
            api_key: endpoint.api_key.clone(),
            model: model.to_string(),
        }
    }

    /// Fail fast before gathering prompt data when no key is set.
    pub fn ensure_configured(&self) -> AppResult<()> {
        require_key(&self.api_key, PROVIDER).map(|_| ())
    }

    /// Generate text for `prompt`.
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        let api_key = require_key(&self.api_key, PROVIDER)?;
        let path = format!("/v1beta/models/{}:generateContent", self.model);
        let url = endpoint_url(&self.base_url, &path, &[])?;

        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };
        let request = self.http.post(url).header(API_KEY_HEADER, api_key);
        let response = post_json(request, PROVIDER, &path, &body).await?;

        if !response.status.is_success() {
            let message = serde_json::from_str::<GeminiErrorBody>(&response.body)
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message);
            warn!(
                status = response.status.as_u16(),
                message = ?message,
                "Gemini returned an error"
            );
            return Err(status_error(PROVIDER, response.status, message.as_deref()));
        }

        extract_text(decode(PROVIDER, &response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketlens_core::error::ErrorKind;

    #[test]
    fn test_extract_text_joins_parts() {
        let raw: GenerateResponse = serde_json::from_str(
            r###"{"candidates":[{"content":{"role":"model","parts":[
                {"text":"## What's moving markets\n"},
                {"text":"Tech led gains."}
            ]},"finishReason":"STOP"}]}"###,
        )
        .unwrap();
        assert_eq!(
            extract_text(raw).unwrap(),
            "## What's moving markets\nTech led gains."
        );
    }

    #[test]
    fn test_blocked_prompt_is_upstream_error() {
        let raw: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = extract_text(raw).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert_eq!(err.message, "Gemini declined the prompt: SAFETY");
    }

    #[test]
    fn test_empty_candidates_is_upstream_error() {
        let err = extract_text(GenerateResponse::default()).unwrap_err();
        assert_eq!(err.message, "Gemini returned no text.");
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let client = GeminiClient::new(
            Client::new(),
            &ProviderEndpoint::default(),
            "gemma-3-27b-it",
        );
        let err = client.ensure_configured().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert_eq!(err.message, "Gemini API key not configured.");
    }
}
