use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ProviderError;

use super::{ReportProvider, truncate_body};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn response_text(parsed: GenerateResponse) -> Result<String, ProviderError> {
    let block_reason = parsed.prompt_feedback.and_then(|f| f.block_reason);

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(ProviderError::Empty { reason: block_reason });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::Empty {
            reason: block_reason.or(candidate.finish_reason),
        });
    }

    Ok(text)
}

#[async_trait]
impl ReportProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "requesting report");

        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .map(|envelope| envelope.error.message)
                .filter(|m| !m.is_empty());
            if let Some(message) = message {
                tracing::error!(%status, %message, "provider rejected the request");
                return Err(ProviderError::Provider(message));
            }
            tracing::error!(%status, "provider request failed");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Envelope(e.to_string()))?;

        let text = response_text(parsed)?;
        tracing::debug!(len = text.len(), "received report text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_body_shape() {
        let request = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "generationConfig": {"responseMimeType": "application/json"}
            })
        );
    }

    #[test]
    fn text_parts_are_joined() {
        let parsed = parse(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\""}, {"text": ":1}"}]}}]
        }));
        assert_eq!(response_text(parsed).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn blocked_prompt_is_empty_with_reason() {
        let parsed = parse(json!({ "promptFeedback": {"blockReason": "SAFETY"} }));
        match response_text(parsed) {
            Err(ProviderError::Empty { reason }) => assert_eq!(reason.as_deref(), Some("SAFETY")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn candidate_without_text_reports_finish_reason() {
        let parsed = parse(json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]
        }));
        match response_text(parsed) {
            Err(ProviderError::Empty { reason }) => {
                assert_eq!(reason.as_deref(), Some("MAX_TOKENS"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn endpoint_has_no_double_slash() {
        let provider = GeminiProvider::new(
            "k".into(),
            DEFAULT_MODEL.into(),
            "http://localhost:1234/".into(),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
