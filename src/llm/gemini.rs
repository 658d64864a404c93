//! Gemini API client implementation
//!
//! Implements the LlmClient trait for Google's Generative Language API with
//! support for both blocking and streaming responses. One attempt per call:
//! transport and API errors are surfaced verbatim, never retried.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::{FinishReason, GenerationRequest, GenerationResponse, LlmClient, LlmError, StreamChunk, TokenUsage};
use crate::config::LlmConfig;

/// Gemini Generative Language API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in the config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(?config, "from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the endpoint URL for an API method
    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method)
    }

    /// Build the request body for the generateContent API
    fn build_request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        serde_json::json!({
            "system_instruction": {
                "parts": [{ "text": request.system_instruction }],
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": {
                "maxOutputTokens": request.max_tokens.min(self.max_tokens),
            },
        })
    }

    /// Parse a complete (non-streamed) API response
    fn parse_response(&self, api_response: GeminiResponse) -> Result<GenerationResponse, LlmError> {
        debug!(candidate_count = api_response.candidates.len(), "parse_response: called");
        let usage = api_response
            .usage_metadata
            .map(TokenUsage::from)
            .unwrap_or_default();

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no candidates".to_string()))?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let finish_reason = candidate
            .finish_reason
            .as_deref()
            .map(FinishReason::from_api)
            .unwrap_or(FinishReason::Stop);

        Ok(GenerationResponse {
            text,
            finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        debug!(%self.model, "complete: called");
        let url = self.endpoint("generateContent");
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.clone())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Network)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(%status, "complete: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        debug!("complete: success");
        let api_response: GeminiResponse = response.json().await?;
        self.parse_response(api_response)
    }

    async fn stream(
        &self,
        request: GenerationRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<GenerationResponse, LlmError> {
        debug!(%self.model, "stream: called");
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let body = self.build_request_body(&request);

        let http_request = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.clone())
            .header("content-type", "application/json")
            .json(&body);

        let mut es = EventSource::new(http_request).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let mut full_text = String::new();
        let mut finish_reason = FinishReason::Stop;
        let mut usage = TokenUsage::default();
        let mut started = false;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("stream: Event::Open");
                }
                Ok(Event::Message(msg)) => {
                    debug!(data_len = msg.data.len(), "stream: received Event::Message");
                    let data: GeminiResponse = serde_json::from_str(&msg.data).map_err(LlmError::Json)?;

                    if let Some(meta) = data.usage_metadata {
                        usage = TokenUsage::from(meta);
                        if !started {
                            started = true;
                            let _ = chunk_tx
                                .send(StreamChunk::MessageStart {
                                    input_tokens: usage.input_tokens,
                                })
                                .await;
                        }
                    }

                    if let Some(candidate) = data.candidates.into_iter().next() {
                        if let Some(content) = candidate.content {
                            for part in content.parts {
                                if let Some(text) = part.text {
                                    debug!(text_len = text.len(), "stream: text delta");
                                    full_text.push_str(&text);
                                    let _ = chunk_tx.send(StreamChunk::TextDelta(text)).await;
                                }
                            }
                        }
                        if let Some(reason) = candidate.finish_reason.as_deref() {
                            debug!(%reason, "stream: finish reason");
                            finish_reason = FinishReason::from_api(reason);
                        }
                    }
                }
                // Server closed the stream: the sequence is fully consumed
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    debug!("stream: stream ended");
                    break;
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(code, response)) => {
                    es.close();
                    let status = code.as_u16();
                    let message = response.text().await.unwrap_or_default();
                    debug!(%status, "stream: invalid status code");
                    let err = LlmError::ApiError { status, message };
                    let _ = chunk_tx.send(StreamChunk::Error(err.user_message())).await;
                    return Err(err);
                }
                Err(reqwest_eventsource::Error::Transport(e)) => {
                    es.close();
                    debug!(error = %e, "stream: transport error");
                    let err = LlmError::Network(e);
                    let _ = chunk_tx.send(StreamChunk::Error(err.user_message())).await;
                    return Err(err);
                }
                Err(e) => {
                    es.close();
                    debug!(error = %e, "stream: event error");
                    let err = LlmError::InvalidResponse(e.to_string());
                    let _ = chunk_tx.send(StreamChunk::Error(err.user_message())).await;
                    return Err(err);
                }
            }
        }

        debug!(text_len = full_text.len(), "stream: complete");
        let _ = chunk_tx
            .send(StreamChunk::MessageDone {
                finish_reason,
                usage: usage.clone(),
            })
            .await;

        Ok(GenerationResponse {
            text: full_text,
            finish_reason,
            usage,
        })
    }
}

// Gemini API response types

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, serde::Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

impl From<GeminiUsage> for TokenUsage {
    fn from(meta: GeminiUsage) -> Self {
        TokenUsage {
            input_tokens: meta.prompt_token_count.unwrap_or(0),
            output_tokens: meta.candidates_token_count.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GeminiClient {
        GeminiClient {
            model: "gemini-2.5-flash".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            http: Client::new(),
            max_tokens: 65536,
        }
    }

    #[test]
    fn test_endpoint_format() {
        let client = test_client();
        assert_eq!(
            client.endpoint("generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_body() {
        let client = test_client();
        let request = GenerationRequest {
            system_instruction: "You are a planner".to_string(),
            prompt: "Generate the plans".to_string(),
            max_tokens: 1000,
        };

        let body = client.build_request_body(&request);

        assert_eq!(body["system_instruction"]["parts"][0]["text"], "You are a planner");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Generate the plans");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_max_tokens_capped() {
        let mut client = test_client();
        client.max_tokens = 1000;

        let request = GenerationRequest {
            system_instruction: "Test".to_string(),
            prompt: "Test".to_string(),
            max_tokens: 5000,
        };

        let body = client.build_request_body(&request);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_parse_response_concatenates_parts() {
        let client = test_client();
        let api_response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": { "parts": [{ "text": "<table>" }, { "text": "</table>" }], "role": "model" },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 34 }
            }"#,
        )
        .unwrap();

        let response = client.parse_response(api_response).unwrap();
        assert_eq!(response.text, "<table></table>");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.usage.output_tokens, 34);
    }

    #[test]
    fn test_parse_response_no_candidates() {
        let client = test_client();
        let api_response: GeminiResponse = serde_json::from_str(r#"{ "candidates": [] }"#).unwrap();
        assert!(client.parse_response(api_response).is_err());
    }
}
