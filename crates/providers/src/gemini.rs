//! Google Gemini multimodal client.
//!
//! Implements the `generateContent` and `streamGenerateContent` APIs.
//! Auth is via an API key passed as a query parameter (`key={api_key}`).
//! HTTP failures are reported as generic provider errors.

use crate::credentials::CapabilityProbe;
use crate::traits::{InlineImage, MultimodalBackend};
use crate::util::{from_reqwest, http_client, redact_url_key, truncate};
use base64::Engine as _;
use sd_domain::config::MultimodalProviderConfig;
use sd_domain::error::{Error, Result};
use sd_domain::stream::{BoxStream, StreamEvent, Usage};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct GeminiClient {
    id: String,
    base_url: String,
    key_env: String,
    probe: CapabilityProbe,
    default_model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn from_config(cfg: &MultimodalProviderConfig, probe: CapabilityProbe) -> Result<Self> {
        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            key_env: cfg.key_env.clone(),
            probe,
            default_model: cfg.default_model.clone(),
            client: http_client(cfg.request_timeout_ms)?,
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn api_key(&self) -> Result<String> {
        self.probe
            .resolve(&self.key_env)
            .ok_or_else(|| Error::NotConfigured {
                provider: self.id.clone(),
                env_var: self.key_env.clone(),
            })
    }

    fn model_or_default<'a>(&'a self, model: &'a str) -> &'a str {
        if model.is_empty() {
            &self.default_model
        } else {
            model
        }
    }

    fn generate_url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, api_key
        )
    }

    fn stream_url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, model, api_key
        )
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        tracing::debug!(provider = %self.id, url = %redact_url_key(url), "gemini request");

        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            // The URL carries the API key.
            .map_err(|e| from_reqwest(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .map_err(|e| from_reqwest(e.without_url()))?;
            tracing::warn!(provider = %self.id, status = status.as_u16(), "gemini request failed");
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!("HTTP {} - {}", status.as_u16(), truncate(&text, 500)),
            });
        }
        Ok(resp)
    }
}

/// Request body with a single user turn: the prompt plus an optional
/// inline base64 image part.
fn build_body(prompt: &str, image: Option<&InlineImage>) -> Value {
    let mut parts = vec![serde_json::json!({"text": prompt})];
    if let Some(img) = image {
        parts.push(serde_json::json!({
            "inlineData": {
                "mimeType": img.mime_type,
                "data": base64::engine::general_purpose::STANDARD.encode(&img.data),
            }
        }));
    }
    serde_json::json!({
        "contents": [{"role": "user", "parts": parts}],
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn candidate_text(candidate: &Value) -> String {
    candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn parse_gemini_response(provider: &str, body: &Value) -> Result<String> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Provider {
            provider: provider.into(),
            message: "no candidates in response".into(),
        })?;
    Ok(candidate_text(candidate))
}

fn parse_gemini_usage(v: &Value) -> Option<Usage> {
    let prompt = v.get("promptTokenCount")?.as_u64()? as u32;
    let completion = v
        .get("candidatesTokenCount")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;
    let total = v
        .get("totalTokenCount")
        .and_then(|v| v.as_u64())
        .unwrap_or((prompt + completion) as u64) as u32;
    Some(Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: total,
    })
}

fn normalize_finish_reason(fr: &str) -> String {
    match fr {
        "STOP" => "stop".to_string(),
        "MAX_TOKENS" => "length".to_string(),
        other => other.to_lowercase(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Streaming helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse a single Gemini streaming SSE data payload.
fn parse_gemini_sse_data(data: &str) -> Vec<Result<StreamEvent>> {
    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return vec![Err(Error::Json(e))],
    };

    let Some(candidate) = v
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
    else {
        return Vec::new();
    };

    let mut events = Vec::new();
    let text = candidate_text(candidate);
    if !text.is_empty() {
        events.push(Ok(StreamEvent::Token { text }));
    }

    if let Some(fr) = candidate.get("finishReason").and_then(|v| v.as_str()) {
        events.push(Ok(StreamEvent::Done {
            usage: v.get("usageMetadata").and_then(parse_gemini_usage),
            finish_reason: Some(normalize_finish_reason(fr)),
        }));
    }
    events
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl MultimodalBackend for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        image: Option<&InlineImage>,
    ) -> Result<String> {
        let key = self.api_key()?;
        let url = self.generate_url(self.model_or_default(model), &key);
        let resp = self.post(&url, &build_body(prompt, image)).await?;
        let resp_json: Value = resp.json().await.map_err(from_reqwest)?;
        parse_gemini_response(&self.id, &resp_json)
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        model: &str,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let key = self.api_key()?;
        let url = self.stream_url(self.model_or_default(model), &key);
        let resp = self.post(&url, &build_body(prompt, None)).await?;
        Ok(crate::sse::sse_response_stream(resp, parse_gemini_sse_data))
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}
