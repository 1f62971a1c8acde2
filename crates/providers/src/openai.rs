//! OpenAI-compatible chat completions client.
//!
//! Works against OpenAI and any endpoint following the
//! `POST {base}/chat/completions` contract. HTTP failures are classified
//! into quota / auth / access / generic errors; nothing is retried here.

use crate::credentials::CapabilityProbe;
use crate::traits::{ChatBackend, CompletionRequest, JsonSchemaSpec};
use crate::util::{classify_chat_failure, from_reqwest, http_client};
use sd_domain::config::ChatProviderConfig;
use sd_domain::error::{Error, Result};
use sd_domain::stream::{BoxStream, StreamEvent, Usage};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Chat backend for OpenAI-compatible APIs.
///
/// The API key is resolved through the [`CapabilityProbe`] on every call.
pub struct OpenAiChatClient {
    id: String,
    base_url: String,
    key_env: String,
    probe: CapabilityProbe,
    default_model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiChatClient {
    pub fn from_config(cfg: &ChatProviderConfig, probe: CapabilityProbe) -> Result<Self> {
        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            key_env: cfg.key_env.clone(),
            probe,
            default_model: cfg.default_model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            client: http_client(cfg.request_timeout_ms)?,
        })
    }

    // ── Internal: auth + request plumbing ─────────────────────────

    fn api_key(&self) -> Result<String> {
        self.probe
            .resolve(&self.key_env)
            .ok_or_else(|| Error::NotConfigured {
                provider: self.id.clone(),
                env_var: self.key_env.clone(),
            })
    }

    fn effective_model<'a>(&'a self, req: &'a CompletionRequest) -> &'a str {
        if req.model.is_empty() {
            &self.default_model
        } else {
            &req.model
        }
    }

    fn build_body(&self, req: &CompletionRequest, stream: bool) -> Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = req.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        messages.push(serde_json::json!({"role": "user", "content": req.message}));

        serde_json::json!({
            "model": self.effective_model(req),
            "messages": messages,
            "stream": stream,
            "temperature": req.temperature.unwrap_or(self.temperature),
            "max_tokens": req.max_tokens.unwrap_or(self.max_tokens),
        })
    }

    /// POST the body and return the response if the status is 2xx.
    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let key = self.api_key()?;
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(provider = %self.id, url = %url, model = %body["model"], "chat request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.map_err(from_reqwest)?;
            let err = classify_chat_failure(&self.id, status.as_u16(), &text);
            tracing::warn!(provider = %self.id, status = status.as_u16(), kind = %err.kind(), "chat request failed");
            return Err(err);
        }
        Ok(resp)
    }

    async fn complete_body(&self, body: &Value) -> Result<String> {
        let resp = self.send(body).await?;
        let resp_json: Value = resp.json().await.map_err(from_reqwest)?;
        let (content, usage) = parse_chat_response(&self.id, &resp_json)?;
        if let Some(u) = usage {
            tracing::debug!(
                provider = %self.id,
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                "chat usage"
            );
        }
        Ok(content)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_chat_response(provider: &str, body: &Value) -> Result<(String, Option<Usage>)> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Provider {
            provider: provider.into(),
            message: "no choices in response".into(),
        })?;

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let usage = body.get("usage").and_then(parse_openai_usage);
    Ok((content, usage))
}

fn parse_openai_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SSE streaming helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse one SSE `data:` payload, handling the `[DONE]` sentinel.
fn parse_sse_data(data: &str) -> Vec<Result<StreamEvent>> {
    if data.trim() == "[DONE]" {
        return vec![Ok(StreamEvent::Done {
            usage: None,
            finish_reason: Some("stop".into()),
        })];
    }

    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return vec![Err(Error::Json(e))],
    };

    if let Some(err) = v.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("stream error")
            .to_string();
        return vec![Ok(StreamEvent::Error { message })];
    }

    let Some(choice) = v
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
    else {
        return Vec::new();
    };

    let mut events = Vec::new();
    if let Some(text) = choice
        .get("delta")
        .and_then(|d| d.get("content"))
        .and_then(|v| v.as_str())
    {
        if !text.is_empty() {
            events.push(Ok(StreamEvent::Token {
                text: text.to_string(),
            }));
        }
    }

    if let Some(fr) = choice.get("finish_reason").and_then(|f| f.as_str()) {
        events.push(Ok(StreamEvent::Done {
            usage: v.get("usage").and_then(parse_openai_usage),
            finish_reason: Some(fr.to_string()),
        }));
    }
    events
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl ChatBackend for OpenAiChatClient {
    async fn complete(&self, req: &CompletionRequest) -> Result<String> {
        let body = self.build_body(req, false);
        self.complete_body(&body).await
    }

    async fn complete_stream(
        &self,
        req: &CompletionRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let body = self.build_body(req, true);
        let resp = self.send(&body).await?;
        Ok(crate::sse::sse_response_stream(resp, parse_sse_data))
    }

    async fn structured_complete(
        &self,
        req: &CompletionRequest,
        schema: &JsonSchemaSpec,
    ) -> Result<Value> {
        let mut body = self.build_body(req, false);
        body["response_format"] = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "schema": schema.schema,
                "strict": schema.strict,
            }
        });

        let content = self.complete_body(&body).await?;
        serde_json::from_str(content.trim()).map_err(|e| Error::Provider {
            provider: self.id.clone(),
            message: format!("structured output was not valid JSON: {e}"),
        })
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;
    use std::sync::Arc;

    fn client() -> OpenAiChatClient {
        let cfg = ChatProviderConfig::default();
        let probe = CapabilityProbe::new(Arc::new(StaticCredentials::new()), "OPENAI_API_KEY", "GEMINI_API_KEY");
        OpenAiChatClient::from_config(&cfg, probe).unwrap()
    }

    #[test]
    fn body_carries_system_prompt_and_defaults() {
        let req = CompletionRequest::new("VPN won't connect", "gpt-4")
            .with_system_prompt("You are IT support.");
        let body = client().build_body(&req, true);
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 1000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "VPN won't connect");
    }

    #[test]
    fn empty_model_uses_default() {
        let req = CompletionRequest::new("hi", "");
        let body = client().build_body(&req, false);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let err = client()
            .complete(&CompletionRequest::new("hi", "gpt-4"))
            .await
            .unwrap_err();
        match err {
            Error::NotConfigured { env_var, .. } => assert_eq!(env_var, "OPENAI_API_KEY"),
            other => panic!("expected NotConfigured, got {other:?}"),
        }
    }

    #[test]
    fn sse_token_and_finish() {
        let events = parse_sse_data(r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#);
        assert!(matches!(&events[..], [Ok(StreamEvent::Token { text })] if text == "Hel"));

        let events = parse_sse_data(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#);
        assert!(matches!(&events[..], [Ok(StreamEvent::Done { .. })]));

        let events = parse_sse_data("[DONE]");
        assert!(matches!(&events[..], [Ok(StreamEvent::Done { .. })]));
    }

    #[test]
    fn sse_error_payload_becomes_error_event() {
        let events = parse_sse_data(r#"{"error":{"message":"server overloaded"}}"#);
        assert!(matches!(&events[..], [Ok(StreamEvent::Error { message })] if message == "server overloaded"));
    }

    #[test]
    fn parse_response_extracts_content() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Reboot the router."}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
        });
        let (content, usage) = parse_chat_response("openai", &body).unwrap();
        assert_eq!(content, "Reboot the router.");
        assert_eq!(usage.unwrap().total_tokens, 14);
    }

    #[test]
    fn parse_response_without_choices_is_provider_error() {
        let err = parse_chat_response("openai", &serde_json::json!({})).unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }
}
