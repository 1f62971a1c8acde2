use sd_domain::error::Result;
use sd_domain::stream::{BoxStream, ChunkSink, StreamEvent};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single-turn chat completion request.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// The user message.
    pub message: String,
    /// Optional system prompt sent ahead of the message.
    pub system_prompt: Option<String>,
    /// Model identifier. Empty lets the client use its default.
    pub model: String,
    /// Sampling temperature. `None` uses the client's configured value.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response. `None` uses the client's configured value.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(message: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

/// A JSON schema the structured completion must satisfy.
#[derive(Debug, Clone)]
pub struct JsonSchemaSpec {
    /// Schema name reported to the provider.
    pub name: String,
    pub schema: Value,
    pub strict: bool,
}

/// Binary image sent inline with a multimodal prompt.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Guess the MIME type from a file extension. Unknown extensions map
    /// to `image/png`.
    pub fn mime_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            _ => "image/png",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Backend traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cloud chat-completion backend.
///
/// Implementations classify HTTP failures into the typed quota / auth /
/// access / generic errors and never retry.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a completion request and wait for the full text.
    async fn complete(&self, req: &CompletionRequest) -> Result<String>;

    /// Send a completion request and return a stream of events.
    async fn complete_stream(
        &self,
        req: &CompletionRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>>;

    /// Ask for output constrained to `schema` and parse it.
    async fn structured_complete(
        &self,
        req: &CompletionRequest,
        schema: &JsonSchemaSpec,
    ) -> Result<Value>;

    /// Stream a completion into `sink` and return the concatenated text.
    async fn stream_complete(&self, req: &CompletionRequest, sink: &dyn ChunkSink) -> Result<String> {
        let stream = self.complete_stream(req).await?;
        crate::sse::collect_tokens(stream, Some(sink)).await
    }

    /// A unique identifier for this backend instance.
    fn provider_id(&self) -> &str;
}

/// Cloud multimodal generation backend.
#[async_trait::async_trait]
pub trait MultimodalBackend: Send + Sync {
    /// Generate text for a prompt, optionally with an inline image.
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        image: Option<&InlineImage>,
    ) -> Result<String>;

    /// Stream generated text for a prompt.
    async fn generate_stream(
        &self,
        prompt: &str,
        model: &str,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>>;

    fn provider_id(&self) -> &str;
}
