//! Response router: validates a message, picks the serving path, streams
//! output into the caller's sink, and turns every outcome into a
//! [`ResponseResult`].
//!
//! Paths:
//!
//! - video trigger matched → multimodal video script + render
//! - `cloud_chat` model → chat backend (streaming when a sink is given)
//! - `cloud_multimodal` model → multimodal text generation
//! - anything else → local responder bank
//!
//! A chat failure classified as quota exhaustion gets exactly one retry on
//! the multimodal backend when its key is configured. Nothing else is
//! retried and no error escapes [`ResponseRouter::get_response`].

use crate::classifier::{classify_service, KeywordVideoTrigger, VideoTriggerPolicy};
use crate::credentials::{CapabilityFlags, CapabilityProbe, CredentialSource};
use crate::gemini::GeminiClient;
use crate::local::LocalResponderBank;
use crate::multimodal::MultimodalService;
use crate::openai::OpenAiChatClient;
use crate::pacing::{Pacer, TokioPacer};
use crate::traits::{ChatBackend, CompletionRequest, MultimodalBackend};
use crate::video::{SyntheticRenderer, VideoRenderer};
use sd_domain::config::{Config, LlmConfig, LocalConfig, RoutingConfig, VideoConfig};
use sd_domain::error::{Error, ErrorKind, Result};
use sd_domain::model::{ModelCatalog, ProviderFamily};
use sd_domain::request::{RequestEnvelope, RequestOptions};
use sd_domain::response::{ResponseResult, ServiceType};
use sd_domain::stream::ChunkSink;
use sd_domain::trace::TraceEvent;
use std::sync::Arc;
use std::time::Instant;

/// Prefixed to content (and sent to the sink first) when a quota failure
/// was served by the backup provider.
pub const FALLBACK_NOTICE: &str =
    "[Notice] The primary AI provider is out of quota. Switching to the backup provider.\n\n";

/// Model suggested when cloud providers are unavailable.
const SUGGESTED_LOCAL_MODEL: &str = "mistral-7b";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Router
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stateless request router. Cheap to share behind an `Arc`; concurrent
/// calls do not interact.
pub struct ResponseRouter {
    catalog: ModelCatalog,
    probe: CapabilityProbe,
    chat: Arc<dyn ChatBackend>,
    multimodal: MultimodalService,
    local: LocalResponderBank,
    video_trigger: Arc<dyn VideoTriggerPolicy>,
    routing: RoutingConfig,
}

impl ResponseRouter {
    pub fn builder() -> ResponseRouterBuilder {
        ResponseRouterBuilder::default()
    }

    /// Wire the production clients from config.
    pub fn from_config(config: &Config, credentials: Arc<dyn CredentialSource>) -> Result<Self> {
        let probe = CapabilityProbe::from_config(&config.llm, credentials);
        let chat = OpenAiChatClient::from_config(&config.llm.chat, probe.clone())?;
        let gemini = GeminiClient::from_config(&config.llm.multimodal, probe.clone())?;

        Self::builder()
            .catalog(ModelCatalog::with_extra(&config.models))
            .probe(probe)
            .chat_backend(Arc::new(chat))
            .multimodal_backend(Arc::new(gemini))
            .multimodal_model(config.llm.multimodal.default_model.clone())
            .video_trigger(Arc::new(KeywordVideoTrigger::new(
                &config.routing.video_keywords,
            )))
            .local_config(config.local.clone())
            .video_config(config.video.clone())
            .routing(config.routing.clone())
            .pacer(Arc::new(TokioPacer))
            .build()
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn probe(&self) -> &CapabilityProbe {
        &self.probe
    }

    pub fn chat_backend(&self) -> &Arc<dyn ChatBackend> {
        &self.chat
    }

    pub fn multimodal(&self) -> &MultimodalService {
        &self.multimodal
    }

    /// Route one message. Always returns a renderable result.
    pub async fn get_response(
        &self,
        message: &str,
        model_id: &str,
        sink: Option<&dyn ChunkSink>,
        options: &RequestOptions,
    ) -> ResponseResult {
        let started = Instant::now();
        let result = self.route(message, model_id, sink, options).await;
        result.with_response_time(started.elapsed().as_millis() as u64)
    }

    pub async fn respond_to(
        &self,
        envelope: &RequestEnvelope,
        sink: Option<&dyn ChunkSink>,
    ) -> ResponseResult {
        self.get_response(&envelope.message, &envelope.model_id, sink, &envelope.options)
            .await
    }

    // ── Routing pipeline ───────────────────────────────────────────

    async fn route(
        &self,
        message: &str,
        model_id: &str,
        sink: Option<&dyn ChunkSink>,
        options: &RequestOptions,
    ) -> ResponseResult {
        let family = classify_service(&self.catalog, model_id);

        if message.trim().is_empty() {
            let err = Error::Validation("message must not be empty".into());
            return self.failure(err, model_id, family_service(family));
        }
        if model_id.trim().is_empty() {
            let err = Error::Validation("a model must be selected".into());
            return self.failure(err, model_id, family_service(family));
        }

        let flags = self.probe.probe();
        let video_override = self.video_trigger.is_video_request(message, options);
        let service_type = if video_override {
            ServiceType::Video
        } else {
            family_service(family)
        };

        TraceEvent::RouteResolved {
            requested_model: model_id.to_string(),
            provider_family: family.as_str().to_string(),
            service_type: service_type.as_str().to_string(),
            video_override,
            streaming: sink.is_some(),
        }
        .emit();

        if let Err(err) = self.require_credentials(service_type, flags) {
            return self.failure(err, model_id, service_type);
        }

        match service_type {
            ServiceType::Video => self.serve_video(message, model_id, sink, options).await,
            ServiceType::CloudChat => {
                self.serve_chat(message, model_id, sink, options, flags)
                    .await
            }
            ServiceType::CloudMultimodal => {
                self.serve_multimodal_text(message, model_id, sink).await
            }
            ServiceType::Local => {
                let content = self.local.respond(message, model_id, sink).await;
                ResponseResult::succeeded(content, model_id, model_id, ServiceType::Local)
            }
        }
    }

    /// Fail fast when the serving path needs a key that is not configured.
    fn require_credentials(&self, service_type: ServiceType, flags: CapabilityFlags) -> Result<()> {
        match service_type {
            ServiceType::CloudChat if !flags.has_cloud_chat_key => Err(Error::NotConfigured {
                provider: self.chat.provider_id().to_string(),
                env_var: self.probe.chat_env().to_string(),
            }),
            ServiceType::CloudMultimodal | ServiceType::Video if !flags.has_multimodal_key => {
                Err(Error::NotConfigured {
                    provider: self.multimodal.provider_id().to_string(),
                    env_var: self.probe.multimodal_env().to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    // ── Serving paths ──────────────────────────────────────────────

    async fn serve_chat(
        &self,
        message: &str,
        model_id: &str,
        sink: Option<&dyn ChunkSink>,
        options: &RequestOptions,
        flags: CapabilityFlags,
    ) -> ResponseResult {
        let system_prompt = if options.is_error {
            &self.routing.error_system_prompt
        } else {
            &self.routing.system_prompt
        };
        let req = CompletionRequest::new(message, model_id).with_system_prompt(system_prompt.as_str());

        let started = Instant::now();
        let outcome = match sink {
            Some(sink) => self.chat.stream_complete(&req, sink).await,
            None => self.chat.complete(&req).await,
        };
        self.trace_request(self.chat.provider_id(), model_id, sink.is_some(), started, outcome.is_ok());

        match outcome {
            Ok(content) => {
                ResponseResult::succeeded(content, model_id, model_id, ServiceType::CloudChat)
            }
            Err(err) if err.kind() == ErrorKind::QuotaExceeded => {
                self.quota_fallback(err, message, model_id, sink, flags).await
            }
            Err(err) => self.failure(err, model_id, ServiceType::CloudChat),
        }
    }

    /// One retry on the multimodal backend after a chat quota failure.
    async fn quota_fallback(
        &self,
        err: Error,
        message: &str,
        model_id: &str,
        sink: Option<&dyn ChunkSink>,
        flags: CapabilityFlags,
    ) -> ResponseResult {
        if !flags.has_multimodal_key {
            return self.failure(err, model_id, ServiceType::CloudChat);
        }

        tracing::warn!(model = %model_id, error = %err, "chat quota exceeded, falling back");
        TraceEvent::LlmFallback {
            from_provider: self.chat.provider_id().to_string(),
            from_model: model_id.to_string(),
            to_provider: self.multimodal.provider_id().to_string(),
            to_model: self.multimodal.model().to_string(),
            reason: err.kind().to_string(),
        }
        .emit();

        if let Some(sink) = sink {
            sink.on_chunk(FALLBACK_NOTICE);
        }

        let started = Instant::now();
        let outcome = self.multimodal.generate_text(message, None, sink).await;
        self.trace_request(
            self.multimodal.provider_id(),
            self.multimodal.model(),
            sink.is_some(),
            started,
            outcome.is_ok(),
        );

        match outcome {
            Ok(text) => {
                let mut result = ResponseResult::succeeded(
                    format!("{FALLBACK_NOTICE}{text}"),
                    self.multimodal.model(),
                    model_id,
                    ServiceType::CloudMultimodal,
                );
                result.fallback_used = true;
                result
            }
            Err(fallback_err) => {
                let mut result = self.failure(fallback_err, model_id, ServiceType::CloudMultimodal);
                result.fallback_used = true;
                result.quota_exceeded = true;
                result
            }
        }
    }

    async fn serve_multimodal_text(
        &self,
        message: &str,
        model_id: &str,
        sink: Option<&dyn ChunkSink>,
    ) -> ResponseResult {
        let started = Instant::now();
        let outcome = self
            .multimodal
            .generate_text(message, Some(model_id), sink)
            .await;
        self.trace_request(
            self.multimodal.provider_id(),
            model_id,
            sink.is_some(),
            started,
            outcome.is_ok(),
        );

        match outcome {
            Ok(text) => {
                ResponseResult::succeeded(text, model_id, model_id, ServiceType::CloudMultimodal)
            }
            Err(err) => self.failure(err, model_id, ServiceType::CloudMultimodal),
        }
    }

    /// Video path. Streaming sends the raw script text followed by the
    /// render summary, so the chunks concatenate to the content.
    async fn serve_video(
        &self,
        message: &str,
        model_id: &str,
        sink: Option<&dyn ChunkSink>,
        options: &RequestOptions,
    ) -> ResponseResult {
        let video_type = options.video_type.unwrap_or_default();
        let started = Instant::now();

        let outcome = match sink {
            Some(sink) => self
                .multimodal
                .stream_video_script(message, sink, video_type)
                .await
                .map(|generation| {
                    let tail = format!("\n\n{}", generation.actual_video.summary());
                    sink.on_chunk(&tail);
                    (format!("{}{tail}", generation.raw), generation)
                }),
            None => self
                .multimodal
                .generate_video_script(message, video_type)
                .await
                .map(|generation| {
                    let content = format!(
                        "{}\n\n{}",
                        generation.script.to_markdown().trim_end(),
                        generation.actual_video.summary()
                    );
                    (content, generation)
                }),
        };
        self.trace_request(
            self.multimodal.provider_id(),
            self.multimodal.model(),
            sink.is_some(),
            started,
            outcome.is_ok(),
        );

        match outcome {
            Ok((content, generation)) => {
                let mut result = ResponseResult::succeeded(
                    content,
                    generation.model.clone(),
                    model_id,
                    ServiceType::Video,
                );
                result.video = Some(generation);
                result
            }
            Err(err) => self.failure(err, model_id, ServiceType::Video),
        }
    }

    // ── Failure shaping ────────────────────────────────────────────

    fn failure(&self, err: Error, model_id: &str, service_type: ServiceType) -> ResponseResult {
        let suggestions = self.suggestions_for(&err);

        let mut content = format!("{err}\n\n{}", err.hint());
        if !suggestions.is_empty() {
            content.push_str("\n\nSuggestions:");
            for s in &suggestions {
                content.push_str("\n- ");
                content.push_str(s);
            }
        }

        tracing::warn!(model = %model_id, kind = %err.kind(), error = %err, "request failed");
        TraceEvent::RequestFailed {
            requested_model: model_id.to_string(),
            error_kind: err.kind().to_string(),
            message: err.to_string(),
        }
        .emit();

        ResponseResult::failed(&err, content, model_id, service_type, suggestions)
    }

    fn suggestions_for(&self, err: &Error) -> Vec<String> {
        match err {
            Error::NotConfigured { env_var, .. } => vec![
                format!("Set {env_var} in the environment and restart the console"),
                format!("Pick a local model such as {SUGGESTED_LOCAL_MODEL}, which needs no API key"),
            ],
            Error::QuotaExceeded { provider, .. } => vec![
                format!("Switch to a local model such as {SUGGESTED_LOCAL_MODEL} to keep working"),
                format!("Check billing and usage limits on the {provider} account"),
                format!(
                    "Add a {} key so quota failures fall back automatically",
                    self.probe.multimodal_env()
                ),
            ],
            Error::AuthInvalid { .. } => vec![
                "Verify the API key is copied correctly and still active".into(),
                format!("Pick a local model such as {SUGGESTED_LOCAL_MODEL} meanwhile"),
            ],
            Error::AccessDenied { .. } => vec![
                "Check that the API key has access to the selected model".into(),
                "Choose a different model".into(),
            ],
            Error::Validation(_) => vec![
                "Type a message before sending".into(),
                "Select a model from the model list".into(),
            ],
            _ => vec![
                "Retry in a few moments".into(),
                format!("Switch to another model or a local model such as {SUGGESTED_LOCAL_MODEL}"),
            ],
        }
    }

    fn trace_request(
        &self,
        provider: &str,
        model: &str,
        streaming: bool,
        started: Instant,
        success: bool,
    ) {
        TraceEvent::LlmRequest {
            provider: provider.to_string(),
            model: model.to_string(),
            streaming,
            duration_ms: started.elapsed().as_millis() as u64,
            success,
        }
        .emit();
    }
}

impl std::fmt::Debug for ResponseRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseRouter")
            .field("chat", &self.chat.provider_id())
            .field("multimodal", &self.multimodal)
            .field("models", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

fn family_service(family: ProviderFamily) -> ServiceType {
    match family {
        ProviderFamily::CloudChat => ServiceType::CloudChat,
        ProviderFamily::CloudMultimodal => ServiceType::CloudMultimodal,
        ProviderFamily::Local => ServiceType::Local,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Builder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Assembles a [`ResponseRouter`] from injected parts.
///
/// The chat and multimodal backends are required. Everything else
/// defaults: built-in catalog, environment credentials with the default
/// variable names, keyword video trigger, tokio pacing, synthetic renderer.
#[derive(Default)]
pub struct ResponseRouterBuilder {
    catalog: Option<ModelCatalog>,
    probe: Option<CapabilityProbe>,
    chat: Option<Arc<dyn ChatBackend>>,
    multimodal: Option<Arc<dyn MultimodalBackend>>,
    multimodal_model: Option<String>,
    renderer: Option<Arc<dyn VideoRenderer>>,
    pacer: Option<Arc<dyn Pacer>>,
    video_trigger: Option<Arc<dyn VideoTriggerPolicy>>,
    local_config: Option<LocalConfig>,
    video_config: Option<VideoConfig>,
    routing: Option<RoutingConfig>,
}

impl ResponseRouterBuilder {
    pub fn catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn probe(mut self, probe: CapabilityProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn chat_backend(mut self, chat: Arc<dyn ChatBackend>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn multimodal_backend(mut self, backend: Arc<dyn MultimodalBackend>) -> Self {
        self.multimodal = Some(backend);
        self
    }

    /// Model for video scripts and quota fallback.
    pub fn multimodal_model(mut self, model: impl Into<String>) -> Self {
        self.multimodal_model = Some(model.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn VideoRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn video_trigger(mut self, policy: Arc<dyn VideoTriggerPolicy>) -> Self {
        self.video_trigger = Some(policy);
        self
    }

    pub fn local_config(mut self, config: LocalConfig) -> Self {
        self.local_config = Some(config);
        self
    }

    pub fn video_config(mut self, config: VideoConfig) -> Self {
        self.video_config = Some(config);
        self
    }

    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = Some(routing);
        self
    }

    pub fn build(self) -> Result<ResponseRouter> {
        let chat = self
            .chat
            .ok_or_else(|| Error::Config("router needs a chat backend".into()))?;
        let backend = self
            .multimodal
            .ok_or_else(|| Error::Config("router needs a multimodal backend".into()))?;

        let llm_defaults = LlmConfig::default();
        let pacer = self.pacer.unwrap_or_else(|| Arc::new(TokioPacer));
        let renderer = self.renderer.unwrap_or_else(|| {
            Arc::new(SyntheticRenderer::new(
                self.video_config.unwrap_or_default(),
                pacer.clone(),
            ))
        });
        let probe = self.probe.unwrap_or_else(|| {
            CapabilityProbe::from_config(&llm_defaults, Arc::new(crate::credentials::EnvCredentials))
        });
        let model = self
            .multimodal_model
            .unwrap_or_else(|| llm_defaults.multimodal.default_model.clone());

        Ok(ResponseRouter {
            catalog: self.catalog.unwrap_or_default(),
            probe,
            chat,
            multimodal: MultimodalService::new(backend, renderer, model),
            local: LocalResponderBank::new(self.local_config.unwrap_or_default(), pacer),
            video_trigger: self
                .video_trigger
                .unwrap_or_else(|| Arc::new(KeywordVideoTrigger::default())),
            routing: self.routing.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_backends() {
        let err = ResponseRouter::builder().build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn from_config_wires_production_clients() {
        let creds = Arc::new(crate::credentials::StaticCredentials::new());
        let router = ResponseRouter::from_config(&Config::default(), creds).unwrap();
        assert_eq!(router.chat_backend().provider_id(), "openai");
        assert_eq!(router.multimodal().provider_id(), "gemini");
        assert_eq!(router.multimodal().model(), "gemini-1.5-flash");
        assert_eq!(router.catalog().len(), 17);
    }

    #[test]
    fn family_maps_to_service_type() {
        assert_eq!(family_service(ProviderFamily::Local), ServiceType::Local);
        assert_eq!(
            family_service(ProviderFamily::CloudMultimodal),
            ServiceType::CloudMultimodal
        );
    }
}
