//! Video script generation and plain-text use of the multimodal backend.

use crate::sse::collect_tokens;
use crate::traits::{InlineImage, MultimodalBackend};
use crate::video::{build_script_prompt, fallback_title, parse_video_script, VideoRenderer};
use chrono::Utc;
use sd_domain::error::{Error, Result};
use sd_domain::request::VideoType;
use sd_domain::stream::ChunkSink;
use sd_domain::video::VideoGeneration;
use std::sync::Arc;

/// Operations the router and console run against the multimodal provider.
///
/// Video-path failures come back as [`Error::Video`]; a missing key stays
/// [`Error::NotConfigured`] so callers can name the variable.
#[derive(Clone)]
pub struct MultimodalService {
    backend: Arc<dyn MultimodalBackend>,
    renderer: Arc<dyn VideoRenderer>,
    model: String,
}

impl MultimodalService {
    pub fn new(
        backend: Arc<dyn MultimodalBackend>,
        renderer: Arc<dyn VideoRenderer>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            renderer,
            model: model.into(),
        }
    }

    /// Model used for video scripts and for text without an explicit model.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_id(&self) -> &str {
        self.backend.provider_id()
    }

    pub async fn generate_video_script(
        &self,
        message: &str,
        video_type: VideoType,
    ) -> Result<VideoGeneration> {
        let prompt = build_script_prompt(message, video_type);
        let raw = self
            .backend
            .generate(&prompt, &self.model, None)
            .await
            .map_err(video_error)?;
        self.finish(message, raw).await
    }

    /// Stream the script text into `sink`, then render.
    pub async fn stream_video_script(
        &self,
        message: &str,
        sink: &dyn ChunkSink,
        video_type: VideoType,
    ) -> Result<VideoGeneration> {
        let prompt = build_script_prompt(message, video_type);
        let stream = self
            .backend
            .generate_stream(&prompt, &self.model)
            .await
            .map_err(video_error)?;
        let raw = collect_tokens(stream, Some(sink))
            .await
            .map_err(video_error)?;
        self.finish(message, raw).await
    }

    /// Send `prompt` with an inline image, then render the resulting script.
    pub async fn generate_with_image(
        &self,
        prompt: &str,
        image: &InlineImage,
    ) -> Result<VideoGeneration> {
        let full_prompt = build_script_prompt(prompt, VideoType::HowTo);
        let raw = self
            .backend
            .generate(&full_prompt, &self.model, Some(image))
            .await
            .map_err(video_error)?;
        self.finish(prompt, raw).await
    }

    /// Plain text generation. Streams into `sink` when one is given.
    pub async fn generate_text(
        &self,
        message: &str,
        model: Option<&str>,
        sink: Option<&dyn ChunkSink>,
    ) -> Result<String> {
        let model = model.unwrap_or(&self.model);
        match sink {
            Some(sink) => {
                let stream = self.backend.generate_stream(message, model).await?;
                collect_tokens(stream, Some(sink)).await
            }
            None => self.backend.generate(message, model, None).await,
        }
    }

    async fn finish(&self, message: &str, raw: String) -> Result<VideoGeneration> {
        let (script, structured) = parse_video_script(&raw, &fallback_title(message));
        tracing::debug!(structured, scenes = script.scenes.len(), "video script parsed");

        let actual_video = self.renderer.render(&script).await.map_err(video_error)?;
        Ok(VideoGeneration {
            script,
            actual_video,
            raw,
            model: self.model.clone(),
            timestamp: Utc::now(),
        })
    }
}

impl std::fmt::Debug for MultimodalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultimodalService")
            .field("provider", &self.backend.provider_id())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

fn video_error(err: Error) -> Error {
    match err {
        Error::NotConfigured { .. } | Error::Video(_) => err,
        other => Error::Video(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoDelay;
    use crate::video::SyntheticRenderer;
    use sd_domain::config::VideoConfig;
    use sd_domain::stream::{BoxStream, StreamEvent};
    use std::sync::Mutex;

    struct ScriptedBackend {
        reply: std::result::Result<String, String>,
        last_prompt: Mutex<Option<(String, bool)>>,
    }

    impl ScriptedBackend {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.into()),
                last_prompt: Mutex::new(None),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.into()),
                last_prompt: Mutex::new(None),
            }
        }

        fn result(&self) -> Result<String> {
            self.reply.clone().map_err(|message| Error::Provider {
                provider: "fake".into(),
                message,
            })
        }
    }

    #[async_trait::async_trait]
    impl MultimodalBackend for ScriptedBackend {
        async fn generate(
            &self,
            prompt: &str,
            _model: &str,
            image: Option<&InlineImage>,
        ) -> Result<String> {
            *self.last_prompt.lock().unwrap() = Some((prompt.to_string(), image.is_some()));
            self.result()
        }

        async fn generate_stream(
            &self,
            _prompt: &str,
            _model: &str,
        ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
            let text = self.result()?;
            let tokens: Vec<Result<StreamEvent>> = text
                .split_inclusive(' ')
                .map(|t| Ok(StreamEvent::Token { text: t.to_string() }))
                .collect();
            Ok(Box::pin(futures_util::stream::iter(tokens)))
        }

        fn provider_id(&self) -> &str {
            "fake"
        }
    }

    fn service(backend: ScriptedBackend) -> (MultimodalService, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let renderer = Arc::new(SyntheticRenderer::new(VideoConfig::default(), Arc::new(NoDelay)));
        (
            MultimodalService::new(backend.clone(), renderer, "gemini-1.5-flash"),
            backend,
        )
    }

    #[tokio::test]
    async fn video_script_falls_back_to_single_scene() {
        let (svc, _) = service(ScriptedBackend::ok("Open Settings then Accounts"));
        let gen = svc
            .generate_video_script("Make a video on adding a work account", VideoType::HowTo)
            .await
            .unwrap();
        assert_eq!(gen.script.scenes.len(), 1);
        assert_eq!(gen.actual_video.duration_secs, 30);
        assert_eq!(gen.model, "gemini-1.5-flash");
        assert!(gen.actual_video.is_placeholder);
    }

    #[tokio::test]
    async fn streamed_script_matches_chunks() {
        let (svc, _) = service(ScriptedBackend::ok(r#"{"title":"T","scenes":[{"duration":"20s"}]}"#));
        let chunks = Mutex::new(String::new());
        let sink = |t: &str| chunks.lock().unwrap().push_str(t);
        let gen = svc
            .stream_video_script("tutorial please", &sink, VideoType::Tutorial)
            .await
            .unwrap();
        assert_eq!(*chunks.lock().unwrap(), gen.raw);
        assert_eq!(gen.script.title, "T");
    }

    #[tokio::test]
    async fn image_is_forwarded() {
        let (svc, backend) = service(ScriptedBackend::ok("{}"));
        let img = InlineImage::new("image/jpeg", vec![1, 2, 3]);
        svc.generate_with_image("What does this dialog mean?", &img)
            .await
            .unwrap();
        let (prompt, had_image) = backend.last_prompt.lock().unwrap().clone().unwrap();
        assert!(had_image);
        assert!(prompt.contains("What does this dialog mean?"));
    }

    #[tokio::test]
    async fn video_failures_are_wrapped() {
        let (svc, _) = service(ScriptedBackend::failing("HTTP 500"));
        let err = svc
            .generate_video_script("video", VideoType::HowTo)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Video(_)));
        assert!(err.to_string().starts_with("video generation error:"));
    }

    #[tokio::test]
    async fn text_errors_are_not_wrapped() {
        let (svc, _) = service(ScriptedBackend::failing("HTTP 500"));
        let err = svc.generate_text("hi", None, None).await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }
}
