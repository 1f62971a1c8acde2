pub mod classifier;
pub mod credentials;
pub mod gemini;
pub mod local;
pub mod multimodal;
pub mod openai;
pub mod pacing;
pub mod router;
pub mod traits;
pub mod video;
pub(crate) mod sse;
pub(crate) mod util;

// Re-exports for convenience.
pub use classifier::{classify_service, is_video_request, KeywordVideoTrigger, VideoTriggerPolicy};
pub use credentials::{CapabilityFlags, CapabilityProbe, CredentialSource, EnvCredentials, StaticCredentials};
pub use gemini::GeminiClient;
pub use local::LocalResponderBank;
pub use multimodal::MultimodalService;
pub use openai::OpenAiChatClient;
pub use pacing::{NoDelay, Pacer, TokioPacer};
pub use router::{ResponseRouter, ResponseRouterBuilder, FALLBACK_NOTICE};
pub use traits::{ChatBackend, CompletionRequest, InlineImage, JsonSchemaSpec, MultimodalBackend};
pub use video::{SyntheticRenderer, VideoRenderer};
