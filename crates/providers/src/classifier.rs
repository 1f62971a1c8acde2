//! Request classification: which provider family serves a model id, and
//! whether a message is really asking for a video.
//!
//! The video trigger is a keyword match over the message plus explicit
//! caller options. It is known to over-trigger ("how to interpret this
//! error code" becomes a video request); swap in a different
//! [`VideoTriggerPolicy`] on the router to change that without touching
//! dispatch.

use sd_domain::model::{ModelCatalog, ProviderFamily};
use sd_domain::request::{RequestOptions, VideoType};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Provider family
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Family serving `model_id`. Unknown ids fall back to [`ProviderFamily::Local`].
pub fn classify_service(catalog: &ModelCatalog, model_id: &str) -> ProviderFamily {
    catalog.family_of(model_id)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Video trigger
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Decides whether a request is forced onto the video generation path.
pub trait VideoTriggerPolicy: Send + Sync {
    fn is_video_request(&self, message: &str, options: &RequestOptions) -> bool;
}

/// Keyword-and-options trigger.
#[derive(Debug, Clone)]
pub struct KeywordVideoTrigger {
    /// Lowercased keywords.
    keywords: Vec<String>,
}

impl Default for KeywordVideoTrigger {
    fn default() -> Self {
        Self::new(["video", "how to", "tutorial", "convert to"])
    }
}

impl KeywordVideoTrigger {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl VideoTriggerPolicy for KeywordVideoTrigger {
    fn is_video_request(&self, message: &str, options: &RequestOptions) -> bool {
        if options_request_video(options) {
            return true;
        }
        let lower = message.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

/// Default-keyword check, usable without constructing a policy.
pub fn is_video_request(message: &str, options: &RequestOptions) -> bool {
    KeywordVideoTrigger::default().is_video_request(message, options)
}

fn options_request_video(options: &RequestOptions) -> bool {
    options.generate_video
        || options
            .content_type
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("video"))
        || options.video_type == Some(VideoType::HowTo)
}
