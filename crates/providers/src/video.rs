//! Video script prompting, parsing, and rendering.
//!
//! Rendering is a stub: [`SyntheticRenderer`] waits a fixed delay and
//! fabricates a descriptor with placeholder URLs. A real render backend
//! plugs in behind [`VideoRenderer`].

use crate::pacing::Pacer;
use chrono::Utc;
use regex::Regex;
use sd_domain::config::VideoConfig;
use sd_domain::error::Result;
use sd_domain::request::VideoType;
use sd_domain::trace::TraceEvent;
use sd_domain::video::{RenderedVideo, VideoScript};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// Fenced ```json blocks in model output.
static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*\})\s*```").expect("valid regex")
});

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Renderer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Turns a script into a video file descriptor.
#[async_trait::async_trait]
pub trait VideoRenderer: Send + Sync {
    async fn render(&self, script: &VideoScript) -> Result<RenderedVideo>;
}

/// Placeholder renderer. Produces `is_placeholder = true` descriptors whose
/// URLs are derived from `storage_base_url`; no media is generated.
pub struct SyntheticRenderer {
    config: VideoConfig,
    pacer: Arc<dyn Pacer>,
}

impl SyntheticRenderer {
    pub fn new(config: VideoConfig, pacer: Arc<dyn Pacer>) -> Self {
        Self { config, pacer }
    }
}

#[async_trait::async_trait]
impl VideoRenderer for SyntheticRenderer {
    async fn render(&self, script: &VideoScript) -> Result<RenderedVideo> {
        self.pacer
            .pause(Duration::from_millis(self.config.render_delay_ms))
            .await;

        let id = format!("vid_{}", uuid::Uuid::new_v4().simple());
        let base = self.config.storage_base_url.trim_end_matches('/');
        let duration_secs = script.total_secs();

        let video = RenderedVideo {
            video_url: format!("{base}/{id}.mp4"),
            thumbnail_url: format!("{base}/{id}_thumb.jpg"),
            download_url: format!("{base}/{id}.mp4?download=1"),
            resolution: self.config.resolution.clone(),
            duration_secs,
            file_size_bytes: u64::from(duration_secs).saturating_mul(self.config.bytes_per_sec),
            format: "mp4".into(),
            status: "completed".into(),
            is_placeholder: true,
            created_at: Utc::now(),
            id,
        };

        TraceEvent::VideoRendered {
            video_id: video.id.clone(),
            scenes: script.scenes.len(),
            duration_secs,
            placeholder: true,
        }
        .emit();

        Ok(video)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Script prompt + parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Prompt asking the model for a JSON video script.
pub fn build_script_prompt(message: &str, video_type: VideoType) -> String {
    format!(
        "You are producing a {kind} for an enterprise IT support knowledge base.\n\
         Request: {message}\n\n\
         Respond with JSON only, no prose, using this shape:\n\
         {{\n\
           \"title\": \"short title\",\n\
           \"description\": \"one sentence summary\",\n\
           \"duration\": \"total length, e.g. 2:30\",\n\
           \"scenes\": [\n\
             {{\"sceneNumber\": 1, \"duration\": \"30s\", \"narration\": \"...\", \
         \"visualDescription\": \"...\", \"onScreenText\": \"...\"}}\n\
           ],\n\
           \"technicalSpecs\": {{\"resolution\": \"1920x1080\", \"format\": \"mp4\", \
         \"voiceOver\": true, \"backgroundMusic\": false}}\n\
         }}\n\
         Keep each scene focused on one action the viewer performs.",
        kind = video_type.describe(),
    )
}

/// Parse model output into a script.
///
/// Accepts bare JSON, a fenced ```json block, or the outermost `{…}` span.
/// Anything else, or a script with no scenes, is wrapped as a single
/// scene. The flag reports whether structured parsing succeeded.
pub fn parse_video_script(raw: &str, fallback_title: &str) -> (VideoScript, bool) {
    let parsed = candidate_json(raw)
        .into_iter()
        .find_map(|candidate| serde_json::from_str::<VideoScript>(candidate).ok())
        .filter(|script| !script.scenes.is_empty());

    match parsed {
        Some(mut script) => {
            if script.title.trim().is_empty() {
                script.title = fallback_title.to_string();
            }
            for (i, scene) in script.scenes.iter_mut().enumerate() {
                if scene.scene_number == 0 {
                    scene.scene_number = i as u32 + 1;
                }
            }
            (script, true)
        }
        None => {
            tracing::debug!("video script was not valid JSON; wrapping raw text");
            (VideoScript::single_scene(fallback_title, raw), false)
        }
    }
}

fn candidate_json(raw: &str) -> Vec<&str> {
    let trimmed = raw.trim();
    let mut out = vec![trimmed];
    if let Some(caps) = FENCED_JSON.captures(trimmed) {
        if let Some(m) = caps.get(1) {
            out.push(m.as_str());
        }
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            out.push(&trimmed[start..=end]);
        }
    }
    out
}

/// Title used when the model's script has none: the request, shortened.
pub fn fallback_title(message: &str) -> String {
    let trimmed = message.trim();
    match trimmed.char_indices().nth(60) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoDelay;

    const SCRIPT_JSON: &str = r#"{
        "title": "Connect to the VPN",
        "description": "Set up GlobalProtect",
        "duration": "1:15",
        "scenes": [
            {"sceneNumber": 1, "duration": "30s", "narration": "Open GlobalProtect"},
            {"sceneNumber": 2, "duration": "45s", "narration": "Enter the portal address"}
        ]
    }"#;

    #[test]
    fn parses_bare_json() {
        let (script, structured) = parse_video_script(SCRIPT_JSON, "fallback");
        assert!(structured);
        assert_eq!(script.title, "Connect to the VPN");
        assert_eq!(script.total_secs(), 75);
    }

    #[test]
    fn parses_fenced_json_with_prose() {
        let raw = format!("Here is your script:\n```json\n{SCRIPT_JSON}\n```\nEnjoy!");
        let (script, structured) = parse_video_script(&raw, "fallback");
        assert!(structured);
        assert_eq!(script.scenes.len(), 2);
    }

    #[test]
    fn unparseable_text_becomes_single_scene() {
        let raw = "Step one: open settings. Step two: click Network.";
        let (script, structured) = parse_video_script(raw, "Network setup");
        assert!(!structured);
        assert_eq!(script.title, "Network setup");
        assert_eq!(script.scenes.len(), 1);
        assert_eq!(script.scenes[0].narration, raw);
    }

    #[test]
    fn json_without_scenes_falls_back() {
        let (script, structured) = parse_video_script(r#"{"title":"Empty"}"#, "fb");
        assert!(!structured);
        assert_eq!(script.scenes.len(), 1);
    }

    #[test]
    fn missing_title_and_scene_numbers_are_filled() {
        let raw = r#"{"scenes":[{"duration":"10s"},{"duration":"5s"}]}"#;
        let (script, _) = parse_video_script(raw, "Printer jam");
        assert_eq!(script.title, "Printer jam");
        assert_eq!(script.scenes[1].scene_number, 2);
    }

    #[test]
    fn prompt_mentions_type_and_request() {
        let p = build_script_prompt("reset MFA", VideoType::Troubleshooting);
        assert!(p.contains("troubleshooting walkthrough video"));
        assert!(p.contains("reset MFA"));
        assert!(p.contains("\"sceneNumber\""));
    }

    #[test]
    fn fallback_title_is_shortened() {
        let long = "a".repeat(200);
        assert_eq!(fallback_title(&long).chars().count(), 61);
        assert_eq!(fallback_title("  VPN  "), "VPN");
    }

    #[tokio::test]
    async fn synthetic_render_shape() {
        let renderer = SyntheticRenderer::new(VideoConfig::default(), Arc::new(NoDelay));
        let (script, _) = parse_video_script(SCRIPT_JSON, "fb");
        let video = renderer.render(&script).await.unwrap();

        let base = "https://storage.supportdesk.local/videos";
        assert!(video.id.starts_with("vid_"));
        assert_eq!(video.video_url, format!("{base}/{}.mp4", video.id));
        assert_eq!(video.thumbnail_url, format!("{base}/{}_thumb.jpg", video.id));
        assert_eq!(video.download_url, format!("{base}/{}.mp4?download=1", video.id));
        assert_eq!(video.resolution, "1920x1080");
        assert_eq!(video.duration_secs, 75);
        assert_eq!(video.file_size_bytes, 75 * 250 * 1024);
        assert!(video.is_placeholder);
    }

    #[tokio::test(start_paused = true)]
    async fn render_waits_configured_delay() {
        let renderer =
            SyntheticRenderer::new(VideoConfig::default(), Arc::new(crate::pacing::TokioPacer));
        let start = tokio::time::Instant::now();
        renderer
            .render(&VideoScript::single_scene("t", "x"))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2_000));
    }
}
