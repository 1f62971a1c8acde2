//! Video script and render descriptor types.
//!
//! The multimodal path produces a structured script and a rendered-video
//! descriptor. Rendering is a placeholder today: descriptors carry
//! `is_placeholder = true` and their URLs point at nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds assumed for a scene whose duration cannot be parsed.
pub const DEFAULT_SCENE_SECS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoScene {
    #[serde(default)]
    pub scene_number: u32,
    /// Free-form duration as returned by the model, e.g. `"45s"` or `"1:30"`.
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub visual_description: String,
    #[serde(default)]
    pub on_screen_text: String,
}

impl VideoScene {
    /// Parse the scene duration into seconds.
    ///
    /// Accepts `"45"`, `"45s"`, `"45 seconds"`, `"2 min"`, and `"1:30"`.
    pub fn duration_secs(&self) -> Option<u32> {
        let d = self.duration.trim().to_ascii_lowercase();
        if d.is_empty() {
            return None;
        }
        if let Some((m, s)) = d.split_once(':') {
            let m: u32 = m.trim().parse().ok()?;
            let s: u32 = s.trim().parse().ok()?;
            return m.checked_mul(60)?.checked_add(s);
        }
        let digits: String = d.chars().take_while(|c| c.is_ascii_digit()).collect();
        let n: u32 = digits.parse().ok()?;
        let unit = d[digits.len()..].trim();
        if unit.starts_with("min") || unit == "m" {
            n.checked_mul(60)
        } else {
            Some(n)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSpecs {
    #[serde(default = "d_resolution")]
    pub resolution: String,
    #[serde(default = "d_format")]
    pub format: String,
    #[serde(default)]
    pub voice_over: bool,
    #[serde(default)]
    pub background_music: bool,
}

impl Default for TechnicalSpecs {
    fn default() -> Self {
        Self {
            resolution: d_resolution(),
            format: d_format(),
            voice_over: true,
            background_music: false,
        }
    }
}

fn d_resolution() -> String {
    "1920x1080".into()
}

fn d_format() -> String {
    "mp4".into()
}

/// Structured script returned by the multimodal model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoScript {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub scenes: Vec<VideoScene>,
    #[serde(default)]
    pub technical_specs: TechnicalSpecs,
}

impl VideoScript {
    /// Wrap unstructured model output into a one-scene script.
    pub fn single_scene(title: impl Into<String>, raw: &str) -> Self {
        Self {
            title: title.into(),
            description: "Generated from unstructured model output".into(),
            duration: format!("{DEFAULT_SCENE_SECS}s"),
            scenes: vec![VideoScene {
                scene_number: 1,
                duration: format!("{DEFAULT_SCENE_SECS}s"),
                narration: raw.trim().to_string(),
                visual_description: "Presenter walkthrough".into(),
                on_screen_text: String::new(),
            }],
            technical_specs: TechnicalSpecs::default(),
        }
    }

    /// Total running time in seconds.
    pub fn total_secs(&self) -> u32 {
        self.scenes
            .iter()
            .map(|s| s.duration_secs().unwrap_or(DEFAULT_SCENE_SECS))
            .fold(0u32, u32::saturating_add)
    }

    /// Render the script as readable markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        if !self.description.is_empty() {
            out.push_str(&format!("\n{}\n", self.description));
        }
        for scene in &self.scenes {
            out.push_str(&format!(
                "\n## Scene {} ({})\n",
                scene.scene_number, scene.duration
            ));
            if !scene.visual_description.is_empty() {
                out.push_str(&format!("Visual: {}\n", scene.visual_description));
            }
            if !scene.narration.is_empty() {
                out.push_str(&format!("Narration: {}\n", scene.narration));
            }
            if !scene.on_screen_text.is_empty() {
                out.push_str(&format!("On screen: {}\n", scene.on_screen_text));
            }
        }
        out
    }
}

/// Descriptor of a rendered video file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedVideo {
    pub id: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub download_url: String,
    pub resolution: String,
    pub duration_secs: u32,
    pub file_size_bytes: u64,
    pub format: String,
    pub status: String,
    pub is_placeholder: bool,
    pub created_at: DateTime<Utc>,
}

impl RenderedVideo {
    /// Short summary appended to chat content.
    pub fn summary(&self) -> String {
        let mb = self.file_size_bytes as f64 / (1024.0 * 1024.0);
        let mut s = format!(
            "Video ready: {} ({}, {}s, {:.1} MB)\nDownload: {}",
            self.video_url, self.resolution, self.duration_secs, mb, self.download_url
        );
        if self.is_placeholder {
            s.push_str("\n(preview render: placeholder file)");
        }
        s
    }
}

/// Output of one multimodal video generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGeneration {
    pub script: VideoScript,
    pub actual_video: RenderedVideo,
    /// Raw model text the script was parsed from.
    pub raw: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(duration: &str) -> VideoScene {
        VideoScene {
            scene_number: 1,
            duration: duration.into(),
            narration: String::new(),
            visual_description: String::new(),
            on_screen_text: String::new(),
        }
    }

    #[test]
    fn duration_formats() {
        assert_eq!(scene("45").duration_secs(), Some(45));
        assert_eq!(scene("45s").duration_secs(), Some(45));
        assert_eq!(scene("20 seconds").duration_secs(), Some(20));
        assert_eq!(scene("2 min").duration_secs(), Some(120));
        assert_eq!(scene("1:30").duration_secs(), Some(90));
        assert_eq!(scene("a while").duration_secs(), None);
        assert_eq!(scene("").duration_secs(), None);
    }

    #[test]
    fn total_secs_defaults_unparseable_scenes() {
        let script = VideoScript {
            title: "t".into(),
            description: String::new(),
            duration: String::new(),
            scenes: vec![scene("10s"), scene("soon")],
            technical_specs: TechnicalSpecs::default(),
        };
        assert_eq!(script.total_secs(), 10 + DEFAULT_SCENE_SECS);
    }

    #[test]
    fn oversized_durations_fall_back() {
        assert_eq!(scene("80000000 min").duration_secs(), None);
        assert_eq!(scene("80000000:00").duration_secs(), None);
        assert_eq!(scene("4294967295").duration_secs(), Some(u32::MAX));
        let script = VideoScript {
            title: "Huge".into(),
            description: String::new(),
            duration: String::new(),
            scenes: vec![scene("80000000 min"), scene("4294967295"), scene("10")],
            technical_specs: TechnicalSpecs::default(),
        };
        assert_eq!(script.total_secs(), u32::MAX);
    }

    #[test]
    fn script_deserializes_partial_json() {
        let json = r#"{"title":"VPN","scenes":[{"sceneNumber":1,"duration":"15s","narration":"Open the client"}]}"#;
        let script: VideoScript = serde_json::from_str(json).unwrap();
        assert_eq!(script.title, "VPN");
        assert_eq!(script.scenes[0].narration, "Open the client");
        assert_eq!(script.technical_specs.resolution, "1920x1080");
    }

    #[test]
    fn single_scene_keeps_raw_text() {
        let script = VideoScript::single_scene("Reset MFA", "  just some text  ");
        assert_eq!(script.scenes.len(), 1);
        assert_eq!(script.scenes[0].narration, "just some text");
        assert!(script.to_markdown().contains("# Reset MFA"));
    }
}
