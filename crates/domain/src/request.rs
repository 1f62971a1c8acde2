use serde::{Deserialize, Serialize};

/// Kind of video the multimodal path should script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    #[default]
    #[serde(rename = "howto")]
    HowTo,
    Tutorial,
    Troubleshooting,
    Overview,
}

impl VideoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::HowTo => "howto",
            VideoType::Tutorial => "tutorial",
            VideoType::Troubleshooting => "troubleshooting",
            VideoType::Overview => "overview",
        }
    }

    /// Phrase used when prompting for a script of this kind.
    pub fn describe(&self) -> &'static str {
        match self {
            VideoType::HowTo => "step-by-step how-to video",
            VideoType::Tutorial => "instructional tutorial video",
            VideoType::Troubleshooting => "troubleshooting walkthrough video",
            VideoType::Overview => "short overview video",
        }
    }
}

impl std::str::FromStr for VideoType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "howto" | "how-to" => Ok(VideoType::HowTo),
            "tutorial" => Ok(VideoType::Tutorial),
            "troubleshooting" => Ok(VideoType::Troubleshooting),
            "overview" => Ok(VideoType::Overview),
            other => Err(format!("unknown video type '{other}'")),
        }
    }
}

/// Caller-supplied per-request options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// `"video"` forces the video path.
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub generate_video: bool,
    #[serde(default)]
    pub video_type: Option<VideoType>,
    /// The message describes an error the user hit; cloud chat answers
    /// with the troubleshooting prompt.
    #[serde(default)]
    pub is_error: bool,
}

impl RequestOptions {
    pub fn video() -> Self {
        Self {
            generate_video: true,
            ..Default::default()
        }
    }
}

/// One routing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub message: String,
    pub model_id: String,
    #[serde(default)]
    pub options: RequestOptions,
}

impl RequestEnvelope {
    pub fn new(message: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model_id: model_id.into(),
            options: RequestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_camel_case() {
        let json = r#"{"contentType":"video","generateVideo":false,"videoType":"howto","isError":true}"#;
        let opts: RequestOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.content_type.as_deref(), Some("video"));
        assert_eq!(opts.video_type, Some(VideoType::HowTo));
        assert!(opts.is_error);
    }

    #[test]
    fn video_type_parses_aliases() {
        assert_eq!("how-to".parse::<VideoType>().unwrap(), VideoType::HowTo);
        assert_eq!("Tutorial".parse::<VideoType>().unwrap(), VideoType::Tutorial);
        assert!("cartoon".parse::<VideoType>().is_err());
    }
}
