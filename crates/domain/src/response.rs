use crate::error::{Error, ErrorKind};
use crate::video::VideoGeneration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which path produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    CloudChat,
    CloudMultimodal,
    Local,
    Video,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::CloudChat => "cloud_chat",
            ServiceType::CloudMultimodal => "cloud_multimodal",
            ServiceType::Local => "local",
            ServiceType::Video => "video",
        }
    }
}

/// Final outcome of one routed request.
///
/// Always renderable: when `success` is false, `content` holds a
/// user-facing explanation and `error` the machine-readable category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseResult {
    pub content: String,
    /// Model that actually produced the content.
    pub model: String,
    pub requested_model: String,
    pub service_type: ServiceType,
    pub response_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub is_video_content: bool,
    #[serde(default)]
    pub fallback_used: bool,
    #[serde(default)]
    pub quota_exceeded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoGeneration>,
}

impl ResponseResult {
    /// A successful result; timing is filled in by the caller.
    pub fn succeeded(
        content: String,
        model: impl Into<String>,
        requested_model: impl Into<String>,
        service_type: ServiceType,
    ) -> Self {
        Self {
            content,
            model: model.into(),
            requested_model: requested_model.into(),
            service_type,
            response_time_ms: 0,
            timestamp: Utc::now(),
            success: true,
            error: None,
            error_message: None,
            is_video_content: service_type == ServiceType::Video,
            fallback_used: false,
            quota_exceeded: false,
            suggestions: Vec::new(),
            video: None,
        }
    }

    /// A failed result carrying the error category and a user-facing message.
    pub fn failed(
        err: &Error,
        content: String,
        requested_model: impl Into<String>,
        service_type: ServiceType,
        suggestions: Vec<String>,
    ) -> Self {
        let requested_model = requested_model.into();
        let content = if content.trim().is_empty() {
            format!("The request could not be completed: {err}")
        } else {
            content
        };
        Self {
            content,
            model: requested_model.clone(),
            requested_model,
            service_type,
            response_time_ms: 0,
            timestamp: Utc::now(),
            success: false,
            error: Some(err.kind()),
            error_message: Some(err.to_string()),
            is_video_content: false,
            fallback_used: false,
            quota_exceeded: err.kind() == ErrorKind::QuotaExceeded,
            suggestions,
            video: None,
        }
    }

    pub fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = ms;
        self
    }
}
