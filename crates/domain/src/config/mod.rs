mod llm;
mod local;
mod routing;
mod video;

pub use llm::*;
pub use local::*;
pub use routing::*;
pub use video::*;

use crate::model::ModelDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Extra models appended to (or replacing) the built-in catalog.
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let endpoints = [
            ("llm.chat.base_url", &self.llm.chat.base_url),
            ("llm.multimodal.base_url", &self.llm.multimodal.base_url),
        ];
        for (field, url) in endpoints {
            if url.is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: field.into(),
                    message: "base_url must not be empty".into(),
                });
            } else if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: field.into(),
                    message: format!("'{url}' is not an http(s) URL"),
                });
            }
        }

        if self.llm.chat.key_env.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.chat.key_env".into(),
                message: "key_env must name an environment variable".into(),
            });
        }
        if self.llm.multimodal.key_env.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.multimodal.key_env".into(),
                message: "key_env must name an environment variable".into(),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.chat.temperature) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.chat.temperature".into(),
                message: "temperature must be between 0.0 and 2.0".into(),
            });
        }

        if self.local.min_latency_ms > self.local.max_latency_ms {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "local.min_latency_ms".into(),
                message: "min_latency_ms must not exceed max_latency_ms".into(),
            });
        }

        if self.routing.video_keywords.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "routing.video_keywords".into(),
                message: "no video keywords: only explicit options trigger video generation"
                    .into(),
            });
        }

        for (i, model) in self.models.iter().enumerate() {
            if model.id.trim().is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: format!("models[{i}].id"),
                    message: "model id must not be empty".into(),
                });
            }
        }

        errors
    }
}
