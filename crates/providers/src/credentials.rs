//! Credential lookup and per-request capability probing.
//!
//! [`CapabilityProbe`] answers "is this provider's key configured?" before
//! the router commits to a network call. Keys are read through a
//! [`CredentialSource`] on every call and never cached, so rotating a key
//! in the environment takes effect on the next request.

use sd_domain::config::LlmConfig;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Where raw credential values come from.
pub trait CredentialSource: Send + Sync {
    /// Raw value of the named variable, if set.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads credentials from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed in-memory credentials, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Which cloud providers have a usable key right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityFlags {
    pub has_cloud_chat_key: bool,
    pub has_multimodal_key: bool,
}

/// Checks credential presence for the chat and multimodal providers.
///
/// Empty values and known placeholder strings count as absent.
#[derive(Clone)]
pub struct CapabilityProbe {
    source: Arc<dyn CredentialSource>,
    chat_env: String,
    multimodal_env: String,
    placeholders: Vec<String>,
}

impl CapabilityProbe {
    pub fn new(
        source: Arc<dyn CredentialSource>,
        chat_env: impl Into<String>,
        multimodal_env: impl Into<String>,
    ) -> Self {
        Self {
            source,
            chat_env: chat_env.into(),
            multimodal_env: multimodal_env.into(),
            placeholders: Vec::new(),
        }
    }

    /// Build a probe using the env var names and placeholders in `cfg`.
    pub fn from_config(cfg: &LlmConfig, source: Arc<dyn CredentialSource>) -> Self {
        Self::new(source, &cfg.chat.key_env, &cfg.multimodal.key_env)
            .with_placeholders(cfg.placeholder_keys.clone())
    }

    pub fn with_placeholders(mut self, placeholders: Vec<String>) -> Self {
        self.placeholders = placeholders;
        self
    }

    pub fn chat_env(&self) -> &str {
        &self.chat_env
    }

    pub fn multimodal_env(&self) -> &str {
        &self.multimodal_env
    }

    pub fn probe(&self) -> CapabilityFlags {
        CapabilityFlags {
            has_cloud_chat_key: self.resolve(&self.chat_env).is_some(),
            has_multimodal_key: self.resolve(&self.multimodal_env).is_some(),
        }
    }

    /// The usable key stored under `env_var`, or `None` when it is unset,
    /// blank, or a placeholder.
    pub fn resolve(&self, env_var: &str) -> Option<String> {
        let value = self.source.get(env_var)?;
        let trimmed = value.trim();
        if trimmed.is_empty() || self.placeholders.iter().any(|p| p == trimmed) {
            return None;
        }
        Some(trimmed.to_string())
    }
}

impl std::fmt::Debug for CapabilityProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityProbe")
            .field("chat_env", &self.chat_env)
            .field("multimodal_env", &self.multimodal_env)
            .finish_non_exhaustive()
    }
}
