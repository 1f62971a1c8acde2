use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Cloud provider settings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub chat: ChatProviderConfig,
    #[serde(default)]
    pub multimodal: MultimodalProviderConfig,
    /// Key values that mean "not configured" (template defaults shipped in
    /// sample env files).
    #[serde(default = "d_placeholder_keys")]
    pub placeholder_keys: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            chat: ChatProviderConfig::default(),
            multimodal: MultimodalProviderConfig::default(),
            placeholder_keys: d_placeholder_keys(),
        }
    }
}

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatProviderConfig {
    #[serde(default = "d_chat_id")]
    pub id: String,
    #[serde(default = "d_chat_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "d_chat_key_env")]
    pub key_env: String,
    #[serde(default = "d_chat_model")]
    pub default_model: String,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
    /// HTTP timeout. `None` keeps the HTTP client's default (no timeout).
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for ChatProviderConfig {
    fn default() -> Self {
        Self {
            id: d_chat_id(),
            base_url: d_chat_base_url(),
            key_env: d_chat_key_env(),
            default_model: d_chat_model(),
            temperature: d_temperature(),
            max_tokens: d_max_tokens(),
            request_timeout_ms: None,
        }
    }
}

/// Gemini-style multimodal generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultimodalProviderConfig {
    #[serde(default = "d_mm_id")]
    pub id: String,
    #[serde(default = "d_mm_base_url")]
    pub base_url: String,
    #[serde(default = "d_mm_key_env")]
    pub key_env: String,
    /// Model used for video scripts and as the quota fallback target.
    #[serde(default = "d_mm_model")]
    pub default_model: String,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for MultimodalProviderConfig {
    fn default() -> Self {
        Self {
            id: d_mm_id(),
            base_url: d_mm_base_url(),
            key_env: d_mm_key_env(),
            default_model: d_mm_model(),
            request_timeout_ms: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_placeholder_keys() -> Vec<String> {
    vec![
        "your_openai_api_key_here".into(),
        "your_gemini_api_key_here".into(),
    ]
}
fn d_chat_id() -> String {
    "openai".into()
}
fn d_chat_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_chat_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn d_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn d_temperature() -> f32 {
    0.7
}
fn d_max_tokens() -> u32 {
    1000
}
fn d_mm_id() -> String {
    "gemini".into()
}
fn d_mm_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn d_mm_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn d_mm_model() -> String {
    "gemini-1.5-flash".into()
}
