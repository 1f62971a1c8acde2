use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Routing policy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Case-insensitive substrings that turn a message into a video request.
    #[serde(default = "d_video_keywords")]
    pub video_keywords: Vec<String>,
    /// System prompt for ordinary cloud chat requests.
    #[serde(default = "d_system_prompt")]
    pub system_prompt: String,
    /// System prompt used when the caller flags the message as an error report.
    #[serde(default = "d_error_system_prompt")]
    pub error_system_prompt: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            video_keywords: d_video_keywords(),
            system_prompt: d_system_prompt(),
            error_system_prompt: d_error_system_prompt(),
        }
    }
}

fn d_video_keywords() -> Vec<String> {
    vec![
        "video".into(),
        "how to".into(),
        "tutorial".into(),
        "convert to".into(),
    ]
}

fn d_system_prompt() -> String {
    "You are an enterprise IT support assistant. Give accurate, concise, \
     step-by-step answers for workplace technology issues (accounts, \
     networking, devices, software). Call out when an action needs \
     administrator rights or a ticket to the service desk."
        .into()
}

fn d_error_system_prompt() -> String {
    "You are an enterprise IT support engineer diagnosing an error. \
     Explain the most likely cause first, list the checks to confirm it, \
     then give the fix. Keep the answer short and ordered."
        .into()
}
