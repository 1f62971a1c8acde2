use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Local responder pacing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Simulated latency for the local responder bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "d_min_latency")]
    pub min_latency_ms: u64,
    #[serde(default = "d_max_latency")]
    pub max_latency_ms: u64,
    /// Delay between streamed words.
    #[serde(default = "d_word_interval")]
    pub word_interval_ms: u64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: d_min_latency(),
            max_latency_ms: d_max_latency(),
            word_interval_ms: d_word_interval(),
        }
    }
}

fn d_min_latency() -> u64 {
    1000
}
fn d_max_latency() -> u64 {
    3000
}
fn d_word_interval() -> u64 {
    100
}
