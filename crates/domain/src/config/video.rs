use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Video rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the placeholder video renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Artificial render time before the descriptor is returned.
    #[serde(default = "d_render_delay")]
    pub render_delay_ms: u64,
    /// Base URL the fabricated video/thumbnail links are built from.
    #[serde(default = "d_storage_base_url")]
    pub storage_base_url: String,
    #[serde(default = "d_resolution")]
    pub resolution: String,
    /// Bytes per second of video used to estimate file size.
    #[serde(default = "d_bytes_per_sec")]
    pub bytes_per_sec: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            render_delay_ms: d_render_delay(),
            storage_base_url: d_storage_base_url(),
            resolution: d_resolution(),
            bytes_per_sec: d_bytes_per_sec(),
        }
    }
}

fn d_render_delay() -> u64 {
    2000
}
fn d_storage_base_url() -> String {
    "https://storage.supportdesk.local/videos".into()
}
fn d_resolution() -> String {
    "1920x1080".into()
}
fn d_bytes_per_sec() -> u64 {
    250 * 1024
}
