//! Simulated on-premise models.
//!
//! Each local model id maps to a fixed persona template. Responses never
//! fail: the bank waits a random latency, then optionally replays the text
//! word by word into the caller's sink.

use crate::pacing::Pacer;
use rand::Rng;
use sd_domain::config::LocalConfig;
use sd_domain::stream::ChunkSink;
use std::sync::Arc;
use std::time::Duration;

/// Canned-response generators for the local model family.
#[derive(Clone)]
pub struct LocalResponderBank {
    config: LocalConfig,
    pacer: Arc<dyn Pacer>,
}

impl LocalResponderBank {
    pub fn new(config: LocalConfig, pacer: Arc<dyn Pacer>) -> Self {
        Self { config, pacer }
    }

    /// Produce the persona response for `model_id`.
    ///
    /// With a sink, every word (with its trailing whitespace) is delivered
    /// in order, so the chunks concatenate to the returned string.
    pub async fn respond(
        &self,
        message: &str,
        model_id: &str,
        sink: Option<&dyn ChunkSink>,
    ) -> String {
        let response = render_persona(model_id, message.trim());

        let latency = self.sample_latency();
        tracing::debug!(model = %model_id, latency_ms = latency.as_millis() as u64, "local responder");
        self.pacer.pause(latency).await;

        if let Some(sink) = sink {
            let interval = Duration::from_millis(self.config.word_interval_ms);
            for word in response.split_inclusive(char::is_whitespace) {
                self.pacer.pause(interval).await;
                sink.on_chunk(word);
            }
        }

        response
    }

    fn sample_latency(&self) -> Duration {
        let (lo, hi) = if self.config.min_latency_ms <= self.config.max_latency_ms {
            (self.config.min_latency_ms, self.config.max_latency_ms)
        } else {
            (self.config.max_latency_ms, self.config.min_latency_ms)
        };
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }
}

impl std::fmt::Debug for LocalResponderBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalResponderBank")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Persona templates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Model ids with a dedicated persona.
pub const LOCAL_PERSONAS: [&str; 8] = [
    "llama-2-7b",
    "llama-2-13b",
    "mistral-7b",
    "codellama-7b",
    "vicuna-13b",
    "falcon-7b",
    "phi-2",
    "orca-mini",
];

fn render_persona(model_id: &str, message: &str) -> String {
    match model_id {
        "llama-2-7b" => format!(
            "[Llama 2 7B - local] Thanks for reaching out about \"{message}\".\n\n\
             Here is a quick plan:\n\
             1. Confirm the exact symptom and when it started.\n\
             2. Restart the affected application or device.\n\
             3. Check for pending OS and driver updates.\n\
             4. If the problem persists, open a ticket with the service desk \
             and include screenshots.\n\n\
             This answer was generated on-premise; no data left your network."
        ),
        "llama-2-13b" => format!(
            "[Llama 2 13B - local] Detailed analysis of: \"{message}\"\n\n\
             Likely causes:\n\
             - A recent configuration or policy change\n\
             - Cached credentials or stale profile data\n\
             - Network path or DNS resolution problems\n\n\
             Recommended diagnostics:\n\
             1. Review the event log around the time of the failure.\n\
             2. Reproduce the issue with a second account or device.\n\
             3. Compare group policy results with a working machine.\n\n\
             Escalate to tier 2 if the diagnostics do not isolate the cause."
        ),
        "mistral-7b" => format!(
            "[Mistral 7B - local] Short answer for \"{message}\": sign out, \
             clear cached credentials, sign back in, and retry. If it still \
             fails, reboot and check connectivity to the corporate network."
        ),
        "codellama-7b" => format!(
            "[Code Llama 7B - local] Scripted approach for \"{message}\":\n\n\
             ```powershell\n\
             # Gather diagnostics\n\
             Get-ComputerInfo | Select-Object OsName, OsVersion\n\
             Test-NetConnection -ComputerName dc01 -Port 389\n\
             Get-WinEvent -LogName System -MaxEvents 50\n\
             ```\n\n\
             Run the script from an elevated prompt and attach the output to \
             your ticket."
        ),
        "vicuna-13b" => format!(
            "[Vicuna 13B - local] I understand how frustrating that can be. \
             About \"{message}\": most of the time this comes down to an \
             expired password or a sync delay. Try locking and unlocking your \
             session, then wait a few minutes for changes to replicate. Let me \
             know what you see and we can dig further together."
        ),
        "falcon-7b" => format!(
            "[Falcon 7B - local] Troubleshooting checklist for \"{message}\":\n\
             [ ] Device powered on and connected\n\
             [ ] User account active and not locked\n\
             [ ] Latest updates installed\n\
             [ ] Security software not blocking the application\n\
             [ ] Issue reproduced and documented"
        ),
        "phi-2" => format!(
            "[Phi-2 - local] \"{message}\": restart, update, retry. Contact \
             the service desk if the issue continues."
        ),
        "orca-mini" => format!(
            "[Orca Mini - local] Let's reason through \"{message}\" step by step.\n\
             Step 1: Identify what changed recently on the system.\n\
             Step 2: Isolate whether the issue affects one user or many.\n\
             Step 3: Apply the least disruptive fix first.\n\
             Step 4: Verify the fix and document the resolution."
        ),
        other => format!(
            "[{other} - local] Received your request: \"{message}\".\n\n\
             General guidance: restart the affected service, verify network \
             connectivity, and confirm your account permissions. Contact the \
             service desk with details if the issue continues."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoDelay;
    use std::sync::Mutex;

    fn bank() -> LocalResponderBank {
        LocalResponderBank::new(LocalConfig::default(), Arc::new(NoDelay))
    }

    #[tokio::test]
    async fn every_persona_responds() {
        let bank = bank();
        let mut seen = std::collections::HashSet::new();
        for id in LOCAL_PERSONAS {
            let text = bank.respond("Outlook keeps crashing", id, None).await;
            assert!(text.contains("Outlook keeps crashing"), "{id}");
            seen.insert(text);
        }
        assert_eq!(seen.len(), LOCAL_PERSONAS.len());
    }

    #[tokio::test]
    async fn unknown_model_gets_generic_template() {
        let text = bank().respond("hello", "tinyllama", None).await;
        assert!(text.starts_with("[tinyllama - local]"));
    }

    #[tokio::test]
    async fn chunks_concatenate_to_response() {
        let chunks = Mutex::new(Vec::<String>::new());
        let sink = |t: &str| chunks.lock().unwrap().push(t.to_string());
        let text = bank()
            .respond("Wi-Fi drops  on\nfloor 2", "codellama-7b", Some(&sink))
            .await;
        let chunks = chunks.into_inner().unwrap();
        assert!(chunks.len() > 10);
        assert_eq!(chunks.concat(), text);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_stays_within_configured_range() {
        let config = LocalConfig {
            min_latency_ms: 1_000,
            max_latency_ms: 3_000,
            word_interval_ms: 100,
        };
        let bank = LocalResponderBank::new(config, Arc::new(crate::pacing::TokioPacer));
        let start = tokio::time::Instant::now();
        bank.respond("ping", "phi-2", None).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1_000));
        assert!(elapsed <= Duration::from_millis(3_100));
    }

    #[test]
    fn inverted_latency_range_is_tolerated() {
        let config = LocalConfig {
            min_latency_ms: 50,
            max_latency_ms: 10,
            word_interval_ms: 0,
        };
        let bank = LocalResponderBank::new(config, Arc::new(NoDelay));
        let d = bank.sample_latency();
        assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(50));
    }
}
