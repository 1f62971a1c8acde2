use serde::Serialize;

/// Structured trace events emitted across all SupportDesk crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    RouteResolved {
        requested_model: String,
        provider_family: String,
        service_type: String,
        video_override: bool,
        streaming: bool,
    },
    LlmRequest {
        provider: String,
        model: String,
        streaming: bool,
        duration_ms: u64,
        success: bool,
    },
    LlmFallback {
        from_provider: String,
        from_model: String,
        to_provider: String,
        to_model: String,
        reason: String,
    },
    VideoRendered {
        video_id: String,
        scenes: usize,
        duration_secs: u32,
        placeholder: bool,
    },
    RequestFailed {
        requested_model: String,
        error_kind: String,
        message: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sd_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::LlmFallback {
            from_provider: "openai".into(),
            from_model: "gpt-4".into(),
            to_provider: "gemini".into(),
            to_model: "gemini-1.5-flash".into(),
            reason: "quota_exceeded".into(),
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "LlmFallback");
        assert_eq!(v["to_model"], "gemini-1.5-flash");
    }
}
