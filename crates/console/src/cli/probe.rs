//! `supportdesk probe`: report which provider keys are usable.

use sd_domain::config::Config;
use sd_providers::{CapabilityProbe, EnvCredentials};
use std::sync::Arc;

pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let probe = CapabilityProbe::from_config(&config.llm, Arc::new(EnvCredentials));
    print!("{}", render(&probe, json)?);
    Ok(())
}

pub fn render(probe: &CapabilityProbe, json: bool) -> anyhow::Result<String> {
    let flags = probe.probe();
    if json {
        let out = serde_json::to_string_pretty(&flags)
            .map_err(|e| anyhow::anyhow!("serializing capability flags: {e}"))?;
        return Ok(format!("{out}\n"));
    }

    let state = |present: bool| if present { "configured" } else { "missing" };
    Ok(format!(
        "cloud chat  ({}): {}\nmultimodal  ({}): {}\nlocal models: always available\n",
        probe.chat_env(),
        state(flags.has_cloud_chat_key),
        probe.multimodal_env(),
        state(flags.has_multimodal_key),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_providers::StaticCredentials;

    fn probe() -> CapabilityProbe {
        let creds = StaticCredentials::new()
            .with("OPENAI_API_KEY", "sk-live")
            .with("GEMINI_API_KEY", "   ");
        CapabilityProbe::new(Arc::new(creds), "OPENAI_API_KEY", "GEMINI_API_KEY")
    }

    #[test]
    fn text_report_names_variables() {
        let out = render(&probe(), false).unwrap();
        assert!(out.contains("(OPENAI_API_KEY): configured"));
        assert!(out.contains("(GEMINI_API_KEY): missing"));
    }

    #[test]
    fn json_report_is_camel_case() {
        let out = render(&probe(), true).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["hasCloudChatKey"], true);
        assert_eq!(v["hasMultimodalKey"], false);
    }
}
