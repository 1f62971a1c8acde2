//! `supportdesk triage`: structured ticket classification through the
//! chat backend's JSON-schema mode.

use sd_domain::config::Config;
use sd_providers::{ChatBackend, CompletionRequest, JsonSchemaSpec};
use serde::{Deserialize, Serialize};

use crate::bootstrap;

const TRIAGE_PROMPT: &str = "You triage IT support tickets. Pick the closest category, \
judge the priority from business impact, and summarise the request in one sentence.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketTriage {
    pub category: String,
    pub priority: String,
    pub summary: String,
}

/// Schema sent with the request; every field is required and closed.
pub fn triage_schema() -> JsonSchemaSpec {
    JsonSchemaSpec {
        name: "ticket_triage".into(),
        schema: serde_json::json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "enum": ["account", "hardware", "network", "software", "security", "other"]
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high", "critical"]
                },
                "summary": {"type": "string"}
            },
            "required": ["category", "priority", "summary"],
            "additionalProperties": false
        }),
        strict: true,
    }
}

pub async fn run(config: &Config, message: String, model: Option<String>) -> anyhow::Result<()> {
    let router = bootstrap::build_router(config)?;
    let model = model.unwrap_or_else(|| config.llm.chat.default_model.clone());

    let req = CompletionRequest::new(message, model).with_system_prompt(TRIAGE_PROMPT);
    let value = router
        .chat_backend()
        .structured_complete(&req, &triage_schema())
        .await
        .map_err(|e| anyhow::anyhow!("{e}\n{}", e.hint()))?;

    let triage: TicketTriage = serde_json::from_value(value)
        .map_err(|e| anyhow::anyhow!("triage response did not match schema: {e}"))?;
    println!("{}", serde_json::to_string_pretty(&triage)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_all_fields() {
        let spec = triage_schema();
        let required = spec.schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        assert!(spec.strict);
    }

    #[test]
    fn triage_deserializes_from_schema_output() {
        let v = serde_json::json!({
            "category": "network",
            "priority": "high",
            "summary": "VPN drops for the whole sales floor."
        });
        let t: TicketTriage = serde_json::from_value(v).unwrap();
        assert_eq!(t.category, "network");
    }
}
