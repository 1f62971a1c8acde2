use serde::{Deserialize, Serialize};

/// Which backend family serves a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// OpenAI-compatible chat completions.
    CloudChat,
    /// Gemini-style multimodal generation.
    CloudMultimodal,
    /// Simulated on-premise models answered by the local responder bank.
    Local,
}

impl ProviderFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFamily::CloudChat => "cloud_chat",
            ProviderFamily::CloudMultimodal => "cloud_multimodal",
            ProviderFamily::Local => "local",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Free,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    Fast,
    Medium,
    Slow,
}

/// Static description of a selectable model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub provider_family: ProviderFamily,
    pub name: String,
    pub cost_tier: CostTier,
    pub speed_tier: SpeedTier,
}

impl ModelDescriptor {
    fn builtin(
        id: &str,
        provider_family: ProviderFamily,
        name: &str,
        cost_tier: CostTier,
        speed_tier: SpeedTier,
    ) -> Self {
        Self {
            id: id.into(),
            provider_family,
            name: name.into(),
            cost_tier,
            speed_tier,
        }
    }
}

/// The models shipped with the console.
pub fn builtin_models() -> Vec<ModelDescriptor> {
    use CostTier::*;
    use ProviderFamily::*;
    use SpeedTier::{Fast, Medium as Mid, Slow};

    vec![
        ModelDescriptor::builtin("gpt-4", CloudChat, "GPT-4", High, Slow),
        ModelDescriptor::builtin("gpt-4-turbo", CloudChat, "GPT-4 Turbo", High, Mid),
        ModelDescriptor::builtin("gpt-4o", CloudChat, "GPT-4o", Medium, Fast),
        ModelDescriptor::builtin("gpt-4o-mini", CloudChat, "GPT-4o mini", Low, Fast),
        ModelDescriptor::builtin("gpt-3.5-turbo", CloudChat, "GPT-3.5 Turbo", Low, Fast),
        ModelDescriptor::builtin("gemini-pro", CloudMultimodal, "Gemini Pro", Medium, Mid),
        ModelDescriptor::builtin("gemini-1.5-pro", CloudMultimodal, "Gemini 1.5 Pro", Medium, Mid),
        ModelDescriptor::builtin("gemini-1.5-flash", CloudMultimodal, "Gemini 1.5 Flash", Low, Fast),
        ModelDescriptor::builtin("gemini-2.0-flash", CloudMultimodal, "Gemini 2.0 Flash", Low, Fast),
        ModelDescriptor::builtin("llama-2-7b", Local, "Llama 2 7B", Free, Mid),
        ModelDescriptor::builtin("llama-2-13b", Local, "Llama 2 13B", Free, Slow),
        ModelDescriptor::builtin("mistral-7b", Local, "Mistral 7B", Free, Fast),
        ModelDescriptor::builtin("codellama-7b", Local, "Code Llama 7B", Free, Mid),
        ModelDescriptor::builtin("vicuna-13b", Local, "Vicuna 13B", Free, Slow),
        ModelDescriptor::builtin("falcon-7b", Local, "Falcon 7B", Free, Mid),
        ModelDescriptor::builtin("phi-2", Local, "Phi-2", Free, Fast),
        ModelDescriptor::builtin("orca-mini", Local, "Orca Mini", Free, Fast),
    ]
}

/// Lookup table of known models.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(builtin_models())
    }
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// Built-in models plus extra entries. An extra entry with the same id
    /// replaces the built-in one.
    pub fn with_extra(extra: &[ModelDescriptor]) -> Self {
        let mut models = builtin_models();
        for m in extra {
            match models.iter_mut().find(|b| b.id == m.id) {
                Some(existing) => *existing = m.clone(),
                None => models.push(m.clone()),
            }
        }
        Self { models }
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Provider family for a model id. Unknown ids are treated as local.
    pub fn family_of(&self, id: &str) -> ProviderFamily {
        self.get(id)
            .map(|m| m.provider_family)
            .unwrap_or(ProviderFamily::Local)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_eight_local_personas() {
        let local = builtin_models()
            .into_iter()
            .filter(|m| m.provider_family == ProviderFamily::Local)
            .count();
        assert_eq!(local, 8);
    }

    #[test]
    fn unknown_id_is_local() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.family_of("not-a-model"), ProviderFamily::Local);
        assert_eq!(catalog.family_of(""), ProviderFamily::Local);
    }

    #[test]
    fn known_ids_resolve() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.family_of("gpt-4"), ProviderFamily::CloudChat);
        assert_eq!(catalog.family_of("gemini-pro"), ProviderFamily::CloudMultimodal);
        assert_eq!(catalog.family_of("mistral-7b"), ProviderFamily::Local);
    }

    #[test]
    fn extra_models_override_builtin() {
        let extra = vec![
            ModelDescriptor {
                id: "gpt-4".into(),
                provider_family: ProviderFamily::Local,
                name: "Pinned GPT-4".into(),
                cost_tier: CostTier::Free,
                speed_tier: SpeedTier::Fast,
            },
            ModelDescriptor {
                id: "azure-gpt".into(),
                provider_family: ProviderFamily::CloudChat,
                name: "Azure GPT".into(),
                cost_tier: CostTier::Medium,
                speed_tier: SpeedTier::Medium,
            },
        ];
        let catalog = ModelCatalog::with_extra(&extra);
        assert_eq!(catalog.len(), builtin_models().len() + 1);
        assert_eq!(catalog.family_of("gpt-4"), ProviderFamily::Local);
        assert_eq!(catalog.family_of("azure-gpt"), ProviderFamily::CloudChat);
    }
}
