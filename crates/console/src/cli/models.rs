//! `supportdesk models`: print the model catalog.

use sd_domain::config::Config;
use sd_domain::model::{ModelCatalog, ModelDescriptor, ProviderFamily};
use sd_providers::{CapabilityFlags, CapabilityProbe, EnvCredentials};
use std::sync::Arc;

pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let catalog = ModelCatalog::with_extra(&config.models);

    if json {
        let models: Vec<&ModelDescriptor> = catalog.iter().collect();
        let out = serde_json::to_string_pretty(&models)
            .map_err(|e| anyhow::anyhow!("serializing catalog: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    let flags = CapabilityProbe::from_config(&config.llm, Arc::new(EnvCredentials)).probe();
    print!("{}", render_table(&catalog, flags));
    Ok(())
}

/// Fixed-width table; the last column says whether the family's key is set.
pub fn render_table(catalog: &ModelCatalog, flags: CapabilityFlags) -> String {
    let mut out = format!(
        "{:<18} {:<18} {:<17} {:<7} {:<7} {}\n",
        "ID", "NAME", "FAMILY", "COST", "SPEED", "READY"
    );
    for m in catalog.iter() {
        out.push_str(&format!(
            "{:<18} {:<18} {:<17} {:<7} {:<7} {}\n",
            m.id,
            m.name,
            m.provider_family.as_str(),
            lower_debug(&m.cost_tier),
            lower_debug(&m.speed_tier),
            if ready(m.provider_family, flags) { "yes" } else { "no key" },
        ));
    }
    out
}

fn ready(family: ProviderFamily, flags: CapabilityFlags) -> bool {
    match family {
        ProviderFamily::CloudChat => flags.has_cloud_chat_key,
        ProviderFamily::CloudMultimodal => flags.has_multimodal_key,
        ProviderFamily::Local => true,
    }
}

fn lower_debug(v: &impl std::fmt::Debug) -> String {
    format!("{v:?}").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_model() {
        let catalog = ModelCatalog::default();
        let table = render_table(&catalog, CapabilityFlags::default());
        assert_eq!(table.lines().count(), catalog.len() + 1);
        assert!(table.lines().next().unwrap().starts_with("ID"));
    }

    #[test]
    fn readiness_follows_keys() {
        let flags = CapabilityFlags {
            has_cloud_chat_key: true,
            has_multimodal_key: false,
        };
        let table = render_table(&ModelCatalog::default(), flags);
        let row = |id: &str| {
            table
                .lines()
                .find(|l| l.split_whitespace().next() == Some(id))
                .unwrap()
                .to_string()
        };
        assert!(row("gpt-4o").ends_with("yes"));
        assert!(row("gemini-pro").ends_with("no key"));
        assert!(row("orca-mini").ends_with("yes"));
    }
}
