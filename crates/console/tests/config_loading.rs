//! Config file loading through the console's loader.

use sd_console::cli::load_config_from;
use sd_domain::config::ConfigSeverity;
use std::io::Write;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(dir.path().join("supportdesk.toml")).unwrap();
    assert_eq!(config.llm.chat.key_env, "OPENAI_API_KEY");
    assert_eq!(config.llm.multimodal.key_env, "GEMINI_API_KEY");
    assert!(config.validate().is_empty());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[llm.chat]
default_model = "gpt-4-turbo"
request_timeout_ms = 15000

[local]
min_latency_ms = 0
max_latency_ms = 0

[[models]]
id = "helpdesk-7b"
provider_family = "local"
name = "Helpdesk 7B"
cost_tier = "free"
speed_tier = "fast"
"#
    )
    .unwrap();

    let config = load_config_from(file.path()).unwrap();
    assert_eq!(config.llm.chat.default_model, "gpt-4-turbo");
    assert_eq!(config.llm.chat.request_timeout_ms, Some(15000));
    assert_eq!(config.llm.chat.key_env, "OPENAI_API_KEY");
    assert_eq!(config.local.max_latency_ms, 0);
    assert_eq!(config.models.len(), 1);
    assert!(!config.routing.video_keywords.is_empty());
}

#[test]
fn malformed_file_names_the_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[llm.chat\nbase_url = ").unwrap();

    let err = load_config_from(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("parsing "));
}

#[test]
fn invalid_values_surface_in_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[llm.multimodal]
base_url = "generativelanguage.googleapis.com"
"#
    )
    .unwrap();

    let config = load_config_from(file.path()).unwrap();
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, "llm.multimodal.base_url");
    assert_eq!(issues[0].severity, ConfigSeverity::Error);
}

#[test]
fn shown_config_parses_back() {
    let config = load_config_from("/nonexistent/supportdesk.toml").unwrap();
    let rendered = toml::to_string_pretty(&config).unwrap();
    let reparsed: sd_domain::config::Config = toml::from_str(&rendered).unwrap();
    assert_eq!(reparsed.llm.chat.default_model, config.llm.chat.default_model);
    assert_eq!(reparsed.routing.video_keywords, config.routing.video_keywords);
}
