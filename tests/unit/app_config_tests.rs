/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use tixobot::app_config::{Config, LlmProvider, LogLevel, ProviderConfig};
use tixobot::language::{Language, LanguagePolicy};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.bot_name, "Camile");
    assert_eq!(config.default_language, Language::Es);
    assert_eq!(config.matching.confidence_threshold, 0.5);
    assert_eq!(config.matching.trust_threshold, 0.7);
    assert_eq!(config.matching.language_policy, LanguagePolicy::Detected);
    assert!(config.matching.catalog_path.is_none());

    assert_eq!(config.llm.provider, LlmProvider::OpenAI);
    assert_eq!(config.llm.common.max_tokens, 150);
    assert_eq!(config.llm.common.history_window, 5);
    assert_eq!(config.llm.get_model(), "gpt-3.5-turbo");
    assert_eq!(config.llm.available_providers.len(), 4);

    assert_eq!(config.messages.fallback.es.len(), 2);
    assert_eq!(config.messages.fallback.en.len(), 2);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.matching.confidence_threshold = 0.8;
    assert!(config.validate().is_err(), "admission above trust must fail");
    config.matching.confidence_threshold = 0.5;

    config.matching.trust_threshold = 1.5;
    assert!(config.validate().is_err());
    config.matching.trust_threshold = 0.7;

    config.messages.fallback.en.clear();
    assert!(config.validate().is_err());
    config.messages.fallback.en.push("Sorry".to_string());

    config.handoff.webhook_url = Some("not a url".to_string());
    assert!(config.validate().is_err());
    config.handoff.webhook_url = Some("https://hooks.example.com/handoff".to_string());
    assert!(config.validate().is_ok());

    config.bot_name = "  ".to_string();
    assert!(config.validate().is_err());
}

/// A missing API key is not a validation error
#[test]
fn test_config_validation_withoutApiKey_shouldPassInLimitedMode() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(!config.llm.is_usable());
}

#[test]
fn test_config_validation_withBadEndpoint_onlyMattersWhenEnabled() {
    let mut config = Config::default();
    config.llm.provider = LlmProvider::Ollama;
    config.llm.available_providers = vec![ProviderConfig {
        endpoint: "::not-a-url::".to_string(),
        ..ProviderConfig::new(LlmProvider::Ollama)
    }];
    assert!(config.validate().is_err());

    config.llm.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_envOverrides_shouldFillEmptyKeysOnly() {
    let mut config = Config::default();
    if let Some(anthropic) = config
        .llm
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "anthropic")
    {
        anthropic.api_key = "from-file".to_string();
    }

    config.apply_env_overrides_with(|name| match name {
        "OPENAI_API_KEY" => Some("sk-env".to_string()),
        "ANTHROPIC_API_KEY" => Some("sk-ant-env".to_string()),
        _ => None,
    });

    assert_eq!(config.llm.get_api_key(), "sk-env");
    assert!(config.llm.is_usable());
    let anthropic = config.llm.get_provider_config(&LlmProvider::Anthropic).unwrap();
    assert_eq!(anthropic.api_key, "from-file");
    let ollama = config.llm.get_provider_config(&LlmProvider::Ollama).unwrap();
    assert!(ollama.api_key.is_empty());
}

#[test]
fn test_provider_fromStr_andDisplay_shouldRoundTrip() {
    for provider in [LlmProvider::OpenAI, LlmProvider::Anthropic, LlmProvider::Ollama, LlmProvider::LMStudio] {
        let parsed: LlmProvider = provider.to_string().parse().unwrap();
        assert_eq!(parsed, provider);
    }
    assert!("gemini".parse::<LlmProvider>().is_err());
    assert_eq!(LlmProvider::LMStudio.display_name(), "LM Studio");
}

#[test]
fn test_partialConfigFile_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str(
        r#"{
            "bot_name": "Tixi",
            "default_language": "en",
            "matching": { "language_policy": "preferred" },
            "llm": { "provider": "ollama" }
        }"#,
    )?;

    assert_eq!(config.bot_name, "Tixi");
    assert_eq!(config.default_language, Language::En);
    assert_eq!(config.matching.language_policy, LanguagePolicy::Preferred);
    assert_eq!(config.matching.trust_threshold, 0.7);
    assert_eq!(config.llm.provider, LlmProvider::Ollama);
    // no provider entries listed, so the built-in defaults apply
    assert_eq!(config.llm.get_endpoint(), "http://localhost:11434");
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_saveAndLoad_shouldPreserveConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.bot_name = "Saved".to_string();
    config.matching.trust_threshold = 0.8;
    config.save(&path)?;

    let loaded = Config::load(&path)?;
    assert_eq!(loaded.bot_name, "Saved");
    assert_eq!(loaded.matching, config.matching);
    assert_eq!(loaded.llm, config.llm);
    Ok(())
}

#[test]
fn test_loadOrCreate_shouldWriteDefaultFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");
    assert!(!path.exists());

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.bot_name, "Camile");
    Ok(())
}

#[test]
fn test_load_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load(&path).is_err());
    Ok(())
}
