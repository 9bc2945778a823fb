/*!
 * Integration tests from configuration file to a running assistant
 */

use anyhow::Result;
use tixobot::app_config::{Config, LlmProvider};
use tixobot::assistant::{Assistant, ReplySource};
use tixobot::errors::{AssistantError, CatalogError};
use tixobot::language::Language;

use crate::common;

/// Test the assistant initialization with the default config
#[test]
fn test_assistant_withDefaultConfig_shouldRunInLimitedMode() -> Result<()> {
    let assistant = Assistant::from_config(&Config::default())?;
    assert_eq!(assistant.name(), "Camile");
    assert_eq!(assistant.matcher().catalog().len(), 20);
    assert!(!assistant.has_llm(), "no API key means no LLM step");
    Ok(())
}

#[test]
fn test_assistant_withLocalProvider_shouldEnableLlm() -> Result<()> {
    let mut config = Config::default();
    config.llm.provider = LlmProvider::Ollama;
    let assistant = Assistant::from_config(&config)?;
    assert!(assistant.has_llm());
    Ok(())
}

#[tokio::test]
async fn test_configFile_withCatalogPath_shouldAnswerFromFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let catalog_path = common::create_test_catalog(temp_dir.path(), "faqs.json")?;
    let config_path = temp_dir.path().join("conf.json");

    let mut config = common::offline_config();
    config.default_language = Language::En;
    config.matching.catalog_path = Some(catalog_path);
    config.save(&config_path)?;

    let loaded = Config::load(&config_path)?;
    loaded.validate()?;
    let assistant = Assistant::from_config(&loaded)?;

    let reply = assistant.respond("How do I buy tickets?", None).await;
    assert_eq!(reply.text, "Buy on tix.do.");
    assert_eq!(reply.source, ReplySource::Faq { confidence: 1.0 });

    // the untagged record was classified as Spanish
    let reply = assistant.respond("¿Qué es Tix.do?", Some(Language::Es)).await;
    assert_eq!(reply.text, "Una plataforma de eventos.");
    Ok(())
}

#[test]
fn test_configFile_withMissingCatalog_shouldFail() {
    let mut config = common::offline_config();
    config.matching.catalog_path = Some("/no/such/faqs.json".into());
    let result = Assistant::from_config(&config);
    assert!(matches!(result, Err(AssistantError::Catalog(CatalogError::Io { .. }))));
}

#[test]
fn test_assistant_withInvertedThresholds_shouldFail() {
    let mut config = common::offline_config();
    config.matching.confidence_threshold = 0.9;
    let result = Assistant::from_config(&config);
    assert!(matches!(result, Err(AssistantError::Config(_))));
}

#[test]
fn test_assistant_withoutFallbackMessages_shouldFail() {
    let mut config = common::offline_config();
    config.messages.fallback.es.clear();
    assert!(matches!(Assistant::from_config(&config), Err(AssistantError::Config(_))));
}

#[test]
fn test_conversation_shouldSurviveSaveAndRestore() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("session.json");

    let assistant = Assistant::from_config(&common::offline_config())?;
    tokio_test::block_on(assistant.respond("Hola", Some(Language::Es)));
    assistant.save_conversation(&path)?;
    let saved_id = assistant.conversation().id();

    let restored = Assistant::from_config(&common::offline_config())?;
    restored.restore_conversation(tixobot::assistant::Conversation::load(&path));
    assert_eq!(restored.conversation().id(), saved_id);
    assert_eq!(restored.conversation().len(), 2);
    Ok(())
}
