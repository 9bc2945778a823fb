/*!
 * Common test utilities for the tixobot test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use tixobot::app_config::Config;
use tixobot::language::Language;
use tixobot::{FaqCatalog, FaqEntry};

// Re-export the mock backends module
pub mod mock_backends;

/// Route library logs to the test output; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes a small JSON catalog, one record without a language tag
pub fn create_test_catalog(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"[
  { "question": "¿Cómo compro entradas?", "answer": "Compra en tix.do.", "language": "es" },
  { "question": "How do I buy tickets?", "answer": "Buy on tix.do.", "language": "en" },
  { "question": "¿Qué es Tix.do?", "answer": "Una plataforma de eventos." }
]"#;
    create_test_file(dir, filename, content)
}

/// A tiny bilingual catalog
pub fn sample_catalog() -> FaqCatalog {
    FaqCatalog::new(vec![
        FaqEntry::new("¿Cómo compro entradas?", "ES-COMPRA", Language::Es),
        FaqEntry::new("¿Puedo obtener un reembolso?", "ES-REEMBOLSO", Language::Es),
        FaqEntry::new("How do I buy tickets?", "EN-BUY", Language::En),
        FaqEntry::new("Can I get a refund?", "EN-REFUND", Language::En),
    ])
}

/// Default config with the LLM step turned off
pub fn offline_config() -> Config {
    let mut config = Config::default();
    config.llm.enabled = false;
    config
}
