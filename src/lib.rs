/*!
 * # tixobot - Tix.do customer support assistant
 *
 * A bilingual (Spanish / English) support chatbot for the Tix.do events
 * platform. Messages are answered from a curated FAQ catalog whenever a
 * question matches closely enough, with keyword replies, an LLM fallback and
 * canned messages behind it.
 *
 * ## Features
 *
 * - Fuzzy FAQ matching with a matching-block similarity score
 * - Lightweight Spanish/English language heuristic
 * - Human handoff detection with log or webhook notification
 * - LLM fallback through various AI providers:
 *   - OpenAI API (and OpenAI-compatible servers such as LM Studio)
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - JSON configuration, FAQ catalogs and conversation logs
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `faq`: FAQ engine:
 *   - `faq::normalize`: Text normalization
 *   - `faq::similarity`: Similarity scoring
 *   - `faq::catalog`: FAQ entries and catalogs
 *   - `faq::matcher`: Best-match lookup
 * - `language`: Language codes and detection
 * - `assistant`: Response pipeline and conversation state
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::ollama`: Ollama API client
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod assistant;
pub mod errors;
pub mod faq;
pub mod language;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use assistant::{Assistant, Reply, ReplySource};
pub use errors::{AssistantError, CatalogError, ProviderError};
pub use faq::{FaqCatalog, FaqEntry, FaqMatcher, MatchResult};
pub use language::{detect_language, Language, LanguagePolicy};
