use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use url::Url;

use crate::faq::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::language::{Language, LanguagePolicy, Localized};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Name the assistant introduces itself with
    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    /// Language used when the caller gives none
    #[serde(default)]
    pub default_language: Language,

    /// System prompt per language for the LLM fallback
    #[serde(default = "default_persona")]
    pub persona: Localized<String>,

    /// Canned messages
    #[serde(default)]
    pub messages: BotMessages,

    /// FAQ matching settings
    #[serde(default)]
    pub matching: MatchingConfig,

    /// LLM fallback settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Human handoff settings
    #[serde(default)]
    pub handoff: HandoffConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Canned assistant messages per language
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BotMessages {
    /// Greeting shown when a conversation starts
    #[serde(default = "default_welcome_messages")]
    pub welcome: Localized<String>,

    /// Reply when the user asks for a human
    #[serde(default = "default_handoff_messages")]
    pub handoff: Localized<String>,

    /// Replies used when nothing else answers; picked by message length
    #[serde(default = "default_fallback_messages")]
    pub fallback: Localized<Vec<String>>,
}

impl Default for BotMessages {
    fn default() -> Self {
        Self {
            welcome: default_welcome_messages(),
            handoff: default_handoff_messages(),
            fallback: default_fallback_messages(),
        }
    }
}

/// FAQ matching configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Minimum similarity for the matcher to return a candidate
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Similarity above which the pipeline answers with the FAQ outright
    #[serde(default = "default_trust_threshold")]
    pub trust_threshold: f64,

    /// Whether detection or the caller's language decides the FAQ language
    #[serde(default)]
    pub language_policy: LanguagePolicy,

    /// JSON catalog file; the built-in catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            trust_threshold: default_trust_threshold(),
            language_policy: LanguagePolicy::default(),
            catalog_path: None,
        }
    }
}

/// LLM provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl LlmProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Whether the provider is a hosted API that needs a key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }

    /// Environment variable consulted for a missing API key
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            _ => None,
        }
    }
}

// Implement Display trait for LlmProvider
impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for LlmProvider
impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: LlmProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// LLM fallback configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LlmConfig {
    /// Whether the LLM step runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Provider to use
    #[serde(default)]
    pub provider: LlmProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Settings shared by all providers
    #[serde(default)]
    pub common: LlmCommonConfig,
}

/// Generation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LlmCommonConfig {
    /// Maximum tokens in a generated reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Number of most recent conversation turns sent with each request
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for LlmCommonConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            history_window: default_history_window(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Human handoff configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HandoffConfig {
    /// Endpoint receiving a JSON notification on every handoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_bot_name() -> String {
    "Camile".to_string()
}

fn default_persona() -> Localized<String> {
    Localized::new(
        "Eres Camile, una asistente virtual femenina, amigable, profesional y casual que atiende clientes de Tix.do, \
         la plataforma líder de eventos en República Dominicana. \
         Siempre respondes en español neutro, con claridad, amabilidad y evitando completamente el uso de jerga dominicana. \
         Si no puedes responder una pregunta, ofreces contactar a un agente humano."
            .to_string(),
        "You are Camile, a friendly, professional, feminine-toned virtual assistant serving customers for Tix.do, \
         the leading events platform in the Dominican Republic. You always respond clearly, politely, and professionally in English, \
         without using slang. If you can't answer a question, you offer to connect with a human agent."
            .to_string(),
    )
}

fn default_welcome_messages() -> Localized<String> {
    Localized::new(
        "Hola, soy Camile, tu asistente virtual de Tix.do. ¿En qué puedo ayudarte hoy? Puedes consultarme sobre eventos, entradas o cualquier otra duda.".to_string(),
        "Hello there! I'm Camile, your virtual assistant from Tix.do. How can I help you today? You can ask me about events, tickets, or any other questions.".to_string(),
    )
}

fn default_handoff_messages() -> Localized<String> {
    Localized::new(
        "Entiendo que necesitas ayuda adicional. Voy a conectarte con un agente humano. Por favor, espera un momento.".to_string(),
        "I understand you need additional help. I'll connect you with a human agent. Please wait a moment.".to_string(),
    )
}

fn default_fallback_messages() -> Localized<Vec<String>> {
    Localized::new(
        vec![
            "Lo siento, no tengo esa información en este momento. ¿Te gustaría que te conecte con un agente humano?".to_string(),
            "No estoy segura de cómo responder eso. Puedes escribir a info@tix.do o pedirme hablar con un agente humano.".to_string(),
        ],
        vec![
            "I'm sorry, I don't have that information at the moment. Would you like me to connect you with a human agent?".to_string(),
            "I'm not sure how to answer that. You can write to info@tix.do or ask me to talk to a human agent.".to_string(),
        ],
    )
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_trust_threshold() -> f64 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

fn default_history_window() -> usize {
    5
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_model(provider: &LlmProvider) -> String {
    match provider {
        LlmProvider::OpenAI => "gpt-3.5-turbo".to_string(),
        LlmProvider::Anthropic => "claude-3-haiku-20240307".to_string(),
        LlmProvider::Ollama => "llama3.2:3b".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        LlmProvider::LMStudio => "local-model".to_string(),
    }
}

fn default_endpoint(provider: &LlmProvider) -> String {
    match provider {
        LlmProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        LlmProvider::Anthropic => "https://api.anthropic.com".to_string(),
        LlmProvider::Ollama => "http://localhost:11434".to_string(),
        LlmProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

impl Config {
    /// Load a configuration file, or create one with defaults when absent
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Fill empty API keys from the provider's environment variable
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_with(|name| std::env::var(name).ok());
    }

    /// Same as `apply_env_overrides` with an injectable variable lookup
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for provider_config in self.llm.available_providers.iter_mut() {
            if !provider_config.api_key.is_empty() {
                continue;
            }
            let env_var = provider_config
                .provider_type
                .parse::<LlmProvider>()
                .ok()
                .and_then(|p| p.api_key_env_var());
            if let Some(value) = env_var.and_then(&lookup).filter(|v| !v.trim().is_empty()) {
                provider_config.api_key = value;
            }
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.bot_name.trim().is_empty() {
            return Err(anyhow!("Bot name cannot be empty"));
        }

        let matching = &self.matching;
        for (name, value) in [
            ("confidence_threshold", matching.confidence_threshold),
            ("trust_threshold", matching.trust_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be between 0.0 and 1.0, got {}", name, value));
            }
        }
        if matching.confidence_threshold > matching.trust_threshold {
            return Err(anyhow!(
                "confidence_threshold ({}) cannot exceed trust_threshold ({})",
                matching.confidence_threshold,
                matching.trust_threshold
            ));
        }

        for language in crate::language::ALL_LANGUAGES {
            if self.messages.fallback.get(language).is_empty() {
                return Err(anyhow!("At least one fallback message is required for {}", language.name()));
            }
        }

        if !(0.0..=2.0).contains(&self.llm.common.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0"));
        }

        if self.llm.enabled {
            Url::parse(&self.llm.get_endpoint())
                .with_context(|| format!("Invalid endpoint for {} provider", self.llm.provider.display_name()))?;
        }

        if let Some(webhook) = &self.handoff.webhook_url {
            Url::parse(webhook).with_context(|| format!("Invalid handoff webhook URL: {}", webhook))?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            bot_name: default_bot_name(),
            default_language: Language::default(),
            persona: default_persona(),
            messages: BotMessages::default(),
            matching: MatchingConfig::default(),
            llm: LlmConfig::default(),
            handoff: HandoffConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl LlmConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &LlmProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration
    pub fn get_active_provider_config_mut(&mut self) -> Option<&mut ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter_mut()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        default_model(&self.provider)
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        // Local providers don't use API keys
        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint(&self.provider)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Whether the LLM step can run: enabled, and keyed when the provider needs one
    pub fn is_usable(&self) -> bool {
        self.enabled && (!self.provider.requires_api_key() || !self.get_api_key().trim().is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: LlmProvider::default(),
            available_providers: vec![
                ProviderConfig::new(LlmProvider::OpenAI),
                ProviderConfig::new(LlmProvider::Anthropic),
                ProviderConfig::new(LlmProvider::Ollama),
                ProviderConfig::new(LlmProvider::LMStudio),
            ],
            common: LlmCommonConfig::default(),
        }
    }
}
