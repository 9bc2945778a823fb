/*!
 * The support assistant.
 *
 * `Assistant::respond` runs a message through the response stages in order:
 * human handoff, trusted FAQ match, keyword rules, LLM fallback and finally
 * the fallback rotator. Every exchange is recorded in the conversation.
 *
 * Concurrent `respond` calls on one assistant are served one at a time so a
 * user turn and its reply always sit next to each other in the log.
 */

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::AssistantError;
use crate::faq::{FaqCatalog, FaqMatcher, MatchResult};
use crate::language::{Language, Localized};

pub mod conversation;
pub mod fallback;
pub mod handoff;
pub mod keywords;
pub mod llm;

pub use conversation::{Conversation, Role, Turn};
pub use fallback::FallbackRotator;
pub use handoff::{HandoffDetector, HandoffNotifier, HandoffRequest, LogNotifier, WebhookNotifier};
pub use keywords::KeywordRules;
pub use llm::{ChatBackend, LlmService};

/// Stage that produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum ReplySource {
    Handoff,
    Faq { confidence: f64 },
    Keyword,
    Llm,
    Fallback,
}

impl fmt::Display for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplySource::Handoff => write!(f, "handoff"),
            ReplySource::Faq { confidence } => write!(f, "faq ({:.2})", confidence),
            ReplySource::Keyword => write!(f, "keyword"),
            ReplySource::Llm => write!(f, "llm"),
            ReplySource::Fallback => write!(f, "fallback"),
        }
    }
}

/// The assistant's answer to one message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
    pub language: Language,
}

/// Support assistant with a single running conversation
#[derive(Debug)]
pub struct Assistant {
    name: String,
    persona: Localized<String>,
    welcome: Localized<String>,
    handoff_message: Localized<String>,
    default_language: Language,
    matcher: FaqMatcher,
    trust_threshold: f64,
    keywords: KeywordRules,
    handoff: HandoffDetector,
    notifier: Arc<dyn HandoffNotifier>,
    llm: Option<Arc<dyn ChatBackend>>,
    history_window: usize,
    fallback: FallbackRotator,
    conversation: Mutex<Conversation>,
    exchange: tokio::sync::Mutex<()>,
}

impl Assistant {
    /// Build an assistant over `catalog` with the configured LLM and notifier
    pub fn new(config: &Config, catalog: FaqCatalog) -> Result<Self, AssistantError> {
        let matching = &config.matching;
        if matching.confidence_threshold > matching.trust_threshold {
            return Err(AssistantError::Config(format!(
                "confidence_threshold ({}) cannot exceed trust_threshold ({})",
                matching.confidence_threshold, matching.trust_threshold
            )));
        }

        let matcher = FaqMatcher::new(catalog)
            .with_confidence_threshold(matching.confidence_threshold)
            .with_language_policy(matching.language_policy);

        let notifier: Arc<dyn HandoffNotifier> = match &config.handoff.webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(LogNotifier),
        };

        let llm = LlmService::from_config(&config.llm).map(|service| Arc::new(service) as Arc<dyn ChatBackend>);

        Ok(Self {
            name: config.bot_name.clone(),
            persona: config.persona.clone(),
            welcome: config.messages.welcome.clone(),
            handoff_message: config.messages.handoff.clone(),
            default_language: config.default_language,
            matcher,
            trust_threshold: matching.trust_threshold,
            keywords: KeywordRules::builtin(),
            handoff: HandoffDetector::default(),
            notifier,
            llm,
            history_window: config.llm.common.history_window,
            fallback: FallbackRotator::new(config.messages.fallback.clone())?,
            conversation: Mutex::new(Conversation::new()),
            exchange: tokio::sync::Mutex::new(()),
        })
    }

    /// Build an assistant with the catalog named in the configuration, or the
    /// built-in catalog when none is set
    pub fn from_config(config: &Config) -> Result<Self, AssistantError> {
        let catalog = match &config.matching.catalog_path {
            Some(path) => {
                let catalog = FaqCatalog::load(path)?;
                info!("Loaded {} FAQ entries from {}", catalog.len(), path.display());
                catalog
            }
            None => FaqCatalog::builtin(),
        };
        Self::new(config, catalog)
    }

    /// Replace the LLM backend; `None` disables the LLM step
    pub fn with_llm(mut self, llm: Option<Arc<dyn ChatBackend>>) -> Self {
        self.llm = llm;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn HandoffNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordRules) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn matcher(&self) -> &FaqMatcher {
        &self.matcher
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn welcome_message(&self, language: Option<Language>) -> &str {
        self.welcome.get(language.unwrap_or(self.default_language))
    }

    /// Look up the catalog without touching the conversation
    pub fn find_faq(&self, message: &str, language: Option<Language>) -> MatchResult {
        self.matcher
            .find_best_match(message, language.unwrap_or(self.default_language))
    }

    /// Answer a user message.
    ///
    /// Never fails: provider and notifier errors are logged and the next
    /// stage answers instead.
    pub async fn respond(&self, message: &str, language: Option<Language>) -> Reply {
        let language = language.unwrap_or(self.default_language);
        let _exchange = self.exchange.lock().await;
        self.conversation.lock().push(Turn::user(message));

        let (text, source) = self.select_reply(message, language).await;
        debug!("Replying via {} in {}", source, language);

        self.conversation.lock().push(Turn::assistant(text.clone()));
        Reply { text, source, language }
    }

    async fn select_reply(&self, message: &str, language: Language) -> (String, ReplySource) {
        if self.handoff.is_handoff_request(message, language) {
            let conversation_id = self.conversation.lock().id();
            let request = HandoffRequest::new(conversation_id, language, message);
            if let Err(e) = self.notifier.notify(&request).await {
                error!("Failed to notify human handoff: {}", e);
            }
            return (self.handoff_message.get(language).clone(), ReplySource::Handoff);
        }

        let faq = self.matcher.find_best_match(message, language);
        if faq.is_trusted(self.trust_threshold) {
            if let Some(answer) = faq.answer {
                return (answer, ReplySource::Faq { confidence: faq.confidence });
            }
        } else if faq.is_match() {
            debug!(
                "FAQ candidate at {:.3} not above trust threshold {:.2}",
                faq.confidence, self.trust_threshold
            );
        }

        if let Some(reply) = self.keywords.find(message, language) {
            return (reply.to_string(), ReplySource::Keyword);
        }

        if let Some(llm) = &self.llm {
            let history = self.conversation.lock().recent(self.history_window).to_vec();
            match llm.reply(self.persona.get(language), &history).await {
                Ok(text) => return (text, ReplySource::Llm),
                Err(e) => warn!("LLM fallback failed, using canned reply: {}", e),
            }
        }

        (self.fallback.select(message, language).to_string(), ReplySource::Fallback)
    }

    /// Snapshot of the current conversation
    pub fn conversation(&self) -> Conversation {
        self.conversation.lock().clone()
    }

    /// Continue a previously saved conversation
    pub fn restore_conversation(&self, conversation: Conversation) {
        *self.conversation.lock() = conversation;
    }

    /// Forget the conversation and start a new session
    pub fn reset(&self) {
        self.conversation.lock().clear();
    }

    pub fn save_conversation(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.conversation().save(path)
    }
}
