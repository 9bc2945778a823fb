/*!
 * FAQ catalog.
 *
 * An ordered, immutable list of question/answer pairs, each tagged with its
 * language when the catalog is built. Catalogs are cheap to clone and can be
 * shared between matchers and threads.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::normalize::normalize;
use crate::errors::CatalogError;
use crate::language::{is_spanish_indicator, Language};

/// Greetings that carry no Spanish punctuation but are Spanish questions
const SPANISH_GREETINGS: &[&str] = &["Hola", "Gracias"];

/// One catalog question with its canned answer
#[derive(Debug, Clone, PartialEq)]
pub struct FaqEntry {
    question: String,
    answer: String,
    language: Language,
    normalized_question: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, language: Language) -> Self {
        let question = question.into();
        let normalized_question = normalize(&question);
        Self {
            question,
            answer: answer.into(),
            language,
            normalized_question,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Question text as the similarity scorer sees it
    pub fn normalized_question(&self) -> &str {
        &self.normalized_question
    }
}

/// On-disk catalog record; `language` may be omitted
#[derive(Debug, Serialize, Deserialize)]
struct FaqRecord {
    question: String,
    answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

/// Guess the language of a catalog question from its wording.
///
/// Used once, at load time, for records that carry no language tag.
pub fn classify_question(question: &str) -> Language {
    if question.contains('¿') || question.contains('¡') || SPANISH_GREETINGS.contains(&question) {
        return Language::Es;
    }

    let normalized = normalize(question);
    let has_marker = normalized.split_whitespace().any(is_spanish_indicator)
        || normalized.chars().any(|c| matches!(c, 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ñ'));

    if has_marker { Language::Es } else { Language::En }
}

/// Immutable, ordered FAQ catalog
#[derive(Debug, Clone, Default)]
pub struct FaqCatalog {
    entries: Arc<[FaqEntry]>,
}

impl FaqCatalog {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// A catalog with no entries; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from untagged (question, answer) pairs, classifying each question
    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(question, answer)| {
                let question = question.into();
                let language = classify_question(&question);
                FaqEntry::new(question, answer, language)
            })
            .collect();
        Self::new(entries)
    }

    /// Parse a JSON array of `{ "question", "answer", "language"? }` records
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<FaqRecord> = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            if record.question.trim().is_empty() {
                return Err(CatalogError::EmptyQuestion { index });
            }
            if record.answer.trim().is_empty() {
                return Err(CatalogError::EmptyAnswer { index });
            }

            let language = match record.language {
                Some(code) => code
                    .parse::<Language>()
                    .map_err(|_| CatalogError::InvalidLanguage { index, code })?,
                None => {
                    let language = classify_question(&record.question);
                    debug!("Catalog entry {} has no language, classified as {}", index, language);
                    language
                }
            };

            entries.push(FaqEntry::new(record.question, record.answer, language));
        }

        Ok(Self::new(entries))
    }

    /// Load a JSON catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&content)?;
        debug!("Loaded {} FAQ entries from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Serialize to the JSON format accepted by `from_json_str`
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let records: Vec<FaqRecord> = self
            .entries
            .iter()
            .map(|entry| FaqRecord {
                question: entry.question.clone(),
                answer: entry.answer.clone(),
                language: Some(entry.language.code().to_string()),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaqEntry> {
        self.entries.iter()
    }

    /// Entries of one language, in catalog order
    pub fn for_language(&self, language: Language) -> impl Iterator<Item = &FaqEntry> {
        self.entries.iter().filter(move |entry| entry.language == language)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The Tix.do support catalog
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_FAQS
                .iter()
                .map(|(question, answer, language)| FaqEntry::new(*question, *answer, *language))
                .collect(),
        )
    }
}

const BUILTIN_FAQS: &[(&str, &str, Language)] = &[
    // Greetings
    (
        "Hola",
        "¡Hola, Gracias por contactarnos!, te asiste Camila. ¿En qué puedo ayudarte hoy?",
        Language::Es,
    ),
    (
        "Hello",
        "Hi, thank you for contacting us! This is Camila assisting you. How can I help you today?",
        Language::En,
    ),
    (
        "Gracias",
        "¡De nada! Siempre es un placer ayudarte. Si tienes más preguntas, estoy aquí para ti.",
        Language::Es,
    ),
    (
        "Thank you",
        "You're welcome! It's always a pleasure to help. If you have more questions, I'm here for you.",
        Language::En,
    ),
    // About the platform
    (
        "¿Qué es Tix.do?",
        "Tix.do es la plataforma líder de venta de entradas y gestión de eventos en República Dominicana. Facilitamos la compra de boletos para conciertos, obras de teatro, eventos deportivos y más.",
        Language::Es,
    ),
    (
        "What is Tix.do?",
        "Tix.do is the leading ticket sales and event management platform in the Dominican Republic. We facilitate the purchase of tickets for concerts, plays, sporting events, and more.",
        Language::En,
    ),
    // Buying tickets
    (
        "¿Cómo compro entradas?",
        "Para comprar entradas en Tix.do: 1) Selecciona el evento que te interesa, 2) Escoge la cantidad y tipo de boletos, 3) Completa el pago con tarjeta de crédito. ¡Listo! Recibirás tus boletos por correo electrónico.",
        Language::Es,
    ),
    (
        "How do I buy tickets?",
        "To buy tickets on Tix.do: 1) Select the event you're interested in, 2) Choose the quantity and type of tickets, 3) Complete payment by credit card. Done! You'll receive your tickets by email.",
        Language::En,
    ),
    // Payment methods
    (
        "¿Qué métodos de pago aceptan?",
        "En Tix.do aceptamos múltiples formas de pago: tarjetas de crédito/débito (Visa y Mastercard) y transferencias bancarias.",
        Language::Es,
    ),
    (
        "What payment methods do you accept?",
        "At Tix.do we accept multiple payment methods: credit/debit cards (Visa and Mastercard) and bank transfers.",
        Language::En,
    ),
    // Refunds
    (
        "¿Puedo solicitar un reembolso?",
        "La política de reembolso depende de cada organizador. En general, los boletos no son reembolsables, pero en caso de cancelación del evento por parte del organizador, se garantiza el reembolso. Recuerda que el cargo por servicio no es reembolsable. Contacta a info@tix.do para casos específicos.",
        Language::Es,
    ),
    (
        "Can I request a refund?",
        "The refund policy depends on each organizer. In general, tickets are non-refundable, but in case of cancellation of the event by the organizer, a refund is guaranteed. Contact info@tix.do for specific cases.",
        Language::En,
    ),
    // Lost tickets
    (
        "Perdí mis entradas, ¿qué hago?",
        "¡No te preocupes! Por favor confírmanos tu correo electrónico y el nombre del evento para poder reenviar tus entradas lo antes posible.",
        Language::Es,
    ),
    (
        "I lost my tickets, what should I do?",
        "No worries! Please confirm your email address and the name of the event so we can resend your tickets as soon as possible.",
        Language::En,
    ),
    // Resale
    (
        "¿Puedo revender mis entradas?",
        "La reventa no oficial de boletos está prohibida en Tix.do.",
        Language::Es,
    ),
    (
        "Can I resell my tickets?",
        "Unofficial ticket resale is prohibited on Tix.do.",
        Language::En,
    ),
    // Contact
    (
        "¿Cómo puedo contactar a servicio al cliente?",
        "Puedes contactar a nuestro equipo de servicio al cliente a través de: Email: info@tix.do, WhatsApp: +1 (809)330-3797, o en instagram @Tix.do.",
        Language::Es,
    ),
    (
        "How can I contact customer service?",
        "You can contact our customer service team through: Email: info@tix.do, WhatsApp: +1 (809) 330-3797, or on instagram @Tix.do.",
        Language::En,
    ),
    // About the assistant
    (
        "¿Quién eres tú?",
        "¡Hola! Soy Camila, la asistente virtual de Tix.do. Estoy aquí para ayudarte con preguntas sobre eventos, entradas y más. Si necesitas hablar con un humano, solo dímelo y te conectaré con un agente de servicio al cliente.",
        Language::Es,
    ),
    (
        "Who are you?",
        "Hello! I'm Camila, the virtual assistant for Tix.do. I'm here to help you with questions about events, tickets, and more. If you need to talk to a human, just tell me and I'll connect you with a customer service agent.",
        Language::En,
    ),
];
