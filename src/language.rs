/*!
 * Language codes and the utterance language heuristic.
 *
 * The assistant works with a closed set of two languages. Codes are parsed
 * leniently (ISO 639-1, ISO 639-2/T and a few common names) through `isolang`,
 * and user utterances are classified by a small list of Spanish indicator
 * words before FAQ matching.
 */

use anyhow::{anyhow, Result};
use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::faq::normalize;

/// Supported conversation language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    /// Spanish
    #[default]
    Es,
    /// English
    En,
}

/// Every supported language, in catalog display order
pub const ALL_LANGUAGES: [Language; 2] = [Language::Es, Language::En];

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    fn iso(&self) -> IsoLanguage {
        match self {
            Self::Es => IsoLanguage::Spa,
            Self::En => IsoLanguage::Eng,
        }
    }

    /// ISO 639-2/T code
    pub fn iso_639_3(&self) -> &'static str {
        self.iso().to_639_3()
    }

    /// English name of the language
    pub fn name(&self) -> &'static str {
        self.iso().to_name()
    }

    /// The other language of the pair
    pub fn other(&self) -> Self {
        match self {
            Self::Es => Self::En,
            Self::En => Self::Es,
        }
    }

    fn from_iso(lang: IsoLanguage) -> Option<Self> {
        match lang {
            IsoLanguage::Spa => Some(Self::Es),
            IsoLanguage::Eng => Some(Self::En),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized_code = s.trim().to_lowercase();

        let iso = match normalized_code.len() {
            2 => IsoLanguage::from_639_1(&normalized_code),
            3 => IsoLanguage::from_639_3(&normalized_code),
            _ => match normalized_code.as_str() {
                "spanish" | "español" | "espanol" => Some(IsoLanguage::Spa),
                "english" | "inglés" | "ingles" => Some(IsoLanguage::Eng),
                _ => None,
            },
        };

        match iso {
            Some(lang) => Self::from_iso(lang)
                .ok_or_else(|| anyhow!("Unsupported language: {} ({})", s, lang.to_name())),
            None => Err(anyhow!("Invalid language code: {}", s)),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

/// A value held once per supported language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Localized<T> {
    pub es: T,
    pub en: T,
}

impl<T> Localized<T> {
    pub fn new(es: T, en: T) -> Self {
        Self { es, en }
    }

    pub fn get(&self, language: Language) -> &T {
        match language {
            Language::Es => &self.es,
            Language::En => &self.en,
        }
    }

    pub fn get_mut(&mut self, language: Language) -> &mut T {
        match language {
            Language::Es => &mut self.es,
            Language::En => &mut self.en,
        }
    }
}

/// How the caller's explicit language reconciles with the detected one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguagePolicy {
    /// The heuristic wins whenever it reaches a verdict
    #[default]
    Detected,
    /// The caller's language always wins
    Preferred,
}

/// Spanish function words, greetings and question words.
/// Matched as whole tokens of the normalized utterance.
const SPANISH_INDICATORS: &[&str] = &[
    "que", "como", "donde", "cuando", "por", "para", "quien", "cual",
    "porque", "qué", "cómo", "dónde", "cuándo", "quién", "cuál",
    "gracias", "hola", "adios", "ayuda", "necesito",
];

/// Whether a single normalized token is a Spanish indicator word
pub fn is_spanish_indicator(token: &str) -> bool {
    SPANISH_INDICATORS.contains(&token)
}

/// Guess the language of an utterance.
///
/// Any indicator token makes it Spanish. Otherwise an utterance of more than
/// one token is English, and a single token (or nothing) keeps `fallback`.
pub fn detect_language(text: &str, fallback: Language) -> Language {
    let normalized = normalize(text);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    if tokens.iter().any(|token| is_spanish_indicator(token)) {
        Language::Es
    } else if tokens.len() > 1 {
        Language::En
    } else {
        fallback
    }
}

/// Decide the effective language for matching an utterance
pub fn resolve_language(text: &str, preferred: Language, policy: LanguagePolicy) -> Language {
    match policy {
        LanguagePolicy::Detected => detect_language(text, preferred),
        LanguagePolicy::Preferred => preferred,
    }
}
