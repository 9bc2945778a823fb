/*!
 * FAQ matcher.
 *
 * Finds the catalog answer whose question best matches an utterance in the
 * effective language. A byte-identical question wins outright with confidence
 * 1.0; otherwise the highest similarity wins if it reaches the confidence
 * threshold, with earlier catalog entries winning ties.
 */

use log::debug;
use serde::Serialize;

use super::catalog::FaqCatalog;
use super::normalize::normalize;
use super::similarity::ratio;
use crate::language::{resolve_language, Language, LanguagePolicy};

/// Minimum similarity for a candidate answer to be returned at all
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Outcome of a catalog lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Matched answer, if any candidate was admitted
    pub answer: Option<String>,
    /// Similarity of the match, 0.0 when there is no answer
    pub confidence: f64,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self {
            answer: None,
            confidence: 0.0,
        }
    }

    pub fn exact(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            confidence: 1.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.answer.is_some()
    }

    /// Whether the match clears a caller's auto-trust threshold (strictly)
    pub fn is_trusted(&self, trust_threshold: f64) -> bool {
        self.is_match() && self.confidence > trust_threshold
    }
}

/// Stateless matcher over an immutable catalog
#[derive(Debug, Clone)]
pub struct FaqMatcher {
    catalog: FaqCatalog,
    confidence_threshold: f64,
    language_policy: LanguagePolicy,
}

impl FaqMatcher {
    pub fn new(catalog: FaqCatalog) -> Self {
        Self {
            catalog,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            language_policy: LanguagePolicy::default(),
        }
    }

    /// Set the candidate admission threshold (clamped to 0.0-1.0)
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_language_policy(mut self, policy: LanguagePolicy) -> Self {
        self.language_policy = policy;
        self
    }

    pub fn catalog(&self) -> &FaqCatalog {
        &self.catalog
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn language_policy(&self) -> LanguagePolicy {
        self.language_policy
    }

    /// Find the best catalog answer for `utterance`.
    ///
    /// `language` is the caller's preference; the effective language comes
    /// from the configured policy. Never fails: empty input, an empty catalog
    /// or no admissible candidate all yield `MatchResult::no_match()`.
    pub fn find_best_match(&self, utterance: &str, language: Language) -> MatchResult {
        let effective = resolve_language(utterance, language, self.language_policy);
        let normalized = normalize(utterance);
        if normalized.is_empty() {
            return MatchResult::no_match();
        }

        let mut best: Option<(&str, f64)> = None;

        // entries without an answer can never produce a match
        for entry in self.catalog.for_language(effective).filter(|e| !e.answer().is_empty()) {
            if utterance == entry.question() {
                debug!("Exact FAQ match for '{}' ({})", entry.question(), effective);
                return MatchResult::exact(entry.answer());
            }

            let score = ratio(&normalized, entry.normalized_question());
            let best_score = best.map_or(0.0, |(_, s)| s);
            if score > best_score {
                best = Some((entry.answer(), score));
            }
        }

        match best {
            Some((answer, score)) if score >= self.confidence_threshold => {
                debug!("FAQ match in {} with confidence {:.3}", effective, score);
                MatchResult {
                    answer: Some(answer.to_string()),
                    confidence: score,
                }
            }
            Some((_, score)) => {
                debug!(
                    "Best FAQ candidate in {} scored {:.3}, below threshold {:.2}",
                    effective, score, self.confidence_threshold
                );
                MatchResult::no_match()
            }
            None => MatchResult::no_match(),
        }
    }
}
