/*!
 * FAQ matching engine.
 *
 * Turns a free-form utterance into a canned answer with a confidence score:
 * - `normalize`: canonical text form used for every comparison
 * - `similarity`: matching-block ratio between two texts
 * - `catalog`: the immutable, language-tagged question/answer catalog
 * - `matcher`: catalog search with exact-match short-circuit and threshold
 */

pub mod catalog;
pub mod matcher;
pub mod normalize;
pub mod similarity;

pub use catalog::{classify_question, FaqCatalog, FaqEntry};
pub use matcher::{FaqMatcher, MatchResult, DEFAULT_CONFIDENCE_THRESHOLD};
pub use normalize::normalize;
pub use similarity::{ratio, similarity};
