// Keyword extraction: turns a cleaned job description into a ranked,
// categorized, tiered keyword set.
//
// The default extractor is frequency-based and driven entirely by the
// classification ruleset; the KeywordExtractor trait keeps it swappable.

pub mod cache;
pub mod declutter;
pub mod extractor;
pub mod learned;
pub mod mandatory;
pub mod models;
pub mod ruleset;
pub mod traits;

pub use cache::KeywordCache;
pub use extractor::{CachingExtractor, FrequencyExtractor};
pub use learned::{InMemoryLearnedStore, LearnedKeyword, LearnedKeywordStore};
pub use models::{Category, Extraction, Keyword, MentionRange, Tier};
pub use ruleset::{ClassificationRuleset, Classifier};
pub use traits::KeywordExtractor;
