use std::collections::HashSet;

use curator_logging::curator_warn;
use thiserror::Error;

pub const DEFAULT_TAG_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum TaggingError {
    #[error("no stopword list for language {0:?}")]
    UnsupportedLanguage(String),
    #[error("keyword extraction failed: {0}")]
    Extraction(String),
}

/// Produces candidate keywords in order of first appearance.
pub trait KeywordSource: Send + Sync {
    fn keywords(&self, text: &str) -> Result<Vec<String>, TaggingError>;
}

/// Lowercased words minus stopwords, digit-bearing words and repeats.
#[derive(Debug, Clone)]
pub struct StopwordKeywordSource {
    language: String,
    stopwords: HashSet<&'static str>,
}

impl StopwordKeywordSource {
    pub fn english() -> Self {
        Self::for_language("english")
    }

    pub fn for_language(language: impl Into<String>) -> Self {
        let language = language.into();
        let stopwords = match language.as_str() {
            "english" | "en" => ENGLISH_STOPWORDS.iter().copied().collect(),
            _ => HashSet::new(),
        };
        Self {
            language,
            stopwords,
        }
    }
}

impl KeywordSource for StopwordKeywordSource {
    fn keywords(&self, text: &str) -> Result<Vec<String>, TaggingError> {
        if self.stopwords.is_empty() {
            return Err(TaggingError::UnsupportedLanguage(self.language.clone()));
        }
        let mut seen = HashSet::new();
        let keywords = text
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
            .map(|word| word.trim_matches(|c| c == '\'' || c == '-'))
            .filter(|word| word.chars().count() > 1)
            .map(str::to_lowercase)
            .filter(|word| !word.chars().any(|c| c.is_ascii_digit()))
            .filter(|word| !self.stopwords.contains(word.as_str()))
            .filter(|word| seen.insert(word.clone()))
            .collect();
        Ok(keywords)
    }
}

/// Best-effort tagging: extraction failures are logged and yield no tags.
pub struct Tagger {
    source: Box<dyn KeywordSource>,
}

impl Tagger {
    pub fn new(source: Box<dyn KeywordSource>) -> Self {
        Self { source }
    }

    pub fn tag(&self, text: &str, limit: usize) -> Vec<String> {
        match self.source.keywords(text) {
            Ok(mut keywords) => {
                keywords.truncate(limit);
                keywords
            }
            Err(err) => {
                curator_warn!("Keyword extraction failed: {}", err);
                Vec::new()
            }
        }
    }
}

impl Default for Tagger {
    fn default() -> Self {
        Self::new(Box::new(StopwordKeywordSource::english()))
    }
}

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "could", "couldn't", "did", "didn't", "do",
    "does", "doesn't", "doing", "don't", "down", "during", "each", "even", "ever", "every", "few",
    "for", "from", "further", "get", "gets", "got", "had", "hadn't", "has", "hasn't", "have",
    "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here", "here's", "hers",
    "herself", "him", "himself", "his", "how", "how's", "however", "i", "i'd", "i'll", "i'm",
    "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just", "let's",
    "like", "made", "make", "many", "may", "me", "might", "more", "most", "much", "must",
    "mustn't", "my", "myself", "never", "new", "no", "nor", "not", "now", "of", "off", "on",
    "once", "one", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over",
    "own", "said", "same", "say", "says", "see", "shan't", "she", "she'd", "she'll", "she's",
    "should", "shouldn't", "since", "so", "some", "still", "such", "than", "that", "that's",
    "the", "their", "theirs", "them", "themselves", "then", "there", "there's", "these", "they",
    "they'd", "they'll", "they're", "they've", "this", "those", "through", "to", "too", "two",
    "under", "until", "up", "upon", "us", "use", "used", "using", "very", "was", "wasn't", "way",
    "we", "we'd", "we'll", "we're", "we've", "well", "were", "weren't", "what", "what's", "when",
    "when's", "where", "where's", "whether", "which", "while", "who", "who's", "whom", "why",
    "why's", "will", "with", "within", "without", "won't", "would", "wouldn't", "yet", "you",
    "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

#[cfg(test)]
mod tests {
    use super::{KeywordSource, StopwordKeywordSource, Tagger, TaggingError};
    use pretty_assertions::assert_eq;

    struct FailingSource;

    impl KeywordSource for FailingSource {
        fn keywords(&self, _text: &str) -> Result<Vec<String>, TaggingError> {
            Err(TaggingError::Extraction("boom".into()))
        }
    }

    #[test]
    fn keywords_are_lowercased_deduplicated_and_filtered() {
        let source = StopwordKeywordSource::english();
        let keywords = source
            .keywords("The Rust compiler: rust borrow checker, 2024 edition x86 and Borrow!")
            .unwrap();
        assert_eq!(keywords, vec!["rust", "compiler", "borrow", "checker", "edition"]);
    }

    #[test]
    fn tags_are_truncated_to_limit() {
        let tagger = Tagger::default();
        let tags = tagger.tag("alpha beta gamma delta epsilon", 3);
        assert_eq!(tags, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn failing_source_yields_no_tags() {
        let tagger = Tagger::new(Box::new(FailingSource));
        assert!(tagger.tag("plenty of words here", 10).is_empty());
    }

    #[test]
    fn unsupported_language_is_an_error() {
        let source = StopwordKeywordSource::for_language("klingon");
        assert!(matches!(
            source.keywords("qapla"),
            Err(TaggingError::UnsupportedLanguage(lang)) if lang == "klingon"
        ));
        assert!(Tagger::new(Box::new(source)).tag("qapla", 10).is_empty());
    }
}
