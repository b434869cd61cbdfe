#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { word_count: usize },
    TooShort { word_count: usize },
    OffTopic { word_count: usize },
}

impl Admission {
    pub fn word_count(self) -> usize {
        match self {
            Admission::Admitted { word_count }
            | Admission::TooShort { word_count }
            | Admission::OffTopic { word_count } => word_count,
        }
    }
}

/// Length first, then topic: a page that is both too short and off topic
/// is reported as too short.
pub fn admit(analysis_text: &str, min_words: usize, topic_keywords: &[String]) -> Admission {
    let word_count = count_words(analysis_text);
    if word_count < min_words {
        return Admission::TooShort { word_count };
    }
    if !matches_topics(analysis_text, topic_keywords) {
        return Admission::OffTopic { word_count };
    }
    Admission::Admitted { word_count }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive substring match against any keyword. No keywords, no filter.
pub fn matches_topics(text: &str, topic_keywords: &[String]) -> bool {
    if topic_keywords.is_empty() {
        return true;
    }
    let lower = text.to_lowercase();
    topic_keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::{admit, count_words, matches_topics, Admission};

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn words_are_whitespace_delimited() {
        assert_eq!(count_words("  one\ttwo\n\nthree  "), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words(" \n\t "), 0);
    }

    #[test]
    fn minimum_is_a_closed_lower_bound() {
        assert_eq!(
            admit(&words(99), 100, &[]),
            Admission::TooShort { word_count: 99 }
        );
        assert_eq!(
            admit(&words(100), 100, &[]),
            Admission::Admitted { word_count: 100 }
        );
    }

    #[test]
    fn topic_match_ignores_case() {
        let text = format!("{} Rust", words(10));
        assert!(matches!(
            admit(&text, 5, &keywords(&["rust"])),
            Admission::Admitted { word_count: 11 }
        ));
        assert!(matches!(
            admit(&text, 5, &keywords(&["python", "go"])),
            Admission::OffTopic { word_count: 11 }
        ));
    }

    #[test]
    fn length_is_checked_before_topic() {
        assert_eq!(
            admit("tiny", 10, &keywords(&["rust"])),
            Admission::TooShort { word_count: 1 }
        );
    }

    #[test]
    fn empty_keyword_list_admits_anything() {
        assert!(matches_topics("whatever", &[]));
        assert!(matches_topics("", &[]));
    }

    #[test]
    fn keywords_match_as_substrings() {
        assert!(matches_topics("Trusty tools", &keywords(&["rust"])));
    }
}
