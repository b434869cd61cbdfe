use std::fmt;

use scraper::Html;

use crate::assemble::OutputRecord;

/// A fetched page as handed over by the crawler. Read-only to page processing.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub url: String,
    pub depth: u32,
    pub document: Html,
}

impl ParsedPage {
    pub fn new(url: impl Into<String>, depth: u32, document: Html) -> Self {
        Self {
            url: url.into(),
            depth,
            document,
        }
    }

    pub fn parse(url: impl Into<String>, depth: u32, html: &str) -> Self {
        Self::new(url, depth, Html::parse_document(html))
    }
}

/// Terminal outcome of processing one page. Never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageVerdict {
    Collected(OutputRecord),
    SkippedNoContent,
    SkippedTooShort { word_count: usize },
    SkippedOffTopic,
}

impl PageVerdict {
    pub fn is_collected(&self) -> bool {
        matches!(self, PageVerdict::Collected(_))
    }

    pub fn record(&self) -> Option<&OutputRecord> {
        match self {
            PageVerdict::Collected(record) => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
