use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use curator_core::CrawlStrategy;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_EXCLUDE_SELECTORS: [&str; 6] = [
    "nav",
    "header",
    "footer",
    ".advertisement",
    ".sidebar",
    ".comments",
];

pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Markdown,
    PlainText,
    StructuredJson,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::PlainText => "plain-text",
            OutputFormat::StructuredJson => "structured-json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction settings, fixed for the lifetime of a run.
///
/// Field names follow the input file keys (`maxCrawlDepth`, `tokenLimit`, ...);
/// every key is optional and falls back to [`ExtractionConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionConfig {
    pub crawl_strategy: CrawlStrategy,
    #[serde(rename = "maxCrawlDepth")]
    pub max_depth: u32,
    pub max_pages_per_domain: usize,
    /// Empty means no topic filter.
    pub topic_keywords: Vec<String>,
    pub content_selectors: Vec<String>,
    pub exclude_selectors: Vec<String>,
    pub output_format: OutputFormat,
    pub include_metadata: bool,
    pub auto_tagging: bool,
    pub embeddings: bool,
    pub mcp_compatible: bool,
    #[serde(rename = "minContentLength")]
    pub min_content_words: usize,
    /// `None` (or zero) means unbounded.
    #[serde(rename = "tokenLimit")]
    pub token_budget: Option<u64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            crawl_strategy: CrawlStrategy::SameDomain,
            max_depth: 3,
            max_pages_per_domain: 100,
            topic_keywords: Vec::new(),
            content_selectors: Vec::new(),
            exclude_selectors: DEFAULT_EXCLUDE_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output_format: OutputFormat::Markdown,
            include_metadata: true,
            auto_tagging: true,
            embeddings: false,
            mcp_compatible: true,
            min_content_words: 100,
            token_budget: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StartUrl {
    Plain(String),
    Request { url: String },
}

impl StartUrl {
    pub fn url(&self) -> &str {
        match self {
            StartUrl::Plain(url) => url,
            StartUrl::Request { url } => url,
        }
    }
}

/// Contents of the run's input file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlInput {
    #[serde(default)]
    pub start_urls: Vec<StartUrl>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(flatten)]
    pub extraction: ExtractionConfig,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read input file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed input: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no start URLs provided")]
    NoStartUrls,
}

impl CrawlInput {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let input: Self = serde_json::from_str(text)?;
        if input.start_urls().is_empty() {
            return Err(ConfigError::NoStartUrls);
        }
        Ok(input)
    }

    /// Trimmed, non-empty start URLs in input order.
    pub fn start_urls(&self) -> Vec<String> {
        self.start_urls
            .iter()
            .map(|start| start.url().trim())
            .filter(|url| !url.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}
