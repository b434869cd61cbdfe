//! Curator engine: fetching, per-page extraction pipeline, and dataset output.
mod assemble;
mod config;
mod convert;
mod counters;
mod decode;
mod engine;
mod extract;
mod fetch;
mod gate;
mod links;
mod metadata;
mod persist;
mod processor;
mod sink;
mod summary;
mod tagger;
mod token;
mod types;

pub use assemble::{
    embedding_id, EmbeddingDocument, EmbeddingMetadata, McpDocument, OutputAssembler,
    OutputRecord, RecordFields, RecordMetadata, EMBEDDING_ID_LEN, MCP_DOCUMENT_TYPE,
};
pub use config::{
    ConfigError, CrawlInput, ExtractionConfig, OutputFormat, StartUrl, DEFAULT_EXCLUDE_SELECTORS,
    DEFAULT_MAX_CONCURRENCY,
};
pub use convert::{
    document_text, render, strip_markdown_syntax, ConvertedContent, Converter, Html2MdConverter,
    SANITIZED_ELEMENTS,
};
pub use counters::{BudgetCheck, CountersSnapshot, HaltSignal, RunCounters};
pub use curator_core::CrawlStrategy;
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use engine::{CrawlError, Crawler, CrawlerSettings};
pub use extract::{
    remove_matching, ContentSource, ExtractedContent, Extractor, SelectorCascadeExtractor,
    FALLBACK_CONTENT_SELECTORS,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use gate::{admit, count_words, matches_topics, Admission};
pub use links::{discover_links, DEFAULT_MAX_LINKS};
pub use metadata::{MetadataExtractor, PageMetadata, UNTITLED};
pub use persist::{
    ensure_output_dir, write_summary, AtomicFileWriter, DatasetSink, PersistError, DATASET_DIR,
    KEY_VALUE_DIR, SUMMARY_FILENAME,
};
pub use processor::{
    Control, LinkTraversal, PageError, PageOutcome, PageProcessor, RecordedTraversal,
    TraversalRequest,
};
pub use sink::{MemorySink, RecordSink, SinkError};
pub use summary::{cost_estimate, RunSummary, USD_PER_10K_TOKENS};
pub use tagger::{KeywordSource, StopwordKeywordSource, Tagger, TaggingError, DEFAULT_TAG_LIMIT};
pub use token::{
    character_estimate, TiktokenTokenizer, TokenEstimator, Tokenizer, TokenizerError,
    CHARS_PER_TOKEN, TOKENIZER_MODEL,
};
pub use types::{
    FailureKind, FetchError, FetchMetadata, FetchOutput, PageVerdict, ParsedPage,
};
