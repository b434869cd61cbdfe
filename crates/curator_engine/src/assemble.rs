use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::ExtractionConfig;
use crate::metadata::PageMetadata;

/// Length of the URL-derived embedding id.
pub const EMBEDDING_ID_LEN: usize = 32;

pub const MCP_DOCUMENT_TYPE: &str = "document";

/// One collected page. Optional blocks are present iff their config flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    /// Always counted on `content`.
    pub token_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_ready: Option<EmbeddingDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcp: Option<McpDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub description: String,
    pub author: String,
    pub publish_date: String,
    pub tags: Vec<String>,
    /// ISO-8601, captured at assembly time.
    pub crawled_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddingDocument {
    pub id: String,
    pub text: String,
    pub metadata: EmbeddingMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddingMetadata {
    pub source: String,
    pub title: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McpDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub title: String,
    pub content: String,
    pub tokens: u64,
}

/// Always-present record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub url: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub token_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputAssembler {
    pub include_metadata: bool,
    pub embeddings: bool,
    pub mcp_compatible: bool,
}

impl OutputAssembler {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            include_metadata: config.include_metadata,
            embeddings: config.embeddings,
            mcp_compatible: config.mcp_compatible,
        }
    }

    pub fn assemble(
        &self,
        fields: RecordFields,
        page: &PageMetadata,
        tags: Vec<String>,
    ) -> OutputRecord {
        self.assemble_at(fields, page, tags, Utc::now())
    }

    pub fn assemble_at(
        &self,
        fields: RecordFields,
        page: &PageMetadata,
        tags: Vec<String>,
        collected_at: DateTime<Utc>,
    ) -> OutputRecord {
        let embedding_ready = self.embeddings.then(|| EmbeddingDocument {
            id: embedding_id(&fields.url),
            text: fields.content.clone(),
            metadata: EmbeddingMetadata {
                source: fields.url.clone(),
                title: fields.title.clone(),
                tags: tags.clone(),
            },
        });

        let mcp = self.mcp_compatible.then(|| McpDocument {
            kind: MCP_DOCUMENT_TYPE.to_string(),
            source: fields.url.clone(),
            title: fields.title.clone(),
            content: fields.content.clone(),
            tokens: fields.token_count,
        });

        let metadata = self.include_metadata.then(|| RecordMetadata {
            description: page.description.clone(),
            author: page.author.clone(),
            publish_date: page.publish_date.clone(),
            tags,
            crawled_at: collected_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        OutputRecord {
            url: fields.url,
            title: fields.title,
            content: fields.content,
            word_count: fields.word_count,
            token_count: fields.token_count,
            metadata,
            embedding_ready,
            mcp,
        }
    }
}

/// Prefix of the base64 encoding of the URL. URLs sharing a long common
/// prefix collide.
pub fn embedding_id(url: &str) -> String {
    STANDARD
        .encode(url.as_bytes())
        .chars()
        .take(EMBEDDING_ID_LEN)
        .collect()
}
