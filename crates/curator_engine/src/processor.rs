use std::fmt;
use std::sync::Arc;

use curator_core::CrawlStrategy;
use curator_logging::{curator_debug, curator_info, curator_warn};
use thiserror::Error;

use crate::assemble::{OutputAssembler, RecordFields};
use crate::config::ExtractionConfig;
use crate::convert::{document_text, render, Converter, Html2MdConverter};
use crate::counters::{HaltSignal, RunCounters};
use crate::extract::{Extractor, SelectorCascadeExtractor};
use crate::gate::{admit, Admission};
use crate::metadata::MetadataExtractor;
use crate::sink::{RecordSink, SinkError};
use crate::tagger::{Tagger, DEFAULT_TAG_LIMIT};
use crate::token::TokenEstimator;
use crate::types::{ParsedPage, PageVerdict};

/// Ask the crawler to follow the current page's links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalRequest {
    pub strategy: CrawlStrategy,
    /// Depth carried by every link found on the page.
    pub depth: u32,
}

/// Capability handed in by the crawler for the page being processed.
pub trait LinkTraversal {
    fn enqueue_links(&mut self, request: TraversalRequest);
}

/// Remembers traversal requests so the caller can act on them afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedTraversal {
    requests: Vec<TraversalRequest>,
}

impl RecordedTraversal {
    pub fn requests(&self) -> &[TraversalRequest] {
        &self.requests
    }
}

impl LinkTraversal for RecordedTraversal {
    fn enqueue_links(&mut self, request: TraversalRequest) {
        self.requests.push(request);
    }
}

/// What the crawler should do after this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// Token budget met or exceeded: stop admitting new requests. Pages
    /// already in flight still finish and are emitted.
    Halt { total_tokens: u64, budget: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub verdict: PageVerdict,
    pub control: Control,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to emit record for {url}: {source}")]
    Emit {
        url: String,
        #[source]
        source: SinkError,
    },
}

/// Per-page pipeline: isolate, convert, gate, enrich, count, emit.
///
/// One instance is shared by every worker of a run; the counters and the
/// halt flag are the only state that changes after construction.
pub struct PageProcessor {
    config: ExtractionConfig,
    extractor: Box<dyn Extractor>,
    converter: Box<dyn Converter>,
    metadata: MetadataExtractor,
    tagger: Tagger,
    estimator: TokenEstimator,
    assembler: OutputAssembler,
    counters: Arc<RunCounters>,
    halt: Arc<HaltSignal>,
}

impl PageProcessor {
    pub fn new(config: ExtractionConfig, estimator: TokenEstimator) -> Self {
        Self {
            counters: Arc::new(RunCounters::new(config.token_budget)),
            halt: Arc::new(HaltSignal::default()),
            assembler: OutputAssembler::from_config(&config),
            extractor: Box::new(SelectorCascadeExtractor),
            converter: Box::new(Html2MdConverter),
            metadata: MetadataExtractor,
            tagger: Tagger::default(),
            estimator,
            config,
        }
    }

    pub fn with_tagger(mut self, tagger: Tagger) -> Self {
        self.tagger = tagger;
        self
    }

    pub fn with_converter(mut self, converter: Box<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn counters(&self) -> &Arc<RunCounters> {
        &self.counters
    }

    pub fn halt_signal(&self) -> &Arc<HaltSignal> {
        &self.halt
    }

    /// Runs the pipeline on one page and emits the record if it is collected.
    ///
    /// Link traversal is requested after emission or rejection, unless the
    /// run has been halted or the page sits at the maximum depth. `Err` is a
    /// genuine failure; a reached budget is reported through
    /// [`PageOutcome::control`].
    pub fn process(
        &self,
        page: &ParsedPage,
        traversal: &mut dyn LinkTraversal,
        sink: &dyn RecordSink,
    ) -> Result<PageOutcome, PageError> {
        curator_info!("Processing: {}", page.url);
        let outcome = self.run_stages(page, sink)?;
        self.request_traversal(page, traversal);
        Ok(outcome)
    }

    /// Failure handler for requests the crawler could not fetch or process.
    pub fn handle_failed_request(&self, url: &str, reason: &dyn fmt::Display) {
        curator_warn!("Failed: {} ({})", url, reason);
    }

    fn run_stages(&self, page: &ParsedPage, sink: &dyn RecordSink) -> Result<PageOutcome, PageError> {
        let mut document = page.document.clone();
        let extracted = self.extractor.isolate(
            &mut document,
            &self.config.exclude_selectors,
            &self.config.content_selectors,
        );
        if extracted.is_empty() {
            curator_info!("No content found, skipping {}", page.url);
            return Ok(self.skip(PageVerdict::SkippedNoContent));
        }
        if extracted.used_whole_page() {
            curator_debug!("No content container matched, using whole body of {}", page.url);
        }

        let page_text = document_text(&document);
        let converted = render(
            self.converter.as_ref(),
            &extracted.content_html,
            &page_text,
            self.config.output_format,
        );

        let word_count = match admit(
            &converted.analysis_text,
            self.config.min_content_words,
            &self.config.topic_keywords,
        ) {
            Admission::TooShort { word_count } => {
                curator_info!("Content too short ({} words), skipping {}", word_count, page.url);
                return Ok(self.skip(PageVerdict::SkippedTooShort { word_count }));
            }
            Admission::OffTopic { .. } => {
                curator_info!("Content doesn't match topic keywords, skipping {}", page.url);
                return Ok(self.skip(PageVerdict::SkippedOffTopic));
            }
            Admission::Admitted { word_count } => word_count,
        };

        let metadata = self.metadata.extract(&document);
        let tags = if self.config.auto_tagging {
            let tags = self.tagger.tag(&converted.analysis_text, DEFAULT_TAG_LIMIT);
            curator_info!("Auto-tags for {}: {}", page.url, tags.join(", "));
            tags
        } else {
            Vec::new()
        };

        let token_count = self.estimator.estimate(&converted.rendered);
        let record = self.assembler.assemble(
            RecordFields {
                url: page.url.clone(),
                title: metadata.title.clone(),
                content: converted.rendered,
                word_count,
                token_count,
            },
            &metadata,
            tags,
        );

        let check = self.counters.add_and_check(token_count);
        curator_info!(
            "Collected {} words ({} tokens) from {}",
            word_count,
            token_count,
            page.url
        );
        sink.push(&record).map_err(|source| PageError::Emit {
            url: page.url.clone(),
            source,
        })?;
        self.counters.record_collected();

        let control = match self.counters.budget() {
            Some(budget) if check.budget_exceeded => {
                if self.halt.request() {
                    curator_warn!(
                        "Token limit reached ({}/{}), stopping crawler",
                        check.new_total,
                        budget
                    );
                }
                Control::Halt {
                    total_tokens: check.new_total,
                    budget,
                }
            }
            _ => Control::Continue,
        };

        Ok(PageOutcome {
            verdict: PageVerdict::Collected(record),
            control,
        })
    }

    fn skip(&self, verdict: PageVerdict) -> PageOutcome {
        self.counters.record_skipped();
        PageOutcome {
            verdict,
            control: Control::Continue,
        }
    }

    fn request_traversal(&self, page: &ParsedPage, traversal: &mut dyn LinkTraversal) {
        if self.halt.is_halted() {
            curator_debug!("Crawl halted, not following links from {}", page.url);
            return;
        }
        if page.depth < self.config.max_depth {
            traversal.enqueue_links(TraversalRequest {
                strategy: self.config.crawl_strategy,
                depth: page.depth + 1,
            });
        }
    }
}
