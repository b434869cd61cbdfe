use std::sync::Arc;

use chrono::Utc;
use curator_core::{update, CrawlLimits, CrawlRequest, CrawlState, Effect, JobId, Msg};
use curator_logging::{curator_debug, curator_info};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

use crate::config::DEFAULT_MAX_CONCURRENCY;
use crate::decode::decode_html;
use crate::fetch::Fetcher;
use crate::links::{discover_links, DEFAULT_MAX_LINKS};
use crate::processor::{Control, PageProcessor, RecordedTraversal};
use crate::sink::RecordSink;
use crate::summary::RunSummary;
use crate::types::{FetchOutput, ParsedPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlerSettings {
    pub max_concurrency: usize,
    /// Links taken from a single page.
    pub max_links_per_page: usize,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_links_per_page: DEFAULT_MAX_LINKS,
        }
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("crawl worker panicked or was cancelled: {0}")]
    Worker(#[from] JoinError),
}

/// Drives the frontier state machine and runs fetch jobs on the tokio runtime.
///
/// Page processing is CPU bound and runs on the blocking pool.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    processor: Arc<PageProcessor>,
    sink: Arc<dyn RecordSink>,
    settings: CrawlerSettings,
}

struct JobReport {
    job_id: JobId,
    discovered: Vec<CrawlRequest>,
    halt: bool,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        processor: Arc<PageProcessor>,
        sink: Arc<dyn RecordSink>,
        settings: CrawlerSettings,
    ) -> Self {
        Self {
            fetcher,
            processor,
            sink,
            settings,
        }
    }

    pub fn processor(&self) -> &Arc<PageProcessor> {
        &self.processor
    }

    /// Crawls from `start_urls` until the frontier drains and returns the run summary.
    pub async fn run(&self, start_urls: Vec<String>) -> Result<RunSummary, CrawlError> {
        let config = self.processor.config();
        curator_info!("Starting crawler with {} start URL(s)", start_urls.len());
        curator_info!(
            "Strategy: {}, Max depth: {}, Max pages per domain: {}",
            config.crawl_strategy,
            config.max_depth,
            config.max_pages_per_domain
        );
        curator_info!(
            "Topic filtering: {}",
            if config.topic_keywords.is_empty() {
                "disabled".to_string()
            } else {
                config.topic_keywords.join(", ")
            }
        );
        curator_info!("Output format: {}", config.output_format);
        if let Some(budget) = self.processor.counters().budget() {
            curator_info!("Token limit: {}", budget);
        }

        let limits = CrawlLimits {
            max_concurrency: self.settings.max_concurrency,
            max_pages_per_domain: config.max_pages_per_domain,
        };
        let mut jobs = JoinSet::new();
        let (mut state, effects) = update(CrawlState::new(limits), Msg::Seeded(start_urls));
        self.spawn_effects(effects, &mut jobs);

        while let Some(joined) = jobs.join_next().await {
            let report = joined??;
            if (report.halt || self.processor.halt_signal().is_halted()) && !state.is_halted() {
                let (next, effects) = update(state, Msg::HaltRequested);
                state = next;
                curator_debug!(
                    "Frontier halted, {} queued request(s) dropped",
                    state.stats().dropped_on_halt
                );
                self.spawn_effects(effects, &mut jobs);
            }
            let (next, effects) = update(
                state,
                Msg::JobFinished {
                    job_id: report.job_id,
                    discovered: report.discovered,
                },
            );
            state = next;
            self.spawn_effects(effects, &mut jobs);
        }

        let stats = state.stats();
        curator_debug!(
            "Frontier: {} admitted, {} duplicate, {} invalid, {} over host cap",
            stats.admitted,
            stats.duplicates,
            stats.invalid,
            stats.over_domain_cap
        );
        Ok(RunSummary::from_counters(
            self.processor.counters().snapshot(),
            Utc::now(),
        ))
    }

    fn spawn_effects(&self, effects: Vec<Effect>, jobs: &mut JoinSet<Result<JobReport, JoinError>>) {
        for effect in effects {
            match effect {
                Effect::Fetch { job_id, request } => {
                    jobs.spawn(run_job(
                        Arc::clone(&self.fetcher),
                        Arc::clone(&self.processor),
                        Arc::clone(&self.sink),
                        self.settings.max_links_per_page,
                        job_id,
                        request,
                    ));
                }
                Effect::Finished => curator_debug!("Frontier drained"),
            }
        }
    }
}

async fn run_job(
    fetcher: Arc<dyn Fetcher>,
    processor: Arc<PageProcessor>,
    sink: Arc<dyn RecordSink>,
    max_links: usize,
    job_id: JobId,
    request: CrawlRequest,
) -> Result<JobReport, JoinError> {
    let output = match fetcher.fetch(&request.url).await {
        Ok(output) => output,
        Err(err) => {
            processor.handle_failed_request(&request.url, &err);
            return Ok(JobReport {
                job_id,
                discovered: Vec::new(),
                halt: false,
            });
        }
    };

    let (discovered, halt) = tokio::task::spawn_blocking(move || {
        process_fetched(&processor, sink.as_ref(), &request, &output, max_links)
    })
    .await?;

    Ok(JobReport {
        job_id,
        discovered,
        halt,
    })
}

fn process_fetched(
    processor: &PageProcessor,
    sink: &dyn RecordSink,
    request: &CrawlRequest,
    output: &FetchOutput,
    max_links: usize,
) -> (Vec<CrawlRequest>, bool) {
    let decoded = match decode_html(&output.bytes, output.metadata.content_type.as_deref()) {
        Ok(decoded) => decoded,
        Err(err) => {
            processor.handle_failed_request(&request.url, &err);
            return (Vec::new(), false);
        }
    };
    curator_debug!(
        "Decoded {} bytes from {} as {}",
        output.metadata.byte_len,
        request.url,
        decoded.encoding_label
    );

    let page = ParsedPage::parse(request.url.clone(), request.depth, &decoded.html);
    let mut traversal = RecordedTraversal::default();
    let outcome = match processor.process(&page, &mut traversal, sink) {
        Ok(outcome) => outcome,
        Err(err) => {
            processor.handle_failed_request(&request.url, &err);
            return (Vec::new(), false);
        }
    };

    let discovered = traversal
        .requests()
        .iter()
        .flat_map(|wanted| {
            discover_links(
                &page.document,
                &output.metadata.final_url,
                wanted.strategy,
                max_links,
            )
            .into_iter()
            .map(move |url| CrawlRequest {
                url,
                depth: wanted.depth,
            })
        })
        .collect();

    (discovered, matches!(outcome.control, Control::Halt { .. }))
}
