mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use curator_engine::{
    write_summary, CrawlInput, Crawler, CrawlerSettings, DatasetSink, FetchSettings,
    PageProcessor, RecordSink, ReqwestFetcher, TokenEstimator, TOKENIZER_MODEL,
};
use curator_logging::curator_info;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    curator_logging::initialize(cli.log_destination(), cli.log_level());

    let input = CrawlInput::load(&cli.input)
        .with_context(|| format!("loading input from {}", cli.input.display()))?;
    let start_urls = input.start_urls();

    let estimator = TokenEstimator::for_model(TOKENIZER_MODEL);
    let processor = Arc::new(PageProcessor::new(input.extraction, estimator));
    let sink: Arc<dyn RecordSink> = Arc::new(
        DatasetSink::new(&cli.output_dir)
            .with_context(|| format!("preparing dataset under {}", cli.output_dir.display()))?,
    );
    let fetcher = Arc::new(
        ReqwestFetcher::new(FetchSettings::default()).context("building HTTP client")?,
    );
    let settings = CrawlerSettings {
        max_concurrency: input.max_concurrency,
        ..CrawlerSettings::default()
    };

    let summary = Crawler::new(fetcher, processor, sink, settings)
        .run(start_urls)
        .await
        .context("crawl aborted")?;
    summary.log();

    let path = write_summary(&cli.output_dir, &summary).context("writing run summary")?;
    curator_info!("Summary written to {}", path.display());
    Ok(())
}
