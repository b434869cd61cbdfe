use std::sync::Arc;

use curator_engine::{
    CrawlStrategy, Crawler, CrawlerSettings, ExtractionConfig, FetchSettings, MemorySink,
    PageProcessor, RecordSink, ReqwestFetcher, TokenEstimator,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    format!(
        "<html><head><title>{title}</title></head><body>\
         <article><p>{title} explains crawling pages and extracting readable text for models.</p></article>\
         {anchors}</body></html>"
    )
}

async fn mount(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

async fn site() -> MockServer {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        article("Home", &["/a", "/b", "/a#section", "https://elsewhere.org/x", "mailto:x@y.z"]),
    )
    .await;
    mount(&server, "/a", article("Alpha", &["/", "/missing"])).await;
    mount(
        &server,
        "/b",
        "<html><body><article><p>tiny</p></article></body></html>".to_string(),
    )
    .await;
    server
}

fn crawler(config: ExtractionConfig, sink: Arc<MemorySink>, max_concurrency: usize) -> Crawler {
    let processor = Arc::new(PageProcessor::new(config, TokenEstimator::character_based()));
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()).expect("client"));
    let sink: Arc<dyn RecordSink> = sink;
    Crawler::new(
        fetcher,
        processor,
        sink,
        CrawlerSettings {
            max_concurrency,
            ..CrawlerSettings::default()
        },
    )
}

fn config() -> ExtractionConfig {
    ExtractionConfig {
        crawl_strategy: CrawlStrategy::SameHostname,
        min_content_words: 5,
        ..ExtractionConfig::default()
    }
}

#[tokio::test]
async fn crawl_follows_local_links_and_summarizes() {
    curator_logging::initialize_for_tests();
    let server = site().await;
    let sink = Arc::new(MemorySink::new());
    let crawler = crawler(config(), Arc::clone(&sink), 4);

    let summary = crawler.run(vec![format!("{}/", server.uri())]).await.unwrap();

    let mut urls: Vec<String> = sink.records().into_iter().map(|r| r.url).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![format!("{}/", server.uri()), format!("{}/a", server.uri())]
    );
    assert_eq!(summary.pages_collected, 2);
    // "/b" is too short; "/missing" is a failed request and not counted
    assert_eq!(summary.pages_skipped, 1);
    assert!(summary.total_tokens > 0);
}

#[tokio::test]
async fn depth_zero_only_visits_start_urls() {
    let server = site().await;
    let sink = Arc::new(MemorySink::new());
    let config = ExtractionConfig {
        max_depth: 0,
        ..config()
    };
    let crawler = crawler(config, Arc::clone(&sink), 4);

    let summary = crawler.run(vec![format!("{}/", server.uri())]).await.unwrap();
    assert_eq!(sink.len(), 1);
    assert_eq!(summary.pages_collected, 1);
    assert_eq!(summary.pages_skipped, 0);
}

#[tokio::test]
async fn reaching_the_token_limit_stops_the_crawl() {
    let server = site().await;
    let sink = Arc::new(MemorySink::new());
    let config = ExtractionConfig {
        token_budget: Some(1),
        ..config()
    };
    let crawler = crawler(config, Arc::clone(&sink), 1);

    let summary = crawler.run(vec![format!("{}/", server.uri())]).await.unwrap();
    assert_eq!(sink.len(), 1);
    assert_eq!(summary.pages_collected, 1);
    assert!(crawler.processor().halt_signal().is_halted());
}

#[tokio::test]
async fn unreachable_start_url_finishes_with_empty_summary() {
    let server = MockServer::start().await;
    let sink = Arc::new(MemorySink::new());
    let crawler = crawler(config(), Arc::clone(&sink), 2);

    let summary = crawler
        .run(vec![format!("{}/nothing-here", server.uri()), "ftp://example.com/".to_string()])
        .await
        .unwrap();
    assert!(sink.is_empty());
    assert_eq!(summary.pages_collected, 0);
    assert_eq!(summary.pages_skipped, 0);
    assert_eq!(summary.total_tokens, 0);
    assert_eq!(summary.cost_estimate, "0.00");
}
