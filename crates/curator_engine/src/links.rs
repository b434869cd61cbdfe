use std::collections::HashSet;

use curator_core::{normalize_url_for_dedupe, CrawlStrategy};
use scraper::Html;
use url::Url;

use crate::extract::parse_selector;

pub const DEFAULT_MAX_LINKS: usize = 5_000;

/// Absolute http(s) links of `document` that `strategy` allows from `page_url`,
/// in document order, without duplicates, at most `max_links`.
pub fn discover_links(
    document: &Html,
    page_url: &str,
    strategy: CrawlStrategy,
    max_links: usize,
) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };
    let Some(anchors) = parse_selector("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&anchors) {
        if links.len() >= max_links {
            break;
        }
        let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_url(href, &base))
        else {
            continue;
        };
        if !strategy.allows(&base, &url) {
            continue;
        }
        if let Some(key) = normalize_url_for_dedupe(url.as_str()) {
            if seen.insert(key.clone()) {
                links.push(key);
            }
        }
    }
    links
}

fn resolve_url(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#')
        || lower.starts_with('?')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
    {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) => Some(url),
        Err(_) => base.join(trimmed).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::{discover_links, DEFAULT_MAX_LINKS};
    use curator_core::CrawlStrategy;
    use scraper::Html;

    const PAGE: &str = r##"<html><body>
        <a href="/guide">Guide</a>
        <a href="/guide/#intro">Guide again</a>
        <a href="https://docs.example.com/api">Docs</a>
        <a href="https://other.org/">Elsewhere</a>
        <a href="#top">Top</a>
        <a href="?page=2">Next</a>
        <a href="javascript:void(0)">Click</a>
        <a href="mailto:team@example.com">Mail</a>
        <a>No href</a>
    </body></html>"##;

    #[test]
    fn same_hostname_keeps_only_local_links() {
        let document = Html::parse_document(PAGE);
        let links = discover_links(
            &document,
            "https://example.com/start",
            CrawlStrategy::SameHostname,
            DEFAULT_MAX_LINKS,
        );
        assert_eq!(links, vec!["https://example.com/guide".to_string()]);
    }

    #[test]
    fn same_domain_includes_subdomains() {
        let document = Html::parse_document(PAGE);
        let links = discover_links(
            &document,
            "https://example.com/start",
            CrawlStrategy::SameDomain,
            DEFAULT_MAX_LINKS,
        );
        assert_eq!(
            links,
            vec![
                "https://example.com/guide".to_string(),
                "https://docs.example.com/api".to_string(),
            ]
        );
    }

    #[test]
    fn all_strategy_is_capped() {
        let document = Html::parse_document(PAGE);
        let links = discover_links(&document, "https://example.com/", CrawlStrategy::All, 2);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn unparsable_page_url_yields_nothing() {
        let document = Html::parse_document(PAGE);
        assert!(discover_links(&document, "not a url", CrawlStrategy::All, 10).is_empty());
    }
}
