use scraper::Html;

use crate::extract::parse_selector;

pub const UNTITLED: &str = "Untitled";

/// Probed in order; the first selector with any match decides the date.
pub const DATE_SELECTORS: [&str; 5] = [
    "meta[property=\"article:published_time\"]",
    "meta[name=\"publish-date\"]",
    "time[datetime]",
    ".published-date",
    ".post-date",
];

const AUTHOR_TEXT_SELECTORS: [&str; 2] = ["[rel=\"author\"]", "[itemprop=\"author\"]"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub author: String,
    pub publish_date: String,
}

/// Title, description, author and publish date. Missing fields are empty
/// strings, except the title which falls back to `h1` and then [`UNTITLED`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn extract(&self, document: &Html) -> PageMetadata {
        PageMetadata {
            title: extract_title(document),
            description: first_attr(document, "meta[name=\"description\"]", "content")
                .unwrap_or_default(),
            author: extract_author(document),
            publish_date: extract_publish_date(document),
        }
    }
}

fn extract_title(document: &Html) -> String {
    first_text(document, "title")
        .or_else(|| first_text(document, "h1"))
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn extract_author(document: &Html) -> String {
    first_attr(document, "meta[name=\"author\"]", "content")
        .or_else(|| {
            AUTHOR_TEXT_SELECTORS
                .iter()
                .find_map(|raw| first_text(document, raw))
        })
        .unwrap_or_default()
}

/// Machine-readable `content`/`datetime` attributes win over element text.
fn extract_publish_date(document: &Html) -> String {
    for raw in DATE_SELECTORS {
        let Some(selector) = parse_selector(raw) else {
            continue;
        };
        let Some(element) = document.select(&selector).next() else {
            continue;
        };
        let value = element.value();
        return value
            .attr("content")
            .or_else(|| value.attr("datetime"))
            .map(|attr| attr.trim().to_string())
            .filter(|attr| !attr.is_empty())
            .unwrap_or_else(|| element_text(element));
    }
    String::new()
}

fn first_text(document: &Html, raw: &str) -> Option<String> {
    let selector = parse_selector(raw)?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn first_attr(document: &Html, raw: &str, attr: &str) -> Option<String> {
    let selector = parse_selector(raw)?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
