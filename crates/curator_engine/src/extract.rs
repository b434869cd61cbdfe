use curator_logging::curator_debug;
use ego_tree::NodeId;
use scraper::{Html, Selector};

/// Tried in order when no configured content selector matches.
pub const FALLBACK_CONTENT_SELECTORS: [&str; 8] = [
    "article",
    "[role=\"main\"]",
    "main",
    ".content",
    ".post-content",
    ".entry-content",
    "#content",
    ".article-content",
];

/// Where the isolated fragment came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A selector from the run configuration.
    Configured(String),
    /// One of [`FALLBACK_CONTENT_SELECTORS`].
    Detected(&'static str),
    /// Nothing matched; the whole body was used.
    Body,
    /// The document has no body.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Inner HTML of the selected container.
    pub content_html: String,
    pub source: ContentSource,
}

impl ExtractedContent {
    pub fn is_empty(&self) -> bool {
        self.content_html.is_empty()
    }

    pub fn used_whole_page(&self) -> bool {
        matches!(self.source, ContentSource::Body | ContentSource::Missing)
    }
}

pub trait Extractor: Send + Sync {
    /// Removes excluded elements from `document` in place, then picks the
    /// main-content container.
    fn isolate(
        &self,
        document: &mut Html,
        exclude_selectors: &[String],
        content_selectors: &[String],
    ) -> ExtractedContent;
}

/// Selector-cascade extractor:
/// - drops every element matching an exclude selector
/// - first configured content selector with a match wins
/// - then [`FALLBACK_CONTENT_SELECTORS`], in order
/// - then `<body>`.
///
/// Selectors that fail to parse are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectorCascadeExtractor;

impl Extractor for SelectorCascadeExtractor {
    fn isolate(
        &self,
        document: &mut Html,
        exclude_selectors: &[String],
        content_selectors: &[String],
    ) -> ExtractedContent {
        remove_matching(document, exclude_selectors);

        for raw in content_selectors {
            if let Some(content_html) = first_inner_html(document, raw) {
                return ExtractedContent {
                    content_html,
                    source: ContentSource::Configured(raw.clone()),
                };
            }
        }

        for raw in FALLBACK_CONTENT_SELECTORS {
            if let Some(content_html) = first_inner_html(document, raw) {
                return ExtractedContent {
                    content_html,
                    source: ContentSource::Detected(raw),
                };
            }
        }

        match first_inner_html(document, "body") {
            Some(content_html) => ExtractedContent {
                content_html,
                source: ContentSource::Body,
            },
            None => ExtractedContent {
                content_html: String::new(),
                source: ContentSource::Missing,
            },
        }
    }
}

/// Detaches every element matching any of `selectors`. Returns how many
/// elements were detached; unparseable selectors count as matching nothing.
pub fn remove_matching<S: AsRef<str>>(document: &mut Html, selectors: &[S]) -> usize {
    let mut removed = 0;
    for raw in selectors {
        let Some(selector) = parse_selector(raw.as_ref()) else {
            continue;
        };
        let ids: Vec<NodeId> = document.select(&selector).map(|el| el.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
    }
    removed
}

pub(crate) fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw.trim()) {
        Ok(selector) => Some(selector),
        Err(err) => {
            curator_debug!("Ignoring invalid selector {:?}: {:?}", raw, err);
            None
        }
    }
}

fn first_inner_html(document: &Html, raw: &str) -> Option<String> {
    let selector = parse_selector(raw)?;
    document.select(&selector).next().map(|el| el.inner_html())
}
