use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

use crate::config::OutputFormat;
use crate::extract::remove_matching;

/// Always stripped before Markdown conversion, whatever the exclude list says.
pub const SANITIZED_ELEMENTS: [&str; 4] = ["script", "style", "iframe", "noscript"];

/// Characters blanked out of Markdown before word counting and topic matching.
const MARKDOWN_SYNTAX: [char; 7] = ['#', '*', '_', '[', ']', '(', ')'];

const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr",
];

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

/// `html2md` with ATX headings. Fenced code blocks and `*` emphasis are
/// already html2md's defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        let sanitized = strip_sanitized_elements(html);
        atx_headings(&html2md::parse_html(&sanitized))
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedContent {
    /// Content in the configured output format; stored in the record.
    pub rendered: String,
    /// Plain text used only for word counts and topic matching.
    pub analysis_text: String,
}

/// Renders the isolated fragment in `format`.
///
/// `plain-text` uses the whole page's text for both views, not the fragment.
/// `structured-json` stores Markdown of the fragment but analyzes the whole
/// page's text.
pub fn render(
    converter: &dyn Converter,
    extracted_html: &str,
    whole_page_text: &str,
    format: OutputFormat,
) -> ConvertedContent {
    match format {
        OutputFormat::Markdown => {
            let rendered = converter.to_markdown(extracted_html);
            let analysis_text = strip_markdown_syntax(&rendered);
            ConvertedContent {
                rendered,
                analysis_text,
            }
        }
        OutputFormat::PlainText => ConvertedContent {
            rendered: whole_page_text.to_string(),
            analysis_text: whole_page_text.to_string(),
        },
        OutputFormat::StructuredJson => ConvertedContent {
            rendered: converter.to_markdown(extracted_html),
            analysis_text: whole_page_text.to_string(),
        },
    }
}

/// Approximate: blanks heading, emphasis and link characters, nothing more.
pub fn strip_markdown_syntax(markdown: &str) -> String {
    markdown
        .chars()
        .map(|c| if MARKDOWN_SYNTAX.contains(&c) { ' ' } else { c })
        .collect()
}

/// Text content of the document body with whitespace collapsed. Block
/// boundaries become line breaks; `<head>`, script and style bodies are skipped.
pub fn document_text(document: &Html) -> String {
    let mut raw = String::new();
    collect_text(document.tree.root(), &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            let name = element.name();
            if NON_TEXT_ELEMENTS.contains(&name) {
                return;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push('\n');
            }
            for child in node.children() {
                collect_text(child, out);
            }
            if block {
                out.push('\n');
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending: Option<char> = None;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending = if ch == '\n' || pending == Some('\n') {
                Some('\n')
            } else {
                Some(' ')
            };
            continue;
        }
        if let Some(separator) = pending.take() {
            if !out.is_empty() {
                out.push(separator);
            }
        }
        out.push(ch);
    }
    out
}

fn strip_sanitized_elements(html: &str) -> String {
    let mut fragment = Html::parse_fragment(html);
    if remove_matching(&mut fragment, &SANITIZED_ELEMENTS) == 0 {
        return html.to_string();
    }
    fragment.root_element().inner_html()
}

/// Rewrites setext headings (`Title` over `===`/`---`) as `#`/`##`,
/// leaving fenced code untouched.
fn atx_headings(markdown: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;
    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            lines.push(line.to_string());
            continue;
        }
        if !in_fence {
            if let Some(level) = setext_level(trimmed) {
                if let Some(previous) = lines.last_mut() {
                    if is_setext_title(previous) {
                        *previous = format!("{} {}", "#".repeat(level), previous.trim());
                        continue;
                    }
                }
            }
        }
        lines.push(line.to_string());
    }
    lines.join("\n")
}

fn setext_level(line: &str) -> Option<usize> {
    if line.len() < 3 {
        return None;
    }
    if line.chars().all(|c| c == '=') {
        Some(1)
    } else if line.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

fn is_setext_title(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty()
        && !t.starts_with('#')
        && !t.starts_with("```")
        && !t.starts_with("- ")
        && !t.starts_with("* ")
        && !t.starts_with("> ")
        && !t.starts_with('|')
}
