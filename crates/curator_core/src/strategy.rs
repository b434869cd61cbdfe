use std::fmt;
use std::net::IpAddr;

use serde::Deserialize;
use url::Url;

/// Which discovered links a page may hand back to the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrawlStrategy {
    /// Any http(s) link.
    All,
    /// Links sharing the registrable domain, subdomains included.
    #[default]
    SameDomain,
    /// Links on exactly the same host.
    SameHostname,
    /// Links with the same scheme, host and port.
    SameOrigin,
}

impl CrawlStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            CrawlStrategy::All => "all",
            CrawlStrategy::SameDomain => "same-domain",
            CrawlStrategy::SameHostname => "same-hostname",
            CrawlStrategy::SameOrigin => "same-origin",
        }
    }

    /// Whether `candidate`, found on the page at `origin`, may be followed.
    pub fn allows(self, origin: &Url, candidate: &Url) -> bool {
        if !matches!(candidate.scheme(), "http" | "https") {
            return false;
        }
        match self {
            CrawlStrategy::All => true,
            CrawlStrategy::SameHostname => {
                candidate.host_str().is_some() && origin.host_str() == candidate.host_str()
            }
            CrawlStrategy::SameDomain => match (origin.host_str(), candidate.host_str()) {
                (Some(a), Some(b)) => registrable_domain(a).eq_ignore_ascii_case(registrable_domain(b)),
                _ => false,
            },
            CrawlStrategy::SameOrigin => origin.origin() == candidate.origin(),
        }
    }
}

impl fmt::Display for CrawlStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last two labels of a host name. Multi-part public suffixes such as
/// `co.uk` are not recognized.
fn registrable_domain(host: &str) -> &str {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return host;
    }
    let mut dots = host.rmatch_indices('.');
    dots.next();
    match dots.next() {
        Some((idx, _)) => &host[idx + 1..],
        None => host,
    }
}
