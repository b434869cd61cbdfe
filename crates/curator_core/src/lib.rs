//! Curator core: pure crawl-frontier state machine and crawl strategies.
mod effect;
mod msg;
mod state;
mod strategy;
mod update;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    normalize_url_for_dedupe, CrawlLimits, CrawlRequest, CrawlState, CrawlStats, JobId,
    SessionState,
};
pub use strategy::CrawlStrategy;
pub use update::update;
