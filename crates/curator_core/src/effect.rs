use crate::{CrawlRequest, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch and process one page; report back with `Msg::JobFinished`.
    Fetch { job_id: JobId, request: CrawlRequest },
    /// Queue drained and nothing in flight. Emitted once per crawl.
    Finished,
}
