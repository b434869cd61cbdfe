#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Start URLs of a new crawl, all admitted at depth 0.
    Seeded(Vec<String>),
    /// A fetch job ended (collected, skipped or failed) and released its slot.
    JobFinished {
        job_id: crate::JobId,
        /// Links the page handler asked to traverse, already tagged with their depth.
        discovered: Vec<crate::CrawlRequest>,
    },
    /// The page handler asked the crawl to stop admitting new requests.
    HaltRequested,
}
