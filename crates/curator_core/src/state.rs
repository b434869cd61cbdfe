use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use url::Url;

use crate::Effect;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Ceiling on simultaneously running fetch jobs.
    pub max_concurrency: usize,
    /// Requests admitted per host over the whole run.
    pub max_pages_per_domain: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            max_pages_per_domain: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub url: String,
    pub depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrawlStats {
    pub admitted: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub over_domain_cap: usize,
    pub dropped_on_halt: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    limits: CrawlLimits,
    session: SessionState,
    halted: bool,
    next_job_id: JobId,
    queue: VecDeque<(JobId, CrawlRequest)>,
    in_flight: BTreeMap<JobId, CrawlRequest>,
    seen: HashSet<String>,
    per_host: HashMap<String, usize>,
    stats: CrawlStats,
}

impl CrawlState {
    pub fn new(limits: CrawlLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    pub(crate) fn start(&mut self) {
        self.session = SessionState::Running;
    }

    /// Queue a request unless it is invalid, already seen, or its host is full.
    pub(crate) fn admit(&mut self, mut request: CrawlRequest) -> bool {
        if self.halted || self.session != SessionState::Running {
            return false;
        }
        let Some((normalized, host)) = normalize_with_host(&request.url) else {
            self.stats.invalid += 1;
            return false;
        };
        if self.seen.contains(&normalized) {
            self.stats.duplicates += 1;
            return false;
        }
        let count = self.per_host.entry(host).or_insert(0);
        if *count >= self.limits.max_pages_per_domain {
            self.stats.over_domain_cap += 1;
            return false;
        }
        *count += 1;
        self.seen.insert(normalized.clone());

        self.next_job_id += 1;
        request.url = normalized;
        self.queue.push_back((self.next_job_id, request));
        self.stats.admitted += 1;
        true
    }

    pub(crate) fn complete(&mut self, job_id: JobId) -> Option<CrawlRequest> {
        self.in_flight.remove(&job_id)
    }

    /// One-way: clears the queue and refuses every later admission.
    pub(crate) fn halt(&mut self) -> bool {
        if self.halted {
            return false;
        }
        self.halted = true;
        self.stats.dropped_on_halt += self.queue.len();
        self.queue.clear();
        true
    }

    pub(crate) fn dispatch(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.session != SessionState::Running {
            return effects;
        }
        let ceiling = self.limits.max_concurrency.max(1);
        while self.in_flight.len() < ceiling {
            let Some((job_id, request)) = self.queue.pop_front() else {
                break;
            };
            self.in_flight.insert(job_id, request.clone());
            effects.push(Effect::Fetch { job_id, request });
        }
        effects
    }

    pub(crate) fn finish_if_drained(&mut self) -> Option<Effect> {
        if self.session == SessionState::Running
            && self.queue.is_empty()
            && self.in_flight.is_empty()
        {
            self.session = SessionState::Finished;
            Some(Effect::Finished)
        } else {
            None
        }
    }
}

/// Canonical form used for de-duplication: http(s) only, no fragment,
/// no trailing slash except for the root path.
pub fn normalize_url_for_dedupe(raw: &str) -> Option<String> {
    normalize_with_host(raw).map(|(normalized, _)| normalized)
}

fn normalize_with_host(raw: &str) -> Option<(String, String)> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    url.set_fragment(None);
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }
    Some((url.to_string(), host))
}
