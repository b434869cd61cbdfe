use curator_core::{
    update, CrawlLimits, CrawlRequest, CrawlState, Effect, JobId, Msg, SessionState,
};
use pretty_assertions::assert_eq;

fn fetches(effects: &[Effect]) -> Vec<(JobId, String, u32)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Fetch { job_id, request } => Some((*job_id, request.url.clone(), request.depth)),
            Effect::Finished => None,
        })
        .collect()
}

fn limits(max_concurrency: usize, max_pages_per_domain: usize) -> CrawlLimits {
    CrawlLimits {
        max_concurrency,
        max_pages_per_domain,
    }
}

fn request(url: &str, depth: u32) -> CrawlRequest {
    CrawlRequest {
        url: url.to_string(),
        depth,
    }
}

#[test]
fn seeding_dispatches_up_to_the_concurrency_ceiling() {
    curator_logging::initialize_for_tests();
    let state = CrawlState::new(limits(2, 100));
    let seeds = vec![
        "https://a.example.com/1".to_string(),
        "https://a.example.com/2".to_string(),
        "https://a.example.com/3".to_string(),
    ];

    let (state, effects) = update(state, Msg::Seeded(seeds));

    assert_eq!(
        fetches(&effects),
        vec![
            (1, "https://a.example.com/1".to_string(), 0),
            (2, "https://a.example.com/2".to_string(), 0),
        ]
    );
    assert_eq!(state.in_flight(), 2);
    assert_eq!(state.queued(), 1);
    assert_eq!(state.session(), SessionState::Running);
}

#[test]
fn finishing_a_job_frees_a_slot_and_admits_discovered_links() {
    let (state, _) = update(
        CrawlState::new(limits(1, 100)),
        Msg::Seeded(vec!["https://example.com/".to_string()]),
    );

    let (state, effects) = update(
        state,
        Msg::JobFinished {
            job_id: 1,
            discovered: vec![
                request("https://example.com/a", 1),
                request("https://example.com/b", 1),
            ],
        },
    );

    assert_eq!(fetches(&effects), vec![(2, "https://example.com/a".to_string(), 1)]);
    assert_eq!(state.queued(), 1);
}

#[test]
fn duplicate_urls_are_admitted_once() {
    let (state, effects) = update(
        CrawlState::new(limits(10, 100)),
        Msg::Seeded(vec![
            "https://example.com/page".to_string(),
            "https://example.com/page/".to_string(),
            "https://example.com/page#section".to_string(),
        ]),
    );

    assert_eq!(fetches(&effects).len(), 1);
    assert_eq!(state.stats().duplicates, 2);
}

#[test]
fn per_host_cap_is_enforced() {
    let (state, effects) = update(
        CrawlState::new(limits(10, 2)),
        Msg::Seeded(vec![
            "https://a.example.com/1".to_string(),
            "https://a.example.com/2".to_string(),
            "https://a.example.com/3".to_string(),
            "https://b.example.com/1".to_string(),
        ]),
    );

    let urls: Vec<_> = fetches(&effects).into_iter().map(|(_, url, _)| url).collect();
    assert_eq!(
        urls,
        vec![
            "https://a.example.com/1".to_string(),
            "https://a.example.com/2".to_string(),
            "https://b.example.com/1".to_string(),
        ]
    );
    assert_eq!(state.stats().over_domain_cap, 1);
}

#[test]
fn halt_drops_queue_and_refuses_new_links_but_waits_for_in_flight() {
    let (state, _) = update(
        CrawlState::new(limits(2, 100)),
        Msg::Seeded(vec![
            "https://example.com/1".to_string(),
            "https://example.com/2".to_string(),
            "https://example.com/3".to_string(),
        ]),
    );

    let (state, effects) = update(state, Msg::HaltRequested);
    assert!(effects.is_empty());
    assert!(state.is_halted());
    assert_eq!(state.queued(), 0);
    assert_eq!(state.stats().dropped_on_halt, 1);

    let (state, effects) = update(
        state,
        Msg::JobFinished {
            job_id: 1,
            discovered: vec![request("https://example.com/new", 1)],
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.in_flight(), 1);

    let (state, effects) = update(
        state,
        Msg::JobFinished {
            job_id: 2,
            discovered: Vec::new(),
        },
    );
    assert_eq!(effects, vec![Effect::Finished]);
    assert_eq!(state.session(), SessionState::Finished);
}

#[test]
fn repeated_halt_is_a_no_op() {
    let (state, _) = update(
        CrawlState::new(limits(1, 100)),
        Msg::Seeded(vec!["https://example.com/".to_string()]),
    );
    let (state, _) = update(state, Msg::HaltRequested);
    let stats_before = state.stats();

    let (state, effects) = update(state, Msg::HaltRequested);

    assert!(effects.is_empty());
    assert_eq!(state.stats(), stats_before);
}

#[test]
fn invalid_seeds_finish_immediately() {
    let (state, effects) = update(
        CrawlState::new(CrawlLimits::default()),
        Msg::Seeded(vec!["not a url".to_string(), "ftp://example.com".to_string()]),
    );

    assert_eq!(effects, vec![Effect::Finished]);
    assert_eq!(state.stats().invalid, 2);
    assert_eq!(state.session(), SessionState::Finished);
}

#[test]
fn unknown_job_completion_is_ignored() {
    let (state, _) = update(
        CrawlState::new(limits(1, 100)),
        Msg::Seeded(vec!["https://example.com/".to_string()]),
    );

    let (state, effects) = update(
        state,
        Msg::JobFinished {
            job_id: 42,
            discovered: vec![request("https://example.com/other", 1)],
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.in_flight(), 1);
    assert_eq!(state.queued(), 0);
}
