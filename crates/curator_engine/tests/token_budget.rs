use std::sync::Arc;

use curator_engine::{
    character_estimate, HaltSignal, RunCounters, TokenEstimator, Tokenizer, TokenizerError,
};
use pretty_assertions::assert_eq;

struct FailingTokenizer;

impl Tokenizer for FailingTokenizer {
    fn count_tokens(&self, _text: &str) -> Result<usize, TokenizerError> {
        Err(TokenizerError::Failed("no vocabulary".to_string()))
    }
}

#[test]
fn failing_tokenizer_falls_back_to_character_estimate() {
    let estimator = TokenEstimator::new(Arc::new(FailingTokenizer));
    assert!(estimator.has_tokenizer());
    assert_eq!(estimator.estimate("abcde"), 2);
    assert_eq!(estimator.estimate("abcdefgh"), 2);
    assert_eq!(estimator.estimate(""), 0);
}

#[test]
fn character_estimate_counts_chars_not_bytes() {
    assert_eq!(character_estimate("ééé"), 1);
    assert_eq!(character_estimate("ééééé"), 2);
    assert_eq!(TokenEstimator::character_based().estimate("a"), 1);
}

#[test]
fn zero_budget_is_no_budget() {
    assert_eq!(RunCounters::new(Some(0)).budget(), None);
    assert_eq!(RunCounters::new(None).budget(), None);
    assert_eq!(RunCounters::new(Some(5)).budget(), Some(5));
}

#[test]
fn budget_check_is_inclusive() {
    let counters = RunCounters::new(Some(1000));
    let first = counters.add_and_check(600);
    assert_eq!(first.new_total, 600);
    assert!(!first.budget_exceeded);

    let second = counters.add_and_check(400);
    assert_eq!(second.new_total, 1000);
    assert!(second.budget_exceeded);
}

#[test]
fn unbounded_counters_never_exceed() {
    let counters = RunCounters::new(None);
    assert!(!counters.add_and_check(u64::MAX / 2).budget_exceeded);
}

#[test]
fn concurrent_additions_are_not_lost() {
    let counters = RunCounters::new(Some(10_000));
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..250 {
                    counters.add_and_check(3);
                    counters.record_collected();
                }
            });
        }
    });
    let snapshot = counters.snapshot();
    assert_eq!(snapshot.total_tokens, 6_000);
    assert_eq!(snapshot.pages_collected, 2_000);
    assert_eq!(snapshot.pages_skipped, 0);
}

#[test]
fn exactly_one_caller_raises_the_halt() {
    let halt = HaltSignal::default();
    let raised: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| halt.request())).collect();
        handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum()
    });
    assert_eq!(raised, 1);
    assert!(halt.is_halted());
}
