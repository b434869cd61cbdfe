//! Run-wide counters shared by every page handler.
//!
//! All updates are single atomic read-modify-write operations. The budget
//! check is not a reservation: handlers running concurrently may each see
//! "not exceeded" before any of them raises the halt, so the final total can
//! overshoot the budget by up to (concurrent handlers x largest page).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetCheck {
    pub new_total: u64,
    pub budget_exceeded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountersSnapshot {
    pub pages_collected: u64,
    pub pages_skipped: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Default)]
pub struct RunCounters {
    total_tokens: AtomicU64,
    pages_collected: AtomicU64,
    pages_skipped: AtomicU64,
    budget: Option<u64>,
}

impl RunCounters {
    /// A zero budget counts as no budget.
    pub fn new(budget: Option<u64>) -> Self {
        Self {
            budget: budget.filter(|limit| *limit > 0),
            ..Self::default()
        }
    }

    pub fn budget(&self) -> Option<u64> {
        self.budget
    }

    /// Adds `tokens` to the running total and reports whether the new total
    /// meets or exceeds the budget.
    pub fn add_and_check(&self, tokens: u64) -> BudgetCheck {
        let previous = self.total_tokens.fetch_add(tokens, Ordering::AcqRel);
        let new_total = previous.saturating_add(tokens);
        BudgetCheck {
            new_total,
            budget_exceeded: self.budget.is_some_and(|limit| new_total >= limit),
        }
    }

    pub fn record_collected(&self) -> u64 {
        self.pages_collected.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn record_skipped(&self) -> u64 {
        self.pages_skipped.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            pages_collected: self.pages_collected.load(Ordering::Acquire),
            pages_skipped: self.pages_skipped.load(Ordering::Acquire),
            total_tokens: self.total_tokens.load(Ordering::Acquire),
        }
    }
}

/// One-way "stop admitting new work" flag.
#[derive(Debug, Default)]
pub struct HaltSignal {
    halted: AtomicBool,
}

impl HaltSignal {
    /// Returns `true` only for the call that actually raised the flag.
    pub fn request(&self) -> bool {
        !self.halted.swap(true, Ordering::AcqRel)
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }
}
