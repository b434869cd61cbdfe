use chrono::{DateTime, SecondsFormat, Utc};
use curator_logging::curator_info;
use serde::Serialize;

use crate::counters::CountersSnapshot;

/// Flat pricing assumption behind the cost estimate.
pub const USD_PER_10K_TOKENS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub pages_collected: u64,
    pub pages_skipped: u64,
    pub total_tokens: u64,
    /// Dollars, two decimals.
    pub cost_estimate: String,
    pub completed_at: String,
}

impl RunSummary {
    pub fn from_counters(counters: CountersSnapshot, completed_at: DateTime<Utc>) -> Self {
        Self {
            pages_collected: counters.pages_collected,
            pages_skipped: counters.pages_skipped,
            total_tokens: counters.total_tokens,
            cost_estimate: cost_estimate(counters.total_tokens),
            completed_at: completed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn log(&self) {
        curator_info!("Crawl complete");
        curator_info!("  Pages collected: {}", self.pages_collected);
        curator_info!("  Pages skipped: {}", self.pages_skipped);
        curator_info!("  Total tokens: {}", self.total_tokens);
        curator_info!(
            "  Cost estimate: ${} (at ${} per 10K tokens)",
            self.cost_estimate,
            USD_PER_10K_TOKENS
        );
    }
}

pub fn cost_estimate(total_tokens: u64) -> String {
    format!("{:.2}", total_tokens as f64 / 10_000.0 * USD_PER_10K_TOKENS)
}

#[cfg(test)]
mod tests {
    use super::{cost_estimate, RunSummary};
    use crate::counters::CountersSnapshot;
    use chrono::{TimeZone, Utc};

    #[test]
    fn cost_is_five_dollars_per_ten_thousand_tokens() {
        assert_eq!(cost_estimate(0), "0.00");
        assert_eq!(cost_estimate(10_000), "5.00");
        assert_eq!(cost_estimate(1_200), "0.60");
        assert_eq!(cost_estimate(123_456), "61.73");
    }

    #[test]
    fn summary_copies_counters() {
        let snapshot = CountersSnapshot {
            pages_collected: 3,
            pages_skipped: 2,
            total_tokens: 20_000,
        };
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let summary = RunSummary::from_counters(snapshot, at);
        assert_eq!(summary.pages_collected, 3);
        assert_eq!(summary.pages_skipped, 2);
        assert_eq!(summary.cost_estimate, "10.00");
        assert_eq!(summary.completed_at, "2024-01-02T03:04:05.000Z");
    }
}
