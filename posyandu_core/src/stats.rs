//! Summary statistics over the record collection.
//!
//! These are pulled by the caller from the current store snapshot after each
//! mutation; nothing here is cached.

use crate::{ChildRecord, GrowthStatus};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Default look-back window for counting newly registered children
pub const DEFAULT_RECENT_WINDOW_DAYS: i64 = 30;

/// Number of bars in the trend visualization
pub const TREND_BUCKETS: usize = 6;

const TREND_MIN: f64 = 8.0;
const TREND_MAX: f64 = 40.0;
const TREND_EMPTY: f64 = 10.0;

/// Dashboard statistics
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Stats {
    pub total_children: usize,
    /// Percentage of stunted children, rounded to a whole number
    pub stunting_rate: u32,
    pub avg_bmi: f64,
    /// Records created within the recent window
    pub monthly_new: usize,
}

impl Stats {
    /// One-line summary used in the printable report
    pub fn summary_line(&self) -> String {
        format!(
            "Total children: {} | Stunting rate: {}% | Avg BMI: {:.1}",
            self.total_children, self.stunting_rate, self.avg_bmi
        )
    }
}

/// Summarize records using the default 30 day window
pub fn summarize(records: &[ChildRecord], now: DateTime<Utc>) -> Stats {
    summarize_with_window(records, now, DEFAULT_RECENT_WINDOW_DAYS)
}

/// Summarize records, counting as new those created strictly within `window_days` of `now`
pub fn summarize_with_window(
    records: &[ChildRecord],
    now: DateTime<Utc>,
    window_days: i64,
) -> Stats {
    let total = records.len();
    if total == 0 {
        return Stats {
            total_children: 0,
            stunting_rate: 0,
            avg_bmi: 0.0,
            monthly_new: 0,
        };
    }

    let stunted = records
        .iter()
        .filter(|r| r.status == GrowthStatus::Stunted)
        .count();
    let bmi_sum: f64 = records.iter().map(|r| r.bmi).sum();
    let cutoff = now - Duration::days(window_days);
    let monthly_new = records.iter().filter(|r| r.created_at > cutoff).count();

    Stats {
        total_children: total,
        stunting_rate: (100.0 * stunted as f64 / total as f64).round() as u32,
        avg_bmi: bmi_sum / total as f64,
        monthly_new,
    }
}

/// Six-bar BMI trend.
///
/// Records are bucketed by `index % 6` in store order, not by date. Each bar
/// is the bucket's mean BMI rounded to a whole number and clamped to
/// `[8, 40]`; an empty bucket shows 10.
pub fn trend(records: &[ChildRecord]) -> [f64; TREND_BUCKETS] {
    let mut sums = [0.0_f64; TREND_BUCKETS];
    let mut counts = [0_usize; TREND_BUCKETS];

    for (index, record) in records.iter().enumerate() {
        let bucket = index % TREND_BUCKETS;
        sums[bucket] += record.bmi;
        counts[bucket] += 1;
    }

    let mut bars = [TREND_EMPTY; TREND_BUCKETS];
    for ((bar, sum), count) in bars.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            let mean = sum / count as f64;
            *bar = mean.round().clamp(TREND_MIN, TREND_MAX);
        }
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gender;
    use uuid::Uuid;

    fn record(bmi: f64, status: GrowthStatus, created_at: DateTime<Utc>) -> ChildRecord {
        ChildRecord {
            id: Uuid::new_v4(),
            created_at,
            name: "Child".into(),
            age_months: 30,
            gender: Gender::Female,
            height_cm: 90.0,
            weight_kg: 12.0,
            bmi,
            status,
            parent_contact: None,
        }
    }

    #[test]
    fn test_summarize_empty() {
        let stats = summarize(&[], Utc::now());
        assert_eq!(
            stats,
            Stats {
                total_children: 0,
                stunting_rate: 0,
                avg_bmi: 0.0,
                monthly_new: 0,
            }
        );
    }

    #[test]
    fn test_summarize_counts() {
        let now = Utc::now();
        let records = vec![
            record(15.0, GrowthStatus::Stunted, now),
            record(16.0, GrowthStatus::Normal, now - Duration::days(10)),
            record(14.0, GrowthStatus::AtRisk, now - Duration::days(45)),
        ];

        let stats = summarize(&records, now);
        assert_eq!(stats.total_children, 3);
        // 1/3 -> 33%
        assert_eq!(stats.stunting_rate, 33);
        assert!((stats.avg_bmi - 15.0).abs() < 1e-9);
        assert_eq!(stats.monthly_new, 2);
    }

    #[test]
    fn test_stunting_rate_rounds() {
        let now = Utc::now();
        let records = vec![
            record(15.0, GrowthStatus::Stunted, now),
            record(15.0, GrowthStatus::Stunted, now),
            record(15.0, GrowthStatus::Normal, now),
        ];
        // 2/3 -> 66.67% -> 67
        assert_eq!(summarize(&records, now).stunting_rate, 67);
    }

    #[test]
    fn test_recent_window_is_strict() {
        let now = Utc::now();
        let records = vec![record(15.0, GrowthStatus::Normal, now - Duration::days(30))];
        assert_eq!(summarize(&records, now).monthly_new, 0);
        assert_eq!(summarize_with_window(&records, now, 31).monthly_new, 1);
    }

    #[test]
    fn test_summary_line() {
        let stats = Stats {
            total_children: 2,
            stunting_rate: 50,
            avg_bmi: 14.24,
            monthly_new: 2,
        };
        assert_eq!(
            stats.summary_line(),
            "Total children: 2 | Stunting rate: 50% | Avg BMI: 14.2"
        );
    }

    #[test]
    fn test_trend_empty() {
        assert_eq!(trend(&[]), [10.0; TREND_BUCKETS]);
    }

    #[test]
    fn test_trend_buckets_by_index() {
        let now = Utc::now();
        let bmis = [15.6, 20.0, 12.0, 7.0, 45.0, 16.0, 16.4];
        let records: Vec<_> = bmis
            .iter()
            .map(|&b| record(b, GrowthStatus::Normal, now))
            .collect();

        let bars = trend(&records);
        // Bucket 0 holds indices 0 and 6: mean 16.0
        assert_eq!(bars[0], 16.0);
        assert_eq!(bars[1], 20.0);
        assert_eq!(bars[2], 12.0);
        // Clamped at both ends
        assert_eq!(bars[3], 8.0);
        assert_eq!(bars[4], 40.0);
        assert_eq!(bars[5], 16.0);
    }

    #[test]
    fn test_trend_partial_fill() {
        let now = Utc::now();
        let records = vec![record(15.6, GrowthStatus::Normal, now)];
        let bars = trend(&records);
        assert_eq!(bars[0], 16.0);
        assert!(bars[1..].iter().all(|&b| b == 10.0));
    }
}
