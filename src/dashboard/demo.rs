//! Mock usage data for the dashboard header.
//!
//! Random numbers regenerated on every start. Display only; no contract.

use chrono::{Duration, Local};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DailyUsage {
    pub date: String,
    pub conversations: u32,
    pub avg_response_secs: f64,
    pub satisfaction: f64,
}

/// One row per day, oldest first, ending today.
pub fn sample_usage(days: usize) -> Vec<DailyUsage> {
    let mut rng = rand::thread_rng();
    let today = Local::now().date_naive();

    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            DailyUsage {
                date: date.format("%Y-%m-%d").to_string(),
                conversations: rng.gen_range(50..200),
                avg_response_secs: rng.gen_range(0.5..3.0),
                satisfaction: rng.gen_range(4.0..5.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_usage_row_count() {
        assert_eq!(sample_usage(14).len(), 14);
        assert!(sample_usage(0).is_empty());
    }

    #[test]
    fn test_sample_usage_values_in_range() {
        for day in sample_usage(30) {
            assert!((50..200).contains(&day.conversations));
            assert!((0.5..3.0).contains(&day.avg_response_secs));
            assert!((4.0..5.0).contains(&day.satisfaction));
        }
    }

    #[test]
    fn test_sample_usage_dates_ascend() {
        let usage = sample_usage(7);
        for pair in usage.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }
}
