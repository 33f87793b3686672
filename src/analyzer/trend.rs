use chrono::NaiveDate;
use serde::Serialize;

use crate::utils::{
    percentage,
    time::{days_ending_at, month_day},
};

use super::date_index::DateIndex;

pub const WEEK_DAYS: usize = 7;

/// Comparison of the last 7 days against the 7 days before them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverWeek {
    /// `M/D - M/D` range of the current week.
    pub current_range_label: String,
    /// `None` means there was no activity in the previous week, so there is nothing to compare
    /// against. Shown as "New".
    pub percent_change: Option<i64>,
    pub is_positive: bool,
    pub current_total: u32,
    pub previous_total: u32,
}

pub fn compute_week_over_week(index: &DateIndex, as_of: NaiveDate) -> WeekOverWeek {
    let both = days_ending_at(as_of, WEEK_DAYS * 2);
    let split = both.len().saturating_sub(WEEK_DAYS);
    let (previous_week, current_week) = both.split_at(split);

    let current_total = index.sum(current_week);
    let previous_total = index.sum(previous_week);

    let (percent_change, is_positive) = match (previous_total, current_total) {
        (0, 0) => (Some(0), true),
        (0, _) => (None, true),
        (previous, current) => {
            let change = percentage::percent_change(previous, current);
            (change, change.is_some_and(|v| v >= 0))
        }
    };

    WeekOverWeek {
        current_range_label: range_label(current_week),
        percent_change,
        is_positive,
        current_total,
        previous_total,
    }
}

fn range_label(days: &[NaiveDate]) -> String {
    match (days.first(), days.last()) {
        (Some(first), Some(last)) => format!("{} - {}", month_day(*first), month_day(*last)),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use crate::{
        analyzer::{date_index::build_date_index, test_utils::record},
        storage::entities::DailyLogEntity,
        utils::time::date_to_record_name,
    };

    use super::compute_week_over_week;

    const AS_OF: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

    /// One record per entry of `counts`, `counts[n]` completed blocks `n` days before [AS_OF].
    fn history(counts: &[(i64, usize)]) -> Vec<DailyLogEntity> {
        counts
            .iter()
            .map(|(days_back, completed)| {
                let blocks = (0..*completed)
                    .map(|i| (format!("block{i}"), serde_json::Value::Bool(true)))
                    .collect::<serde_json::Map<_, _>>();
                record(
                    &date_to_record_name(AS_OF - Duration::days(*days_back)),
                    serde_json::Value::Object(blocks),
                )
            })
            .collect()
    }

    #[test]
    fn zero_to_zero_is_flat() {
        let result = compute_week_over_week(&build_date_index(&history(&[])), AS_OF);
        assert_eq!(result.percent_change, Some(0));
        assert!(result.is_positive);
    }

    #[test]
    fn zero_to_some_is_new() {
        let result = compute_week_over_week(&build_date_index(&history(&[(0, 3), (6, 2)])), AS_OF);
        assert_eq!(result.current_total, 5);
        assert_eq!(result.previous_total, 0);
        assert_eq!(result.percent_change, None);
    }

    #[test]
    fn growth() {
        let records = history(&[(0, 6), (7, 3), (13, 1)]);
        let result = compute_week_over_week(&build_date_index(&records), AS_OF);
        assert_eq!(result.previous_total, 4);
        assert_eq!(result.current_total, 6);
        assert_eq!(result.percent_change, Some(50));
        assert!(result.is_positive);
    }

    #[test]
    fn decline() {
        let records = history(&[(2, 5), (8, 10)]);
        let result = compute_week_over_week(&build_date_index(&records), AS_OF);
        assert_eq!(result.percent_change, Some(-50));
        assert!(!result.is_positive);
    }

    #[test]
    fn days_outside_both_weeks_are_ignored() {
        let records = history(&[(0, 2), (7, 2), (14, 9), (-1, 9)]);
        let result = compute_week_over_week(&build_date_index(&records), AS_OF);
        assert_eq!(result.current_total, 2);
        assert_eq!(result.previous_total, 2);
        assert_eq!(result.percent_change, Some(0));
        assert!(result.is_positive);
    }

    #[test]
    fn label_covers_current_week() {
        let result = compute_week_over_week(&build_date_index(&history(&[])), AS_OF);
        assert_eq!(result.current_range_label, "3/8 - 3/14");
    }
}
