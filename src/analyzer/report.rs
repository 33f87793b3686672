use chrono::NaiveDate;
use serde::Serialize;

use crate::utils::percentage::completion_score;

use super::{
    blocks::flatten_true_count,
    consistency::{top_block_consistency, BlockConsistency},
    date_index::build_date_index,
    streak::compute_streak,
    trend::{compute_week_over_week, WeekOverWeek},
    DailyRecord,
};

/// A single day of the chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScore {
    pub date: String,
    pub completed_count: u32,
    pub total_blocks: u32,
    pub score: u32,
}

impl DailyScore {
    /// `MM-DD` part of the date, used as the chart label.
    pub fn label(&self) -> &str {
        self.date.get(5..).unwrap_or(&self.date)
    }
}

/// Everything the stats output needs, computed from one snapshot of a user's logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub as_of: NaiveDate,
    pub streak: u32,
    pub week_over_week: WeekOverWeek,
    pub daily_scores: Vec<DailyScore>,
    pub top_blocks: Vec<BlockConsistency>,
}

/// Per-day completion in ascending date order.
pub fn daily_score_series<R: DailyRecord>(records: &[R]) -> Vec<DailyScore> {
    let mut series = records
        .iter()
        .map(|record| {
            let completed_count = flatten_true_count(record.blocks());
            let total_blocks = record.blocks().len() as u32;
            DailyScore {
                date: record.date_key().to_string(),
                completed_count,
                total_blocks,
                score: completion_score(completed_count, total_blocks),
            }
        })
        .collect::<Vec<_>>();
    series.sort_by(|a, b| a.date.cmp(&b.date));
    series
}

/// Runs every analysis over `records` as of the given day.
pub fn analyze_progress<R: DailyRecord>(
    records: &[R],
    as_of: NaiveDate,
    top_limit: usize,
) -> ProgressReport {
    let index = build_date_index(records);
    ProgressReport {
        as_of,
        streak: compute_streak(&index, as_of),
        week_over_week: compute_week_over_week(&index, as_of),
        daily_scores: daily_score_series(records),
        top_blocks: top_block_consistency(records, top_limit),
    }
}
