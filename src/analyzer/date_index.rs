use std::collections::HashMap;

use chrono::NaiveDate;

use crate::utils::time::date_to_record_name;

use super::{blocks::flatten_true_count, DailyRecord};

/// Completed block count per day, keyed by the exact date string of each record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateIndex {
    counts: HashMap<String, u32>,
}

impl DateIndex {
    /// Count stored for `date`, `None` if there is no record for that key.
    pub fn get(&self, date: &str) -> Option<u32> {
        self.counts.get(date).copied()
    }

    /// Count for a calendar day. Missing days count as zero.
    pub fn count(&self, date: NaiveDate) -> u32 {
        self.get(&date_to_record_name(date)).unwrap_or(0)
    }

    /// Sum of [DateIndex::count] over `days`.
    pub fn sum(&self, days: &[NaiveDate]) -> u32 {
        days.iter().map(|day| self.count(*day)).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Builds a [DateIndex] with one entry per record. Keys are not normalized, so a record stored
/// under `2025-3-7` will not be found when looking up `2025-03-07`. When two records share a key
/// the later one wins.
pub fn build_date_index<R: DailyRecord>(records: &[R]) -> DateIndex {
    let counts = records
        .iter()
        .map(|record| {
            (
                record.date_key().to_string(),
                flatten_true_count(record.blocks()),
            )
        })
        .collect();
    DateIndex { counts }
}
