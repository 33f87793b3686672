use std::collections::HashMap;

use serde::Serialize;

use super::{blocks::true_count, DailyRecord};

pub const DEFAULT_TOP_BLOCKS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockConsistency {
    pub block_key: String,
    pub true_count: u32,
}

/// Counts how often every top-level block was completed across `records` and returns the `limit`
/// most consistent ones. Completed sub-blocks are credited to their parent block. Equal counts
/// are ordered by block key.
pub fn top_block_consistency<R: DailyRecord>(records: &[R], limit: usize) -> Vec<BlockConsistency> {
    let mut counters = HashMap::<&str, u32>::new();
    for record in records {
        for (key, value) in record.blocks() {
            *counters.entry(key.as_str()).or_default() += true_count(value);
        }
    }

    let mut consistency = counters
        .into_iter()
        .map(|(key, count)| BlockConsistency {
            block_key: key.to_string(),
            true_count: count,
        })
        .collect::<Vec<_>>();
    consistency.sort_by(|a, b| {
        b.true_count
            .cmp(&a.true_count)
            .then_with(|| a.block_key.cmp(&b.block_key))
    });
    consistency.truncate(limit);
    consistency
}
