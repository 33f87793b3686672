use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{analyzer::blocks::flatten_true_count, utils::percentage::completion_score};

/// State of a single block inside a daily log. Stored documents may hold a plain flag, a group of
/// sub-blocks, or something unexpected; the last case is kept around instead of failing the whole
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockValue {
    Leaf(bool),
    Group(BTreeMap<String, BlockValue>),
    Other(serde_json::Value),
}

impl BlockValue {
    /// Whether the block counts as done. For groups this means any sub-block is done.
    pub fn is_done(&self) -> bool {
        match self {
            BlockValue::Leaf(v) => *v,
            BlockValue::Group(group) => group.values().any(BlockValue::is_done),
            BlockValue::Other(_) => false,
        }
    }
}

impl From<bool> for BlockValue {
    fn from(value: bool) -> Self {
        BlockValue::Leaf(value)
    }
}

/// Mapping of block name to its state. Ordered so that documents and reports are stable.
pub type Blocks = BTreeMap<String, BlockValue>;

/// Document stored for a (user, day) pair. Field names follow the camelCase layout of the
/// original document store so existing exports can be read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogEntity {
    pub date: String,
    pub blocks: Blocks,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub total_blocks: u32,
    /// `completed_count / total_blocks` in percent. Goes above 100 when groups have several
    /// completed sub-blocks.
    #[serde(default)]
    pub score: u32,
    pub created_at: DateTime<Utc>,
}

impl DailyLogEntity {
    /// Builds a log for `date`, deriving the redundant counters from `blocks`.
    pub fn new(date: String, blocks: Blocks, created_at: DateTime<Utc>) -> Self {
        let completed_count = flatten_true_count(&blocks);
        let total_blocks = blocks.len() as u32;
        Self {
            date,
            blocks,
            completed_count,
            total_blocks,
            score: completion_score(completed_count, total_blocks),
            created_at,
        }
    }
}
