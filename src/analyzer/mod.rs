//! Derived statistics over a user's daily logs.
//!
//! Everything here is a pure function of its input: no I/O, no shared state, and no failure
//! modes. Malformed block values simply count as not completed. [analyze_progress] is the usual
//! entry point and bundles every analysis into a [ProgressReport].

pub mod blocks;
pub mod consistency;
pub mod date_index;
pub mod report;
pub mod streak;
pub mod trend;

pub use report::{analyze_progress, ProgressReport};

use crate::storage::entities::{Blocks, DailyLogEntity};

/// Minimal view of a stored daily log the analysis needs: the date key of the document and its
/// blocks.
pub trait DailyRecord {
    fn date_key(&self) -> &str;

    fn blocks(&self) -> &Blocks;
}

impl DailyRecord for DailyLogEntity {
    fn date_key(&self) -> &str {
        &self.date
    }

    fn blocks(&self) -> &Blocks {
        &self.blocks
    }
}

impl DailyRecord for (String, Blocks) {
    fn date_key(&self) -> &str {
        &self.0
    }

    fn blocks(&self) -> &Blocks {
        &self.1
    }
}
