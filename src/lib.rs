//! Simple to use cli for tracking your daily discipline blocks: toggle what you've done today,
//! keep a log per day, and see your streak, weekly trend and most consistent blocks.
//!

pub mod analyzer;
pub mod checklist;
pub mod cli;
pub mod storage;
pub mod utils;
