//!  Storage is organized through [log_storage::LogStorageImpl].
//!  The basic idea is:
//!   - There is a directory per user with all of their daily logs.
//!   - Every day is a separate json document named after the day, `YYYY-MM-DD.json`.
//!   - Saving a day again replaces its document.

pub mod entities;
pub mod log_storage;
