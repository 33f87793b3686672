use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a string in blocklog. The same string is used
/// as the key of a daily log and as the name of its document.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

/// Inverse of [date_to_record_name]. Only the canonical zero padded form is accepted.
pub fn record_name_to_date(name: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(name, RECORD_DATE_FORMAT)
        .with_context(|| format!("{name:?} is not a YYYY-MM-DD date"))?;
    if date_to_record_name(date) != name {
        bail!("{name:?} is not a YYYY-MM-DD date");
    }
    Ok(date)
}

/// Short month/day form used in labels, e.g. `3/7`.
pub fn month_day(date: NaiveDate) -> String {
    date.format("%-m/%-d").to_string()
}

/// Returns `count` consecutive days that end at `end` (inclusive), oldest first. Stops early at
/// the beginning of chrono's calendar.
pub fn days_ending_at(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = Some(end);
    while days.len() < count {
        let Some(day) = current else {
            break;
        };
        days.push(day);
        current = day.pred_opt();
    }
    days.reverse();
    days
}
