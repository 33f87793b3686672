use chrono::NaiveDate;

use super::date_index::DateIndex;

/// Upper bound on how many days the streak walk looks back.
pub const MAX_STREAK_DAYS: u32 = 365;

/// Number of consecutive days, ending at `as_of` inclusive, with at least one completed block. A
/// day with nothing completed breaks the streak the same way a missing day does.
pub fn compute_streak(index: &DateIndex, as_of: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(as_of);
    while let Some(current) = day {
        if streak >= MAX_STREAK_DAYS || index.count(current) == 0 {
            break;
        }
        streak += 1;
        day = current.pred_opt();
    }
    streak
}
