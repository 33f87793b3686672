use std::{fmt::Display, ops::Deref, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Whole percentage in `0..=100`. Used for completion scores and progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Percentage(u32);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: u32) -> Option<Percentage> {
        if value > 100 {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Share of `part` in `whole`, rounded half up and clamped into range. An empty whole gives 0%.
    pub fn of(part: u32, whole: u32) -> Percentage {
        if whole == 0 {
            return Percentage(0);
        }
        let value = round_half_up(part as f64 / whole as f64 * 100.);
        Percentage(value.clamp(0, 100) as u32)
    }
}

impl FromStr for Percentage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // This means that 100%% also works, but I think I'm fine with that
        let s = s.trim_end_matches("%");
        let v = s.parse::<u32>()?;
        Percentage::new_opt(v).ok_or_else(|| anyhow!("Can't parse {s} into percentage"))
    }
}

impl Deref for Percentage {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Completed leaves relative to top-level blocks, in whole percent. Unlike [Percentage::of] this
/// isn't clamped: groups count every completed sub-block, so a day can score above 100.
pub fn completion_score(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    round_half_up(completed as f64 / total as f64 * 100.).max(0) as u32
}

/// Rounds to the nearest integer, with halves going towards positive infinity. `-12.5` becomes
/// `-12`, `12.5` becomes `13`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Signed change from `previous` to `current` in whole percent. `None` when `previous` is zero,
/// because there is no base to compare against.
pub fn percent_change(previous: u32, current: u32) -> Option<i64> {
    if previous == 0 {
        return None;
    }
    let previous = previous as f64;
    Some(round_half_up((current as f64 - previous) / previous * 100.))
}
