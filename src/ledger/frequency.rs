use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// How often an expense repeats from its anchor date.
///
/// Unrecognized values deserialize to [`Frequency::None`] so a malformed record is
/// simply never due.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn parse(raw: &str) -> Frequency {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            "yearly" => Frequency::Yearly,
            _ => Frequency::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::None => "One-off",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::None)
    }

    /// Returns the `steps`-th occurrence counted from `anchor`.
    ///
    /// Month and year steps are always measured from the anchor, so an anchor on the
    /// 31st lands on the last day of shorter months without drifting afterwards
    /// (Jan 31, Feb 28, Mar 31). Stepping one period at a time from the previous
    /// occurrence would stay on the 28th after February instead.
    pub fn advance(&self, anchor: DateTime<Utc>, steps: u32) -> Option<DateTime<Utc>> {
        match self {
            Frequency::None => None,
            Frequency::Daily => anchor.checked_add_signed(Duration::days(steps as i64)),
            Frequency::Weekly => anchor.checked_add_signed(Duration::weeks(steps as i64)),
            Frequency::Monthly => anchor.checked_add_months(Months::new(steps)),
            Frequency::Yearly => anchor.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }

    /// Lower bound on the number of whole periods between `anchor` and `now`.
    ///
    /// `advance(anchor, periods_elapsed(..))` never lands after `now`.
    pub(crate) fn periods_elapsed(&self, anchor: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        if now <= anchor {
            return 0;
        }
        let steps = match self {
            Frequency::None => 0,
            Frequency::Daily => (now - anchor).num_days(),
            Frequency::Weekly => (now - anchor).num_weeks(),
            Frequency::Monthly => month_index(now) - month_index(anchor) - 1,
            Frequency::Yearly => (now.year() - anchor.year()) as i64 - 1,
        };
        steps.clamp(0, u32::MAX as i64) as u32
    }
}

fn month_index(date: DateTime<Utc>) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

impl From<String> for Frequency {
    fn from(raw: String) -> Self {
        Frequency::parse(&raw)
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}
