use chrono::{DateTime, Local, NaiveDate, SubsecRound, Utc};

use dl_utils::start_of_day;

/// Source of the current instant and the current local calendar day.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar day in the local time zone.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the operating system. Instants are truncated to
/// milliseconds, the precision timestamps are persisted with.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    fn today(&self) -> NaiveDate {
        start_of_day(Local::now().naive_local())
    }
}

/// Clock pinned to a single instant. Its local zone is UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// A clock that always reads `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// A clock reading 10:00 UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let morning = date.and_hms_opt(10, 0, 0).unwrap_or_default();
        Self::new(morning.and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        start_of_day(self.now.naive_utc())
    }
}
