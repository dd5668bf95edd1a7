// src/common/time.rs

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Conversion between absolute instants and the facility's wall clock.
///
/// All facilities run in one configured zone; callers never pass a zone.
#[derive(Debug, Clone, Copy)]
pub struct FacilityClock {
    tz: Tz,
}

impl FacilityClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn parse(name: &str) -> anyhow::Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid time zone: {}", name))?;
        Ok(Self::new(tz))
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Local wall-clock minute-of-day. Seconds are dropped.
    pub fn minute_of_day(&self, instant: DateTime<Utc>) -> i32 {
        let local = instant.with_timezone(&self.tz);
        (local.hour() * 60 + local.minute()) as i32
    }

    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::default());
        self.tz
            .from_local_datetime(&midnight)
            .earliest()
            // Midnight skipped by a DST jump: read the wall time as UTC.
            .unwrap_or_else(|| self.tz.from_utc_datetime(&midnight))
            .with_timezone(&Utc)
    }

    /// `[start, end)` of the local calendar day.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = date.succ_opt().unwrap_or(date);
        (self.day_start(date), self.day_start(next))
    }

    /// Instant of `minute` after local midnight of `date`.
    pub fn at_minute(&self, date: NaiveDate, minute: i32) -> DateTime<Utc> {
        self.day_start(date) + Duration::minutes(minute as i64)
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}

impl Default for FacilityClock {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Istanbul)
    }
}
