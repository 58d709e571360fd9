//! Time sources and household-local calendar arithmetic.
//!
//! The rules core never samples the wall clock itself. Every operation takes
//! one explicit instant, sampled once by the caller, so an entire approval or
//! purchase is computed against a single moment and any scenario can be
//! replayed exactly in tests.
//!
//! "Local" below means the household's configured fixed UTC offset. Streaks,
//! weekly windows and daily purchase counters all care about the family's
//! calendar day, not the server's.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Source of "now" for callers that drive the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, used by the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-cranked clock for tests and replays.
///
/// Stores epoch milliseconds so it can be shared and advanced without locks.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.millis.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// The calendar day an instant falls on in the household offset.
pub fn local_day(at: DateTime<Utc>, tz: FixedOffset) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// True when both instants fall on the same household calendar day.
pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: FixedOffset) -> bool {
    local_day(a, tz) == local_day(b, tz)
}

/// Map key for per-day counters, e.g. `"2026-08-23"`.
pub fn day_key(at: DateTime<Utc>, tz: FixedOffset) -> String {
    local_day(at, tz).format("%Y-%m-%d").to_string()
}

/// Weekday index in the household offset, Sunday = 0 through Saturday = 6.
pub fn weekday_index(at: DateTime<Utc>, tz: FixedOffset) -> u8 {
    at.with_timezone(&tz)
        .weekday()
        .num_days_from_sunday() as u8
}

/// The most recent Sunday at household-local midnight, as a UTC instant.
///
/// This is the weekly-goal window boundary: progress resets when an approval
/// observes a boundary newer than the recorded one.
pub fn week_start(at: DateTime<Utc>, tz: FixedOffset) -> DateTime<Utc> {
    let local = at.with_timezone(&tz);
    let days_back = local.weekday().num_days_from_sunday() as i64;
    let midnight = (local.date_naive() - Duration::days(days_back)).and_time(NaiveTime::MIN);
    // A fixed offset has no gaps or folds, so local midnight is one instant.
    let naive_utc = midnight - Duration::seconds(tz.local_minus_utc() as i64);
    DateTime::from_naive_utc_and_offset(naive_utc, Utc)
}

/// Cooldown horizon a whole number of days after `now`.
pub fn days_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now + Duration::days(days as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn week_start_rolls_back_to_sunday_midnight() {
        // 2026-01-07 is a Wednesday; the window opened on Sunday the 4th.
        let wednesday = utc(2026, 1, 7, 15, 30);
        assert_eq!(
            week_start(wednesday, FixedOffset::east_opt(0).unwrap()),
            utc(2026, 1, 4, 0, 0)
        );
    }

    #[test]
    fn week_start_on_sunday_midnight_is_identity() {
        let boundary = utc(2026, 1, 4, 0, 0);
        assert_eq!(
            week_start(boundary, FixedOffset::east_opt(0).unwrap()),
            boundary
        );
    }

    #[test]
    fn week_start_respects_household_offset() {
        // 23:30 UTC on Saturday the 3rd is already Sunday in UTC+2, so the
        // boundary is Sunday local midnight, i.e. 22:00 UTC on the 3rd.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let late_saturday = utc(2026, 1, 3, 23, 30);
        assert_eq!(week_start(late_saturday, tz), utc(2026, 1, 3, 22, 0));
    }

    #[test]
    fn day_key_crosses_midnight_with_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let at = utc(2026, 1, 4, 23, 30);
        assert_eq!(day_key(at, tz), "2026-01-05");
        assert_eq!(day_key(at, FixedOffset::east_opt(0).unwrap()), "2026-01-04");
    }

    #[test]
    fn weekday_index_is_sunday_based() {
        let tz = FixedOffset::east_opt(0).unwrap();
        assert_eq!(weekday_index(utc(2026, 1, 4, 12, 0), tz), 0); // Sunday
        assert_eq!(weekday_index(utc(2026, 1, 10, 12, 0), tz), 6); // Saturday
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(utc(2026, 1, 4, 0, 0));
        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), utc(2026, 1, 6, 0, 0));
        clock.set(utc(2026, 1, 1, 0, 0));
        assert_eq!(clock.now(), utc(2026, 1, 1, 0, 0));
    }
}
