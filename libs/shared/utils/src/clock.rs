use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

/// Source of "now" for anything that compares against the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Wall-clock time at the clinic, given its UTC offset in minutes.
    fn local_now(&self, utc_offset_minutes: i32) -> NaiveDateTime {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        self.now().with_timezone(&offset).naive_local()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock, stored as milliseconds since the epoch.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
            .single()
            .unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::minutes(45));
        assert_eq!(clock.now(), start + Duration::minutes(45));
    }

    #[test]
    fn test_local_now_applies_offset() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 20, 2, 0, 0).unwrap());
        // UTC-3 is still the previous evening
        let local = clock.local_now(-180);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(local.time().format("%H:%M").to_string(), "23:00");
    }
}
