//! Wall-clock source for every time-sensitive operation.
//!
//! Each operation samples `now()` exactly once and uses that value for all of
//! its comparisons. Tests drive time through [`ManualClock`].

use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};

pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Real local time, optionally shifted so that the process starts at a mock instant
/// and advances from there at the normal rate.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: TimeDelta,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            offset: TimeDelta::zero(),
        }
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(mock_now: NaiveDateTime) -> Self {
        let real_now = Local::now().naive_local();
        let offset = mock_now.signed_duration_since(real_now);
        tracing::info!(
            "mock time enabled: {mock_now} (offset {}s)",
            offset.num_seconds()
        );
        Self { offset }
    }

    pub fn is_mocked(&self) -> bool {
        self.offset != TimeDelta::zero()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local() + self.offset
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_on_request() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(TimeDelta::minutes(16));
        assert_eq!(clock.now(), start + TimeDelta::minutes(16));
        assert_eq!(clock.today(), start.date());

        clock.set(start - TimeDelta::days(1));
        assert_eq!(clock.today(), start.date().pred_opt().unwrap());
    }

    #[test]
    fn system_clock_mock_offset() {
        let mock = NaiveDate::from_ymd_opt(2030, 6, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let clock = SystemClock::starting_at(mock);
        assert!(clock.is_mocked());
        let drift = clock.now().signed_duration_since(mock);
        assert!(drift >= TimeDelta::zero() && drift < TimeDelta::seconds(5));
        assert!(!SystemClock::new().is_mocked());
    }
}
