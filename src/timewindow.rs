//! Slot labels and the time windows derived from them.
//!
//! A slot label looks like `"9:00 AM - 10:00 AM"`. Labels are parsed once into a
//! [`TimeSlot`] when the catalog is loaded; everything downstream works on the
//! structured start/end times and keeps the label only for display.
//!
//! All instants are local wall-clock [`NaiveDateTime`]s. The grace period is the
//! single policy value behind both the check-in window and the lateness threshold.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("slot label {0:?} is missing the ' - ' separator")]
    MissingSeparator(String),
    #[error("invalid clock time {0:?} (expected H:MM AM|PM)")]
    InvalidTime(String),
    #[error("slot {0:?} does not end after it starts")]
    EndNotAfterStart(String),
}

/// A bookable daily interval, e.g. `9:00 AM - 10:00 AM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    label: String,
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Parse `"H:MM AM|PM - H:MM AM|PM"`. The end must be later in the same day,
    /// except that `12:00 AM` as an end means midnight at the close of the day
    /// (`"11:00 PM - 12:00 AM"`). Slots never span into the next day otherwise.
    pub fn parse(label: &str) -> Result<Self, ParseError> {
        let (start, end) = label
            .split_once(" - ")
            .ok_or_else(|| ParseError::MissingSeparator(label.to_string()))?;
        let start = parse_clock_time(start)?;
        let end = parse_clock_time(end)?;
        if !ends_after(start, end) {
            return Err(ParseError::EndNotAfterStart(label.to_string()));
        }
        Ok(Self {
            label: label.to_string(),
            start,
            end,
        })
    }

    /// Build a slot from times, rendering the label in catalog format.
    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Result<Self, ParseError> {
        let label = format!("{} - {}", format_clock_time(start), format_clock_time(end));
        if !ends_after(start, end) {
            return Err(ParseError::EndNotAfterStart(label));
        }
        Ok(Self { label, start, end })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for TimeSlot {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.label
    }
}

/// `"H:MM AM"` → 24h time. PM hours below 12 gain 12; 12 AM is midnight.
fn parse_clock_time(s: &str) -> Result<NaiveTime, ParseError> {
    let invalid = || ParseError::InvalidTime(s.to_string());
    let (time, meridiem) = s.trim().split_once(' ').ok_or_else(invalid)?;
    let (hours, minutes) = time.split_once(':').ok_or_else(invalid)?;
    if minutes.len() != 2 {
        return Err(invalid());
    }
    let hour: u32 = hours.parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) {
        return Err(invalid());
    }
    let hour = match meridiem {
        "AM" => hour % 12,
        "PM" => hour % 12 + 12,
        _ => return Err(invalid()),
    };
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Midnight as an end time closes the day.
fn ends_after(start: NaiveTime, end: NaiveTime) -> bool {
    let end_is_midnight = end.num_seconds_from_midnight() == 0;
    end > start || (end_is_midnight && start.num_seconds_from_midnight() != 0)
}

fn format_clock_time(t: NaiveTime) -> String {
    t.format("%-I:%M %p").to_string()
}

/// The instant a slot begins on the given day.
pub fn slot_start(date: NaiveDate, slot: &TimeSlot) -> NaiveDateTime {
    date.and_time(slot.start)
}

/// After this instant an unattended CONFIRMED booking is a no-show.
pub fn late_threshold(date: NaiveDate, slot: &TimeSlot, grace: TimeDelta) -> NaiveDateTime {
    slot_start(date, slot) + grace
}

/// Closed interval `[start - grace, start + grace]` during which check-in is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInWindow {
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    TooEarly,
    Open,
    Expired,
}

impl CheckInWindow {
    pub fn classify(&self, now: NaiveDateTime) -> WindowPosition {
        if now < self.earliest {
            WindowPosition::TooEarly
        } else if now > self.latest {
            WindowPosition::Expired
        } else {
            WindowPosition::Open
        }
    }
}

pub fn check_in_window(date: NaiveDate, slot: &TimeSlot, grace: TimeDelta) -> CheckInWindow {
    let start = slot_start(date, slot);
    CheckInWindow {
        earliest: start - grace,
        latest: late_threshold(date, slot, grace),
    }
}

/// Whether a slot can no longer be newly booked from a display point of view.
pub fn is_slot_past(date: NaiveDate, slot: &TimeSlot, now: NaiveDateTime) -> bool {
    let today = now.date();
    if date != today {
        return date < today;
    }
    now > slot_start(date, slot)
}
