use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::model::BookingStatus;

use super::transitions::BookingEvent;

/// Expected, user-facing reasons an operation did not go through.
/// `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("This time slot is already booked.")]
    SlotTaken,
    #[error(
        "You already have a booking for this time slot. You can only occupy one resource at a time."
    )]
    AlreadyBookedThisSlot,
    #[error("You have reached the maximum of {limit} bookings for today.")]
    DailyLimitReached { limit: usize },
    #[error("You can only check-in on the scheduled date of your booking ({scheduled}).")]
    WrongDate { scheduled: NaiveDate },
    #[error(
        "It is too early to check in. Check-in becomes available at {}.",
        .opens_at.format("%-I:%M %p")
    )]
    TooEarly { opens_at: NaiveDateTime },
    /// The booking has already been moved to NO_SHOW when this is returned.
    #[error(
        "You are too late. The {} grace period for check-in has expired. Your booking is marked as No Show.",
        grace_length(.grace)
    )]
    GracePeriodExpired { grace: TimeDelta },
    #[error("Cannot {event}: booking is {status}.")]
    IllegalTransition {
        status: BookingStatus,
        event: BookingEvent,
    },
}

/// "15-minute", or "30-second" when the grace is not a whole number of minutes.
fn grace_length(grace: &TimeDelta) -> String {
    let secs = grace.num_seconds();
    if secs >= 60 && secs % 60 == 0 {
        format!("{}-minute", secs / 60)
    } else {
        format!("{secs}-second")
    }
}

/// Result of a policy-checked operation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Accepted(T),
    Refused(Refusal),
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            Outcome::Accepted(_) => None,
            Outcome::Refused(r) => Some(r),
        }
    }

    /// Human-readable reason for UI display, if refused.
    pub fn reason(&self) -> Option<String> {
        self.refusal().map(ToString::to_string)
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Outcome::Accepted(v) => Some(v),
            Outcome::Refused(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, Refusal> {
        match self {
            Outcome::Accepted(v) => Ok(v),
            Outcome::Refused(r) => Err(r),
        }
    }
}
