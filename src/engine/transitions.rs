use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::BookingStatus;

/// Everything that can happen to an existing booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingEvent {
    RequestCheckIn,
    ConfirmCheckIn,
    RequestCheckOut,
    ConfirmCheckOut,
    /// Staff rejects a pending check-in or check-out request.
    Decline,
    Cancel,
    /// System-only: the grace period lapsed without a check-in.
    MarkNoShow,
}

impl fmt::Display for BookingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingEvent::RequestCheckIn => "request check-in",
            BookingEvent::ConfirmCheckIn => "confirm check-in",
            BookingEvent::RequestCheckOut => "request check-out",
            BookingEvent::ConfirmCheckOut => "confirm check-out",
            BookingEvent::Decline => "decline request",
            BookingEvent::Cancel => "cancel",
            BookingEvent::MarkNoShow => "mark no-show",
        };
        f.write_str(s)
    }
}

/// The booking state machine. `None` means the event is illegal in `current`.
///
/// Cancelling an already-cancelled booking yields `Cancelled` again so repeated
/// cancels are harmless.
pub fn next_status(current: BookingStatus, event: BookingEvent) -> Option<BookingStatus> {
    use BookingEvent::*;
    use BookingStatus::*;

    match (current, event) {
        (Confirmed, RequestCheckIn) => Some(PendingCheckIn),
        (PendingCheckIn, ConfirmCheckIn) => Some(CheckedIn),
        (PendingCheckIn, Decline) => Some(Confirmed),
        (CheckedIn, RequestCheckOut) => Some(PendingCheckOut),
        (PendingCheckOut, ConfirmCheckOut) => Some(Completed),
        (PendingCheckOut, Decline) => Some(CheckedIn),
        (Confirmed, MarkNoShow) => Some(NoShow),
        (Cancelled, Cancel) => Some(Cancelled),
        (s, Cancel) if !s.is_terminal() => Some(Cancelled),
        _ => None,
    }
}
