use std::net::SocketAddr;

use crate::engine::Refusal;
use crate::model::BookingStatus;

/// Counter: bookings admitted.
pub const BOOKINGS_CREATED_TOTAL: &str = "libsched_bookings_created_total";

/// Counter: policy refusals. Labels: reason.
pub const BOOKING_REFUSALS_TOTAL: &str = "libsched_booking_refusals_total";

/// Counter: applied status transitions. Labels: to.
pub const STATUS_TRANSITIONS_TOTAL: &str = "libsched_status_transitions_total";

/// Counter: bookings moved to NO_SHOW. Labels: source (sweeper, check_in).
pub const NO_SHOWS_TOTAL: &str = "libsched_no_shows_total";

/// Histogram: lateness sweep duration in seconds.
pub const SWEEP_DURATION_SECONDS: &str = "libsched_sweep_duration_seconds";

/// Counter: resources deleted (bookings cascade with them).
pub const RESOURCES_DELETED_TOTAL: &str = "libsched_resources_deleted_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Short metric label for a refusal.
pub fn refusal_label(refusal: &Refusal) -> &'static str {
    match refusal {
        Refusal::SlotTaken => "slot_taken",
        Refusal::AlreadyBookedThisSlot => "already_booked_this_slot",
        Refusal::DailyLimitReached { .. } => "daily_limit_reached",
        Refusal::WrongDate { .. } => "wrong_date",
        Refusal::TooEarly { .. } => "too_early",
        Refusal::GracePeriodExpired { .. } => "grace_period_expired",
        Refusal::IllegalTransition { .. } => "illegal_transition",
    }
}

pub fn status_label(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "confirmed",
        BookingStatus::PendingCheckIn => "pending_check_in",
        BookingStatus::CheckedIn => "checked_in",
        BookingStatus::PendingCheckOut => "pending_check_out",
        BookingStatus::Completed => "completed",
        BookingStatus::Cancelled => "cancelled",
        BookingStatus::NoShow => "no_show",
    }
}
