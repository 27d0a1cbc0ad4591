use chrono::NaiveDate;

use crate::config::Policy;
use crate::model::*;
use crate::timewindow::TimeSlot;

use super::outcome::Refusal;
use super::store::BookingStore;

/// A booking request after ids and slot label have been resolved.
pub(crate) struct BookingRequest<'a> {
    pub resource_id: &'a ResourceId,
    pub user: &'a User,
    pub date: NaiveDate,
    pub slot: &'a TimeSlot,
}

/// Admission checks for a new booking, in order: slot free, user not already
/// somewhere else at that time, daily limit (students only).
///
/// Caller must hold the store write lock across this check and the insert.
pub(crate) fn check_admission(
    store: &BookingStore,
    req: &BookingRequest<'_>,
    policy: &Policy,
) -> Result<(), Refusal> {
    if store.is_slot_occupied(req.resource_id, req.date, req.slot) {
        return Err(Refusal::SlotTaken);
    }
    if store.has_concurrent_booking(&req.user.id, req.date, req.slot) {
        return Err(Refusal::AlreadyBookedThisSlot);
    }
    if req.user.role.has_daily_limit()
        && store.count_active_for_user_on_date(&req.user.id, req.date) >= policy.daily_limit
    {
        return Err(Refusal::DailyLimitReached {
            limit: policy.daily_limit,
        });
    }
    Ok(())
}
