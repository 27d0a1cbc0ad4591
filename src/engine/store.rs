use chrono::NaiveDate;

use crate::model::*;
use crate::timewindow::TimeSlot;

/// Authoritative collection of resources and bookings, in insertion order.
///
/// Bookings are never mutated in place: a status change replaces the stored
/// booking with a new snapshot that keeps every field except `status`.
#[derive(Debug, Default)]
pub struct BookingStore {
    resources: Vec<Resource>,
    bookings: Vec<Booking>,
}

impl BookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Resources ────────────────────────────────────────────

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn contains_resource(&self, id: &ResourceId) -> bool {
        self.resources.iter().any(|r| &r.id == id)
    }

    pub fn get_resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn insert_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    /// Remove a resource together with every booking that references it,
    /// history included. Returns the resource and the removed bookings.
    pub fn remove_resource(&mut self, id: &ResourceId) -> Option<(Resource, Vec<Booking>)> {
        let pos = self.resources.iter().position(|r| &r.id == id)?;
        let resource = self.resources.remove(pos);
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.bookings)
            .into_iter()
            .partition(|b| &b.resource_id == id);
        self.bookings = kept;
        Some((resource, removed))
    }

    // ── Bookings ─────────────────────────────────────────────

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    pub fn get_booking(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| &b.id == id)
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn insert_booking(&mut self, booking: Booking) {
        self.bookings.push(booking);
    }

    /// Swap in a new snapshot with `status`. Returns `(previous, current)`.
    pub fn set_status(
        &mut self,
        id: &BookingId,
        status: BookingStatus,
    ) -> Option<(Booking, Booking)> {
        let slot = self.bookings.iter_mut().find(|b| &b.id == id)?;
        let updated = slot.with_status(status);
        let previous = std::mem::replace(slot, updated.clone());
        Some((previous, updated))
    }

    // ── Predicates ───────────────────────────────────────────

    /// Some active booking (any user) holds this resource slot.
    pub fn is_slot_occupied(&self, resource_id: &ResourceId, date: NaiveDate, slot: &TimeSlot) -> bool {
        self.bookings.iter().any(|b| {
            &b.resource_id == resource_id
                && b.date == date
                && &b.slot == slot
                && b.status.is_active()
        })
    }

    /// The user already occupies some resource at this date and slot.
    pub fn has_concurrent_booking(&self, user_id: &UserId, date: NaiveDate, slot: &TimeSlot) -> bool {
        self.bookings.iter().any(|b| {
            &b.user_id == user_id && b.date == date && &b.slot == slot && b.status.is_occupying()
        })
    }

    pub fn count_active_for_user_on_date(&self, user_id: &UserId, date: NaiveDate) -> usize {
        self.bookings
            .iter()
            .filter(|b| &b.user_id == user_id && b.date == date && b.status.is_active())
            .count()
    }
}
