use chrono::NaiveDate;

use crate::model::*;

use super::availability::slot_board;
use super::{Engine, EngineError};

impl Engine {
    pub async fn list_resources(&self, resource_type: Option<ResourceType>) -> Vec<Resource> {
        let store = self.store.read().await;
        store
            .resources()
            .iter()
            .filter(|r| resource_type.is_none_or(|t| r.resource_type == t))
            .cloned()
            .collect()
    }

    pub async fn get_resource(&self, id: &ResourceId) -> Option<Resource> {
        self.store.read().await.get_resource(id).cloned()
    }

    pub async fn get_booking(&self, id: &BookingId) -> Option<Booking> {
        self.store.read().await.get_booking(id).cloned()
    }

    /// Every booking in insertion order.
    pub async fn list_bookings(&self) -> Vec<Booking> {
        self.store.read().await.bookings().to_vec()
    }

    /// A user's bookings for one day in every status (history log), by slot start.
    pub async fn bookings_for_user_on(&self, user_id: &UserId, date: NaiveDate) -> Vec<Booking> {
        let store = self.store.read().await;
        let mut out: Vec<Booking> = store
            .bookings()
            .iter()
            .filter(|b| &b.user_id == user_id && b.date == date)
            .cloned()
            .collect();
        out.sort_by_key(|b| b.slot.start());
        out
    }

    /// Check-in and check-out requests awaiting staff on `date`.
    pub async fn pending_requests_on(&self, date: NaiveDate) -> Vec<Booking> {
        let store = self.store.read().await;
        store
            .bookings()
            .iter()
            .filter(|b| b.date == date && b.status.is_pending())
            .cloned()
            .collect()
    }

    /// Staff overview of a day: everything except cancellations, optionally
    /// narrowed to one resource type. Bookings whose resource is gone are skipped.
    pub async fn staff_bookings_on(
        &self,
        date: NaiveDate,
        resource_type: Option<ResourceType>,
    ) -> Vec<Booking> {
        let store = self.store.read().await;
        store
            .bookings()
            .iter()
            .filter(|b| b.date == date && b.status != BookingStatus::Cancelled)
            .filter(|b| {
                store
                    .get_resource(&b.resource_id)
                    .is_some_and(|r| resource_type.is_none_or(|t| r.resource_type == t))
            })
            .cloned()
            .collect()
    }

    /// Slot-by-slot state of one resource on `date` for `viewer`.
    pub async fn slot_board(
        &self,
        resource_id: &ResourceId,
        date: NaiveDate,
        viewer: &UserId,
    ) -> Result<Vec<SlotCell>, EngineError> {
        let store = self.store.read().await;
        if !store.contains_resource(resource_id) {
            return Err(EngineError::ResourceNotFound(resource_id.clone()));
        }
        let now = self.clock.now();
        Ok(slot_board(&store, &self.catalog, resource_id, date, viewer, now))
    }
}
