use chrono::{NaiveDate, NaiveDateTime};

use crate::catalog::SlotCatalog;
use crate::model::*;
use crate::timewindow::{is_slot_past, TimeSlot};

use super::store::BookingStore;

/// State of every catalog slot on one resource for one day, as seen by `viewer`.
/// Precedence: `Mine`, then `Occupied`, then `Past`, else `Available`.
pub fn slot_board(
    store: &BookingStore,
    catalog: &SlotCatalog,
    resource_id: &ResourceId,
    date: NaiveDate,
    viewer: &UserId,
    now: NaiveDateTime,
) -> Vec<SlotCell> {
    catalog
        .iter()
        .map(|slot| SlotCell {
            slot: slot.clone(),
            state: slot_state(store, resource_id, date, slot, viewer, now),
        })
        .collect()
}

fn slot_state(
    store: &BookingStore,
    resource_id: &ResourceId,
    date: NaiveDate,
    slot: &TimeSlot,
    viewer: &UserId,
    now: NaiveDateTime,
) -> SlotState {
    let mut occupied = false;
    for b in store.bookings() {
        if &b.resource_id == resource_id && b.date == date && &b.slot == slot && b.status.is_active() {
            if &b.user_id == viewer {
                return SlotState::Mine;
            }
            occupied = true;
        }
    }
    if occupied {
        SlotState::Occupied
    } else if is_slot_past(date, slot, now) {
        SlotState::Past
    } else {
        SlotState::Available
    }
}
