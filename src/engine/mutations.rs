use chrono::NaiveDate;
use tracing::{info, warn};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::timewindow::{check_in_window, late_threshold, TimeSlot, WindowPosition};

use super::conflict::{check_admission, BookingRequest};
use super::{BookingEvent, Engine, EngineError, Outcome, Refusal};

impl Engine {
    // ── Resource catalog ─────────────────────────────────────

    /// Staff-created resource; an id is generated.
    pub async fn add_resource(&self, new: NewResource) -> Result<Resource, EngineError> {
        let resource = Resource {
            id: ResourceId::generate(),
            name: new.name,
            resource_type: new.resource_type,
            description: new.description,
        };
        self.insert_resource(resource.clone()).await?;
        Ok(resource)
    }

    /// Insert a resource with a caller-chosen id (seeding, fixtures).
    pub async fn insert_resource(&self, resource: Resource) -> Result<(), EngineError> {
        if resource.name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("resource name too long"));
        }
        if resource.description.len() > MAX_DESCRIPTION_LEN {
            return Err(EngineError::LimitExceeded("resource description too long"));
        }
        let mut store = self.store.write().await;
        if store.resource_count() >= MAX_RESOURCES {
            return Err(EngineError::LimitExceeded("too many resources"));
        }
        if store.contains_resource(&resource.id) {
            return Err(EngineError::ResourceExists(resource.id));
        }
        info!("added resource {} ({}, {})", resource.id, resource.name, resource.resource_type);
        let event = Event::ResourceAdded {
            id: resource.id.clone(),
        };
        store.insert_resource(resource);
        self.notify.send(&event);
        Ok(())
    }

    /// Delete a resource and every booking that references it, history included.
    /// Returns how many bookings were removed.
    pub async fn delete_resource(&self, id: &ResourceId) -> Result<usize, EngineError> {
        let mut store = self.store.write().await;
        let Some((resource, removed)) = store.remove_resource(id) else {
            warn!("delete of unknown resource {id}");
            return Err(EngineError::ResourceNotFound(id.clone()));
        };
        info!(
            "deleted resource {} ({}), removed {} bookings",
            resource.id,
            resource.name,
            removed.len()
        );
        metrics::counter!(crate::observability::RESOURCES_DELETED_TOTAL).increment(1);
        self.notify.send(&Event::ResourceDeleted {
            id: id.clone(),
            bookings_removed: removed.len(),
        });
        self.notify.remove(id);
        Ok(removed.len())
    }

    // ── Bookings ─────────────────────────────────────────────

    /// Admit a new booking or refuse it. Checks, in order: slot already held,
    /// user already booked at that time, student daily limit.
    pub async fn create_booking(
        &self,
        resource_id: &ResourceId,
        user_id: &UserId,
        date: NaiveDate,
        slot_label: &str,
    ) -> Result<Outcome<Booking>, EngineError> {
        let slot = self.resolve_slot(slot_label)?;
        let user = self.require_user(user_id)?;

        let mut store = self.store.write().await;
        if !store.contains_resource(resource_id) {
            warn!("booking against unknown resource {resource_id}");
            return Err(EngineError::ResourceNotFound(resource_id.clone()));
        }
        let now = self.clock.now();

        let req = BookingRequest {
            resource_id,
            user: &user,
            date,
            slot: &slot,
        };
        if let Err(refusal) = check_admission(&store, &req, &self.policy) {
            return Ok(self.refuse(refusal));
        }

        let booking = Booking {
            id: Ulid::new(),
            resource_id: resource_id.clone(),
            user_id: user_id.clone(),
            slot,
            date,
            status: BookingStatus::Confirmed,
            booked_at: Some(now),
        };
        store.insert_booking(booking.clone());
        info!(
            "booking {} created: {} {} {} for {}",
            booking.id, booking.resource_id, booking.date, booking.slot, booking.user_id
        );
        metrics::counter!(crate::observability::BOOKINGS_CREATED_TOTAL).increment(1);
        self.notify.send(&Event::BookingCreated {
            id: booking.id,
            resource_id: booking.resource_id.clone(),
            user_id: booking.user_id.clone(),
        });
        Ok(Outcome::Accepted(booking))
    }

    /// Cancel from any live status. Cancelling twice is accepted and changes nothing.
    pub async fn cancel_booking(&self, id: BookingId) -> Result<Outcome<Booking>, EngineError> {
        self.transition(id, BookingEvent::Cancel).await
    }

    /// Student asks to check in. Only on the booking's own date, within the
    /// grace window around slot start. Arriving after the window closes marks
    /// the booking NO_SHOW immediately and reports why.
    pub async fn request_check_in(&self, id: BookingId) -> Result<Outcome<Booking>, EngineError> {
        let mut store = self.store.write().await;
        let now = self.clock.now();
        let booking = store.get_booking(&id).cloned().ok_or_else(|| {
            warn!("check-in on unknown booking {id}");
            EngineError::BookingNotFound(id)
        })?;

        if booking.status != BookingStatus::Confirmed {
            return Ok(self.refuse(Refusal::IllegalTransition {
                status: booking.status,
                event: BookingEvent::RequestCheckIn,
            }));
        }
        if booking.date != now.date() {
            return Ok(self.refuse(Refusal::WrongDate {
                scheduled: booking.date,
            }));
        }

        let window = check_in_window(booking.date, &booking.slot, self.policy.grace_period);
        match window.classify(now) {
            WindowPosition::TooEarly => Ok(self.refuse(Refusal::TooEarly {
                opens_at: window.earliest,
            })),
            WindowPosition::Expired => {
                let marked = self.apply_event(&mut store, id, BookingEvent::MarkNoShow)?;
                if marked.is_accepted() {
                    metrics::counter!(crate::observability::NO_SHOWS_TOTAL, "source" => "check_in")
                        .increment(1);
                }
                Ok(self.refuse(Refusal::GracePeriodExpired {
                    grace: self.policy.grace_period,
                }))
            }
            WindowPosition::Open => self.apply_event(&mut store, id, BookingEvent::RequestCheckIn),
        }
    }

    /// Student asks to check out. No time gate.
    pub async fn request_check_out(&self, id: BookingId) -> Result<Outcome<Booking>, EngineError> {
        self.transition(id, BookingEvent::RequestCheckOut).await
    }

    pub async fn staff_confirm_check_in(
        &self,
        id: BookingId,
    ) -> Result<Outcome<Booking>, EngineError> {
        self.transition(id, BookingEvent::ConfirmCheckIn).await
    }

    pub async fn staff_confirm_check_out(
        &self,
        id: BookingId,
    ) -> Result<Outcome<Booking>, EngineError> {
        self.transition(id, BookingEvent::ConfirmCheckOut).await
    }

    /// Send a pending request back: PENDING_CHECK_IN → CONFIRMED,
    /// PENDING_CHECK_OUT → CHECKED_IN.
    pub async fn staff_decline(&self, id: BookingId) -> Result<Outcome<Booking>, EngineError> {
        self.transition(id, BookingEvent::Decline).await
    }

    /// Demote every CONFIRMED booking dated today or earlier whose late
    /// threshold has passed. PENDING_CHECK_IN is left alone: the student is
    /// waiting on staff. Returns the ids marked NO_SHOW.
    pub async fn sweep_late_bookings(&self) -> Vec<BookingId> {
        let mut store = self.store.write().await;
        let now = self.clock.now();
        let today = now.date();
        let grace = self.policy.grace_period;

        let late: Vec<BookingId> = store
            .bookings()
            .iter()
            .filter(|b| {
                b.status == BookingStatus::Confirmed
                    && b.date <= today
                    && now > late_threshold(b.date, &b.slot, grace)
            })
            .map(|b| b.id)
            .collect();

        let mut marked = Vec::with_capacity(late.len());
        for id in late {
            match self.apply_event(&mut store, id, BookingEvent::MarkNoShow) {
                Ok(Outcome::Accepted(_)) => {
                    info!("booking {id} marked NO_SHOW due to lateness");
                    metrics::counter!(crate::observability::NO_SHOWS_TOTAL, "source" => "sweeper")
                        .increment(1);
                    marked.push(id);
                }
                Ok(Outcome::Refused(r)) => tracing::debug!("sweep skip {id}: {r}"),
                Err(e) => warn!("sweep skip {id}: {e}"),
            }
        }
        marked
    }

    // ── Helpers ──────────────────────────────────────────────

    async fn transition(
        &self,
        id: BookingId,
        event: BookingEvent,
    ) -> Result<Outcome<Booking>, EngineError> {
        let mut store = self.store.write().await;
        self.apply_event(&mut store, id, event)
    }

    /// Catalog lookup. A well-formed label that is not offered is `UnknownSlot`;
    /// an unparseable one is `InvalidSlot`.
    fn resolve_slot(&self, label: &str) -> Result<TimeSlot, EngineError> {
        if let Some(slot) = self.catalog.get(label) {
            return Ok(slot.clone());
        }
        match TimeSlot::parse(label) {
            Ok(_) => {
                warn!("slot {label:?} is not in the catalog");
                Err(EngineError::UnknownSlot(label.to_string()))
            }
            Err(e) => {
                warn!("unparseable slot label: {e}");
                Err(EngineError::InvalidSlot(e))
            }
        }
    }
}
