mod availability;
mod conflict;
mod error;
mod mutations;
mod outcome;
mod queries;
mod store;
mod transitions;

pub use availability::slot_board;
pub use error::EngineError;
pub use outcome::{Outcome, Refusal};
pub use store::BookingStore;
pub use transitions::{next_status, BookingEvent};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::catalog::SlotCatalog;
use crate::clock::Clock;
use crate::config::Policy;
use crate::model::*;
use crate::notify::NotifyHub;

/// The booking rule engine. Owns the store; every mutation goes through the
/// policy checks and the state machine here.
///
/// All mutations hold the store write lock for their full duration, so an
/// admission check and the insert it guards can never interleave with another
/// writer.
pub struct Engine {
    store: RwLock<BookingStore>,
    users: DashMap<UserId, User>,
    catalog: SlotCatalog,
    policy: Policy,
    clock: Arc<dyn Clock>,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(
        catalog: SlotCatalog,
        policy: Policy,
        clock: Arc<dyn Clock>,
        notify: Arc<NotifyHub>,
    ) -> Self {
        Self {
            store: RwLock::new(BookingStore::new()),
            users: DashMap::new(),
            catalog,
            policy,
            clock,
            notify,
        }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ── Users ────────────────────────────────────────────────

    pub fn register_user(&self, user: User) {
        info!("registered {:?} {} ({})", user.role, user.id, user.name);
        self.users.insert(user.id.clone(), user);
    }

    pub fn get_user(&self, id: &UserId) -> Option<User> {
        self.users.get(id).map(|e| e.value().clone())
    }

    pub(super) fn require_user(&self, id: &UserId) -> Result<User, EngineError> {
        self.get_user(id).ok_or_else(|| {
            warn!("unknown user {id}");
            EngineError::UserNotFound(id.clone())
        })
    }

    // ── Transition plumbing ──────────────────────────────────

    /// Run `event` through the state machine and swap in the resulting snapshot.
    /// Caller holds the write lock.
    pub(super) fn apply_event(
        &self,
        store: &mut BookingStore,
        id: BookingId,
        event: BookingEvent,
    ) -> Result<Outcome<Booking>, EngineError> {
        let current = store.get_booking(&id).ok_or_else(|| {
            warn!("{event} on unknown booking {id}");
            EngineError::BookingNotFound(id)
        })?;

        let Some(next) = next_status(current.status, event) else {
            return Ok(self.refuse(Refusal::IllegalTransition {
                status: current.status,
                event,
            }));
        };
        if next == current.status {
            return Ok(Outcome::Accepted(current.clone()));
        }

        let (previous, updated) = store
            .set_status(&id, next)
            .ok_or(EngineError::BookingNotFound(id))?;
        info!(
            "booking {id} ({} {} {}): {} -> {}",
            updated.resource_id, updated.date, updated.slot, previous.status, updated.status
        );
        metrics::counter!(
            crate::observability::STATUS_TRANSITIONS_TOTAL,
            "to" => crate::observability::status_label(updated.status)
        )
        .increment(1);
        self.notify.send(&Event::StatusChanged {
            id,
            resource_id: updated.resource_id.clone(),
            from: previous.status,
            to: updated.status,
        });
        Ok(Outcome::Accepted(updated))
    }

    /// Record and return a policy refusal.
    pub(super) fn refuse<T>(&self, refusal: Refusal) -> Outcome<T> {
        tracing::debug!("refused: {refusal}");
        metrics::counter!(
            crate::observability::BOOKING_REFUSALS_TOTAL,
            "reason" => crate::observability::refusal_label(&refusal)
        )
        .increment(1);
        Outcome::Refused(refusal)
    }
}
