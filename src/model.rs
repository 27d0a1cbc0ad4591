use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::timewindow::TimeSlot;

pub type BookingId = Ulid;

/// Resource identity, e.g. `comp-1` or `room-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a staff-created resource.
    pub fn generate() -> Self {
        Self(format!("resource-{}", Ulid::new().to_string().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ── Resources ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "Computer Station")]
    Computer,
    #[serde(rename = "Collaboration Room")]
    CollabRoom,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Computer => f.write_str("Computer Station"),
            ResourceType::CollabRoom => f.write_str("Collaboration Room"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub description: String,
}

/// A resource as submitted by staff, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub description: String,
}

// ── Users ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Student,
    Staff,
}

impl UserRole {
    /// Staff may hold any number of bookings per day.
    pub fn has_daily_limit(self) -> bool {
        matches!(self, UserRole::Student)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: UserRole,
    pub department: Option<String>,
}

// ── Bookings ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    /// Student asked to check in; waiting for staff.
    #[serde(rename = "Pending Check-In")]
    PendingCheckIn,
    #[serde(rename = "Checked In")]
    CheckedIn,
    /// Student asked to check out; waiting for staff.
    #[serde(rename = "Pending Check-Out")]
    PendingCheckOut,
    Completed,
    /// By user.
    Cancelled,
    /// Set by the system when the grace period lapses.
    #[serde(rename = "No Show")]
    NoShow,
}

impl BookingStatus {
    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::PendingCheckIn => "Pending Check-In",
            BookingStatus::CheckedIn => "Checked In",
            BookingStatus::PendingCheckOut => "Pending Check-Out",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::NoShow => "No Show",
        }
    }

    /// Counts against slot occupancy and the daily limit.
    pub fn is_active(self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::NoShow)
    }

    /// The holder is (or is about to be) physically using the resource.
    pub fn is_occupying(self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed
                | BookingStatus::CheckedIn
                | BookingStatus::PendingCheckIn
                | BookingStatus::PendingCheckOut
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }

    pub fn is_pending(self) -> bool {
        matches!(
            self,
            BookingStatus::PendingCheckIn | BookingStatus::PendingCheckOut
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub resource_id: ResourceId,
    pub user_id: UserId,
    #[serde(rename = "timeSlot")]
    pub slot: TimeSlot,
    pub date: NaiveDate,
    pub status: BookingStatus,
    pub booked_at: Option<NaiveDateTime>,
}

impl Booking {
    /// New snapshot with only the status changed.
    pub fn with_status(&self, status: BookingStatus) -> Booking {
        Booking {
            status,
            ..self.clone()
        }
    }
}

// ── Change notifications ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ResourceAdded {
        id: ResourceId,
    },
    ResourceDeleted {
        id: ResourceId,
        bookings_removed: usize,
    },
    BookingCreated {
        id: BookingId,
        resource_id: ResourceId,
        user_id: UserId,
    },
    StatusChanged {
        id: BookingId,
        resource_id: ResourceId,
        from: BookingStatus,
        to: BookingStatus,
    },
}

impl Event {
    pub fn resource_id(&self) -> &ResourceId {
        match self {
            Event::ResourceAdded { id } | Event::ResourceDeleted { id, .. } => id,
            Event::BookingCreated { resource_id, .. }
            | Event::StatusChanged { resource_id, .. } => resource_id,
        }
    }
}

// ── Query result types ──────────────────────────────────────────

/// How one catalog slot on one resource looks to a given viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    Available,
    /// The viewer holds an active booking here.
    Mine,
    /// Someone else holds an active booking here.
    Occupied,
    /// Unbooked, but its start time has passed.
    Past,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCell {
    pub slot: TimeSlot,
    pub state: SlotState,
}
