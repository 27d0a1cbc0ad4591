//! Static configuration the engine treats as given: the daily slot catalog and
//! the demo resources/users a fresh process starts with.

use chrono::NaiveTime;

use crate::limits::{CATALOG_FIRST_HOUR, CATALOG_LAST_HOUR};
use crate::model::*;
use crate::timewindow::{ParseError, TimeSlot};

/// Ordered list of bookable slots, parsed once at load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCatalog {
    slots: Vec<TimeSlot>,
}

impl SlotCatalog {
    /// One-hour slots from `first_hour` up to `last_hour` (24h clock).
    pub fn hourly(first_hour: u32, last_hour: u32) -> Self {
        let slots = (first_hour..last_hour)
            .filter_map(|h| {
                let start = NaiveTime::from_hms_opt(h, 0, 0)?;
                let end = NaiveTime::from_hms_opt(h + 1, 0, 0)?;
                TimeSlot::from_times(start, end).ok()
            })
            .collect();
        Self { slots }
    }

    /// Eight one-hour slots, 9 AM to 5 PM.
    pub fn standard() -> Self {
        Self::hourly(CATALOG_FIRST_HOUR, CATALOG_LAST_HOUR)
    }

    pub fn from_labels<I, S>(labels: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let slots = labels
            .into_iter()
            .map(|l| TimeSlot::parse(l.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { slots })
    }

    pub fn get(&self, label: &str) -> Option<&TimeSlot> {
        self.slots.iter().find(|s| s.label() == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn demo_resources() -> Vec<Resource> {
    let computers = (1..=6).map(|n| Resource {
        id: ResourceId::new(format!("comp-{n}")),
        name: format!("Computer {n} (Solo)"),
        resource_type: ResourceType::Computer,
        description: "High-performance PC".to_string(),
    });
    let room_sizes = [
        "4 persons",
        "6 persons",
        "6 persons",
        "6-8 persons",
        "6-8 persons",
        "6-12 persons",
    ];
    let rooms = room_sizes.iter().enumerate().map(|(i, size)| Resource {
        id: ResourceId::new(format!("room-{}", i + 1)),
        name: format!("Collaborative Room {}", i + 1),
        resource_type: ResourceType::CollabRoom,
        description: size.to_string(),
    });
    computers.chain(rooms).collect()
}

pub fn demo_users() -> Vec<User> {
    vec![
        User {
            id: UserId::new("student-123"),
            name: "Arvin S. Jimenez".to_string(),
            role: UserRole::Student,
            department: Some("Student".to_string()),
        },
        User {
            id: UserId::new("staff-456"),
            name: "Dizon, Evelyn R.".to_string(),
            role: UserRole::Staff,
            department: Some("Librarian".to_string()),
        },
    ]
}
