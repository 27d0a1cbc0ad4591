use thiserror::Error;

use crate::model::{BookingId, ResourceId, UserId};
use crate::timewindow::ParseError;

/// Defects: the caller referenced something that does not exist or handed in
/// malformed data. State is left unchanged. Policy refusals are not errors; see
/// [`super::Refusal`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    #[error("resource already exists: {0}")]
    ResourceExists(ResourceId),
    #[error("time slot not in catalog: {0:?}")]
    UnknownSlot(String),
    #[error("invalid time slot: {0}")]
    InvalidSlot(#[from] ParseError),
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),
}
