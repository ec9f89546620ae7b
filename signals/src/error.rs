use thiserror::Error;

/// Returned when a slot is invoked after one of its tracked objects has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("slot has expired: a tracked object is no longer alive")]
pub struct ExpiredSlot;
