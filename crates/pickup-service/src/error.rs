use crate::directory::DirectoryError;
use chrono::NaiveDate;
use pickup_core::{CoreError, TimeSlot};
use pickup_store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("slot {slot} on {date} is fully booked")]
    SlotFull { date: NaiveDate, slot: TimeSlot },
    #[error("resident already has an unpaid booking")]
    DuplicateUnpaid,
    #[error("malformed QR token")]
    MalformedToken,
    #[error("collection already completed")]
    AlreadyCollected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyReason {
    #[error("resident account is inactive")]
    InactiveResident,
    #[error("resident has overdue payments")]
    OverduePayments,
    #[error("reschedule needs at least {notice_hours}h notice")]
    RescheduleWindow { notice_hours: u32 },
    #[error("cancellation needs at least {notice_hours}h notice")]
    CancelWindow { notice_hours: u32 },
    #[error("requested slot has already started")]
    DateInPast,
    #[error("fee is frozen; only date and slot can change")]
    FeeFrozen,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("conflict: {0}")]
    Conflict(ConflictReason),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("policy violation: {0}")]
    PolicyViolation(PolicyReason),
    #[error("resident directory error: {0}")]
    Directory(#[source] DirectoryError),
    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    NotFound,
    Unauthorized,
    Conflict,
    InvalidArgument,
    PolicyViolation,
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            ServiceError::NotFound(_) => ServiceErrorKind::NotFound,
            ServiceError::Unauthorized(_) => ServiceErrorKind::Unauthorized,
            ServiceError::Conflict(_) => ServiceErrorKind::Conflict,
            ServiceError::InvalidArgument(_) => ServiceErrorKind::InvalidArgument,
            ServiceError::PolicyViolation(_) => ServiceErrorKind::PolicyViolation,
            ServiceError::Directory(_) | ServiceError::Store(_) => ServiceErrorKind::Internal,
        }
    }

    pub fn conflict_reason(&self) -> Option<&ConflictReason> {
        match self {
            ServiceError::Conflict(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn policy_reason(&self) -> Option<&PolicyReason> {
        match self {
            ServiceError::PolicyViolation(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<ConflictReason> for ServiceError {
    fn from(reason: ConflictReason) -> Self {
        ServiceError::Conflict(reason)
    }
}

impl From<PolicyReason> for ServiceError {
    fn from(reason: PolicyReason) -> Self {
        ServiceError::PolicyViolation(reason)
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedQrToken => ServiceError::Conflict(ConflictReason::MalformedToken),
            other => ServiceError::InvalidArgument(other.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ServiceError::NotFound(what),
            StoreError::SlotFull { date, slot } => {
                ServiceError::Conflict(ConflictReason::SlotFull { date, slot })
            }
            StoreError::DuplicateUnpaid(_) => {
                ServiceError::Conflict(ConflictReason::DuplicateUnpaid)
            }
            StoreError::Core(core) => core.into(),
            StoreError::DuplicateEmail(email) => {
                ServiceError::InvalidArgument(format!("duplicate email: {email}"))
            }
            other => ServiceError::Store(other),
        }
    }
}
