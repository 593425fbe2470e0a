use chrono::NaiveDate;
use pickup_core::{CoreError, ResidentId, TimeSlot};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid id string: {0}")]
    InvalidId(String),
    #[error("invalid stored date: {0}")]
    InvalidDate(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("invalid data path: {0}")]
    InvalidDataPath(PathBuf),
    #[error("slot {slot} on {date} is fully booked")]
    SlotFull { date: NaiveDate, slot: TimeSlot },
    #[error("resident {0} already has an unpaid booking")]
    DuplicateUnpaid(ResidentId),
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    Core,
    MissingHomeDir,
    InvalidId,
    InvalidDate,
    NotFound,
    Migration,
    InvalidDataPath,
    SlotFull,
    DuplicateUnpaid,
    DuplicateEmail,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::InvalidId(_) => StoreErrorKind::InvalidId,
            StoreError::InvalidDate(_) => StoreErrorKind::InvalidDate,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
            StoreError::SlotFull { .. } => StoreErrorKind::SlotFull,
            StoreError::DuplicateUnpaid(_) => StoreErrorKind::DuplicateUnpaid,
            StoreError::DuplicateEmail(_) => StoreErrorKind::DuplicateEmail,
        }
    }
}

/// Name of the unique constraint a failed statement tripped, if any.
pub(crate) fn unique_violation(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(code, Some(message))
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            message.strip_prefix("UNIQUE constraint failed: ")
        }
        _ => None,
    }
}
