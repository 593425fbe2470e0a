use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid waste category: {0}")]
    InvalidCategory(String),
    #[error("invalid time slot: {0} (expected Morning or Afternoon)")]
    InvalidTimeSlot(String),
    #[error("invalid payment status: {0}")]
    InvalidPaymentStatus(String),
    #[error("invalid payment method: {0} (expected card, bank or cash)")]
    InvalidPaymentMethod(String),
    #[error("invalid collection status: {0}")]
    InvalidCollectionStatus(String),
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
    #[error("invalid booking horizon: {0} days")]
    InvalidHorizon(u32),
    #[error("invalid slot capacity: {0}")]
    InvalidCapacity(u32),
    #[error("invalid fee rate: {0}")]
    InvalidRate(i64),
    #[error("malformed qr token")]
    MalformedQrToken,
    #[error("display name is required")]
    EmptyDisplayName,
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("invalid timestamp")]
    InvalidTimestamp,
}
