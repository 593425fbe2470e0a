use chrono::NaiveDate;
use pickup_core::{CollectionId, PaymentMethod, TimeSlot};

pub type NotifyError = Box<dyn std::error::Error + Send + Sync>;

/// Outbound resident notices. A failed send is logged by the caller and never
/// undoes the operation that triggered it.
pub trait CollectionNotifier {
    fn send_confirmation(
        &self,
        email: &str,
        id: CollectionId,
        date: NaiveDate,
        slot: TimeSlot,
        fee: i64,
        location: &str,
    ) -> Result<(), NotifyError>;

    fn send_payment_notice(
        &self,
        email: &str,
        id: CollectionId,
        fee: i64,
        method: Option<PaymentMethod>,
        success: bool,
    ) -> Result<(), NotifyError>;

    fn send_completion_notice(
        &self,
        email: &str,
        id: CollectionId,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> Result<(), NotifyError>;
}

pub struct NoopNotifier;

impl CollectionNotifier for NoopNotifier {
    fn send_confirmation(
        &self,
        _email: &str,
        _id: CollectionId,
        _date: NaiveDate,
        _slot: TimeSlot,
        _fee: i64,
        _location: &str,
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    fn send_payment_notice(
        &self,
        _email: &str,
        _id: CollectionId,
        _fee: i64,
        _method: Option<PaymentMethod>,
        _success: bool,
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    fn send_completion_notice(
        &self,
        _email: &str,
        _id: CollectionId,
        _date: NaiveDate,
        _slot: TimeSlot,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}
