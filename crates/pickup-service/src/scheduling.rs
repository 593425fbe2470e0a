use crate::directory::ResidentDirectory;
use crate::error::{ConflictReason, PolicyReason, Result, ServiceError};
use crate::notify::{CollectionNotifier, NotifyError};
use chrono::NaiveDate;
use pickup_core::rules::{
    available_dates, meets_notice, open_slots, scheduled_instant, FeeSchedule, SchedulingPolicy,
    SlotOpening,
};
use pickup_core::time::today_in;
use pickup_core::{
    CollectionId, CollectionRecord, CollectionRequest, CollectionStatus, CoreError,
    PaymentMethod, PaymentStatus, QrToken, Resident, ResidentId, TimeSlot, WasteCategory,
};
use pickup_store::error::StoreError;
use pickup_store::repo::{CollectionMove, CollectionNew, CollectionsRepo};
use pickup_store::{Store, Transaction};
use tracing::{info, warn};

/// New date and slot for a booking. Category and quantity are only honoured
/// when the policy allows fee recalculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleRequest {
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub category: Option<WasteCategory>,
    pub quantity: Option<i64>,
}

impl RescheduleRequest {
    pub fn new(date: NaiveDate, time_slot: TimeSlot) -> Self {
        Self {
            date,
            time_slot,
            category: None,
            quantity: None,
        }
    }
}

/// Booking lifecycle over one store connection.
///
/// Every mutation runs inside a single `BEGIN IMMEDIATE` transaction: the
/// checks read current data under the write lock, the write follows, and the
/// resident is notified only after commit. Concurrent callers each need their
/// own `Store`.
pub struct SchedulingService<'a> {
    store: &'a Store,
    residents: &'a dyn ResidentDirectory,
    notifier: &'a dyn CollectionNotifier,
    policy: SchedulingPolicy,
    fees: FeeSchedule,
}

impl<'a> SchedulingService<'a> {
    pub fn new(
        store: &'a Store,
        residents: &'a dyn ResidentDirectory,
        notifier: &'a dyn CollectionNotifier,
        policy: SchedulingPolicy,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            store,
            residents,
            notifier,
            policy,
            fees,
        }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn list_available_dates(&self, now_utc: i64, horizon_days: u32) -> Result<Vec<NaiveDate>> {
        let today = today_in(now_utc, self.policy.utc_offset);
        Ok(available_dates(today, horizon_days)?)
    }

    pub fn list_available_slots(&self, date: NaiveDate) -> Result<Vec<SlotOpening>> {
        let occupancy = self.store.collections().slot_occupancy(date)?;
        Ok(open_slots(date, self.policy.capacity_per_slot, |slot| {
            occupancy.get(&slot).copied().unwrap_or(0)
        }))
    }

    pub fn schedule(
        &self,
        now_utc: i64,
        resident_id: ResidentId,
        request: CollectionRequest,
    ) -> Result<CollectionRecord> {
        let tx = self.store.write_transaction()?;
        let repo = CollectionsRepo::new(&tx);

        let resident = self.require_resident(resident_id)?;
        if !resident.active {
            return Err(PolicyReason::InactiveResident.into());
        }
        if resident.overdue_payments {
            return Err(PolicyReason::OverduePayments.into());
        }
        request.validate()?;

        let starts_at = scheduled_instant(request.date, request.time_slot, self.policy.utc_offset)?;
        if starts_at < now_utc {
            return Err(PolicyReason::DateInPast.into());
        }
        if repo.has_active_unpaid(resident_id, None)? {
            return Err(ConflictReason::DuplicateUnpaid.into());
        }

        let fee = self.fees.fee_for(request.category, request.quantity);
        let record = repo.create(
            now_utc,
            CollectionNew {
                resident_id,
                category: request.category,
                items_description: request.items_description,
                quantity: request.quantity,
                fee,
                date: request.date,
                time_slot: request.time_slot,
                location: request.location,
                coordinates: request.coordinates,
                instructions: request.instructions,
            },
            self.policy.capacity_per_slot,
        )?;
        commit(tx)?;

        info!(
            collection = %record.id,
            resident = %resident_id,
            date = %record.date,
            slot = %record.time_slot,
            fee = record.fee,
            "collection scheduled"
        );
        self.report(
            "confirmation",
            record.id,
            self.notifier.send_confirmation(
                &resident.email,
                record.id,
                record.date,
                record.time_slot,
                record.fee,
                &record.location,
            ),
        );
        Ok(record)
    }

    /// Moves a booking to a new date and slot. Status and payment status are
    /// left as they are.
    pub fn reschedule(
        &self,
        now_utc: i64,
        resident_id: ResidentId,
        id: CollectionId,
        request: RescheduleRequest,
    ) -> Result<CollectionRecord> {
        let tx = self.store.write_transaction()?;
        let repo = CollectionsRepo::new(&tx);

        let existing = owned_record(&repo, resident_id, id)?;
        if existing.is_collected() {
            return Err(ConflictReason::AlreadyCollected.into());
        }

        if let Some(quantity) = request.quantity {
            if quantity < 1 {
                return Err(CoreError::InvalidQuantity(quantity).into());
            }
        }
        let category = request.category.unwrap_or(existing.category);
        let quantity = request.quantity.unwrap_or(existing.quantity);
        let fee_inputs_changed = category != existing.category || quantity != existing.quantity;
        let fee = if !fee_inputs_changed {
            existing.fee
        } else if self.policy.allow_fee_recalc_on_reschedule {
            self.fees.fee_for(category, quantity)
        } else {
            return Err(PolicyReason::FeeFrozen.into());
        };

        let starts_at = scheduled_instant(request.date, request.time_slot, self.policy.utc_offset)?;
        if !meets_notice(now_utc, starts_at, self.policy.reschedule_notice_hours) {
            return Err(PolicyReason::RescheduleWindow {
                notice_hours: self.policy.reschedule_notice_hours,
            }
            .into());
        }

        let record = repo.move_to(
            now_utc,
            id,
            CollectionMove {
                date: request.date,
                time_slot: request.time_slot,
                category,
                quantity,
                fee,
            },
            self.policy.capacity_per_slot,
        )?;
        commit(tx)?;

        info!(
            collection = %id,
            resident = %resident_id,
            from_date = %existing.date,
            from_slot = %existing.time_slot,
            date = %record.date,
            slot = %record.time_slot,
            "collection rescheduled"
        );
        Ok(record)
    }

    /// Deletes a booking and returns its last state. Irreversible: the record
    /// cannot be read back afterwards.
    pub fn cancel(
        &self,
        now_utc: i64,
        resident_id: ResidentId,
        id: CollectionId,
    ) -> Result<CollectionRecord> {
        let tx = self.store.write_transaction()?;
        let repo = CollectionsRepo::new(&tx);

        let existing = owned_record(&repo, resident_id, id)?;
        if existing.is_collected() {
            return Err(ConflictReason::AlreadyCollected.into());
        }
        let starts_at = existing.scheduled_instant(self.policy.utc_offset)?;
        if !meets_notice(now_utc, starts_at, self.policy.cancel_notice_hours) {
            return Err(PolicyReason::CancelWindow {
                notice_hours: self.policy.cancel_notice_hours,
            }
            .into());
        }

        let snapshot = repo.delete(id)?;
        commit(tx)?;

        info!(
            collection = %id,
            resident = %resident_id,
            date = %snapshot.date,
            slot = %snapshot.time_slot,
            "collection cancelled"
        );
        Ok(snapshot)
    }

    /// Marks a booking paid. Without a method the recorded one is kept.
    pub fn mark_paid(
        &self,
        now_utc: i64,
        resident_id: ResidentId,
        id: CollectionId,
        method: Option<PaymentMethod>,
    ) -> Result<CollectionRecord> {
        self.change_payment(now_utc, resident_id, id, PaymentStatus::Paid, method)
    }

    pub fn mark_cash_pending(
        &self,
        now_utc: i64,
        resident_id: ResidentId,
        id: CollectionId,
    ) -> Result<CollectionRecord> {
        self.change_payment(
            now_utc,
            resident_id,
            id,
            PaymentStatus::Pending,
            Some(PaymentMethod::Cash),
        )
    }

    pub fn mark_unpaid(
        &self,
        now_utc: i64,
        resident_id: ResidentId,
        id: CollectionId,
    ) -> Result<CollectionRecord> {
        self.change_payment(now_utc, resident_id, id, PaymentStatus::Unpaid, None)
    }

    /// Completes the pickup identified by a scanned QR token.
    pub fn mark_collected(&self, now_utc: i64, token: &str) -> Result<CollectionRecord> {
        let (id, resident_id) = QrToken::decode(token)?;

        let tx = self.store.write_transaction()?;
        let repo = CollectionsRepo::new(&tx);

        let existing = owned_record(&repo, resident_id, id)?;
        if existing.is_collected() {
            return Err(ConflictReason::AlreadyCollected.into());
        }
        let record = repo.mark_collected(now_utc, id)?;
        commit(tx)?;

        info!(collection = %id, resident = %resident_id, "collection completed");
        if let Some(email) = self.contact_email(resident_id) {
            self.report(
                "completion",
                id,
                self.notifier
                    .send_completion_notice(&email, id, record.date, record.time_slot),
            );
        }
        Ok(record)
    }

    /// Ordered by date, then Morning before Afternoon, then creation time.
    pub fn list_for_user(&self, resident_id: ResidentId) -> Result<Vec<CollectionRecord>> {
        Ok(self.store.collections().list_for_resident(resident_id)?)
    }

    pub fn get_for_user(
        &self,
        resident_id: ResidentId,
        id: CollectionId,
    ) -> Result<CollectionRecord> {
        owned_record(&self.store.collections(), resident_id, id)
    }

    fn change_payment(
        &self,
        now_utc: i64,
        resident_id: ResidentId,
        id: CollectionId,
        status: PaymentStatus,
        method: Option<PaymentMethod>,
    ) -> Result<CollectionRecord> {
        let tx = self.store.write_transaction()?;
        let repo = CollectionsRepo::new(&tx);

        let existing = owned_record(&repo, resident_id, id)?;
        if status == PaymentStatus::Unpaid
            && existing.status == CollectionStatus::Scheduled
            && repo.has_active_unpaid(resident_id, Some(id))?
        {
            return Err(ConflictReason::DuplicateUnpaid.into());
        }
        let method = match status {
            PaymentStatus::Unpaid => None,
            _ => method.or(existing.payment_method),
        };
        let record = repo.set_payment(now_utc, id, status, method)?;
        commit(tx)?;

        info!(
            collection = %id,
            resident = %resident_id,
            from = %existing.payment_status,
            to = %record.payment_status,
            "payment status changed"
        );
        if let Some(email) = self.contact_email(resident_id) {
            let success = status != PaymentStatus::Unpaid;
            self.report(
                "payment",
                id,
                self.notifier
                    .send_payment_notice(&email, id, record.fee, record.payment_method, success),
            );
        }
        Ok(record)
    }

    fn require_resident(&self, id: ResidentId) -> Result<Resident> {
        self.residents
            .resident(id)
            .map_err(ServiceError::Directory)?
            .ok_or_else(|| ServiceError::NotFound(format!("resident {id}")))
    }

    fn contact_email(&self, id: ResidentId) -> Option<String> {
        match self.residents.resident(id) {
            Ok(Some(resident)) => Some(resident.email),
            Ok(None) => {
                warn!(resident = %id, "resident missing, notice skipped");
                None
            }
            Err(err) => {
                warn!(resident = %id, error = %err, "resident lookup failed, notice skipped");
                None
            }
        }
    }

    fn report(
        &self,
        notice: &'static str,
        id: CollectionId,
        outcome: std::result::Result<(), NotifyError>,
    ) {
        if let Err(err) = outcome {
            warn!(collection = %id, notice, error = %err, "notification failed");
        }
    }
}

fn owned_record(
    repo: &CollectionsRepo<'_>,
    resident_id: ResidentId,
    id: CollectionId,
) -> Result<CollectionRecord> {
    let record = repo
        .get(id)?
        .ok_or_else(|| ServiceError::NotFound(format!("collection {id}")))?;
    if !record.is_owned_by(resident_id) {
        return Err(ServiceError::Unauthorized(format!(
            "collection {id} belongs to another resident"
        )));
    }
    Ok(record)
}

fn commit(tx: Transaction<'_>) -> Result<()> {
    tx.commit().map_err(StoreError::from)?;
    Ok(())
}
