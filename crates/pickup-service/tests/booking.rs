use chrono::{FixedOffset, NaiveDate};
use pickup_core::rules::{FeeSchedule, SchedulingPolicy};
use pickup_core::{
    CollectionId, CollectionRequest, CollectionStatus, PaymentMethod, PaymentStatus, QrToken,
    ResidentId, TimeSlot, WasteCategory,
};
use pickup_service::{
    CollectionNotifier, ConflictReason, NoopNotifier, NotifyError, PolicyReason,
    SchedulingService, ServiceErrorKind,
};
use pickup_store::repo::{ResidentNew, ResidentUpdate};
use pickup_store::Store;
use std::cell::RefCell;

// 2030-01-01 00:00:00 UTC
const NOW: i64 = 1_893_456_000;

#[derive(Default)]
struct RecordingNotifier {
    sent: RefCell<Vec<String>>,
}

impl CollectionNotifier for RecordingNotifier {
    fn send_confirmation(
        &self,
        email: &str,
        _id: CollectionId,
        date: NaiveDate,
        slot: TimeSlot,
        fee: i64,
        _location: &str,
    ) -> Result<(), NotifyError> {
        self.sent
            .borrow_mut()
            .push(format!("confirmation {email} {date} {slot} {fee}"));
        Ok(())
    }

    fn send_payment_notice(
        &self,
        email: &str,
        _id: CollectionId,
        fee: i64,
        _method: Option<PaymentMethod>,
        success: bool,
    ) -> Result<(), NotifyError> {
        self.sent
            .borrow_mut()
            .push(format!("payment {email} {fee} {success}"));
        Ok(())
    }

    fn send_completion_notice(
        &self,
        email: &str,
        _id: CollectionId,
        _date: NaiveDate,
        _slot: TimeSlot,
    ) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push(format!("completion {email}"));
        Ok(())
    }
}

struct FailingNotifier;

impl CollectionNotifier for FailingNotifier {
    fn send_confirmation(
        &self,
        _email: &str,
        _id: CollectionId,
        _date: NaiveDate,
        _slot: TimeSlot,
        _fee: i64,
        _location: &str,
    ) -> Result<(), NotifyError> {
        Err("smtp unreachable".into())
    }

    fn send_payment_notice(
        &self,
        _email: &str,
        _id: CollectionId,
        _fee: i64,
        _method: Option<PaymentMethod>,
        _success: bool,
    ) -> Result<(), NotifyError> {
        Err("smtp unreachable".into())
    }

    fn send_completion_notice(
        &self,
        _email: &str,
        _id: CollectionId,
        _date: NaiveDate,
        _slot: TimeSlot,
    ) -> Result<(), NotifyError> {
        Err("smtp unreachable".into())
    }
}

fn setup() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn policy() -> SchedulingPolicy {
    SchedulingPolicy {
        utc_offset: FixedOffset::east_opt(0).unwrap(),
        ..SchedulingPolicy::default()
    }
}

fn build_service<'a>(
    store: &'a Store,
    notifier: &'a dyn CollectionNotifier,
) -> SchedulingService<'a> {
    SchedulingService::new(store, store, notifier, policy(), FeeSchedule::default())
}

fn add_resident(store: &Store, email: &str) -> ResidentId {
    store
        .residents()
        .create(
            NOW,
            ResidentNew {
                display_name: "Resident".to_string(),
                email: email.to_string(),
                active: true,
                overdue_payments: false,
            },
        )
        .expect("create resident")
        .id
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, d).unwrap()
}

fn request(
    category: WasteCategory,
    quantity: i64,
    date: NaiveDate,
    slot: TimeSlot,
) -> CollectionRequest {
    CollectionRequest {
        category,
        items_description: "old sofa".to_string(),
        quantity,
        date,
        time_slot: slot,
        location: "42 Galle Road".to_string(),
        coordinates: None,
        instructions: None,
    }
}

#[test]
fn schedule_prices_booking_and_sends_confirmation() {
    let store = setup();
    let notifier = RecordingNotifier::default();
    let service = build_service(&store, &notifier);
    let resident = add_resident(&store, "kamal@example.lk");

    let record = service
        .schedule(NOW, resident, request(WasteCategory::Bulky, 3, day(15), TimeSlot::Morning))
        .expect("schedule");

    assert_eq!(record.fee, 360);
    assert_eq!(record.status, CollectionStatus::Scheduled);
    assert_eq!(record.payment_status, PaymentStatus::Unpaid);
    assert_eq!(record.payment_method, None);
    assert_eq!(
        QrToken::decode(record.qr_token.as_str()).expect("decode"),
        (record.id, resident)
    );
    assert_eq!(
        notifier.sent.borrow().as_slice(),
        ["confirmation kamal@example.lk 2030-01-15 Morning 360".to_string()]
    );

    let fetched = service.get_for_user(resident, record.id).expect("get");
    assert_eq!(fetched, record);
}

#[test]
fn schedule_uses_configured_rates() {
    let store = setup();
    let fees = FeeSchedule::default()
        .with_rate(WasteCategory::Organic, 95)
        .expect("rate");
    let service = SchedulingService::new(&store, &store, &NoopNotifier, policy(), fees);
    let resident = add_resident(&store, "a@example.lk");

    let record = service
        .schedule(NOW, resident, request(WasteCategory::Organic, 2, day(15), TimeSlot::Afternoon))
        .expect("schedule");
    assert_eq!(record.fee, 190);
}

#[test]
fn tenth_booking_fits_and_eleventh_conflicts() {
    let store = setup();
    let service = build_service(&store, &NoopNotifier);

    for index in 0..10 {
        let resident = add_resident(&store, &format!("r{index}@example.lk"));
        service
            .schedule(NOW, resident, request(WasteCategory::Other, 1, day(15), TimeSlot::Morning))
            .unwrap_or_else(|err| panic!("booking {} failed: {err}", index + 1));
    }

    let eleventh = add_resident(&store, "eleventh@example.lk");
    let err = service
        .schedule(NOW, eleventh, request(WasteCategory::Other, 1, day(15), TimeSlot::Morning))
        .expect_err("slot full");
    assert_eq!(err.kind(), ServiceErrorKind::Conflict);
    assert_eq!(
        err.conflict_reason(),
        Some(&ConflictReason::SlotFull {
            date: day(15),
            slot: TimeSlot::Morning
        })
    );
    assert!(service.list_for_user(eleventh).expect("list").is_empty());

    let open = service.list_available_slots(day(15)).expect("slots");
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].slot, TimeSlot::Afternoon);
    assert_eq!(open[0].remaining, 10);

    service
        .schedule(NOW, eleventh, request(WasteCategory::Other, 1, day(15), TimeSlot::Afternoon))
        .expect("afternoon still open");
}

#[test]
fn lowered_capacity_agrees_with_listed_slots() {
    let store = setup();
    let service = build_service(&store, &NoopNotifier);

    let mut booked = Vec::new();
    for index in 0..10 {
        let resident = add_resident(&store, &format!("r{index}@example.lk"));
        let record = service
            .schedule(NOW, resident, request(WasteCategory::Other, 1, day(15), TimeSlot::Morning))
            .expect("schedule");
        booked.push((resident, record.id));
    }
    for (resident, id) in &booked[..5] {
        service.cancel(NOW, *resident, *id).expect("cancel");
    }

    let smaller = SchedulingPolicy {
        capacity_per_slot: 5,
        ..policy()
    };
    let service =
        SchedulingService::new(&store, &store, &NoopNotifier, smaller, FeeSchedule::default());
    let open = service.list_available_slots(day(15)).expect("slots");
    assert!(open.iter().all(|opening| opening.slot != TimeSlot::Morning));

    let late = add_resident(&store, "late@example.lk");
    let err = service
        .schedule(NOW, late, request(WasteCategory::Other, 1, day(15), TimeSlot::Morning))
        .expect_err("five bookings already occupy the slot");
    assert_eq!(
        err.conflict_reason(),
        Some(&ConflictReason::SlotFull {
            date: day(15),
            slot: TimeSlot::Morning
        })
    );
    assert_eq!(
        store
            .collections()
            .count_for_slot(day(15), TimeSlot::Morning)
            .expect("count"),
        5
    );
}

#[test]
fn second_unpaid_booking_conflicts_until_paid() {
    let store = setup();
    let service = build_service(&store, &NoopNotifier);
    let resident = add_resident(&store, "a@example.lk");

    let first = service
        .schedule(NOW, resident, request(WasteCategory::Hazardous, 1, day(15), TimeSlot::Morning))
        .expect("first");
    let err = service
        .schedule(NOW, resident, request(WasteCategory::Hazardous, 1, day(16), TimeSlot::Morning))
        .expect_err("duplicate unpaid");
    assert_eq!(err.conflict_reason(), Some(&ConflictReason::DuplicateUnpaid));

    service
        .mark_paid(NOW, resident, first.id, Some(PaymentMethod::Card))
        .expect("pay");
    service
        .schedule(NOW, resident, request(WasteCategory::Hazardous, 1, day(16), TimeSlot::Morning))
        .expect("second after paying");
}

#[test]
fn schedule_checks_resident_standing() {
    let store = setup();
    let service = build_service(&store, &NoopNotifier);

    let inactive = add_resident(&store, "inactive@example.lk");
    store
        .residents()
        .update(
            NOW,
            inactive,
            ResidentUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .expect("deactivate");
    let err = service
        .schedule(NOW, inactive, request(WasteCategory::Bulky, 1, day(15), TimeSlot::Morning))
        .expect_err("inactive");
    assert_eq!(err.policy_reason(), Some(&PolicyReason::InactiveResident));

    let overdue = add_resident(&store, "overdue@example.lk");
    store
        .residents()
        .update(
            NOW,
            overdue,
            ResidentUpdate {
                overdue_payments: Some(true),
                ..Default::default()
            },
        )
        .expect("flag overdue");
    let err = service
        .schedule(NOW, overdue, request(WasteCategory::Bulky, 1, day(15), TimeSlot::Morning))
        .expect_err("overdue");
    assert_eq!(err.policy_reason(), Some(&PolicyReason::OverduePayments));

    let err = service
        .schedule(
            NOW,
            ResidentId::new(),
            request(WasteCategory::Bulky, 1, day(15), TimeSlot::Morning),
        )
        .expect_err("unknown resident");
    assert_eq!(err.kind(), ServiceErrorKind::NotFound);

    assert_eq!(
        store
            .collections()
            .count_for_slot(day(15), TimeSlot::Morning)
            .expect("count"),
        0
    );
}

#[test]
fn schedule_rejects_bad_quantity_and_past_dates() {
    let store = setup();
    let service = build_service(&store, &NoopNotifier);
    let resident = add_resident(&store, "a@example.lk");

    let err = service
        .schedule(NOW, resident, request(WasteCategory::Bulky, 0, day(15), TimeSlot::Morning))
        .expect_err("zero quantity");
    assert_eq!(err.kind(), ServiceErrorKind::InvalidArgument);

    let yesterday = NaiveDate::from_ymd_opt(2029, 12, 31).unwrap();
    let err = service
        .schedule(NOW, resident, request(WasteCategory::Bulky, 1, yesterday, TimeSlot::Afternoon))
        .expect_err("past");
    assert_eq!(err.policy_reason(), Some(&PolicyReason::DateInPast));
}

#[test]
fn horizon_limits_listing_not_booking() {
    let store = setup();
    let service = build_service(&store, &NoopNotifier);
    let resident = add_resident(&store, "a@example.lk");

    let listed = service.list_available_dates(NOW, 14).expect("dates");
    assert!(!listed.contains(&day(30)));

    let record = service
        .schedule(NOW, resident, request(WasteCategory::Bulky, 1, day(30), TimeSlot::Morning))
        .expect("dates past the horizon can still be booked");
    assert_eq!(record.date, day(30));
}

#[test]
fn notifier_failure_keeps_the_booking() {
    let store = setup();
    let service = build_service(&store, &FailingNotifier);
    let resident = add_resident(&store, "a@example.lk");

    let record = service
        .schedule(NOW, resident, request(WasteCategory::EWaste, 2, day(15), TimeSlot::Morning))
        .expect("schedule despite notifier");
    assert_eq!(record.fee, 260);

    let paid = service
        .mark_paid(NOW + 60, resident, record.id, Some(PaymentMethod::Bank))
        .expect("pay despite notifier");
    assert_eq!(paid.payment_status, PaymentStatus::Paid);

    let collected = service
        .mark_collected(NOW + 120, record.qr_token.as_str())
        .expect("collect despite notifier");
    assert_eq!(collected.status, CollectionStatus::Collected);
}

#[test]
fn available_dates_start_today_in_the_configured_offset() {
    let store = setup();
    let service = build_service(&store, &NoopNotifier);

    let dates = service.list_available_dates(NOW, 14).expect("dates");
    assert_eq!(dates.len(), 14);
    assert_eq!(dates[0], NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
    assert_eq!(dates[13], day(14));

    let err = service.list_available_dates(NOW, 0).expect_err("zero horizon");
    assert_eq!(err.kind(), ServiceErrorKind::InvalidArgument);
}

#[test]
fn list_for_user_orders_by_date_and_slot() {
    let store = setup();
    let service = build_service(&store, &NoopNotifier);
    let resident = add_resident(&store, "a@example.lk");
    let other = add_resident(&store, "b@example.lk");

    let mut booked = Vec::new();
    for (date, slot) in [
        (day(20), TimeSlot::Morning),
        (day(15), TimeSlot::Afternoon),
        (day(15), TimeSlot::Morning),
    ] {
        let record = service
            .schedule(NOW, resident, request(WasteCategory::Recyclable, 1, date, slot))
            .expect("schedule");
        service
            .mark_paid(NOW, resident, record.id, Some(PaymentMethod::Cash))
            .expect("pay");
        booked.push(record.id);
    }
    service
        .schedule(NOW, other, request(WasteCategory::Recyclable, 1, day(10), TimeSlot::Morning))
        .expect("other resident");

    let ids: Vec<_> = service
        .list_for_user(resident)
        .expect("list")
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec![booked[2], booked[1], booked[0]]);
}
