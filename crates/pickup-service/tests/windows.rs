use chrono::{FixedOffset, NaiveDate};
use pickup_core::rules::{scheduled_instant, FeeSchedule, SchedulingPolicy};
use pickup_core::{
    CollectionId, CollectionRecord, CollectionRequest, PaymentMethod, PaymentStatus, ResidentId,
    TimeSlot, WasteCategory,
};
use pickup_service::{
    ConflictReason, NoopNotifier, PolicyReason, RescheduleRequest, SchedulingService,
    ServiceErrorKind,
};
use pickup_store::repo::ResidentNew;
use pickup_store::Store;

// 2030-01-01 00:00:00 UTC
const NOW: i64 = 1_893_456_000;
const HOUR: i64 = 3_600;

fn setup() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn policy() -> SchedulingPolicy {
    SchedulingPolicy {
        utc_offset: utc(),
        ..SchedulingPolicy::default()
    }
}

fn build_service(store: &Store, policy: SchedulingPolicy) -> SchedulingService<'_> {
    SchedulingService::new(store, store, &NoopNotifier, policy, FeeSchedule::default())
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

fn instant(date: NaiveDate, slot: TimeSlot) -> i64 {
    scheduled_instant(date, slot, utc()).expect("instant")
}

fn book(
    service: &SchedulingService<'_>,
    resident: ResidentId,
    date: NaiveDate,
    slot: TimeSlot,
) -> CollectionRecord {
    service
        .schedule(
            NOW,
            resident,
            CollectionRequest {
                category: WasteCategory::Bulky,
                items_description: "mattress".to_string(),
                quantity: 2,
                date,
                time_slot: slot,
                location: "7 Flower Road".to_string(),
                coordinates: None,
                instructions: None,
            },
        )
        .expect("schedule")
}

#[test]
fn reschedule_inside_notice_window_is_rejected_and_record_unchanged() {
    let store = setup();
    let service = build_service(&store, policy());
    let resident = add_resident(&store, "a@example.lk");
    let record = book(&service, resident, day(15), TimeSlot::Morning);

    let target = instant(day(20), TimeSlot::Afternoon);
    let now = target - 24 * HOUR + 60;
    let err = service
        .reschedule(
            now,
            resident,
            record.id,
            RescheduleRequest::new(day(20), TimeSlot::Afternoon),
        )
        .expect_err("23h59m notice");
    assert_eq!(err.kind(), ServiceErrorKind::PolicyViolation);
    assert_eq!(
        err.policy_reason(),
        Some(&PolicyReason::RescheduleWindow { notice_hours: 24 })
    );

    let after = service.get_for_user(resident, record.id).expect("get");
    assert_eq!(after, record);
}

#[test]
fn reschedule_at_exactly_the_notice_boundary_is_allowed() {
    let store = setup();
    let service = build_service(&store, policy());
    let resident = add_resident(&store, "a@example.lk");
    let record = book(&service, resident, day(15), TimeSlot::Morning);
    service
        .mark_cash_pending(NOW, resident, record.id)
        .expect("cash pending");

    let target = instant(day(20), TimeSlot::Afternoon);
    let moved = service
        .reschedule(
            target - 24 * HOUR,
            resident,
            record.id,
            RescheduleRequest::new(day(20), TimeSlot::Afternoon),
        )
        .expect("exactly 24h notice");

    assert_eq!(moved.date, day(20));
    assert_eq!(moved.time_slot, TimeSlot::Afternoon);
    assert_eq!(moved.status, record.status);
    assert_eq!(moved.payment_status, PaymentStatus::Pending);
    assert_eq!(moved.payment_method, Some(PaymentMethod::Cash));
    assert_eq!(moved.fee, record.fee);
    assert_eq!(moved.qr_token, record.qr_token);
}

#[test]
fn reschedule_with_a_minute_to_spare_is_allowed() {
    let store = setup();
    let service = build_service(&store, policy());
    let resident = add_resident(&store, "a@example.lk");
    let record = book(&service, resident, day(15), TimeSlot::Morning);

    let target = instant(day(21), TimeSlot::Morning);
    let moved = service
        .reschedule(
            target - 24 * HOUR - 60,
            resident,
            record.id,
            RescheduleRequest::new(day(21), TimeSlot::Morning),
        )
        .expect("24h01m notice");
    assert_eq!(moved.date, day(21));
    assert_eq!(moved.time_slot, TimeSlot::Morning);
}

#[test]
fn reschedule_checks_existence_and_ownership() {
    let store = setup();
    let service = build_service(&store, policy());
    let owner = add_resident(&store, "owner@example.lk");
    let intruder = add_resident(&store, "intruder@example.lk");
    let record = book(&service, owner, day(15), TimeSlot::Morning);

    let err = service
        .reschedule(
            NOW,
            intruder,
            record.id,
            RescheduleRequest::new(day(20), TimeSlot::Morning),
        )
        .expect_err("not owner");
    assert_eq!(err.kind(), ServiceErrorKind::Unauthorized);

    let err = service
        .reschedule(
            NOW,
            owner,
            CollectionId::new(),
            RescheduleRequest::new(day(20), TimeSlot::Morning),
        )
        .expect_err("missing");
    assert_eq!(err.kind(), ServiceErrorKind::NotFound);

    let err = service
        .get_for_user(intruder, record.id)
        .expect_err("not owner");
    assert_eq!(err.kind(), ServiceErrorKind::Unauthorized);
}

#[test]
fn reschedule_respects_target_capacity() {
    let store = setup();
    let tight = SchedulingPolicy {
        capacity_per_slot: 1,
        ..policy()
    };
    let service = build_service(&store, tight);
    let first = add_resident(&store, "first@example.lk");
    let second = add_resident(&store, "second@example.lk");
    let mine = book(&service, first, day(15), TimeSlot::Morning);
    book(&service, second, day(20), TimeSlot::Morning);

    let err = service
        .reschedule(
            NOW,
            first,
            mine.id,
            RescheduleRequest::new(day(20), TimeSlot::Morning),
        )
        .expect_err("target full");
    assert_eq!(
        err.conflict_reason(),
        Some(&ConflictReason::SlotFull {
            date: day(20),
            slot: TimeSlot::Morning
        })
    );
    assert_eq!(service.get_for_user(first, mine.id).expect("get"), mine);

    let same = service
        .reschedule(
            NOW,
            first,
            mine.id,
            RescheduleRequest::new(day(15), TimeSlot::Morning),
        )
        .expect("own slot is never full for its occupant");
    assert_eq!(same.date, day(15));
}

#[test]
fn fee_is_frozen_unless_recalculation_is_enabled() {
    let store = setup();
    let service = build_service(&store, policy());
    let resident = add_resident(&store, "a@example.lk");
    let record = book(&service, resident, day(15), TimeSlot::Morning);

    let err = service
        .reschedule(
            NOW,
            resident,
            record.id,
            RescheduleRequest {
                quantity: Some(4),
                ..RescheduleRequest::new(day(20), TimeSlot::Morning)
            },
        )
        .expect_err("fee frozen");
    assert_eq!(err.policy_reason(), Some(&PolicyReason::FeeFrozen));

    let unchanged_inputs = service
        .reschedule(
            NOW,
            resident,
            record.id,
            RescheduleRequest {
                category: Some(WasteCategory::Bulky),
                quantity: Some(2),
                ..RescheduleRequest::new(day(20), TimeSlot::Morning)
            },
        )
        .expect("same category and quantity");
    assert_eq!(unchanged_inputs.fee, 240);

    let flexible = SchedulingPolicy {
        allow_fee_recalc_on_reschedule: true,
        ..policy()
    };
    let service = build_service(&store, flexible);
    let repriced = service
        .reschedule(
            NOW,
            resident,
            record.id,
            RescheduleRequest {
                category: Some(WasteCategory::Hazardous),
                quantity: Some(3),
                ..RescheduleRequest::new(day(21), TimeSlot::Afternoon)
            },
        )
        .expect("recalculated");
    assert_eq!(repriced.category, WasteCategory::Hazardous);
    assert_eq!(repriced.quantity, 3);
    assert_eq!(repriced.fee, 420);
}

#[test]
fn reschedule_rejects_zero_quantity_as_invalid() {
    let store = setup();
    let resident = add_resident(&store, "a@example.lk");
    let service = build_service(&store, policy());
    let record = book(&service, resident, day(15), TimeSlot::Morning);

    for allow_fee_recalc_on_reschedule in [false, true] {
        let service = build_service(
            &store,
            SchedulingPolicy {
                allow_fee_recalc_on_reschedule,
                ..policy()
            },
        );
        let err = service
            .reschedule(
                NOW,
                resident,
                record.id,
                RescheduleRequest {
                    quantity: Some(0),
                    ..RescheduleRequest::new(day(20), TimeSlot::Morning)
                },
            )
            .expect_err("zero quantity");
        assert_eq!(err.kind(), ServiceErrorKind::InvalidArgument);
    }

    let unchanged = service.get_for_user(resident, record.id).expect("get");
    assert_eq!(unchanged, record);
}

#[test]
fn cancel_needs_eight_hours_notice() {
    let store = setup();
    let service = build_service(&store, policy());
    let resident = add_resident(&store, "a@example.lk");
    let record = book(&service, resident, day(15), TimeSlot::Afternoon);
    let starts_at = instant(day(15), TimeSlot::Afternoon);

    let err = service
        .cancel(starts_at - 8 * HOUR + 1, resident, record.id)
        .expect_err("inside window");
    assert_eq!(
        err.policy_reason(),
        Some(&PolicyReason::CancelWindow { notice_hours: 8 })
    );
    assert_eq!(
        service.get_for_user(resident, record.id).expect("still there"),
        record
    );

    let snapshot = service
        .cancel(starts_at - 8 * HOUR, resident, record.id)
        .expect("exactly 8h");
    assert_eq!(snapshot, record);

    let err = service
        .get_for_user(resident, record.id)
        .expect_err("gone after cancel");
    assert_eq!(err.kind(), ServiceErrorKind::NotFound);
    assert!(service.list_for_user(resident).expect("list").is_empty());

    let err = service
        .cancel(NOW, resident, record.id)
        .expect_err("second cancel");
    assert_eq!(err.kind(), ServiceErrorKind::NotFound);
}

#[test]
fn cancel_frees_the_seat_and_the_unpaid_allowance() {
    let store = setup();
    let tight = SchedulingPolicy {
        capacity_per_slot: 1,
        ..policy()
    };
    let service = build_service(&store, tight);
    let resident = add_resident(&store, "a@example.lk");
    let other = add_resident(&store, "b@example.lk");

    let record = book(&service, resident, day(15), TimeSlot::Morning);
    service.cancel(NOW, resident, record.id).expect("cancel");

    book(&service, other, day(15), TimeSlot::Morning);
    book(&service, resident, day(16), TimeSlot::Morning);
}

#[test]
fn cancel_rejects_other_residents() {
    let store = setup();
    let service = build_service(&store, policy());
    let owner = add_resident(&store, "owner@example.lk");
    let intruder = add_resident(&store, "intruder@example.lk");
    let record = book(&service, owner, day(15), TimeSlot::Morning);

    let err = service
        .cancel(NOW, intruder, record.id)
        .expect_err("not owner");
    assert_eq!(err.kind(), ServiceErrorKind::Unauthorized);
    assert!(service.get_for_user(owner, record.id).is_ok());
}
