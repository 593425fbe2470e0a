use chrono::{FixedOffset, NaiveDate};
use pickup_core::rules::{FeeSchedule, SchedulingPolicy};
use pickup_core::{CollectionRequest, ResidentId, TimeSlot, WasteCategory};
use pickup_service::{ConflictReason, NoopNotifier, SchedulingService, ServiceError};
use pickup_store::repo::ResidentNew;
use pickup_store::{paths, Store};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

// 2030-01-01 00:00:00 UTC
const NOW: i64 = 1_893_456_000;
const CAPACITY: usize = 10;
const PREBOOKED: usize = 6;
const CONTENDERS: usize = 16;

fn policy() -> SchedulingPolicy {
    SchedulingPolicy {
        utc_offset: FixedOffset::east_opt(0).unwrap(),
        ..SchedulingPolicy::default()
    }
}

fn request(date: NaiveDate) -> CollectionRequest {
    CollectionRequest {
        category: WasteCategory::Organic,
        items_description: "garden cuttings".to_string(),
        quantity: 1,
        date,
        time_slot: TimeSlot::Morning,
        location: "Ward 4".to_string(),
        coordinates: None,
        instructions: None,
    }
}

#[test]
fn concurrent_schedules_fill_exactly_the_remaining_seats() {
    let temp = TempDir::new().expect("temp dir");
    let db_path = paths::db_path_in(temp.path());
    let date = NaiveDate::from_ymd_opt(2030, 1, 15).unwrap();

    let setup = Store::open(&db_path).expect("open store");
    setup.migrate().expect("migrate");
    let residents: Vec<ResidentId> = (0..PREBOOKED + CONTENDERS)
        .map(|index| {
            setup
                .residents()
                .create(
                    NOW,
                    ResidentNew {
                        display_name: format!("Resident {index}"),
                        email: format!("r{index}@example.lk"),
                        active: true,
                        overdue_payments: false,
                    },
                )
                .expect("create resident")
                .id
        })
        .collect();

    {
        let service =
            SchedulingService::new(&setup, &setup, &NoopNotifier, policy(), FeeSchedule::default());
        for resident in &residents[..PREBOOKED] {
            service
                .schedule(NOW, *resident, request(date))
                .expect("prebook");
        }
    }

    let stores: Vec<Store> = (0..CONTENDERS)
        .map(|_| Store::open(&db_path).expect("open contender"))
        .collect();
    let barrier = Arc::new(Barrier::new(CONTENDERS));

    let handles: Vec<_> = stores
        .into_iter()
        .zip(residents[PREBOOKED..].iter().copied())
        .map(|(store, resident)| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let service = SchedulingService::new(
                    &store,
                    &store,
                    &NoopNotifier,
                    policy(),
                    FeeSchedule::default(),
                );
                barrier.wait();
                service
                    .schedule(NOW, resident, request(date))
                    .map(|record| record.id)
                    .map_err(|err| err.conflict_reason().cloned().ok_or(err))
            })
        })
        .collect();

    let mut booked = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.join().expect("thread") {
            Ok(_) => booked += 1,
            Err(Ok(ConflictReason::SlotFull { .. })) => rejected += 1,
            Err(Ok(other)) => panic!("unexpected conflict: {other}"),
            Err(Err(err)) => panic!("unexpected error: {}", describe(&err)),
        }
    }

    assert_eq!(booked, CAPACITY - PREBOOKED);
    assert_eq!(rejected, CONTENDERS - booked);
    let count = setup
        .collections()
        .count_for_slot(date, TimeSlot::Morning)
        .expect("count");
    assert_eq!(count as usize, CAPACITY);
}

fn describe(err: &ServiceError) -> String {
    format!("{err} ({:?})", err.kind())
}
