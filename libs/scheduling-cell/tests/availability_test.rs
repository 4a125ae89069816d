// libs/scheduling-cell/tests/availability_test.rs
mod common;

use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};

use common::{booking_request, monday, TestSetup};
use scheduling_cell::models::{SchedulingError, SlotStatus, TransitionAction};
use shared_models::ProviderId;

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
}

#[tokio::test]
async fn unknown_provider_has_no_schedule() {
    let setup = TestSetup::new();
    let result = setup
        .availability
        .resolve(&ProviderId::new("DOC999"), june(2))
        .await;
    assert_matches!(result, Err(SchedulingError::ScheduleNotFound));
}

#[tokio::test]
async fn day_off_resolves_to_empty() {
    let setup = TestSetup::new();
    // 2025-06-01 is a Sunday.
    let slots = setup
        .availability
        .resolve(&ProviderId::new(common::PROVIDER), june(1))
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn full_day_before_any_booking_is_all_available() {
    let setup = TestSetup::new();
    let slots = setup
        .availability
        .resolve_at(
            &ProviderId::new(common::PROVIDER),
            june(2),
            // The day before, so no slot is filtered as past.
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(slots.len(), 28);
    assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
}

#[tokio::test]
async fn booked_slot_is_labelled_and_released_on_cancel() {
    let setup = TestSetup::new();
    let provider = ProviderId::new(common::PROVIDER);
    let yesterday_noon = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    let appointment = setup
        .booking
        .book(booking_request(monday(10, 0), monday(10, 15)))
        .await
        .unwrap();

    let slots = setup
        .availability
        .resolve_at(&provider, june(2), yesterday_noon)
        .await
        .unwrap();
    let ten = slots.iter().find(|s| s.start == monday(10, 0)).unwrap();
    assert_eq!(ten.status, SlotStatus::Booked);
    assert_eq!(
        slots.iter().filter(|s| s.status == SlotStatus::Booked).count(),
        1
    );

    setup
        .lifecycle
        .transition_at(&appointment.id, TransitionAction::Cancel, yesterday_noon)
        .await
        .unwrap();

    let slots = setup
        .availability
        .resolve_at(&provider, june(2), yesterday_noon)
        .await
        .unwrap();
    let ten = slots.iter().find(|s| s.start == monday(10, 0)).unwrap();
    assert_eq!(ten.status, SlotStatus::Available);
}

#[tokio::test]
async fn past_slots_are_dropped_when_resolving_today() {
    let setup = TestSetup::new();
    let slots = setup
        .availability
        .resolve_at(&ProviderId::new(common::PROVIDER), june(2), monday(12, 0))
        .await
        .unwrap();

    // 12:15, 12:30, 12:45 and the twelve afternoon slots. The 12:00 slot
    // starts exactly at the clock and is already gone.
    assert_eq!(slots.len(), 15);
    assert_eq!(slots[0].start, monday(12, 15));
    assert_eq!(slots.last().unwrap().start, monday(16, 45));
}

#[tokio::test]
async fn slots_come_back_sorted() {
    let setup = TestSetup::new();
    let slots = setup
        .availability
        .resolve_at(
            &ProviderId::new(common::PROVIDER),
            june(2),
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    for pair in slots.windows(2) {
        assert!(pair[0].start < pair[1].start);
    }
}
