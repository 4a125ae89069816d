// libs/scheduling-cell/tests/common/mod.rs
use chrono::{DateTime, NaiveTime, TimeZone, Utc, Weekday};
use std::sync::Arc;

use scheduling_cell::models::{BookSlotRequest, BreakInterval, WorkingSchedule};
use scheduling_cell::services::{
    AppointmentLifecycleService, AvailabilityService, BookingService, LogNotifier, SlotGenerator,
};
use scheduling_cell::store::MemoryStore;
use shared_config::AppConfig;
use shared_models::{ProviderId, RequesterId};

pub const PROVIDER: &str = "DOC1";
pub const REQUESTER: &str = "PAT1";

/// Full service stack over one in-memory store, seeded with a provider whose
/// week is Mon-Sat 09:00-17:00 with a lunch break and Sundays off.
pub struct TestSetup {
    pub store: Arc<MemoryStore>,
    pub availability: AvailabilityService,
    pub booking: BookingService,
    pub lifecycle: AppointmentLifecycleService,
}

impl TestSetup {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let store = Arc::new(MemoryStore::new());
        store.add_requester(RequesterId::new(REQUESTER));
        store.upsert_schedule(standard_schedule());

        Self::with_store(store)
    }

    /// Stack over an already-seeded store, for scenarios that need a
    /// different schedule.
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        let config = AppConfig::default();
        let generator = SlotGenerator::new(&config);
        let notifier = Arc::new(LogNotifier);

        let availability =
            AvailabilityService::new(store.clone(), store.clone(), generator);
        let booking = BookingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            notifier.clone(),
            &config,
        );
        let lifecycle = AppointmentLifecycleService::new(store.clone(), notifier);

        Self {
            store,
            availability,
            booking,
            lifecycle,
        }
    }
}

pub fn standard_schedule() -> WorkingSchedule {
    WorkingSchedule {
        provider_id: ProviderId::new(PROVIDER),
        day_off: Some(Weekday::Sun),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        breaks: vec![BreakInterval {
            start_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            reason: "Lunch".to_string(),
        }],
    }
}

/// A Monday under the standard schedule.
pub fn monday(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
}

pub fn booking_request(start: DateTime<Utc>, end: DateTime<Utc>) -> BookSlotRequest {
    BookSlotRequest {
        provider_id: ProviderId::new(PROVIDER),
        requester_id: RequesterId::new(REQUESTER),
        start,
        end,
        purpose: Some("checkup".to_string()),
        attachments: Vec::new(),
    }
}
