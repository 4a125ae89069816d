// libs/scheduling-cell/src/services/availability.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::models::{DaySlot, SchedulingError, SlotStatus};
use crate::services::slots::SlotGenerator;
use crate::store::{AppointmentStore, ScheduleStore};
use shared_models::ProviderId;

/// Resolves a provider's bookable slots for one date by crossing the
/// generated grid with the appointments already held in the store.
pub struct AvailabilityService {
    schedules: Arc<dyn ScheduleStore>,
    appointments: Arc<dyn AppointmentStore>,
    generator: SlotGenerator,
}

impl AvailabilityService {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        appointments: Arc<dyn AppointmentStore>,
        generator: SlotGenerator,
    ) -> Self {
        Self {
            schedules,
            appointments,
            generator,
        }
    }

    pub async fn resolve(
        &self,
        provider_id: &ProviderId,
        date: NaiveDate,
    ) -> Result<Vec<DaySlot>, SchedulingError> {
        self.resolve_at(provider_id, date, Utc::now()).await
    }

    /// Same as [`resolve`](Self::resolve) with an explicit clock.
    ///
    /// A provider with no schedule at all is an error; a day off is an empty
    /// list. When `date` is today, slots whose start has already passed are
    /// dropped before labelling.
    pub async fn resolve_at(
        &self,
        provider_id: &ProviderId,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<DaySlot>, SchedulingError> {
        let schedule = self
            .schedules
            .schedule_for(provider_id)
            .await?
            .ok_or(SchedulingError::ScheduleNotFound)?;

        let mut candidates = self.generator.generate(&schedule, date)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        if date == now.date_naive() {
            candidates.retain(|slot| slot.start > now);
        }

        let day_start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| SchedulingError::InvalidInterval("unrepresentable date".to_string()))?
            .and_utc();
        let day_end = day_start + Duration::days(1);

        let booked = self
            .appointments
            .live_in_range(provider_id, day_start, day_end)
            .await?;

        let slots: Vec<DaySlot> = candidates
            .into_iter()
            .map(|slot| {
                let taken = booked.iter().any(|a| a.overlaps(slot.start, slot.end));
                DaySlot {
                    start: slot.start,
                    end: slot.end,
                    status: if taken {
                        SlotStatus::Booked
                    } else {
                        SlotStatus::Available
                    },
                }
            })
            .collect();

        debug!(
            %provider_id,
            %date,
            total = slots.len(),
            booked = slots.iter().filter(|s| s.status == SlotStatus::Booked).count(),
            "resolved availability"
        );
        Ok(slots)
    }
}
