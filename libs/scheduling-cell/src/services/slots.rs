// libs/scheduling-cell/src/services/slots.rs
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::models::{SchedulingError, SlotCandidate, WorkingSchedule};
use shared_config::AppConfig;

/// Pure slot-grid generator. Walks the working window in fixed steps and
/// drops every window that intersects a break. No store access, no clock.
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    slot_duration: Duration,
}

impl SlotGenerator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            slot_duration: Duration::minutes(config.slot_duration_minutes),
        }
    }

    pub fn with_slot_minutes(minutes: i64) -> Self {
        Self {
            slot_duration: Duration::minutes(minutes),
        }
    }

    /// Candidate slots for `date` under `schedule`, in ascending order.
    ///
    /// A day off yields an empty list, not an error. A trailing window
    /// shorter than the slot duration is never emitted. Whether a slot is
    /// already booked is out of scope here.
    pub fn generate(
        &self,
        schedule: &WorkingSchedule,
        date: NaiveDate,
    ) -> Result<Vec<SlotCandidate>, SchedulingError> {
        schedule.validate()?;

        if schedule.day_off == Some(date.weekday()) {
            debug!(provider_id = %schedule.provider_id, %date, "requested date is the provider's day off");
            return Ok(Vec::new());
        }

        // NaiveTime arithmetic wraps at midnight, so the walk runs on full
        // datetimes anchored to the requested date.
        let work_start: NaiveDateTime = date.and_time(schedule.start_time);
        let work_end: NaiveDateTime = date.and_time(schedule.end_time);

        let mut slots = Vec::new();
        let mut current = work_start;

        while current + self.slot_duration <= work_end {
            let slot_end = current + self.slot_duration;

            let in_break = schedule.breaks.iter().any(|brk| {
                let br_start = date.and_time(brk.start_time);
                let br_end = date.and_time(brk.end_time);
                br_start < slot_end && current < br_end
            });

            if !in_break {
                slots.push(SlotCandidate {
                    start: current.and_utc(),
                    end: slot_end.and_utc(),
                });
            }

            current = slot_end;
        }

        debug!(
            provider_id = %schedule.provider_id,
            %date,
            count = slots.len(),
            "generated slot candidates"
        );
        Ok(slots)
    }
}

impl Default for SlotGenerator {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}
