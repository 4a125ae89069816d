// libs/scheduling-cell/src/services/booking.rs
use chrono::{DateTime, Datelike, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{
    Appointment, AppointmentStatus, BookSlotRequest, SchedulingError,
};
use crate::services::notify::Notifier;
use crate::store::{AppointmentStore, DirectoryStore, ScheduleStore, StoreError};
use shared_config::AppConfig;
use shared_models::{AppointmentId, ProviderId};

/// Books appointments against provider schedules.
///
/// Checks run in a fixed order so a request failing several ways always
/// reports the same error: interval shape, party existence, provider
/// availability, working hours, breaks, then slot occupancy. The final
/// occupancy check and the insert are one atomic store operation.
pub struct BookingService {
    directory: Arc<dyn DirectoryStore>,
    schedules: Arc<dyn ScheduleStore>,
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
    upcoming_window: Duration,
}

impl BookingService {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        schedules: Arc<dyn ScheduleStore>,
        appointments: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        Self {
            directory,
            schedules,
            appointments,
            notifier,
            upcoming_window: Duration::hours(config.upcoming_window_hours),
        }
    }

    /// Attempt to book the requested interval. Success yields the stored
    /// appointment in `Pending` status.
    pub async fn book(&self, request: BookSlotRequest) -> Result<Appointment, SchedulingError> {
        if request.start >= request.end {
            return Err(SchedulingError::InvalidInterval(
                "start must be strictly before end".to_string(),
            ));
        }
        if request.start.date_naive() != request.end.date_naive() {
            return Err(SchedulingError::InvalidInterval(
                "appointment must start and end on the same date".to_string(),
            ));
        }

        if !self.directory.provider_exists(&request.provider_id).await? {
            return Err(SchedulingError::ProviderNotFound);
        }
        if !self.directory.requester_exists(&request.requester_id).await? {
            return Err(SchedulingError::RequesterNotFound);
        }

        let schedule = self
            .schedules
            .schedule_for(&request.provider_id)
            .await?
            .ok_or(SchedulingError::ProviderUnavailable)?;
        schedule.validate()?;

        let date = request.date();
        if schedule.day_off == Some(date.weekday()) {
            debug!(provider_id = %request.provider_id, %date, "booking refused, day off");
            return Err(SchedulingError::ProviderUnavailable);
        }

        let work_start = date.and_time(schedule.start_time).and_utc();
        let work_end = date.and_time(schedule.end_time).and_utc();
        if request.start < work_start || request.end > work_end {
            return Err(SchedulingError::OutsideWorkingHours);
        }

        for brk in &schedule.breaks {
            let br_start = date.and_time(brk.start_time).and_utc();
            let br_end = date.and_time(brk.end_time).and_utc();
            if br_start < request.end && request.start < br_end {
                return Err(SchedulingError::BreakConflict {
                    reason: brk.reason.clone(),
                });
            }
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: AppointmentId::generate(),
            provider_id: request.provider_id.clone(),
            requester_id: request.requester_id.clone(),
            date,
            day: request.day(),
            start: request.start,
            end: request.end,
            status: AppointmentStatus::Pending,
            purpose: request.purpose,
            attachments: request.attachments,
            created_at: now,
            updated_at: now,
        };

        let stored = match self.appointments.insert_if_free(appointment).await {
            Ok(stored) => stored,
            Err(StoreError::Conflict) => {
                warn!(
                    provider_id = %request.provider_id,
                    start = %request.start,
                    "slot already taken"
                );
                return Err(SchedulingError::SlotConflict);
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            appointment_id = %stored.id,
            provider_id = %stored.provider_id,
            start = %stored.start,
            "appointment booked"
        );

        if let Err(err) = self.notifier.booking_created(&stored).await {
            warn!(appointment_id = %stored.id, error = %err, "booking notification failed");
        }

        Ok(stored)
    }

    /// Live appointments for the provider starting within the configured
    /// upcoming window.
    pub async fn upcoming(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.upcoming_at(provider_id, Utc::now()).await
    }

    pub async fn upcoming_at(
        &self,
        provider_id: &ProviderId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if !self.directory.provider_exists(provider_id).await? {
            return Err(SchedulingError::ProviderNotFound);
        }

        let mut upcoming = self
            .appointments
            .live_in_range(provider_id, now, now + self.upcoming_window)
            .await?;
        upcoming.retain(|a| a.start >= now);
        Ok(upcoming)
    }

    /// Full appointment history for the provider, any status.
    pub async fn history(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if !self.directory.provider_exists(provider_id).await? {
            return Err(SchedulingError::ProviderNotFound);
        }

        Ok(self.appointments.all_for_provider(provider_id).await?)
    }
}
