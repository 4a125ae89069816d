// libs/scheduling-cell/src/services/lifecycle.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{Appointment, AppointmentStatus, SchedulingError, TransitionAction};
use crate::services::notify::Notifier;
use crate::store::{AppointmentStore, CasOutcome};
use shared_models::AppointmentId;

/// Statuses an action may start from.
fn allowed_from(action: TransitionAction) -> &'static [AppointmentStatus] {
    match action {
        TransitionAction::Approve | TransitionAction::Reject => &[AppointmentStatus::Pending],
        TransitionAction::Cancel => &[AppointmentStatus::Pending, AppointmentStatus::Approved],
        TransitionAction::Complete => &[AppointmentStatus::Approved],
    }
}

fn target_status(action: TransitionAction) -> AppointmentStatus {
    match action {
        TransitionAction::Approve => AppointmentStatus::Approved,
        TransitionAction::Reject => AppointmentStatus::Rejected,
        TransitionAction::Cancel => AppointmentStatus::Cancelled,
        TransitionAction::Complete => AppointmentStatus::Completed,
    }
}

/// Drives appointments through their status machine. Every status write is a
/// compare-and-set against the store, so two racing transitions cannot both
/// win.
pub struct AppointmentLifecycleService {
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
}

impl AppointmentLifecycleService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            appointments,
            notifier,
        }
    }

    pub async fn transition(
        &self,
        id: &AppointmentId,
        action: TransitionAction,
    ) -> Result<Appointment, SchedulingError> {
        self.transition_at(id, action, Utc::now()).await
    }

    /// Apply `action` to the appointment, with an explicit clock for the
    /// cancellation cutoff. Cancelling is allowed only strictly before the
    /// appointment's start time.
    pub async fn transition_at(
        &self,
        id: &AppointmentId,
        action: TransitionAction,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let expected = allowed_from(action);

        let current = self
            .appointments
            .get(id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound)?;

        if !expected.contains(&current.status) {
            return Err(SchedulingError::InvalidTransition {
                from: current.status,
                action,
            });
        }

        if action == TransitionAction::Cancel && now >= current.start {
            return Err(SchedulingError::TooLateToCancel);
        }

        match self
            .appointments
            .compare_and_set_status(id, expected, target_status(action), now)
            .await?
        {
            CasOutcome::Updated(updated) => {
                info!(
                    appointment_id = %updated.id,
                    status = %updated.status,
                    %action,
                    "appointment transitioned"
                );
                if let Err(err) = self.notifier.status_changed(&updated, action).await {
                    warn!(appointment_id = %updated.id, error = %err, "status notification failed");
                }
                Ok(updated)
            }
            // Lost a race: another transition moved the record between our
            // read and the write. Report the status actually found.
            CasOutcome::Mismatch(found) => Err(SchedulingError::InvalidTransition {
                from: found.status,
                action,
            }),
            CasOutcome::Missing => Err(SchedulingError::AppointmentNotFound),
        }
    }

    /// Move approved appointments whose end time has passed to `Completed`.
    /// Returns the appointments that were actually swept.
    pub async fn sweep_completed(&self) -> Result<Vec<Appointment>, SchedulingError> {
        self.sweep_completed_at(Utc::now()).await
    }

    pub async fn sweep_completed_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let expired = self
            .appointments
            .with_status_ended_before(AppointmentStatus::Approved, now)
            .await?;

        let mut swept = Vec::new();
        for appointment in expired {
            let outcome = self
                .appointments
                .compare_and_set_status(
                    &appointment.id,
                    &[AppointmentStatus::Approved],
                    AppointmentStatus::Completed,
                    now,
                )
                .await?;
            if let CasOutcome::Updated(updated) = outcome {
                swept.push(updated);
            }
        }

        info!(count = swept.len(), "swept ended appointments to completed");
        Ok(swept)
    }
}
