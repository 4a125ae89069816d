// libs/scheduling-cell/src/services/notify.rs
use async_trait::async_trait;
use tracing::info;

use crate::models::{Appointment, TransitionAction};

/// Outbound notifications. Fire-and-forget: callers log failures and carry
/// on, a dead notifier never blocks a booking or a transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_created(&self, appointment: &Appointment) -> anyhow::Result<()>;

    async fn status_changed(
        &self,
        appointment: &Appointment,
        action: TransitionAction,
    ) -> anyhow::Result<()>;
}

/// Default notifier that only writes structured log lines.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_created(&self, appointment: &Appointment) -> anyhow::Result<()> {
        info!(
            appointment_id = %appointment.id,
            provider_id = %appointment.provider_id,
            requester_id = %appointment.requester_id,
            start = %appointment.start,
            "notify: booking created"
        );
        Ok(())
    }

    async fn status_changed(
        &self,
        appointment: &Appointment,
        action: TransitionAction,
    ) -> anyhow::Result<()> {
        info!(
            appointment_id = %appointment.id,
            status = %appointment.status,
            %action,
            "notify: appointment status changed"
        );
        Ok(())
    }
}
