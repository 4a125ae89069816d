// libs/scheduling-cell/src/store/mod.rs
pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Appointment, AppointmentStatus, SchedulingError, WorkingSchedule};
use shared_models::{AppointmentId, ProviderId, RequesterId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("write conflicts with a live appointment")]
    Conflict,

    #[error("record not found")]
    NotFound,

    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for SchedulingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => SchedulingError::SlotConflict,
            StoreError::NotFound => SchedulingError::AppointmentNotFound,
            StoreError::Backend(msg) => SchedulingError::Store(msg),
        }
    }
}

/// Result of a guarded status update.
#[derive(Debug, Clone)]
pub enum CasOutcome {
    /// The record matched one of the expected statuses and was updated.
    Updated(Appointment),
    /// The record exists but its status was not among the expected ones.
    /// Carries the record as found so the caller can report the real status.
    Mismatch(Appointment),
    /// No record with that id.
    Missing,
}

/// Read access to provider working schedules. Schedules are owned by the
/// onboarding flow; this cell only consumes them.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn schedule_for(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Option<WorkingSchedule>, StoreError>;
}

/// Existence checks against the provider and requester registries.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn provider_exists(&self, provider_id: &ProviderId) -> Result<bool, StoreError>;
    async fn requester_exists(&self, requester_id: &RequesterId) -> Result<bool, StoreError>;
}

/// Appointment persistence. `insert_if_free` and `compare_and_set_status` are
/// the two primitives every implementation must make atomic; all booking and
/// lifecycle guarantees rest on them.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn get(&self, id: &AppointmentId) -> Result<Option<Appointment>, StoreError>;

    /// Live appointments for the provider overlapping `[from, to)`, sorted by
    /// start time.
    async fn live_in_range(
        &self,
        provider_id: &ProviderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Every appointment ever recorded for the provider, any status, sorted by
    /// start time.
    async fn all_for_provider(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Appointments in `status` whose end time is at or before `cutoff`.
    async fn with_status_ended_before(
        &self,
        status: AppointmentStatus,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Insert the appointment unless a live appointment for the same provider
    /// overlaps its interval. The overlap check and the insert happen under
    /// one critical section; returns `StoreError::Conflict` when occupied.
    async fn insert_if_free(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    /// Atomically move the appointment to `next` if its current status is one
    /// of `expected`, stamping `updated_at` with `now`.
    async fn compare_and_set_status(
        &self,
        id: &AppointmentId,
        expected: &[AppointmentStatus],
        next: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<CasOutcome, StoreError>;
}
