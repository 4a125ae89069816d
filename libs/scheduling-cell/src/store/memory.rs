// libs/scheduling-cell/src/store/memory.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{AppointmentStore, CasOutcome, DirectoryStore, ScheduleStore, StoreError};
use crate::models::{Appointment, AppointmentStatus, WorkingSchedule};
use shared_models::{AppointmentId, ProviderId, RequesterId};

#[derive(Debug, Default)]
struct MemoryInner {
    providers: HashSet<ProviderId>,
    requesters: HashSet<RequesterId>,
    schedules: HashMap<ProviderId, WorkingSchedule>,
    appointments: HashMap<AppointmentId, Appointment>,
}

/// In-memory store backing all three contracts. The single mutex serializes
/// `insert_if_free` and `compare_and_set_status`, which is what makes the
/// booking and lifecycle paths race-free.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
    }

    pub fn add_provider(&self, provider_id: ProviderId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.providers.insert(provider_id);
        }
    }

    pub fn add_requester(&self, requester_id: RequesterId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.requesters.insert(requester_id);
        }
    }

    pub fn upsert_schedule(&self, schedule: WorkingSchedule) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.providers.insert(schedule.provider_id.clone());
            inner.schedules.insert(schedule.provider_id.clone(), schedule);
        }
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn schedule_for(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Option<WorkingSchedule>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.schedules.get(provider_id).cloned())
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn provider_exists(&self, provider_id: &ProviderId) -> Result<bool, StoreError> {
        let inner = self.lock()?;
        Ok(inner.providers.contains(provider_id))
    }

    async fn requester_exists(&self, requester_id: &RequesterId) -> Result<bool, StoreError> {
        let inner = self.lock()?;
        Ok(inner.requesters.contains(requester_id))
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn get(&self, id: &AppointmentId) -> Result<Option<Appointment>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.appointments.get(id).cloned())
    }

    async fn live_in_range(
        &self,
        provider_id: &ProviderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.lock()?;
        let mut matches: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|a| {
                a.provider_id == *provider_id && a.status.is_live() && a.overlaps(from, to)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|a| a.start);
        Ok(matches)
    }

    async fn all_for_provider(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.lock()?;
        let mut matches: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|a| a.provider_id == *provider_id)
            .cloned()
            .collect();
        matches.sort_by_key(|a| a.start);
        Ok(matches)
    }

    async fn with_status_ended_before(
        &self,
        status: AppointmentStatus,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.lock()?;
        let mut matches: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|a| a.status == status && a.end <= cutoff)
            .cloned()
            .collect();
        matches.sort_by_key(|a| a.start);
        Ok(matches)
    }

    async fn insert_if_free(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut inner = self.lock()?;

        let occupied = inner.appointments.values().any(|existing| {
            existing.provider_id == appointment.provider_id
                && existing.status.is_live()
                && existing.overlaps(appointment.start, appointment.end)
        });
        if occupied {
            debug!(
                appointment_id = %appointment.id,
                provider_id = %appointment.provider_id,
                "insert rejected, interval already held"
            );
            return Err(StoreError::Conflict);
        }

        inner.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn compare_and_set_status(
        &self,
        id: &AppointmentId,
        expected: &[AppointmentStatus],
        next: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<CasOutcome, StoreError> {
        let mut inner = self.lock()?;

        let Some(record) = inner.appointments.get_mut(id) else {
            return Ok(CasOutcome::Missing);
        };

        if !expected.contains(&record.status) {
            return Ok(CasOutcome::Mismatch(record.clone()));
        }

        record.status = next;
        record.updated_at = now;
        Ok(CasOutcome::Updated(record.clone()))
    }
}
