// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use shared_models::{AppointmentId, ProviderId, RequesterId};

// ==============================================================================
// WORKING SCHEDULE
// ==============================================================================

/// A pause inside a provider's working day during which no slot may be offered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakInterval {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub reason: String,
}

/// A provider's recurring weekly availability template.
///
/// Owned by the onboarding flow and read-only to this cell; replaced wholesale
/// on update. The break invariants are checked, never auto-corrected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingSchedule {
    pub provider_id: ProviderId,
    pub day_off: Option<Weekday>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub breaks: Vec<BreakInterval>,
}

impl WorkingSchedule {
    /// Check the schedule's data integrity: a non-empty working window, every
    /// break inside `[start_time, end_time)`, and no two breaks overlapping.
    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.start_time >= self.end_time {
            return Err(SchedulingError::ScheduleIntegrity(format!(
                "working window {} - {} is empty",
                self.start_time, self.end_time
            )));
        }

        for brk in &self.breaks {
            if brk.start_time >= brk.end_time {
                return Err(SchedulingError::ScheduleIntegrity(format!(
                    "break {:?} has an empty interval",
                    brk.reason
                )));
            }
            if brk.start_time < self.start_time || brk.end_time > self.end_time {
                return Err(SchedulingError::ScheduleIntegrity(format!(
                    "break {:?} falls outside working hours",
                    brk.reason
                )));
            }
        }

        for (i, a) in self.breaks.iter().enumerate() {
            for b in self.breaks.iter().skip(i + 1) {
                if a.start_time < b.end_time && b.start_time < a.end_time {
                    return Err(SchedulingError::ScheduleIntegrity(format!(
                        "breaks {:?} and {:?} overlap",
                        a.reason, b.reason
                    )));
                }
            }
        }

        Ok(())
    }
}

// ==============================================================================
// SLOTS
// ==============================================================================

/// One fixed-duration window on the generation grid. Ephemeral: generated
/// fresh per query and never cached, since schedules can change between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCandidate {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
}

/// A candidate slot labelled against the provider's existing reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: SlotStatus,
}

/// Half-open interval overlap: `[s1,e1)` and `[s2,e2)` overlap iff
/// `s1 < e2 && s2 < e1`. Touching endpoints do not count.
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub provider_id: ProviderId,
    pub requester_id: RequesterId,
    pub date: NaiveDate,
    /// Weekday of `start`, stored for reporting.
    pub day: Weekday,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub purpose: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        intervals_overlap(self.start, self.end, start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Live appointments count against availability; rejected and cancelled
    /// ones release their interval.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Approved | AppointmentStatus::Completed
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Approved => write!(f, "approved"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The actions callers may drive through the lifecycle service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Approve,
    Reject,
    Cancel,
    Complete,
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionAction::Approve => write!(f, "approve"),
            TransitionAction::Reject => write!(f, "reject"),
            TransitionAction::Cancel => write!(f, "cancel"),
            TransitionAction::Complete => write!(f, "complete"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSlotRequest {
    pub provider_id: ProviderId,
    pub requester_id: RequesterId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub purpose: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl BookSlotRequest {
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn day(&self) -> Weekday {
        self.start.weekday()
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum SchedulingError {
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("provider not found")]
    ProviderNotFound,

    #[error("requester not found")]
    RequesterNotFound,

    #[error("appointment not found")]
    AppointmentNotFound,

    #[error("no working schedule found for provider")]
    ScheduleNotFound,

    #[error("provider is not available on the requested date")]
    ProviderUnavailable,

    #[error("requested time is outside the provider's working hours")]
    OutsideWorkingHours,

    #[error("provider is not available during {reason} break")]
    BreakConflict { reason: String },

    #[error("the requested time slot overlaps with an existing appointment")]
    SlotConflict,

    #[error("cannot {action} an appointment in status {from}")]
    InvalidTransition {
        from: AppointmentStatus,
        action: TransitionAction,
    },

    #[error("appointment can no longer be cancelled once its start time has passed")]
    TooLateToCancel,

    #[error("schedule integrity violation: {0}")]
    ScheduleIntegrity(String),

    #[error("store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn schedule_with_breaks(breaks: Vec<BreakInterval>) -> WorkingSchedule {
        WorkingSchedule {
            provider_id: ProviderId::new("DOC1"),
            day_off: Some(Weekday::Sun),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            breaks,
        }
    }

    fn brk(start: (u32, u32), end: (u32, u32), reason: &str) -> BreakInterval {
        BreakInterval {
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::from_str::<TransitionAction>("\"approve\"").unwrap(),
            TransitionAction::Approve
        );
    }

    #[test]
    fn live_statuses_match_taxonomy() {
        assert!(AppointmentStatus::Pending.is_live());
        assert!(AppointmentStatus::Approved.is_live());
        assert!(AppointmentStatus::Completed.is_live());
        assert!(!AppointmentStatus::Rejected.is_live());
        assert!(!AppointmentStatus::Cancelled.is_live());
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let t = |h: u32| Utc.with_ymd_and_hms(2025, 6, 2, h, 0, 0).unwrap();
        assert!(!intervals_overlap(t(9), t(10), t(10), t(11)));
        assert!(intervals_overlap(t(9), t(11), t(10), t(12)));
    }

    #[test]
    fn schedule_with_clean_breaks_validates() {
        let schedule = schedule_with_breaks(vec![brk((13, 0), (14, 0), "Lunch")]);
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn overlapping_breaks_are_an_integrity_error() {
        let schedule = schedule_with_breaks(vec![
            brk((13, 0), (14, 0), "Lunch"),
            brk((13, 30), (14, 30), "Rounds"),
        ]);
        assert!(matches!(
            schedule.validate(),
            Err(SchedulingError::ScheduleIntegrity(_))
        ));
    }

    #[test]
    fn break_outside_hours_is_an_integrity_error() {
        let schedule = schedule_with_breaks(vec![brk((8, 0), (9, 30), "Early")]);
        assert!(matches!(
            schedule.validate(),
            Err(SchedulingError::ScheduleIntegrity(_))
        ));
    }
}
