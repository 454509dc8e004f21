use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A doctor's recurring weekly template for one day of the week. Admin-owned;
/// at most one active row per (doctor_id, day_of_week). Wall-clock times
/// travel as strings exactly as the store serializes its `time` columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: i32, // 0 = Sunday, 1 = Monday, etc.
    pub is_available: bool,
    pub start_time: String,
    pub end_time: String,
    pub break_start_time: Option<String>,
    pub break_end_time: Option<String>,
    pub buffer_minutes: Option<i32>,
    pub max_appointments_per_day: Option<i32>,
}

/// An approved or pending absence. Only approved rows reach the engine.
/// Both time fields absent means a full-day leave; both present means a
/// partial-day window inside the date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub approved: bool,
    pub leave_type: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedAppointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Active appointments are the ones that still occupy their slot.
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub duration_minutes: i32,
    pub exclude_appointment_id: Option<Uuid>,
}

/// Verdict for a single requested interval. `conflicts` carries stable
/// machine-readable tags (`no_schedule`, `outside_hours`, `during_break`,
/// `leave:<type>`, `appointment:<id>`, `max_reached`, `system_error`);
/// `message` is for humans and may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub available: bool,
    pub message: String,
    pub conflicts: Vec<String>,
}

impl AvailabilityResult {
    pub fn available() -> Self {
        Self {
            available: true,
            message: "Doctor is available at this time".to_string(),
            conflicts: vec![],
        }
    }

    pub fn unavailable(message: impl Into<String>, conflicts: Vec<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
            conflicts,
        }
    }

    /// Fail-closed verdict for a store read that failed or timed out.
    pub fn system_error() -> Self {
        Self::unavailable(
            "Error checking availability. Please try again.",
            vec!["system_error".to_string()],
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// Error types specific to availability evaluation. Store failures are not
// here on purpose: they degrade to a negative AvailabilityResult instead of
// propagating, so one bad read cannot take down a whole day grid.
#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
