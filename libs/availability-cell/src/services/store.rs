use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tokio::time::timeout;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{BookedAppointment, LeaveRequest, WeeklyAvailability};

/// Read interfaces over the schedule/leave/booking store. Every read carries
/// a deadline; a read that misses it is an error for the caller to fail
/// closed on, never an implicit "available".
pub struct AvailabilityStore {
    supabase: SupabaseClient,
    read_timeout: Duration,
}

impl AvailabilityStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            read_timeout: Duration::from_secs(config.store_timeout_secs),
        }
    }

    /// The active weekly template for (doctor, day-of-week), if any.
    pub async fn get_weekly_availability(
        &self,
        doctor_id: Uuid,
        day_of_week: i32,
        auth_token: Option<&str>,
    ) -> Result<Option<WeeklyAvailability>> {
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&day_of_week=eq.{}&is_available=eq.true",
            doctor_id, day_of_week
        );

        let rows: Vec<WeeklyAvailability> = self.read(&path, auth_token).await?;
        Ok(rows.into_iter().next())
    }

    /// Approved leaves whose date range contains `date`.
    pub async fn get_approved_leaves(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<LeaveRequest>> {
        let path = format!(
            "/rest/v1/doctor_leaves?doctor_id=eq.{}&approved=eq.true&start_date=lte.{}&end_date=gte.{}",
            doctor_id, date, date
        );

        self.read(&path, auth_token).await
    }

    /// Appointments still occupying their slot on `date`, optionally
    /// excluding one id (the appointment being rescheduled).
    pub async fn get_active_appointments(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_id: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<Vec<BookedAppointment>> {
        let mut path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&scheduled_date=eq.{}&status=not.in.(cancelled,no_show,completed)&order=scheduled_time.asc",
            doctor_id, date
        );

        if let Some(exclude) = exclude_id {
            path.push_str(&format!("&id=neq.{}", exclude));
        }

        self.read(&path, auth_token).await
    }

    async fn read<T: DeserializeOwned>(&self, path: &str, auth_token: Option<&str>) -> Result<T> {
        debug!("Store read: {}", path);

        match timeout(self.read_timeout, self.supabase.get::<T>(path, auth_token)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "Store read timed out after {}s: {}",
                self.read_timeout.as_secs(),
                path
            )),
        }
    }
}
