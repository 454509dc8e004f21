use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{
    AvailabilityError, AvailabilityQuery, AvailabilityResult, AvailabilitySlot,
};
use crate::services::store::AvailabilityStore;
use crate::timeutil::{intervals_overlap, minutes_to_time, time_to_minutes};

const DEFAULT_SLOT_GRANULARITY_MINUTES: i32 = 15;

pub struct AvailabilityService {
    store: AvailabilityStore,
    max_concurrent_checks: usize,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: AvailabilityStore::new(config),
            max_concurrent_checks: config.max_concurrent_availability_checks.max(1),
        }
    }

    /// Check whether a doctor can be booked for the requested interval.
    ///
    /// Constraints are evaluated in a fixed order and the first failure is
    /// returned: schedule existence, working hours, break window, approved
    /// leaves, booking conflicts (with buffer, all reported together), daily
    /// cap. The ordering decides which reason the caller sees when several
    /// constraints would fail at once, so it is part of the contract.
    ///
    /// Store read failures degrade to an unavailable result tagged
    /// `system_error`; malformed time values are returned as errors.
    pub async fn check_availability(
        &self,
        query: &AvailabilityQuery,
        auth_token: Option<&str>,
    ) -> Result<AvailabilityResult, AvailabilityError> {
        debug!(
            "Checking availability for doctor {} on {} at {} for {} minutes",
            query.doctor_id, query.date, query.start_time, query.duration_minutes
        );

        if query.duration_minutes <= 0 {
            return Err(AvailabilityError::Validation(
                "Duration must be a positive number of minutes".to_string(),
            ));
        }

        let requested_start = time_to_minutes(&query.start_time)?;
        let requested_end = requested_start + query.duration_minutes;

        // 1. Weekly schedule for this day of the week. A doctor we cannot
        //    read is a doctor we do not book.
        let schedule = match self
            .store
            .get_weekly_availability(query.doctor_id, day_of_week(query.date), auth_token)
            .await
        {
            Ok(Some(schedule)) => schedule,
            Ok(None) => {
                return Ok(AvailabilityResult::unavailable(
                    "Doctor is not available on this day of the week",
                    vec!["no_schedule".to_string()],
                ));
            }
            Err(e) => {
                warn!(
                    "Failed to load weekly availability for doctor {}: {}",
                    query.doctor_id, e
                );
                return Ok(AvailabilityResult::system_error());
            }
        };

        // 2. Working-hours containment.
        let working_start = time_to_minutes(&schedule.start_time)?;
        let working_end = time_to_minutes(&schedule.end_time)?;

        if requested_start < working_start || requested_end > working_end {
            return Ok(AvailabilityResult::unavailable(
                format!(
                    "Doctor is only available from {} to {}",
                    minutes_to_time(working_start),
                    minutes_to_time(working_end)
                ),
                vec!["outside_hours".to_string()],
            ));
        }

        // 3. Break window.
        if let (Some(break_start), Some(break_end)) =
            (&schedule.break_start_time, &schedule.break_end_time)
        {
            let break_start = time_to_minutes(break_start)?;
            let break_end = time_to_minutes(break_end)?;

            if intervals_overlap(requested_start, requested_end, break_start, break_end) {
                return Ok(AvailabilityResult::unavailable(
                    format!(
                        "Doctor has a break from {} to {}",
                        minutes_to_time(break_start),
                        minutes_to_time(break_end)
                    ),
                    vec!["during_break".to_string()],
                ));
            }
        }

        // 4. Approved leaves containing this date.
        let leaves = match self
            .store
            .get_approved_leaves(query.doctor_id, query.date, auth_token)
            .await
        {
            Ok(leaves) => leaves,
            Err(e) => {
                warn!("Failed to load leaves for doctor {}: {}", query.doctor_id, e);
                return Ok(AvailabilityResult::system_error());
            }
        };

        for leave in &leaves {
            match (&leave.start_time, &leave.end_time) {
                (None, None) => {
                    return Ok(AvailabilityResult::unavailable(
                        format!("Doctor is on {} leave", leave.leave_type),
                        vec![format!("leave:{}", leave.leave_type)],
                    ));
                }
                (Some(leave_start), Some(leave_end)) => {
                    let leave_start = time_to_minutes(leave_start)?;
                    let leave_end = time_to_minutes(leave_end)?;

                    if intervals_overlap(requested_start, requested_end, leave_start, leave_end) {
                        return Ok(AvailabilityResult::unavailable(
                            format!(
                                "Doctor is on {} leave from {} to {}",
                                leave.leave_type,
                                minutes_to_time(leave_start),
                                minutes_to_time(leave_end)
                            ),
                            vec![format!("leave:{}", leave.leave_type)],
                        ));
                    }
                }
                // One bound without the other is a malformed row, not a
                // full-day leave; surface it instead of guessing.
                _ => {
                    return Err(AvailabilityError::InvalidFormat(format!(
                        "Leave {} has a start or end time but not both",
                        leave.id
                    )));
                }
            }
        }

        // 5. Booking conflicts, each existing appointment expanded by the
        //    configured buffer on both sides. Unlike the single-cause checks
        //    above, every conflicting appointment is reported.
        let appointments = match self
            .store
            .get_active_appointments(
                query.doctor_id,
                query.date,
                query.exclude_appointment_id,
                auth_token,
            )
            .await
        {
            Ok(appointments) => appointments,
            Err(e) => {
                warn!(
                    "Failed to load appointments for doctor {}: {}",
                    query.doctor_id, e
                );
                return Ok(AvailabilityResult::system_error());
            }
        };

        // Only active appointments occupy their slot
        let active_appointments: Vec<_> = appointments
            .into_iter()
            .filter(|appointment| appointment.status.is_active())
            .collect();

        let buffer = schedule.buffer_minutes.unwrap_or(0);
        let mut conflicts = Vec::new();

        for appointment in &active_appointments {
            let appointment_start = time_to_minutes(&appointment.scheduled_time)?;
            let appointment_end = appointment_start + appointment.duration_minutes;

            if intervals_overlap(
                requested_start,
                requested_end,
                appointment_start - buffer,
                appointment_end + buffer,
            ) {
                conflicts.push(format!("appointment:{}", appointment.id));
            }
        }

        if !conflicts.is_empty() {
            return Ok(AvailabilityResult::unavailable(
                "Doctor has conflicting appointments at this time",
                conflicts,
            ));
        }

        // 6. Daily cap. Counts the same fetched list, so a rescheduled
        //    appointment excluded above is exempt here too.
        if let Some(max_appointments) = schedule.max_appointments_per_day {
            if active_appointments.len() as i32 >= max_appointments {
                return Ok(AvailabilityResult::unavailable(
                    format!(
                        "Doctor has reached the maximum appointments limit for this day ({})",
                        max_appointments
                    ),
                    vec!["max_reached".to_string()],
                ));
            }
        }

        Ok(AvailabilityResult::available())
    }

    /// Enumerate the full day grid of candidate slots for one doctor.
    ///
    /// Candidates step through the working window at `granularity_minutes`
    /// (default 15) and each is classified through `check_availability`; the
    /// grid is returned in full, unavailable slots carrying their reason, so
    /// callers can render a day view. No active schedule means no slots.
    pub async fn list_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        duration_minutes: i32,
        granularity_minutes: Option<i32>,
        auth_token: Option<&str>,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        let granularity = granularity_minutes.unwrap_or(DEFAULT_SLOT_GRANULARITY_MINUTES);

        if duration_minutes <= 0 || granularity <= 0 {
            return Err(AvailabilityError::Validation(
                "Duration and granularity must be positive numbers of minutes".to_string(),
            ));
        }

        let schedule = match self
            .store
            .get_weekly_availability(doctor_id, day_of_week(date), auth_token)
            .await
        {
            Ok(Some(schedule)) => schedule,
            Ok(None) => return Ok(vec![]),
            Err(e) => {
                warn!(
                    "Failed to load weekly availability for doctor {}: {}",
                    doctor_id, e
                );
                return Ok(vec![]);
            }
        };

        let working_start = time_to_minutes(&schedule.start_time)?;
        let working_end = time_to_minutes(&schedule.end_time)?;

        let mut slots = Vec::new();
        let mut slot_start = working_start;

        while slot_start + duration_minutes <= working_end {
            let start_time = minutes_to_time(slot_start);

            let check = self
                .check_availability(
                    &AvailabilityQuery {
                        doctor_id,
                        date,
                        start_time: start_time.clone(),
                        duration_minutes,
                        exclude_appointment_id: None,
                    },
                    auth_token,
                )
                .await?;

            slots.push(AvailabilitySlot {
                start_time,
                end_time: minutes_to_time(slot_start + duration_minutes),
                is_available: check.available,
                reason: if check.available {
                    None
                } else {
                    Some(check.message)
                },
            });

            slot_start += granularity;
        }

        debug!(
            "Built {} slots for doctor {} on {}",
            slots.len(),
            doctor_id,
            date
        );
        Ok(slots)
    }

    /// Enumerate day grids for several doctors concurrently, bounded by the
    /// configured in-flight limit. A failure for one doctor yields an empty
    /// list for that doctor only.
    pub async fn list_availability_for_doctors(
        &self,
        doctor_ids: &[Uuid],
        date: NaiveDate,
        duration_minutes: i32,
        auth_token: Option<&str>,
    ) -> HashMap<Uuid, Vec<AvailabilitySlot>> {
        debug!(
            "Enumerating availability for {} doctors on {}",
            doctor_ids.len(),
            date
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.max_concurrent_checks));

        let slot_futures: Vec<_> = doctor_ids
            .iter()
            .map(|&doctor_id| {
                let semaphore = Arc::clone(&semaphore);

                async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    let slots = match self
                        .list_available_slots(doctor_id, date, duration_minutes, None, auth_token)
                        .await
                    {
                        Ok(slots) => slots,
                        Err(e) => {
                            warn!("Failed to enumerate slots for doctor {}: {}", doctor_id, e);
                            vec![]
                        }
                    };

                    (doctor_id, slots)
                }
            })
            .collect();

        join_all(slot_futures).await.into_iter().collect()
    }
}

fn day_of_week(date: NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}
