use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AvailabilityError, AvailabilityQuery};
use crate::services::AvailabilityService;

const DEFAULT_APPOINTMENT_DURATION_MINUTES: i32 = 30;

// Query parameters for the availability endpoints
#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityParams {
    pub date: NaiveDate,
    pub start_time: String,
    pub duration_minutes: Option<i32>,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsParams {
    pub date: NaiveDate,
    pub duration_minutes: Option<i32>,
    pub granularity_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct BulkAvailabilityRequest {
    pub doctor_ids: Vec<Uuid>,
    pub date: NaiveDate,
    pub duration_minutes: Option<i32>,
}

#[axum::debug_handler]
pub async fn check_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(params): Query<CheckAvailabilityParams>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let query = AvailabilityQuery {
        doctor_id,
        date: params.date,
        start_time: params.start_time,
        duration_minutes: params
            .duration_minutes
            .unwrap_or(DEFAULT_APPOINTMENT_DURATION_MINUTES),
        exclude_appointment_id: params.exclude_appointment_id,
    };

    let result = service
        .check_availability(&query, bearer_token(&auth))
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!(result)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(params): Query<AvailableSlotsParams>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let slots = service
        .list_available_slots(
            doctor_id,
            params.date,
            params
                .duration_minutes
                .unwrap_or(DEFAULT_APPOINTMENT_DURATION_MINUTES),
            params.granularity_minutes,
            bearer_token(&auth),
        )
        .await
        .map_err(into_app_error)?;

    let total = slots.len();
    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": params.date,
        "slots": slots,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_multi_doctor_slots(
    State(state): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<BulkAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let slots_by_doctor = service
        .list_availability_for_doctors(
            &request.doctor_ids,
            request.date,
            request
                .duration_minutes
                .unwrap_or(DEFAULT_APPOINTMENT_DURATION_MINUTES),
            bearer_token(&auth),
        )
        .await;

    Ok(Json(json!({
        "date": request.date,
        "doctors": slots_by_doctor
    })))
}

fn bearer_token(auth: &Option<TypedHeader<Authorization<Bearer>>>) -> Option<&str> {
    auth.as_ref()
        .map(|TypedHeader(Authorization(bearer))| bearer.token())
}

fn into_app_error(error: AvailabilityError) -> AppError {
    match error {
        AvailabilityError::InvalidFormat(msg) => AppError::BadRequest(msg),
        AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
    }
}
